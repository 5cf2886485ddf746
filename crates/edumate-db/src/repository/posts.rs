//! Post operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewPost, Post, PostContent, PostType};
use crate::repository::Database;

/// Posts joined with the public fields of their author
const POST_SELECT: &str = r#"
    SELECT p.id, p.post_type, p.heading, p.body,
           p.campus, p.floor, p.room_no,
           p.start_date, p.end_date, p.start_time, p.end_time,
           p.is_date_range, p.is_time_range,
           p.author_id, p.author_username, p.created_at, p.updated_at,
           u.username AS user_username,
           u.first_name AS user_first_name,
           u.last_name AS user_last_name
    FROM posts p
    LEFT JOIN users u ON u.id = p.author_id
"#;

/// Query parameters for listing posts
#[derive(Debug, Clone)]
pub struct PostQuery {
    /// Exact-match filter on the post type
    pub post_type: Option<PostType>,
    /// Pagination offset
    pub offset: i64,
    /// Pagination limit
    pub limit: i64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            post_type: None,
            offset: 0,
            limit: 50,
        }
    }
}

impl Database {
    // ==================== Post Operations ====================

    /// Insert a new post and return it joined with its author
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();
        let content = &post.content;

        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                post_type, heading, body, campus, floor, room_no,
                start_date, end_date, start_time, end_time, is_date_range, is_time_range,
                author_id, author_username, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(content.post_type.as_str())
        .bind(&content.heading)
        .bind(&content.body)
        .bind(&content.location.campus)
        .bind(&content.location.floor)
        .bind(&content.location.room_no)
        .bind(content.event_details.start_date)
        .bind(content.event_details.end_date)
        .bind(&content.event_details.start_time)
        .bind(&content.event_details.end_time)
        .bind(content.event_details.is_date_range)
        .bind(content.event_details.is_time_range)
        .bind(post.author_id)
        .bind(&post.author_username)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        self.get_post_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Post: {}", id)))
    }

    /// Get a post by ID
    pub async fn get_post_by_id(&self, id: i64) -> Result<Option<Post>, DbError> {
        let sql = format!("{} WHERE p.id = ?", POST_SELECT);
        let result = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Post::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List posts, newest first, with an optional type filter and pagination
    ///
    /// Returns the page together with the total number of matching posts.
    pub async fn list_posts(&self, query: PostQuery) -> Result<(Vec<Post>, i64), DbError> {
        let where_clause = if query.post_type.is_some() {
            "WHERE p.post_type = ?"
        } else {
            ""
        };

        // Get total count
        let count_sql = format!("SELECT COUNT(*) as count FROM posts p {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(post_type) = query.post_type {
            count_query = count_query.bind(post_type.as_str());
        }
        let count_row = count_query.fetch_one(&self.pool).await?;
        let total: i64 = count_row.get("count");

        // Get posts; id breaks ties between posts created in the same instant
        let sql = format!(
            "{} {} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?",
            POST_SELECT, where_clause
        );
        let mut posts_query = sqlx::query(&sql);
        if let Some(post_type) = query.post_type {
            posts_query = posts_query.bind(post_type.as_str());
        }
        posts_query = posts_query.bind(query.limit).bind(query.offset);

        let rows = posts_query.fetch_all(&self.pool).await?;
        let posts: Result<Vec<Post>, _> = rows
            .iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect();

        Ok((posts?, total))
    }

    /// Overwrite the editable fields of a post and bump `updated_at`
    ///
    /// The author columns are never touched.
    pub async fn update_post_content(
        &self,
        id: i64,
        content: &PostContent,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET post_type = ?, heading = ?, body = ?,
                campus = ?, floor = ?, room_no = ?,
                start_date = ?, end_date = ?, start_time = ?, end_time = ?,
                is_date_range = ?, is_time_range = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(content.post_type.as_str())
        .bind(&content.heading)
        .bind(&content.body)
        .bind(&content.location.campus)
        .bind(&content.location.floor)
        .bind(&content.location.room_no)
        .bind(content.event_details.start_date)
        .bind(content.event_details.end_date)
        .bind(&content.event_details.start_time)
        .bind(&content.event_details.end_time)
        .bind(content.event_details.is_date_range)
        .bind(content.event_details.is_time_range)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post
    pub async fn delete_post(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
