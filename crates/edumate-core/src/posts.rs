//! Post lifecycle: creation, listing, lookup, author-only update and delete

use edumate_auth::AuthUser;
use edumate_db::utils::trimmed_non_empty;
use edumate_db::{
    Database, EventDetails, Location, NewPost, Post, PostContent, PostQuery, PostType,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
/// Largest page a caller may request
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Input for creating a post
///
/// Author fields are absent on purpose: the author is always the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub event_details: Option<EventDetails>,
}

/// Partial update of a post
///
/// Present fields replace the stored ones; `location` and `eventDetails`
/// replace the whole sub-record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub event_details: Option<EventDetails>,
}

/// Listing parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub skip: Option<i64>,
}

/// One page of posts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: i64,
    pub has_more: bool,
}

/// Post operations; every mutating call takes the caller's identity explicitly
#[derive(Clone)]
pub struct PostService {
    db: Database,
}

impl PostService {
    /// Create a new post service
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a post authored by `author`
    pub async fn create(&self, author: &AuthUser, input: PostInput) -> Result<Post, CoreError> {
        let (post_type, heading, body) = match (input.post_type, input.heading, input.body) {
            (Some(t), Some(h), Some(b)) if !t.is_empty() && !h.is_empty() && !b.is_empty() => {
                (t, h, b)
            }
            _ => {
                return Err(CoreError::Validation(
                    "Post type, heading, and body are required".to_string(),
                ));
            }
        };

        let content = validate_content(PostContent {
            post_type: parse_post_type(&post_type)?,
            heading,
            body,
            location: input.location.unwrap_or_default(),
            event_details: input.event_details.unwrap_or_default(),
        })?;

        let post = self
            .db
            .insert_post(NewPost {
                author_id: author.id,
                author_username: author.username.clone(),
                content,
            })
            .await?;

        info!(
            "Post {} ({}) created by {}",
            post.id,
            post.post_type.as_str(),
            author.username
        );
        Ok(post)
    }

    /// List posts newest first
    pub async fn list(&self, params: ListParams) -> Result<PostPage, CoreError> {
        let post_type = params
            .post_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(parse_post_type)
            .transpose()?;

        let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit < 1 {
            return Err(CoreError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }
        let limit = limit.min(MAX_PAGE_LIMIT);

        let skip = params.skip.unwrap_or(0);
        if skip < 0 {
            return Err(CoreError::Validation(
                "skip must not be negative".to_string(),
            ));
        }

        debug!(
            "Listing posts: type={:?} limit={} skip={}",
            post_type, limit, skip
        );

        let (posts, total) = self
            .db
            .list_posts(PostQuery {
                post_type,
                offset: skip,
                limit,
            })
            .await?;

        let has_more = total > skip + posts.len() as i64;
        Ok(PostPage {
            posts,
            total,
            has_more,
        })
    }

    /// Get a post by ID
    pub async fn get(&self, id: i64) -> Result<Post, CoreError> {
        self.db
            .get_post_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Post not found".to_string()))
    }

    /// Apply a patch to a post owned by `caller`
    ///
    /// The result is validated against its effective type, so switching a
    /// news post to an event requires the event fields to be present.
    pub async fn update(
        &self,
        caller: &AuthUser,
        id: i64,
        patch: PostPatch,
    ) -> Result<Post, CoreError> {
        let post = self.get(id).await?;
        ensure_author(caller, &post, "update")?;

        let mut content = post.content();
        if let Some(post_type) = patch.post_type {
            content.post_type = parse_post_type(&post_type)?;
        }
        if let Some(heading) = patch.heading {
            content.heading = heading;
        }
        if let Some(body) = patch.body {
            content.body = body;
        }
        if let Some(location) = patch.location {
            content.location = location;
        }
        if let Some(event_details) = patch.event_details {
            content.event_details = event_details;
        }
        let content = validate_content(content)?;

        // Last writer wins between concurrent updates by the same author
        if !self.db.update_post_content(id, &content).await? {
            return Err(CoreError::NotFound("Post not found".to_string()));
        }

        info!("Post {} updated by {}", id, caller.username);
        self.get(id).await
    }

    /// Delete a post owned by `caller`
    pub async fn delete(&self, caller: &AuthUser, id: i64) -> Result<(), CoreError> {
        let post = self.get(id).await?;
        ensure_author(caller, &post, "delete")?;

        if !self.db.delete_post(id).await? {
            return Err(CoreError::NotFound("Post not found".to_string()));
        }

        info!("Post {} deleted by {}", id, caller.username);
        Ok(())
    }
}

fn ensure_author(caller: &AuthUser, post: &Post, verb: &str) -> Result<(), CoreError> {
    if post.author.id != caller.id {
        warn!(
            "User {} tried to {} post {} owned by user {}",
            caller.id, verb, post.id, post.author.id
        );
        return Err(CoreError::Forbidden(format!(
            "Not authorized to {} this post",
            verb
        )));
    }
    Ok(())
}

fn parse_post_type(value: &str) -> Result<PostType, CoreError> {
    PostType::from_str(value)
        .map_err(|_| CoreError::Validation("postType must be one of: news, event".to_string()))
}

/// Normalize a post and enforce the per-type required fields
fn validate_content(content: PostContent) -> Result<PostContent, CoreError> {
    let heading = content.heading.trim().to_string();
    if heading.is_empty() {
        return Err(CoreError::Validation("heading must not be empty".to_string()));
    }
    if content.body.trim().is_empty() {
        return Err(CoreError::Validation("body must not be empty".to_string()));
    }

    let location = Location {
        campus: trimmed_non_empty(content.location.campus),
        floor: trimmed_non_empty(content.location.floor),
        room_no: trimmed_non_empty(content.location.room_no),
    };
    let event_details = EventDetails {
        start_time: trimmed_non_empty(content.event_details.start_time),
        end_time: trimmed_non_empty(content.event_details.end_time),
        ..content.event_details
    };

    if content.post_type == PostType::Event {
        if location.campus.is_none() {
            return Err(CoreError::Validation(
                "location.campus is required for events".to_string(),
            ));
        }
        if event_details.start_date.is_none() {
            return Err(CoreError::Validation(
                "eventDetails.startDate is required for events".to_string(),
            ));
        }
        if event_details.start_time.is_none() {
            return Err(CoreError::Validation(
                "eventDetails.startTime is required for events".to_string(),
            ));
        }
    }

    Ok(PostContent {
        post_type: content.post_type,
        heading,
        body: content.body,
        location,
        event_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use edumate_db::{NewUser, UserRole};

    async fn setup() -> (PostService, AuthUser, AuthUser) {
        let db = Database::in_memory().await.unwrap();
        let mut users = Vec::new();
        for (username, role) in [("chess_club", UserRole::SocietyHead), ("drama_club", UserRole::SocietyHead)] {
            let user = db
                .insert_user(NewUser {
                    username: username.to_string(),
                    email: format!("{}@campus.edu", username),
                    first_name: "Club".to_string(),
                    last_name: "Head".to_string(),
                    password_hash: "hash".to_string(),
                    role,
                })
                .await
                .unwrap();
            users.push(AuthUser::from_user(&user));
        }
        let other = users.pop().unwrap();
        let author = users.pop().unwrap();
        (PostService::new(db), author, other)
    }

    fn news(heading: &str) -> PostInput {
        PostInput {
            post_type: Some("news".to_string()),
            heading: Some(heading.to_string()),
            body: Some("Details inside".to_string()),
            ..Default::default()
        }
    }

    fn event() -> PostInput {
        PostInput {
            post_type: Some("event".to_string()),
            heading: Some("Spring tournament".to_string()),
            body: Some("Bring a board".to_string()),
            location: Some(Location {
                campus: Some("North".to_string()),
                floor: Some("2".to_string()),
                room_no: Some("204".to_string()),
            }),
            event_details: Some(EventDetails {
                start_date: NaiveDate::from_ymd_opt(2025, 4, 12),
                start_time: Some("10:00".to_string()),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_create_news_without_location() {
        let (posts, author, _) = setup().await;
        let post = posts.create(&author, news("  Results are out  ")).await.unwrap();

        assert_eq!(post.post_type, PostType::News);
        assert_eq!(post.heading, "Results are out");
        assert_eq!(post.author.id, author.id);
        assert_eq!(post.author_username, "chess_club");
        assert_eq!(post.location, Location::default());
    }

    #[tokio::test]
    async fn test_create_requires_type_heading_body() {
        let (posts, author, _) = setup().await;

        let mut input = news("x");
        input.body = None;
        assert!(matches!(posts.create(&author, input).await, Err(CoreError::Validation(_))));

        let mut input = news("x");
        input.post_type = Some("party".to_string());
        assert!(matches!(posts.create(&author, input).await, Err(CoreError::Validation(_))));

        let input = news("   ");
        assert!(matches!(posts.create(&author, input).await, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_event_requires_campus_and_start() {
        let (posts, author, _) = setup().await;
        assert!(posts.create(&author, event()).await.is_ok());

        let mut input = event();
        input.location = None;
        match posts.create(&author, input).await {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("location.campus")),
            other => panic!("expected validation error, got {:?}", other.map(|p| p.id)),
        }

        let mut input = event();
        input.location.as_mut().unwrap().campus = Some("  ".to_string());
        assert!(matches!(posts.create(&author, input).await, Err(CoreError::Validation(_))));

        let mut input = event();
        input.event_details.as_mut().unwrap().start_time = None;
        match posts.create(&author, input).await {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("startTime")),
            other => panic!("expected validation error, got {:?}", other.map(|p| p.id)),
        }

        let mut input = event();
        input.event_details = None;
        match posts.create(&author, input).await {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("startDate")),
            other => panic!("expected validation error, got {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (posts, author, _) = setup().await;
        for i in 0..60 {
            posts.create(&author, news(&format!("post {}", i))).await.unwrap();
        }

        let first = posts
            .list(ListParams { limit: Some(50), skip: Some(0), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(first.posts.len(), 50);
        assert_eq!(first.total, 60);
        assert!(first.has_more);
        assert_eq!(first.posts[0].heading, "post 59");

        let second = posts
            .list(ListParams { limit: Some(50), skip: Some(50), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(second.posts.len(), 10);
        assert_eq!(second.total, 60);
        assert!(!second.has_more);
        assert_eq!(second.posts[9].heading, "post 0");
    }

    #[tokio::test]
    async fn test_list_filters_and_rejects_bad_params() {
        let (posts, author, _) = setup().await;
        posts.create(&author, news("a")).await.unwrap();
        posts.create(&author, event()).await.unwrap();

        let events = posts
            .list(ListParams { post_type: Some("event".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(events.total, 1);
        assert_eq!(events.posts[0].post_type, PostType::Event);

        let all = posts.list(ListParams::default()).await.unwrap();
        assert_eq!(all.total, 2);
        assert!(!all.has_more);

        for params in [
            ListParams { post_type: Some("gossip".to_string()), ..Default::default() },
            ListParams { limit: Some(0), ..Default::default() },
            ListParams { skip: Some(-1), ..Default::default() },
        ] {
            assert!(matches!(posts.list(params).await, Err(CoreError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_only_author_may_update() {
        let (posts, author, other) = setup().await;
        let post = posts.create(&author, news("original")).await.unwrap();

        let patch = PostPatch { heading: Some("hijacked".to_string()), ..Default::default() };
        assert!(matches!(
            posts.update(&other, post.id, patch).await,
            Err(CoreError::Forbidden(_))
        ));
        assert_eq!(posts.get(post.id).await.unwrap().heading, "original");

        let patch = PostPatch { heading: Some("revised".to_string()), ..Default::default() };
        let updated = posts.update(&author, post.id, patch).await.unwrap();
        assert_eq!(updated.heading, "revised");
        assert_eq!(updated.body, post.body);
        assert_eq!(updated.author.id, author.id);
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_switching_to_event_revalidates() {
        let (posts, author, _) = setup().await;
        let post = posts.create(&author, news("meetup")).await.unwrap();

        let patch = PostPatch { post_type: Some("event".to_string()), ..Default::default() };
        assert!(matches!(
            posts.update(&author, post.id, patch).await,
            Err(CoreError::Validation(_))
        ));
        assert_eq!(posts.get(post.id).await.unwrap().post_type, PostType::News);

        let full = event();
        let patch = PostPatch {
            post_type: Some("event".to_string()),
            location: full.location,
            event_details: full.event_details,
            ..Default::default()
        };
        let updated = posts.update(&author, post.id, patch).await.unwrap();
        assert_eq!(updated.post_type, PostType::Event);
        assert_eq!(updated.location.campus.as_deref(), Some("North"));
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let (posts, author, _) = setup().await;
        assert!(matches!(
            posts.update(&author, 404, PostPatch::default()).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_author_only_and_not_idempotent() {
        let (posts, author, other) = setup().await;
        let post = posts.create(&author, news("temporary")).await.unwrap();

        assert!(matches!(posts.delete(&other, post.id).await, Err(CoreError::Forbidden(_))));
        assert!(posts.get(post.id).await.is_ok());

        posts.delete(&author, post.id).await.unwrap();
        assert!(matches!(posts.get(post.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(posts.delete(&author, post.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(posts.delete(&author, 12345).await, Err(CoreError::NotFound(_))));
    }
}
