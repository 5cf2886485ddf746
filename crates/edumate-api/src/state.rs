//! Application state

use edumate_auth::AccessPolicy;
use edumate_core::{AccountService, PostService};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub posts: Arc<PostService>,
    pub access: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        accounts: Arc<AccountService>,
        posts: Arc<PostService>,
        access: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            accounts,
            posts,
            access,
        }
    }
}
