//! EduMate Authentication and Authorization
//!
//! This crate provides password hashing, JWT-based identity tokens and
//! role-based access control for EduMate.

pub mod access;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod password;

pub use access::{AccessPolicy, Action, authorize};
pub use error::AuthError;
pub use identity::{AuthUser, extract_bearer_token};
pub use jwt::{Claims, JwtManager, TOKEN_TTL_HOURS};
pub use password::{hash_password, verify_password};
