//! session_manager - Identity and persisted session state
//!
//! Two concerns live here:
//! - the identity provider adapter: an explicit service object (never a
//!   module-level singleton) with a multi-listener change-notification
//!   contract and a guest fallback path;
//! - best-effort persisted session storage keyed by user email and agent
//!   role, last-write-wins, no TTL.

pub mod auth;
pub mod error;
pub mod storage;
pub mod structs;

pub use auth::{AuthError, AuthService, AuthSubscription, IdentityProvider};
pub use error::{Result, SessionError};
pub use storage::{FileSessionStore, SessionStore};
pub use structs::{
    conversation_key, user_key, AuthUser, SessionMeta, UploadSummary, CONVERSATION_KEY_PREFIX,
    USER_KEY_PREFIX,
};
