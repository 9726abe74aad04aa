//! Client core for the user and role management console.
//!
//! The pieces, leaves first:
//!
//! - [`auth::CredentialStore`]: persisted access/refresh tokens
//! - [`auth::SessionState`]: the cached identity and its authorization flags
//! - [`api::ApiClient`]: the authenticated request pipeline plus typed
//!   bindings for the auth, user and role endpoints
//!
//! They are tied together by an explicitly owned [`auth::AuthContext`] that
//! is shared between the client and the [`auth::NavigationGuard`].

pub mod api;
pub mod auth;
pub mod config;
pub mod feedback;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResult};
pub use auth::{AuthContext, CredentialStore, GuardDecision, NavigationGuard, RouteAccess};
pub use config::Config;
pub use feedback::{Feedback, LogFeedback, ReauthDecision, RecordingFeedback};
