//! REST API client module for the user/role management service.
//!
//! This module provides the `ApiClient`, the authenticated request pipeline
//! every call goes through, plus typed bindings for the auth, user and role
//! endpoints.
//!
//! The API uses JWT bearer tokens obtained from `/auth/login` and renewed
//! through `/auth/refresh`; all responses are wrapped in an `Envelope`.

pub mod auth;
pub mod client;
pub mod error;
pub mod roles;
pub mod users;

pub use client::{ApiClient, ApiRequest};
pub use error::{ApiError, ApiResult, ACCESS_DENIED_CODE};
