//! Data models for the user and role management API.
//!
//! This module contains the structures exchanged with the REST service:
//!
//! - `User` / `Identity`: account profile with its role set
//! - `Role`: named authorization role
//! - `Envelope`, `Page`: the response wrapper and paged list shape
//! - Request bodies for login, registration and admin operations

pub mod envelope;
pub mod role;
pub mod user;

pub use envelope::{Envelope, Page};
pub use role::{format_roles, has_role, NewRole, Role, ADMIN_ROLE};
pub use user::{
    ChangePasswordRequest, CreateUserRequest, Identity, LoginRequest, RegisterRequest,
    UpdateProfileRequest, User, UserQuery, UserStatistics, UserStatus,
};
