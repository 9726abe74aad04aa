//! Route access decisions for the front end.
//!
//! The guard only consumes the session's signals (authenticated, admin,
//! current identity); route tables themselves belong to the caller.

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};

/// Login entry point
pub const LOGIN_PATH: &str = "/login";

/// Where an already authenticated user lands when opening the login page
pub const HOME_PATH: &str = "/";

/// Shown when a non-admin opens an admin route
pub const FORBIDDEN_PATH: &str = "/403";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send the user to the login page, remembering where they were going
    Login { location: String },
    Redirect(String),
    Forbidden,
}

/// Build the login location, carrying the original destination so the
/// user can be sent back after logging in
pub fn login_location(return_path: Option<&str>) -> String {
    match return_path {
        Some(path) if !path.is_empty() && path != LOGIN_PATH => {
            format!("{}?redirect={}", LOGIN_PATH, path)
        }
        _ => LOGIN_PATH.to_string(),
    }
}

pub struct NavigationGuard {
    client: ApiClient,
}

impl NavigationGuard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.auth().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.client.auth().is_admin()
    }

    /// Decide whether navigation to `path` may proceed
    pub async fn check(&self, path: &str, access: RouteAccess) -> GuardDecision {
        let auth = self.client.auth();

        if path == LOGIN_PATH {
            return if auth.is_authenticated() {
                GuardDecision::Redirect(HOME_PATH.to_string())
            } else {
                GuardDecision::Allow
            };
        }

        if !auth.is_authenticated() {
            return match access {
                RouteAccess::Public => GuardDecision::Allow,
                _ => GuardDecision::Login {
                    location: login_location(Some(path)),
                },
            };
        }

        if auth.identity().is_none() {
            let client = self.client.with_return_path(path);
            match auth.session().initialize(&client).await {
                Ok(_) => {}
                Err(ApiError::IdentityFetch(cause)) if matches!(*cause, ApiError::SessionExpired) => {
                    // The pipeline already cleared the session and redirected
                    debug!(path, "Session expired while loading identity");
                    return GuardDecision::Login {
                        location: login_location(Some(path)),
                    };
                }
                Err(e) => {
                    warn!(error = %e, path, "Could not load identity, forcing login");
                    return self.force_reauthenticate(Some(path));
                }
            }
        }

        if access == RouteAccess::Admin && !auth.is_admin() {
            debug!(path, "Admin route denied");
            return GuardDecision::Forbidden;
        }

        GuardDecision::Allow
    }

    /// Drop the session and send the user to the login page
    pub fn force_reauthenticate(&self, return_path: Option<&str>) -> GuardDecision {
        if let Err(e) = self.client.auth().clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        let location = login_location(return_path);
        self.client.feedback().redirect_to_login(&location);
        GuardDecision::Login { location }
    }
}
