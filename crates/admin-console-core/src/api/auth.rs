//! Login, logout, registration and current-user endpoints.

use serde::Deserialize;
use tracing::info;

use crate::models::{
    ChangePasswordRequest, Identity, LoginRequest, RegisterRequest, UpdateProfileRequest, User,
};

use super::{ApiClient, ApiRequest, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

impl ApiClient {
    /// Authenticate and start a session.
    ///
    /// Stores the returned token pair and makes the returned user the
    /// session identity.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Identity> {
        let request = ApiRequest::post("/auth/login").json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let response: LoginResponse = self.send(request).await?;

        self.auth()
            .credentials()
            .set_tokens(&response.access_token, &response.refresh_token)?;
        self.auth().session().set(response.user.clone());

        info!(user_id = response.user.id, username = %response.user.username, "Logged in");
        Ok(response.user)
    }

    /// End the session. The server is told when a token exists, but local
    /// state is cleared regardless of its answer. Calling it again is a no-op.
    ///
    /// Clearing waits for any refresh in flight so its tokens cannot
    /// outlive the logout.
    pub async fn logout(&self) -> ApiResult<()> {
        if self.auth().is_authenticated() {
            self.fire_and_forget(&ApiRequest::post("/auth/logout")).await;
        }
        let _gate = self.auth().refresh_gate().lock().await;
        self.auth().clear()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn register(&self, form: &RegisterRequest) -> ApiResult<User> {
        self.send(ApiRequest::post("/auth/register").json(form)?).await
    }

    /// Ask the server whether the current token is still accepted
    pub async fn validate_token(&self) -> ApiResult<Option<String>> {
        self.send_message(ApiRequest::post("/auth/validate")).await
    }

    /// `true` when the username is free
    pub async fn check_username(&self, username: &str) -> ApiResult<bool> {
        self.send(ApiRequest::get("/auth/check-username").query("username", username))
            .await
    }

    /// `true` when the email is free
    pub async fn check_email(&self, email: &str) -> ApiResult<bool> {
        self.send(ApiRequest::get("/auth/check-email").query("email", email))
            .await
    }

    /// Fetch the logged-in user's profile without touching the session cache
    pub async fn fetch_profile(&self) -> ApiResult<Identity> {
        self.send(ApiRequest::get("/users/profile")).await
    }

    /// The session identity, fetching it once if needed
    pub async fn current_user(&self) -> ApiResult<Identity> {
        self.auth().session().initialize(self).await
    }

    /// Update the logged-in user's profile and refresh the cached identity
    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> ApiResult<Identity> {
        let identity: Identity = self
            .send(ApiRequest::put("/users/profile").json(update)?)
            .await?;
        self.auth().session().set(identity.clone());
        Ok(identity)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<Option<String>> {
        let request = ApiRequest::put("/users/password").json(&ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        })?;
        self.send_message(request).await
    }
}
