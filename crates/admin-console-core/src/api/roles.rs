//! Role management and role assignment endpoints.

use serde_json::json;

use crate::models::{NewRole, Role};

use super::{ApiClient, ApiRequest, ApiResult};

impl ApiClient {
    pub async fn fetch_roles(&self) -> ApiResult<Vec<Role>> {
        self.send(ApiRequest::get("/roles")).await
    }

    pub async fn fetch_role(&self, role_id: i64) -> ApiResult<Role> {
        self.send(ApiRequest::get(format!("/roles/{}", role_id))).await
    }

    pub async fn create_role(&self, role: &NewRole) -> ApiResult<Role> {
        self.send(ApiRequest::post("/roles").json(role)?).await
    }

    pub async fn update_role(&self, role_id: i64, role: &NewRole) -> ApiResult<Role> {
        self.send(ApiRequest::put(format!("/roles/{}", role_id)).json(role)?)
            .await
    }

    pub async fn delete_role(&self, role_id: i64) -> ApiResult<Option<String>> {
        self.send_message(ApiRequest::delete(format!("/roles/{}", role_id)))
            .await
    }

    pub async fn batch_delete_roles(&self, role_ids: &[i64]) -> ApiResult<Option<String>> {
        let request = ApiRequest::delete("/roles/batch").json(&json!({ "roleIds": role_ids }))?;
        self.send_message(request).await
    }

    /// Replace a user's role set
    pub async fn assign_roles(&self, user_id: i64, role_ids: &[i64]) -> ApiResult<Option<String>> {
        let request = ApiRequest::put(format!("/roles/assign/{}", user_id))
            .json(&json!({ "roleIds": role_ids }))?;
        self.send_message(request).await
    }

    pub async fn add_role_to_user(&self, user_id: i64, role_id: i64) -> ApiResult<Option<String>> {
        self.send_message(ApiRequest::post(format!("/roles/add/{}/{}", user_id, role_id)))
            .await
    }

    pub async fn remove_role_from_user(
        &self,
        user_id: i64,
        role_id: i64,
    ) -> ApiResult<Option<String>> {
        self.send_message(ApiRequest::delete(format!(
            "/roles/remove/{}/{}",
            user_id, role_id
        )))
        .await
    }

    pub async fn fetch_user_roles(&self, user_id: i64) -> ApiResult<Vec<Role>> {
        self.send(ApiRequest::get(format!("/roles/user/{}", user_id)))
            .await
    }

    pub async fn fetch_role_user_ids(&self, role_id: i64) -> ApiResult<Vec<i64>> {
        self.send(ApiRequest::get(format!("/roles/{}/users", role_id)))
            .await
    }

    pub async fn can_delete_role(&self, role_id: i64) -> ApiResult<bool> {
        self.send(ApiRequest::get(format!("/roles/{}/can-delete", role_id)))
            .await
    }

    /// Number of users holding the role
    pub async fn fetch_role_usage(&self, role_id: i64) -> ApiResult<u64> {
        self.send(ApiRequest::get(format!("/roles/{}/usage", role_id)))
            .await
    }

    pub async fn user_has_role(&self, user_id: i64, role_name: &str) -> ApiResult<bool> {
        self.send(ApiRequest::get(role_check_path(user_id, role_name)))
            .await
    }
}

/// The role name is a single path segment, whatever characters it holds
fn role_check_path(user_id: i64, role_name: &str) -> String {
    format!(
        "/roles/check/{}/{}",
        user_id,
        urlencoding::encode(role_name)
    )
}
