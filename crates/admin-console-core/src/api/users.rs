//! Administrative user management endpoints.

use serde_json::json;

use crate::models::{CreateUserRequest, Page, User, UserQuery, UserStatistics, UserStatus};

use super::{ApiClient, ApiRequest, ApiResult};

impl ApiClient {
    pub async fn fetch_users(&self, query: &UserQuery) -> ApiResult<Page<User>> {
        self.send(ApiRequest::get("/users").query_pairs(query.to_params()))
            .await
    }

    pub async fn fetch_user(&self, user_id: i64) -> ApiResult<User> {
        self.send(ApiRequest::get(format!("/users/{}", user_id))).await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<User> {
        self.send(ApiRequest::post("/users").json(request)?).await
    }

    pub async fn update_user_status(
        &self,
        user_id: i64,
        status: UserStatus,
    ) -> ApiResult<Option<String>> {
        let request = ApiRequest::put(format!("/users/{}/status", user_id))
            .json(&json!({ "status": i32::from(status) }))?;
        self.send_message(request).await
    }

    pub async fn batch_update_user_status(
        &self,
        user_ids: &[i64],
        status: UserStatus,
    ) -> ApiResult<Option<String>> {
        let request = ApiRequest::put("/users/batch/status").json(&json!({
            "userIds": user_ids,
            "status": i32::from(status),
        }))?;
        self.send_message(request).await
    }

    pub async fn reset_user_password(
        &self,
        user_id: i64,
        password: &str,
    ) -> ApiResult<Option<String>> {
        let request = ApiRequest::put(format!("/users/{}/reset-password", user_id))
            .json(&json!({ "password": password }))?;
        self.send_message(request).await
    }

    pub async fn delete_user(&self, user_id: i64) -> ApiResult<Option<String>> {
        self.send_message(ApiRequest::delete(format!("/users/{}", user_id)))
            .await
    }

    pub async fn fetch_user_statistics(&self) -> ApiResult<UserStatistics> {
        self.send(ApiRequest::get("/users/statistics")).await
    }
}
