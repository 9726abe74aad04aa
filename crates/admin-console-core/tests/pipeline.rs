use std::sync::Arc;
use std::time::Duration;

use admin_console_core::{
    ApiClient, ApiError, AuthContext, CredentialStore, GuardDecision, NavigationGuard,
    ReauthDecision, RecordingFeedback, RouteAccess,
};
use admin_console_core::models::UserQuery;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    client: ApiClient,
    feedback: Arc<RecordingFeedback>,
}

impl Harness {
    async fn new() -> Self {
        Self::with_decision(ReauthDecision::Cancel).await
    }

    async fn with_decision(decision: ReauthDecision) -> Self {
        let server = MockServer::start().await;
        let auth = Arc::new(AuthContext::new(CredentialStore::in_memory()));
        let feedback = Arc::new(RecordingFeedback::new(decision));
        let client = ApiClient::new(&server.uri(), Duration::from_secs(5), auth, feedback.clone())
            .expect("client");
        Self {
            server,
            client,
            feedback,
        }
    }

    fn with_tokens(self, access: &str, refresh: Option<&str>) -> Self {
        let credentials = self.client.auth().credentials();
        credentials.set_access_token(access).unwrap();
        if let Some(refresh) = refresh {
            credentials.set_refresh_token(refresh).unwrap();
        }
        self
    }
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn profile(roles: &[&str]) -> Value {
    json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "status": 1,
        "roles": roles.iter().map(|r| json!({ "name": r })).collect::<Vec<_>>(),
    })
}

// ---------------------------------------------------------------------------
// Credential injection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attaches_bearer_token_when_present() {
    let h = Harness::new().await.with_tokens("tok-123", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ok(profile(&["USER"])))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.fetch_profile().await.unwrap();
    assert_eq!(user.username, "alice");
    assert!(h.feedback.notifications().is_empty());
}

#[tokio::test]
async fn sends_no_authorization_without_token() {
    let h = Harness::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/check-username"))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.client.check_username("newbie").await.unwrap());

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(requests[0].url.query(), Some("username=newbie"));
}

// ---------------------------------------------------------------------------
// Refresh and retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_refreshes_once_and_retries_once() {
    let h = Harness::new().await.with_tokens("stale", Some("r1"));
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ok(json!({ "accessToken": "fresh", "refreshToken": "r2" })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ok(profile(&["USER"])))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.fetch_profile().await.unwrap();
    assert_eq!(user.id, 1);

    let credentials = h.client.auth().credentials();
    assert_eq!(credentials.access_token().as_deref(), Some("fresh"));
    assert_eq!(credentials.refresh_token().as_deref(), Some("r2"));
    assert!(h.feedback.notifications().is_empty());
    assert!(h.feedback.redirects().is_empty());
}

#[tokio::test]
async fn missing_refresh_token_expires_session() {
    let h = Harness::new().await.with_tokens("stale", None);
    h.client.auth().session().set(
        serde_json::from_value(profile(&["ADMIN"])).unwrap(),
    );
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ok(json!({ "accessToken": "x", "refreshToken": "y" })))
        .expect(0)
        .mount(&h.server)
        .await;

    let client = h.client.with_return_path("/users");
    let err = client.fetch_users(&UserQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));

    let auth = h.client.auth();
    assert!(auth.credentials().access_token().is_none());
    assert!(auth.credentials().refresh_token().is_none());
    assert!(auth.identity().is_none());
    assert!(!auth.is_admin());
    assert_eq!(h.feedback.redirects(), vec!["/login?redirect=/users".to_string()]);
    assert_eq!(h.feedback.notifications().len(), 1);
}

#[tokio::test]
async fn rejected_refresh_expires_session() {
    let h = Harness::new().await.with_tokens("stale", Some("revoked"));
    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "success": false, "message": "Refresh token expired" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.fetch_roles().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(!h.client.auth().is_authenticated());
    assert_eq!(h.feedback.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn retry_that_is_still_unauthorized_does_not_refresh_again() {
    let h = Harness::new().await.with_tokens("stale", Some("r1"));
    Mock::given(method("GET"))
        .and(path("/users/statistics"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ok(json!({ "accessToken": "fresh", "refreshToken": "r2" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.fetch_user_statistics().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(!h.client.auth().is_authenticated());
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
    let h = Harness::new().await.with_tokens("stale", Some("r1"));
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ok(json!({ "accessToken": "fresh", "refreshToken": "r2" }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ok(profile(&["USER"])))
        .mount(&h.server)
        .await;

    let calls = (0..5).map(|_| h.client.fetch_profile());
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(
        h.client.auth().credentials().access_token().as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn explicit_refresh_failure_clears_session() {
    let h = Harness::new().await.with_tokens("access", None);
    let err = h.client.refresh_session().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(!h.client.auth().is_authenticated());
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn access_denied_envelope_notifies_without_retry_or_logout() {
    let h = Harness::new().await.with_tokens("tok", Some("r"));
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "X",
            "errorCode": "ACCESS_DENIED"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.fetch_users(&UserQuery::default()).await.unwrap_err();
    assert!(err.is_access_denied());
    assert_eq!(h.feedback.notifications(), vec!["X".to_string()]);
    assert_eq!(h.feedback.confirmations().len(), 1);
    assert!(h.feedback.redirects().is_empty());
    assert_eq!(
        h.client.auth().credentials().access_token().as_deref(),
        Some("tok")
    );
}

#[tokio::test]
async fn confirmed_access_denied_logs_out() {
    let h = Harness::with_decision(ReauthDecision::Confirm)
        .await
        .with_tokens("tok", Some("r"));
    Mock::given(method("DELETE"))
        .and(path("/users/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "X",
            "errorCode": "ACCESS_DENIED"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.delete_user(9).await.unwrap_err();
    assert!(matches!(err, ApiError::Application { .. }));
    assert!(!h.client.auth().is_authenticated());
    assert!(h.client.auth().credentials().refresh_token().is_none());
    assert_eq!(h.feedback.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn other_application_errors_do_not_prompt() {
    let h = Harness::with_decision(ReauthDecision::Confirm)
        .await
        .with_tokens("tok", None);
    Mock::given(method("POST"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Role name already exists",
            "errorCode": "ROLE_NAME_EXISTS"
        })))
        .mount(&h.server)
        .await;

    let role = admin_console_core::models::NewRole {
        name: "AUDITOR".to_string(),
        description: None,
    };
    let err = h.client.create_role(&role).await.unwrap_err();
    assert_eq!(err.user_message(), "Role name already exists");
    assert!(h.feedback.confirmations().is_empty());
    assert!(h.client.auth().is_authenticated());
}

#[tokio::test]
async fn forbidden_keeps_session() {
    let h = Harness::new().await.with_tokens("tok", Some("r"));
    Mock::given(method("GET"))
        .and(path("/users/statistics"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "success": false, "message": "Admins only" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.fetch_user_statistics().await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Admins only"));
    assert!(h.client.auth().is_authenticated());
    assert_eq!(h.feedback.notifications(), vec!["Admins only".to_string()]);
}

#[tokio::test]
async fn not_found_and_server_errors_are_classified() {
    let h = Harness::new().await.with_tokens("tok", None);
    Mock::given(method("GET"))
        .and(path("/roles/404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/roles/500"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "success": false, "message": "Database down" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/roles/502"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(matches!(
        h.client.fetch_role(404).await.unwrap_err(),
        ApiError::NotFound(_)
    ));
    assert!(matches!(
        h.client.fetch_role(500).await.unwrap_err(),
        ApiError::Server { status: 500, ref message } if message == "Database down"
    ));
    assert!(matches!(
        h.client.fetch_role(502).await.unwrap_err(),
        ApiError::Server { status: 502, .. }
    ));
    assert_eq!(
        h.feedback.notifications(),
        vec![
            "The requested resource does not exist".to_string(),
            "Database down".to_string(),
            "Internal server error".to_string(),
        ]
    );
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ok(json!([])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let feedback = Arc::new(RecordingFeedback::default());
    let auth = Arc::new(AuthContext::new(CredentialStore::in_memory()));
    let client =
        ApiClient::new(&server.uri(), Duration::from_millis(200), auth, feedback.clone()).unwrap();

    let err = client.fetch_roles().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
    assert_eq!(feedback.notifications().len(), 1);
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let feedback = Arc::new(RecordingFeedback::default());
    let auth = Arc::new(AuthContext::new(CredentialStore::in_memory()));
    let client = ApiClient::new(
        &format!("http://127.0.0.1:{}", port),
        Duration::from_secs(2),
        auth,
        feedback.clone(),
    )
    .unwrap();

    let err = client.fetch_roles().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(
        feedback.notifications(),
        vec!["Network error, please check your connection".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Session actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_tokens_and_identity() {
    let h = Harness::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "secret123" })))
        .respond_with(ok(json!({
            "accessToken": "new-access",
            "refreshToken": "new-refresh",
            "tokenType": "Bearer",
            "user": profile(&["ADMIN", "USER"]),
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ok(profile(&["ADMIN", "USER"])))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.login("alice", "secret123").await.unwrap();

    let auth = h.client.auth();
    assert_eq!(auth.credentials().access_token().as_deref(), Some("new-access"));
    assert_eq!(auth.credentials().refresh_token().as_deref(), Some("new-refresh"));
    assert_eq!(auth.identity(), Some(user.clone()));
    assert!(auth.is_admin());

    let fetched = h.client.fetch_profile().await.unwrap();
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn failed_login_reports_server_message() {
    let h = Harness::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid username or password",
            "errorCode": "AUTHENTICATION_FAILED"
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ok(json!({ "accessToken": "x", "refreshToken": "y" })))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Request { status: 401, .. }));
    assert_eq!(err.user_message(), "Invalid username or password");
    assert!(!h.client.auth().is_authenticated());
    assert_eq!(
        h.feedback.notifications(),
        vec!["Invalid username or password".to_string()]
    );
    assert!(h.feedback.redirects().is_empty());
}

#[tokio::test]
async fn failed_login_keeps_refresh_token_of_previous_session() {
    let h = Harness::new().await;
    h.client.auth().credentials().set_refresh_token("kept").unwrap();
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Request { status: 401, ref message } if message == "Request failed (401)"));
    assert_eq!(
        h.client.auth().credentials().refresh_token().as_deref(),
        Some("kept")
    );
}

#[tokio::test]
async fn logout_twice_is_harmless() {
    let h = Harness::new().await.with_tokens("tok", Some("r"));
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client.logout().await.unwrap();
    assert!(!h.client.auth().is_authenticated());
    assert!(h.client.auth().credentials().refresh_token().is_none());

    h.client.logout().await.unwrap();
    assert!(!h.client.auth().is_authenticated());
    assert!(h.client.auth().identity().is_none());
}

#[tokio::test]
async fn logout_clears_even_when_server_fails() {
    let h = Harness::new().await.with_tokens("tok", Some("r"));
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    h.client.logout().await.unwrap();
    assert!(!h.client.auth().is_authenticated());
    assert!(h.feedback.notifications().is_empty());
}

#[tokio::test]
async fn identity_is_fetched_once_and_cached() {
    let h = Harness::new().await.with_tokens("tok", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ok(profile(&["USER"])))
        .expect(1)
        .mount(&h.server)
        .await;

    let first = h.client.current_user().await.unwrap();
    let second = h.client.current_user().await.unwrap();
    assert_eq!(first, second);
    assert!(!h.client.auth().is_admin());
}

#[tokio::test]
async fn identity_fetch_failure_is_reported() {
    let h = Harness::new().await.with_tokens("tok", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::IdentityFetch(_)));
    assert!(h.client.auth().identity().is_none());
}

#[tokio::test]
async fn identity_requires_token() {
    let h = Harness::new().await;
    let err = h.client.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::IdentityFetch(_)));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Navigation guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn guard_sends_anonymous_users_to_login() {
    let h = Harness::new().await;
    let guard = NavigationGuard::new(h.client.clone());

    assert_eq!(
        guard.check("/users", RouteAccess::Admin).await,
        GuardDecision::Login {
            location: "/login?redirect=/users".to_string()
        }
    );
    assert_eq!(guard.check("/about", RouteAccess::Public).await, GuardDecision::Allow);
    assert_eq!(guard.check("/login", RouteAccess::Public).await, GuardDecision::Allow);
}

#[tokio::test]
async fn guard_loads_identity_and_checks_admin_role() {
    let h = Harness::new().await.with_tokens("tok", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ok(profile(&["USER"])))
        .expect(1)
        .mount(&h.server)
        .await;
    let guard = NavigationGuard::new(h.client.clone());

    assert_eq!(
        guard.check("/roles", RouteAccess::Admin).await,
        GuardDecision::Forbidden
    );
    assert_eq!(
        guard.check("/profile", RouteAccess::Authenticated).await,
        GuardDecision::Allow
    );
    assert_eq!(
        guard.check("/login", RouteAccess::Public).await,
        GuardDecision::Redirect("/".to_string())
    );
}

#[tokio::test]
async fn guard_allows_admins() {
    let h = Harness::new().await.with_tokens("tok", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ok(profile(&["ADMIN"])))
        .expect(1)
        .mount(&h.server)
        .await;
    let guard = NavigationGuard::new(h.client.clone());

    assert_eq!(guard.check("/users", RouteAccess::Admin).await, GuardDecision::Allow);
    assert!(guard.is_admin());
}

#[tokio::test]
async fn guard_forces_login_when_identity_cannot_load() {
    let h = Harness::new().await.with_tokens("tok", Some("r"));
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;
    let guard = NavigationGuard::new(h.client.clone());

    assert_eq!(
        guard.check("/users", RouteAccess::Admin).await,
        GuardDecision::Login {
            location: "/login?redirect=/users".to_string()
        }
    );
    assert!(!guard.is_authenticated());
    assert!(h.client.auth().credentials().refresh_token().is_none());
    assert_eq!(h.feedback.redirects(), vec!["/login?redirect=/users".to_string()]);
}

#[tokio::test]
async fn guard_redirects_once_when_session_expires_during_identity_load() {
    let h = Harness::new().await.with_tokens("stale", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    let guard = NavigationGuard::new(h.client.clone());

    assert_eq!(
        guard.check("/users", RouteAccess::Admin).await,
        GuardDecision::Login {
            location: "/login?redirect=/users".to_string()
        }
    );
    assert!(!guard.is_authenticated());
    assert_eq!(h.feedback.redirects(), vec!["/login?redirect=/users".to_string()]);
}

#[tokio::test]
async fn logout_during_refresh_is_not_undone() {
    let h = Harness::new().await.with_tokens("stale", Some("r1"));
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ok(json!({ "accessToken": "fresh", "refreshToken": "r2" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&h.server)
        .await;

    let request = h.client.fetch_profile();
    let logout = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.client.logout().await
    };
    let (_, logged_out) = tokio::join!(request, logout);

    logged_out.unwrap();
    let auth = h.client.auth();
    assert!(!auth.is_authenticated());
    assert!(auth.credentials().refresh_token().is_none());
}

#[tokio::test]
async fn concurrent_identity_loads_share_one_fetch() {
    let h = Harness::new().await.with_tokens("tok", None);
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ok(profile(&["ADMIN"])).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&h.server)
        .await;

    let (first, second) = tokio::join!(h.client.current_user(), h.client.current_user());
    assert_eq!(first.unwrap(), second.unwrap());
    assert!(h.client.auth().is_admin());
}
