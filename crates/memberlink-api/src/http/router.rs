//! Axum router configuration with middleware.
//!
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Members (scoped to the caller)
        .route("/member/create", post(handlers::member::create_member))
        .route("/members", get(handlers::member::list_members))
        .route("/member/{id}", delete(handlers::member::delete_member))
        // Accounts
        .route("/user/register", post(handlers::user::register))
        .route("/user/login", post(handlers::user::login))
        .route(
            "/user/me",
            get(handlers::user::me).patch(handlers::user::update_me),
        )
        .route("/user/profile/{id}", get(handlers::user::profile))
        .route("/user/{id}", delete(handlers::user::delete_user))
        .route("/users", get(handlers::user::list_users))
        .route("/health", get(handlers::health::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use memberlink_types::config::GlobalConfig;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app() -> (Router, AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = AppState::open(dir.path().to_path_buf(), GlobalConfig::default())
            .await
            .unwrap();
        (build_router(state.clone()), state, dir)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Register an account and log it in; returns the session token.
    async fn register_and_login(app: &Router, username: &str, status: &str) -> String {
        let email = format!("{username}@example.com");
        let (code, _) = send(
            app,
            Method::POST,
            "/user/register",
            None,
            Some(json!({
                "firstName": username,
                "username": username,
                "email": email,
                "link": format!("https://example.com/{username}"),
                "password": "hunter22",
                "chatUserId": format!("chat-{username}"),
                "status": status,
            })),
        )
        .await;
        assert_eq!(code, StatusCode::OK);

        let (code, body) = send(
            app,
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": email, "password": "hunter22" })),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn bob() -> Value {
        json!({ "name": "Bob", "username": "bob", "externalUserId": "42" })
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _state, _dir) = test_app().await;
        let (code, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_members_require_login() {
        let (app, _state, _dir) = test_app().await;
        let (code, body) = send(&app, Method::GET, "/members", None, None).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errors"][0]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let (app, _state, _dir) = test_app().await;
        register_and_login(&app, "ada", "active").await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "ada@example.com", "password": "hunter22" }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Max-Age=259200"));

        // The cookie alone authenticates.
        let token = cookie.trim_start_matches("token=").split(';').next().unwrap();
        let request = Request::builder()
            .uri("/user/me")
            .header(header::COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let (app, _state, _dir) = test_app().await;
        register_and_login(&app, "ada", "active").await;
        let (code, body) = send(
            &app,
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "nope" })),
        )
        .await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_member_lifecycle_and_resolution() {
        let (app, state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;

        let (code, body) =
            send(&app, Method::POST, "/member/create", Some(&token), Some(bob())).await;
        assert_eq!(code, StatusCode::OK);
        let member_id = body["data"]["id"].as_str().unwrap().to_string();
        let owner = body["data"]["ownerAccountId"].as_str().unwrap().to_string();

        let resolved = state.member_lookup.resolve_owner("42", "bob").await.unwrap();
        assert_eq!(resolved.map(|id| id.to_string()), Some(owner));

        let (code, body) = send(&app, Method::GET, "/members", Some(&token), None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let uri = format!("/member/{member_id}");
        let (code, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Member deleted");
        assert_eq!(state.member_lookup.resolve_owner("42", "bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_member_rejects_unknown_field() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;

        let mut body = bob();
        body["isAdmin"] = json!(true);
        let (code, resp) =
            send(&app, Method::POST, "/member/create", Some(&token), Some(body)).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(resp["errors"][0]["code"], "VALIDATION_ERROR");

        let (_, list) = send(&app, Method::GET, "/members", Some(&token), None).await;
        assert!(list["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/member/create")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_register_with_taken_chat_user_id_conflicts() {
        let (app, _state, _dir) = test_app().await;
        register_and_login(&app, "ada", "active").await;

        let (code, body) = send(
            &app,
            Method::POST,
            "/user/register",
            None,
            Some(json!({
                "firstName": "Eve",
                "username": "eve",
                "email": "eve@example.com",
                "link": "https://example.com/eve",
                "password": "hunter22",
                "chatUserId": "chat-ada",
            })),
        )
        .await;
        assert_eq!(code, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["code"], "USER_CONFLICT");
    }

    #[tokio::test]
    async fn test_duplicate_member_conflicts() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;
        send(&app, Method::POST, "/member/create", Some(&token), Some(bob())).await;

        let (code, body) =
            send(&app, Method::POST, "/member/create", Some(&token), Some(bob())).await;
        assert_eq!(code, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["code"], "MEMBER_CONFLICT");
    }

    #[tokio::test]
    async fn test_cannot_delete_another_owners_member() {
        let (app, _state, _dir) = test_app().await;
        let ada = register_and_login(&app, "ada", "active").await;
        let eve = register_and_login(&app, "eve", "active").await;

        let (_, body) = send(&app, Method::POST, "/member/create", Some(&ada), Some(bob())).await;
        let uri = format!("/member/{}", body["data"]["id"].as_str().unwrap());

        let (code, _) = send(&app, Method::DELETE, &uri, Some(&eve), None).await;
        assert_eq!(code, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, "/members", Some(&ada), None).await;
        assert_eq!(list["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_member_id_is_validation_error() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;
        let (code, _) = send(&app, Method::DELETE, "/member/not-a-uuid", Some(&token), None).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deactivated_account_limited_to_me() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "deactive").await;

        let (code, body) = send(&app, Method::GET, "/user/me", Some(&token), None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"]["status"], "deactive");
        assert!(body["data"].get("passwordHash").is_none());

        let (code, _) = send(&app, Method::GET, "/members", Some(&token), None).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_users_filters_by_status() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;
        register_and_login(&app, "eve", "deactive").await;

        let (code, body) =
            send(&app, Method::GET, "/users?status=deactive", Some(&token), None).await;
        assert_eq!(code, StatusCode::OK);
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "eve");

        let (code, _) = send(&app, Method::GET, "/users?status=banned", Some(&token), None).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_me_and_profile() {
        let (app, _state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;

        let (code, body) = send(
            &app,
            Method::PATCH,
            "/user/me",
            Some(&token),
            Some(json!({ "firstName": "Augusta" })),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let uri = format!("/user/profile/{id}");
        let (code, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"]["firstName"], "Augusta");
    }

    #[tokio::test]
    async fn test_delete_own_account_cascades() {
        let (app, state, _dir) = test_app().await;
        let token = register_and_login(&app, "ada", "active").await;
        let (_, body) = send(&app, Method::POST, "/member/create", Some(&token), Some(bob())).await;
        let owner = body["data"]["ownerAccountId"].as_str().unwrap().to_string();

        let uri = format!("/user/{owner}");
        let (code, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(code, StatusCode::OK);

        assert_eq!(state.member_lookup.resolve_owner("42", "bob").await.unwrap(), None);
        let (code, _) = send(&app, Method::GET, "/user/me", Some(&token), None).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
    }
}
