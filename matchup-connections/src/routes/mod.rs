pub mod discover;
pub mod health;
pub mod interests;
pub mod likes;
pub mod matches;
pub mod preferences;

use std::sync::Arc;

use matchup_shared::errors::{AppError, AppResult};

use crate::error::ConnectionResult;
use crate::services::ConnectionsService;
use crate::AppState;

/// Runs a synchronous service call on the blocking pool.
pub(crate) async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> AppResult<T>
where
    F: FnOnce(&ConnectionsService) -> ConnectionResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| AppError::internal(format!("blocking task failed: {e}")))?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use matchup_shared::middleware::{jwt_secret, sign_token};
    use matchup_shared::types::auth::Claims;

    use crate::config::AppConfig;
    use crate::models::{Gender, Profile};
    use crate::store::MemoryStore;

    struct TestApp {
        router: Router,
        store: Arc<MemoryStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let state = Arc::new(AppState {
                service: ConnectionsService::new(store.clone()),
                config: AppConfig::default(),
                rabbitmq: None,
                metrics_handle: None,
            });
            Self { router: crate::app(state), store }
        }

        fn profile(&self, age: i32, gender: Gender, minutes_ago: i64) -> Profile {
            self.store.add_profile(
                Uuid::new_v4(),
                Some(format!("user-{age}")),
                age,
                gender,
                Utc::now() - Duration::minutes(minutes_ago),
            )
            .unwrap()
        }

        async fn send(&self, method: Method, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(user_id) = user {
                let token = sign_token(&Claims::new(user_id, 3600), &jwt_secret()).unwrap();
                req = req.header("authorization", format!("Bearer {token}"));
            }
            let req = match body {
                Some(json) => req
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => req.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(req).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }
    }

    #[tokio::test]
    async fn health_reports_healthy_store() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"][0]["name"], "postgres");
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/discover", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn user_without_profile_gets_profile_not_found() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/matches", Some(Uuid::new_v4()), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "E2001");
    }

    #[tokio::test]
    async fn mutual_like_returns_is_match() {
        let app = TestApp::new();
        let a = app.profile(30, Gender::Male, 2);
        let b = app.profile(28, Gender::Female, 1);

        let (status, body) = app
            .send(Method::POST, &format!("/profiles/{}/like", b.id), Some(a.user_id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_match"], false);

        let (status, body) = app
            .send(Method::POST, &format!("/profiles/{}/like", a.id), Some(b.user_id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_match"], true);
        assert_eq!(body["data"]["match_created"], true);

        let (_, body) = app.send(Method::GET, "/matches", Some(a.user_id), None).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["profile"]["id"], b.id.to_string());
    }

    #[tokio::test]
    async fn liking_own_profile_is_bad_request() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 1);

        let (status, body) = app
            .send(Method::POST, &format!("/profiles/{}/like", me.id), Some(me.user_id), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E8001");
    }

    #[tokio::test]
    async fn liking_unknown_profile_is_not_found() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 1);

        let (status, _) = app
            .send(Method::POST, &format!("/profiles/{}/like", Uuid::new_v4()), Some(me.user_id), None)
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dislike_alias_records_a_pass() {
        let app = TestApp::new();
        let a = app.profile(30, Gender::Male, 2);
        let b = app.profile(28, Gender::Female, 1);

        let (status, body) = app
            .send(Method::POST, &format!("/profiles/{}/dislike", b.id), Some(a.user_id), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["disposition"], "dislike");
    }

    #[tokio::test]
    async fn discover_paginates_with_default_page_size() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 100);
        for i in 0..5 {
            app.profile(25, Gender::Female, i);
        }

        let (status, body) = app.send(Method::GET, "/discover", Some(me.user_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 5);
        assert_eq!(body["data"]["per_page"], 3);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);

        let (_, body) = app
            .send(Method::GET, "/discover?order=random&page=2", Some(me.user_id), None)
            .await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn discover_with_huge_page_is_empty_not_a_panic() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 100);
        app.profile(25, Gender::Female, 1);

        let (status, body) = app
            .send(Method::GET, "/discover?page=18446744073709551615", Some(me.user_id), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert!(body["data"]["items"].as_array().unwrap().is_empty());
        assert_eq!(body["data"]["page"], u64::MAX);
    }

    #[tokio::test]
    async fn discover_rejects_unknown_order() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 1);

        let (status, body) = app
            .send(Method::GET, "/discover?order=oldest", Some(me.user_id), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E8005");
    }

    #[tokio::test]
    async fn preferences_round_trip_and_validate() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 1);

        let (_, body) = app.send(Method::GET, "/preferences", Some(me.user_id), None).await;
        assert_eq!(body["data"], Value::Null);

        let draft = serde_json::json!({ "min_age": 25, "max_age": 35, "preferred_genders": ["female", "other"] });
        let (status, _) = app.send(Method::PUT, "/preferences", Some(me.user_id), Some(draft)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.send(Method::GET, "/preferences", Some(me.user_id), None).await;
        assert_eq!(body["data"]["min_age"], 25);
        assert_eq!(body["data"]["preferred_genders"], serde_json::json!(["female", "other"]));

        let invalid = serde_json::json!({ "min_age": 40, "max_age": 30, "preferred_genders": ["male"] });
        let (status, body) = app.send(Method::PUT, "/preferences", Some(me.user_id), Some(invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "E8004");
    }

    #[tokio::test]
    async fn unmatch_hides_match_and_rejects_outsiders() {
        let app = TestApp::new();
        let a = app.profile(30, Gender::Male, 3);
        let b = app.profile(28, Gender::Female, 2);
        let outsider = app.profile(33, Gender::Other, 1);

        app.send(Method::POST, &format!("/profiles/{}/like", b.id), Some(a.user_id), None).await;
        let (_, body) = app
            .send(Method::POST, &format!("/profiles/{}/like", a.id), Some(b.user_id), None)
            .await;
        let match_id = body["data"]["match_id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(Method::DELETE, &format!("/matches/{match_id}"), Some(outsider.user_id), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "E8003");

        let (status, _) = app.send(Method::DELETE, &format!("/matches/{match_id}"), Some(a.user_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.send(Method::GET, "/matches", Some(b.user_id), None).await;
        assert_eq!(body["data"]["total"], 0);

        let (status, _) = app
            .send(Method::DELETE, &format!("/matches/{}", Uuid::new_v4()), Some(a.user_id), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn likes_lists_liked_profiles() {
        let app = TestApp::new();
        let me = app.profile(30, Gender::Male, 10);
        let liked = app.profile(28, Gender::Female, 5);
        let passed = app.profile(29, Gender::Female, 4);

        app.send(Method::POST, &format!("/profiles/{}/like", liked.id), Some(me.user_id), None).await;
        app.send(Method::POST, &format!("/profiles/{}/pass", passed.id), Some(me.user_id), None).await;

        let (status, body) = app.send(Method::GET, "/likes", Some(me.user_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["id"], liked.id.to_string());
    }
}
