//! Router-level tests over the in-memory backend

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::create_router_with_state;
use super::state::AppState;
use crate::domain::User;
use crate::infrastructure::user::CreateUserRequest;

struct TestApp {
    state: AppState,
    router: Router,
    admin_token: String,
}

impl TestApp {
    async fn new() -> Self {
        let state = crate::create_app_state().await.unwrap();
        let admin = state.user_service.list().await.unwrap().remove(0);
        let admin_token = state.jwt_service.generate(&admin).unwrap().token;

        Self {
            router: create_router_with_state(state.clone()),
            state,
            admin_token,
        }
    }

    /// Register a student and return them with a bearer token
    async fn student(&self, name: &str) -> (User, String) {
        let user = self
            .state
            .user_service
            .register(CreateUserRequest {
                email: format!("{}@example.com", name),
                username: name.to_string(),
                first_name: "Test".to_string(),
                last_name: "Student".to_string(),
                password: "correct-horse-battery".to_string(),
                is_staff: false,
            })
            .await
            .unwrap();
        let token = self.state.jwt_service.generate(&user).unwrap().token;
        (user, token)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, body)
    }

    async fn create_course(&self, title: &str, price: i64) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/courses",
                Some(&self.admin_token),
                Some(json!({
                    "author": "Ada",
                    "title": title,
                    "start_date": "2026-01-15",
                    "price": price
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn balance_of(&self, token: &str) -> i64 {
        let (status, body) = self
            .send(Method::GET, "/api/v1/users/me/balance", Some(&token.to_string()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["amount"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/live")
                .header("x-request-id", "client-chosen")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "client-chosen");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "Eve@Example.com",
                "username": "eve",
                "first_name": "Eve",
                "last_name": "Adams",
                "password": "long-enough-pw",
                "is_staff": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["is_staff"], false);
    assert!(body.get("password_hash").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "eve@example.com", "password": "long-enough-pw"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert!(body["expires_at"].is_string());

    let (status, body) = app.send(Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "eve");

    assert_eq!(app.balance_of(&token).await, 1000);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;
    app.student("mallory").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "mallory@example.com", "password": "wrong-password"})),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "authentication_error");
}

#[tokio::test]
async fn test_invalid_token_is_rejected_not_downgraded() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(Method::GET, "/api/v1/courses", Some(&"not-a-jwt".to_string()), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_course_writes_are_admin_only() {
    let app = TestApp::new().await;
    let (_, student) = app.student("bob").await;
    let body = json!({"author": "A", "title": "T", "start_date": "2026-02-01", "price": 10});

    let (status, _) = app
        .send(Method::POST, "/api/v1/courses", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(Method::POST, "/api/v1/courses", Some(&student), Some(body))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["type"], "permission_error");

    let course_id = app.create_course("Rust 101", 300).await;

    let (status, body) = app.send(Method::GET, "/api/v1/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let uri = format!("/api/v1/courses/{}", course_id);
    let (status, body) = app.send(Method::GET, &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 300);

    let (status, _) = app
        .send(Method::PATCH, &uri, Some(&student), Some(json!({"price": 0})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(&app.admin_token), Some(json!({"price": 250})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 250);
}

#[tokio::test]
async fn test_course_validation_and_bad_ids() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/courses",
            Some(&app.admin_token),
            Some(json!({"author": "A", "title": "T", "start_date": "2026-02-01", "price": -5})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/api/v1/courses/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, student) = app.student("malformed").await;
    let (status, _) = app
        .send(Method::POST, "/api/v1/courses/42/pay", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/courses/{}", uuid::Uuid::new_v4());
    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_endpoint_status_codes() {
    let app = TestApp::new().await;
    let (_, student) = app.student("carol").await;
    let course_id = app.create_course("Databases", 300).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            None,
            Some(json!({"course_id": course_id})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(Method::POST, "/api/v1/payment", Some(&student), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["param"], "course_id");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            Some(&student),
            Some(json!({"course_id": uuid::Uuid::new_v4().to_string()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            Some(&student),
            Some(json!({"course_id": course_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["status"].as_str().unwrap().contains("successful"));
    assert_eq!(body["remaining_balance"], 700);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            Some(&student),
            Some(json!({"course_id": course_id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "already_subscribed");

    assert_eq!(app.balance_of(&student).await, 700);
}

#[tokio::test]
async fn test_insufficient_funds_leaves_balance_untouched() {
    let app = TestApp::new().await;
    let (_, student) = app.student("dave").await;
    let course_id = app.create_course("Compilers", 1200).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            Some(&student),
            Some(json!({"course_id": course_id})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "insufficient_funds");
    assert_eq!(app.balance_of(&student).await, 1000);

    let (_, body) = app
        .send(Method::GET, "/api/v1/users/me/subscriptions", Some(&student), None)
        .await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_pay_action_on_course() {
    let app = TestApp::new().await;
    let (_, student) = app.student("erin").await;
    let course_id = app.create_course("Networking", 400).await;
    let uri = format!("/api/v1/courses/{}/pay", course_id);

    let (status, _) = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(Method::POST, &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["course_id"], course_id.as_str());
    assert!(body["subscription_id"].is_string());
    assert!(body["message"].is_string());

    let (status, _) = app.send(Method::POST, &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/api/v1/courses/{}/pay", uuid::Uuid::new_v4());
    let (status, _) = app.send(Method::POST, &missing, Some(&student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.balance_of(&student).await, 600);
}

#[tokio::test]
async fn test_lessons_require_subscription() {
    let app = TestApp::new().await;
    let (_, student) = app.student("frank").await;
    let course_id = app.create_course("Algorithms", 100).await;
    let lessons = format!("/api/v1/courses/{}/lessons", course_id);

    let (status, body) = app
        .send(
            Method::POST,
            &lessons,
            Some(&app.admin_token),
            Some(json!({"title": "Sorting", "link": "https://example.com/sorting"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let lesson_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app.send(Method::GET, &lessons, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, &lessons, Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let pay = format!("/api/v1/courses/{}/pay", course_id);
    let (status, _) = app.send(Method::POST, &pay, Some(&student), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send(Method::GET, &lessons, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let lesson = format!("{}/{}", lessons, lesson_id);
    let (status, body) = app.send(Method::GET, &lesson, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Sorting");

    let unknown_course = format!("/api/v1/courses/{}/lessons", uuid::Uuid::new_v4());
    let (status, _) = app
        .send(Method::GET, &unknown_course, Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_groups_are_admin_only() {
    let app = TestApp::new().await;
    let (_, student) = app.student("grace").await;
    let course_id = app.create_course("Security", 0).await;
    let groups = format!("/api/v1/courses/{}/groups", course_id);

    let (status, _) = app
        .send(Method::POST, &groups, Some(&student), Some(json!({"title": "Cohort A"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            &groups,
            Some(&app.admin_token),
            Some(json!({"title": "Cohort A"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::GET, &groups, Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"][0]["title"], "Cohort A");
}

#[tokio::test]
async fn test_deleting_course_removes_subscriptions() {
    let app = TestApp::new().await;
    let (_, student) = app.student("heidi").await;
    let course_id = app.create_course("Distributed Systems", 200).await;

    let pay = format!("/api/v1/courses/{}/pay", course_id);
    app.send(Method::POST, &pay, Some(&student), None).await;

    let uri = format!("/api/v1/courses/{}", course_id);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::DELETE, &uri, Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (_, body) = app
        .send(Method::GET, "/api/v1/users/me/subscriptions", Some(&student), None)
        .await;
    assert_eq!(body["total"], 0);

    let (status, _) = app
        .send(Method::DELETE, &uri, Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = TestApp::new().await;
    let (student, token) = app.student("ivan").await;
    let deposit = format!("/api/v1/users/{}/balance/deposit", student.id());

    let (status, _) = app
        .send(Method::POST, &deposit, Some(&token), Some(json!({"amount": 500})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            &deposit,
            Some(&app.admin_token),
            Some(json!({"amount": 500})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 1500);

    let (status, _) = app
        .send(
            Method::POST,
            &deposit,
            Some(&app.admin_token),
            Some(json!({"amount": -1})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::GET, "/api/v1/users", Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let user_uri = format!("/api/v1/users/{}", student.id());
    let (status, _) = app
        .send(Method::DELETE, &user_uri, Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // The token now points at a deleted account
    let (status, _) = app
        .send(Method::GET, "/api/v1/users/me/balance", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
