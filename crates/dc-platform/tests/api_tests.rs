//! Platform API Integration Tests
//!
//! Drives the assembled router end to end over the in-memory store, static
//! tokens and the simulated payment gateway.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use dc_platform::shared::health_api::HealthState;
use dc_platform::user::entity::WorkStatus;
use dc_platform::{
    build_platform, CheckoutSettings, PlatformServices, Repositories, SimulatedGateway,
    StaticTokenVerifier, UserRole,
};

const ADMIN_TOKEN: &str = "admin-token";
const CUSTOMER_TOKEN: &str = "customer-token";
const ADMIN_EMAIL: &str = "admin@example.com";
const CUSTOMER_EMAIL: &str = "customer@example.com";

struct TestApp {
    router: Router,
    repos: Repositories,
}

impl TestApp {
    async fn new() -> Self {
        let repos = Repositories::in_memory();
        let identity = StaticTokenVerifier::new([
            (ADMIN_TOKEN, ADMIN_EMAIL),
            (CUSTOMER_TOKEN, CUSTOMER_EMAIL),
        ]);

        let app = build_platform(PlatformServices {
            repos: repos.clone(),
            identity: Arc::new(identity),
            gateway: Arc::new(SimulatedGateway::new()),
            checkout: CheckoutSettings {
                currency: "usd".to_string(),
                client_domain: "http://localhost:5173".to_string(),
            },
            health: HealthState::new(None, None),
        });

        let test_app = Self { router: app.router, repos };
        test_app.login(ADMIN_EMAIL).await;
        test_app.login(CUSTOMER_EMAIL).await;
        test_app.repos.users.update_role(ADMIN_EMAIL, UserRole::Admin).await.unwrap();
        test_app
    }

    async fn login(&self, email: &str) {
        let (status, _) = self.send(Method::POST, "/user", None, Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
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
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}

fn promotion_request() -> Value {
    json!({
        "name": "A",
        "email": "a@x.com",
        "division": "Dhaka",
        "district": "Dhaka",
        "phone": "01700000000"
    })
}

fn booking_request() -> Value {
    json!({
        "decorationId": "665f1c2e8b3a4d0012345678",
        "decorationName": "Classic Wedding Stage",
        "category": "wedding",
        "price": 1500.0,
        "bookingDate": "2024-05-01",
        "startTime": "10:00",
        "endTime": "14:00",
        "userInfo": { "userEmail": CUSTOMER_EMAIL, "userName": "Customer" }
    })
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_root_banner() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("Hello from Server..".to_string()));
    }

    #[tokio::test]
    async fn test_health_without_database_is_up() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/user/role", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let app = TestApp::new().await;
        let (status, _) = app.send(Method::GET, "/my-bookins", Some("nope"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let app = TestApp::new().await;
        let (status, _) = app.send(Method::GET, "/bookings", Some(CUSTOMER_TOKEN), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send(Method::GET, "/bookings", Some(ADMIN_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod user_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_upserts_by_email() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(Method::POST, "/user", None, Some(json!({ "email": "new@example.com", "name": "New" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], true);

        let (_, body) = app
            .send(Method::POST, "/user", None, Some(json!({ "email": "new@example.com" })))
            .await;
        assert_eq!(body["created"], false);

        assert_eq!(app.repos.users.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_own_role() {
        let app = TestApp::new().await;

        let (status, body) = app.send(Method::GET, "/user/role", Some(ADMIN_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");

        let (_, body) = app.send(Method::GET, "/user/role", Some(CUSTOMER_TOKEN), None).await;
        assert!(body["role"].is_null());
    }

    #[tokio::test]
    async fn test_admin_changes_role() {
        let app = TestApp::new().await;
        let command = json!({ "email": CUSTOMER_EMAIL, "role": "decorator" });

        let (status, _) = app
            .send(Method::PATCH, "/users/update-role", Some(CUSTOMER_TOKEN), Some(command.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send(Method::PATCH, "/users/update-role", Some(ADMIN_TOKEN), Some(command))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "decorator");

        let user = app.repos.users.find_by_email(CUSTOMER_EMAIL).await.unwrap().unwrap();
        assert_eq!(user.work_status, Some(WorkStatus::Available));
    }
}

mod promotion_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_request_conflicts() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(Method::POST, "/decorator-requests", None, Some(promotion_request()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");

        let (status, _) = app
            .send(Method::POST, "/decorator-requests", None, Some(promotion_request()))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_approve_promotes_user() {
        let app = TestApp::new().await;
        app.login("a@x.com").await;

        let (_, body) = app
            .send(Method::POST, "/decorator-requests", None, Some(promotion_request()))
            .await;
        let id = body["insertedId"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(Method::PATCH, &format!("/decorator-requests/approve/{}", id), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userUpdated"], true);

        let user = app.repos.users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.role.as_deref(), Some("decorator"));
        assert_eq!(user.work_status, Some(WorkStatus::Available));
        assert_eq!(user.division.as_deref(), Some("Dhaka"));
    }

    #[tokio::test]
    async fn test_reject_leaves_role_unchanged() {
        let app = TestApp::new().await;
        app.login("a@x.com").await;

        let (_, body) = app
            .send(Method::POST, "/decorator-requests", None, Some(promotion_request()))
            .await;
        let uri = format!("/decorator-requests/reject/{}", body["insertedId"].as_str().unwrap());

        let (status, _) = app.send(Method::PATCH, &uri, Some(CUSTOMER_TOKEN), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send(Method::PATCH, &uri, Some(ADMIN_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "rejected");

        let user = app.repos.users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(user.role.is_none());

        // A rejected request no longer blocks a new one
        let (status, _) = app
            .send(Method::POST, "/decorator-requests", None, Some(promotion_request()))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod decorator_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_decorators_available() {
        let app = TestApp::new().await;
        let uri = "/decorators/available?division=Dhaka&district=Dhaka&bookingDate=2024-05-01";

        let (status, _) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app.send(Method::GET, uri, Some(CUSTOMER_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "available": false, "decorators": [] }));
    }

    #[tokio::test]
    async fn test_unscheduled_decorator_is_available() {
        let app = TestApp::new().await;
        app.login("a@x.com").await;
        let (_, body) = app
            .send(Method::POST, "/decorator-requests", None, Some(promotion_request()))
            .await;
        let uri = format!("/decorator-requests/approve/{}", body["insertedId"].as_str().unwrap());
        app.send(Method::PATCH, &uri, None, None).await;

        let (_, body) = app
            .send(
                Method::GET,
                "/decorators/available?division=Dhaka&district=Dhaka&bookingDate=2024-05-01",
                Some(CUSTOMER_TOKEN),
                None,
            )
            .await;
        assert_eq!(body["available"], true);
        assert_eq!(body["decorators"][0]["email"], "a@x.com");

        let (status, body) = app.send(Method::GET, "/Deco_Available", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}

mod booking_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_booking_conflicts() {
        let app = TestApp::new().await;

        let (status, body) = app.send(Method::POST, "/userBooks", None, Some(booking_request())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Booking successful");

        let (status, _) = app.send(Method::POST, "/userBooks", None, Some(booking_request())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app.send(Method::GET, "/my-bookins", Some(CUSTOMER_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_is_bad_request() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(Method::POST, "/userBooks", None, Some(json!({ "decorationId": "x" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assign_unknown_decorator_leaves_booking_unchanged() {
        let app = TestApp::new().await;
        let (_, body) = app.send(Method::POST, "/userBooks", None, Some(booking_request())).await;
        let booking_id = body["insertedId"].as_str().unwrap().to_string();

        let (status, _) = app
            .send(
                Method::PATCH,
                "/bookings/assign-decorator",
                Some(ADMIN_TOKEN),
                Some(json!({ "bookingId": booking_id, "decoratorId": "665f1c2e8b3a4d00ffffffff" })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let bookings = app.repos.bookings.find_by_customer(CUSTOMER_EMAIL).await.unwrap();
        assert!(bookings[0].assigned_decorator.is_none());
        assert_eq!(bookings[0].status, "pending");
    }

    #[tokio::test]
    async fn test_status_update() {
        let app = TestApp::new().await;
        let (_, body) = app.send(Method::POST, "/userBooks", None, Some(booking_request())).await;
        let uri = format!("/bookings/{}/status", body["insertedId"].as_str().unwrap());

        let (status, _) = app
            .send(Method::PATCH, &uri, Some(CUSTOMER_TOKEN), Some(json!({ "status": "in-progress" })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let bookings = app.repos.bookings.find_by_customer(CUSTOMER_EMAIL).await.unwrap();
        assert_eq!(bookings[0].status, "in-progress");
    }
}

mod payment_tests {
    use super::*;

    async fn create_decoration(app: &TestApp) -> String {
        let (status, body) = app
            .send(
                Method::POST,
                "/decorations",
                None,
                Some(json!({ "name": "Classic Wedding Stage", "category": "wedding", "price": 1500 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["insertedId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_checkout_then_confirm_twice_books_once() {
        let app = TestApp::new().await;
        let decoration_id = create_decoration(&app).await;

        let (status, body) = app
            .send(
                Method::POST,
                "/create-checkout-session",
                None,
                Some(json!({
                    "decorationId": decoration_id,
                    "name": "Classic Wedding Stage",
                    "price": 1500,
                    "customer": { "email": CUSTOMER_EMAIL, "name": "Customer" },
                    "bookingDate": "2024-05-01",
                    "startTime": "10:00",
                    "endTime": "14:00"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let session_id = body["sessionId"].as_str().unwrap().to_string();
        assert!(body["url"].as_str().unwrap().contains(&session_id));

        let confirm = json!({ "sessionId": session_id });
        let (status, first) = app.send(Method::POST, "/payment-success", None, Some(confirm.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["created"], true);

        let (status, second) = app.send(Method::POST, "/payment-success", None, Some(confirm)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["created"], false);

        let bookings = app.repos.bookings.find_by_customer(CUSTOMER_EMAIL).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].transaction_id.as_deref(), first["transactionId"].as_str());
        assert_eq!(bookings[0].decoration_id, decoration_id);

        let (status, cancelled) = app
            .send(
                Method::PATCH,
                &format!("/bookings/cancel/{}", first["transactionId"].as_str().unwrap()),
                Some(CUSTOMER_TOKEN),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["bookingId"], first["bookingId"]);

        let bookings = app.repos.bookings.find_by_customer(CUSTOMER_EMAIL).await.unwrap();
        assert_eq!(bookings[0].status, "cancelled");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(Method::POST, "/payment-success", None, Some(json!({ "sessionId": "cs_missing" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
