// Each integration test binary compiles this module; not every binary uses
// every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::{
    api_v1_routes,
    config::AppConfig,
    db,
    entities::user::{ActiveModel as UserActiveModel, Entity as UserEntity},
    handlers::{self, AppServices},
    services::orders::{CartLine, CreateOrderRequest},
    services::products::CreateProductInput,
    services::users::RegisterRequest,
    AppState,
};

/// Shared secret the test harness configures for payment callbacks.
pub const TEST_CALLBACK_TOKEN: &str = "test-callback-token";

/// Helper harness for spinning up an application backed by a throwaway
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_file: NamedTempFile,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Construct a test application with config overrides applied before the
    /// services are built (e.g. pointing provider URLs at a wiremock server).
    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let db_file = NamedTempFile::new().expect("temp database file");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.path().display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.payment_callback_token = Some(TEST_CALLBACK_TOKEN.to_string());
        customize(&mut cfg);

        let db = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("test database connection");
        db::run_migrations(&db).await.expect("test migrations");

        let db = Arc::new(db);
        let services = AppServices::new(db.clone(), &cfg);
        let state = AppState {
            db,
            config: cfg,
            services,
        };

        let router = Router::new()
            .route("/health", get(handlers::health::health))
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_file: db_file,
        }
    }

    /// Issue a request against the in-process router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(serde_json::to_vec(&json).unwrap()))
                    .unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router")
    }

    /// Issue a request carrying extra headers.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(serde_json::to_vec(&json).unwrap()))
                    .unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router")
    }

    /// Seed a catalog product and return its id.
    pub async fn seed_product(&self, name: &str, price: Decimal) -> Uuid {
        self.state
            .services
            .products
            .create_product(CreateProductInput {
                name: name.to_string(),
                price,
                description: None,
                category: None,
                image_url: None,
            })
            .await
            .expect("seed product")
            .id
    }

    /// Seed a registered user, optionally with a phone number for OTP flows.
    pub async fn seed_user(&self, email: &str, password: &str, phone: Option<&str>) -> Uuid {
        self.state
            .services
            .users
            .register(RegisterRequest {
                name: "Test Customer".to_string(),
                email: email.to_string(),
                password: password.to_string(),
                phone_number: phone.map(str::to_string),
            })
            .await
            .expect("seed user")
            .id
    }

    /// Seed a pending order over the given (product, quantity) pairs.
    pub async fn seed_order(&self, user_id: Uuid, lines: &[(Uuid, i32)]) -> Uuid {
        self.state
            .services
            .orders
            .create_order(CreateOrderRequest {
                user_id,
                customer_name: "Test Customer".to_string(),
                shipping_address: "Jl. Sudirman No. 1, Jakarta".to_string(),
                items: lines
                    .iter()
                    .map(|(product_id, quantity)| CartLine {
                        product_id: *product_id,
                        quantity: *quantity,
                    })
                    .collect(),
            })
            .await
            .expect("seed order")
            .id
    }

    /// Force an OTP expiry timestamp, for exercising the expiry window.
    pub async fn force_otp_expiry(&self, user_id: Uuid, expires_at: chrono::DateTime<chrono::Utc>) {
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};

        let user = UserEntity::find_by_id(user_id)
            .one(&*self.state.db)
            .await
            .expect("load user")
            .expect("user exists");

        let mut active: UserActiveModel = user.into();
        active.otp_expires_at = Set(Some(expires_at));
        active.update(&*self.state.db).await.expect("update user");
    }
}

/// Decode a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parse a Decimal out of a JSON value that may arrive as string or number.
pub fn decimal_field(value: &Value) -> Decimal {
    use std::str::FromStr;

    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected decimal-ish value, got {other:?}"),
    }
}
