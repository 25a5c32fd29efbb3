//! Admin login through the auth service followed by an authenticated write
//! on the catalog API, both backed by the same store
//!
//! Needs a live PostgreSQL database pointed to by `DATABASE_URL`, wipes the
//! `users` and `cars` tables, and is skipped unless run with `--ignored`.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

use api::uploads::UploadStore;
use auth::{models::NewUser, repositories::UserRepository};
use common::{
    database::{DatabaseConfig, init_pool, run_migrations},
    jwt::{DEFAULT_TOKEN_EXPIRY, JwtConfig, JwtService},
};

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_logged_in_admin_can_create_car() {
    let pool = init_pool(&DatabaseConfig::from_env().unwrap())
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    sqlx::query("TRUNCATE users, cars RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    UserRepository::new(pool.clone())
        .create(&NewUser {
            username: "admin".to_string(),
            password: "Str0ng!Passw0rd".to_string(),
        })
        .await
        .unwrap();

    let jwt_service = JwtService::new(JwtConfig {
        secret: "shared-secret".to_string(),
        expiry: DEFAULT_TOKEN_EXPIRY,
    })
    .unwrap();

    let auth_router = auth::routes::create_router(auth::AppState::new(
        pool.clone(),
        jwt_service.clone(),
    ));
    let upload_dir = tempfile::tempdir().unwrap();
    let api_router = api::routes::create_router(api::AppState::new(
        pool,
        jwt_service,
        UploadStore::new(upload_dir.path(), None, 1024),
        false,
    ));

    let (status, body) = send(
        &auth_router,
        post_json(
            "/auth/login",
            None,
            &json!({ "username": "admin", "password": "Str0ng!Passw0rd" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let car = json!({
        "year": 2022,
        "make": "Toyota",
        "model": "Corolla",
        "series": "SE",
        "mileage": 15000,
        "location_city": "Montreal",
        "location_branch": "Downtown",
        "sale_price": 24999.99,
        "stock_number": "TOY-001",
        "vin": "JT2BF22K3W0123456",
        "transmission": "Automatic",
        "fuel_type": "Gasoline",
        "cylinders": 4,
        "photos": ["https://example.com/a.jpg"]
    });

    let (status, _) = send(&api_router, post_json("/cars", None, &car)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&api_router, post_json("/cars", Some(&token), &car)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["stock_number"], "TOY-001");
    assert_eq!(body["status"], "active");

    let (status, body) = send(
        &api_router,
        Request::get("/cars/1").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vin"], "JT2BF22K3W0123456");
}
