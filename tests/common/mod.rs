#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use dotenv::dotenv;
use kanban::storage::BlobStore;
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;

/// Database pool plus a throwaway media root.
pub struct TestContext {
    pub pool: PgPool,
    pub store: BlobStore,
    pub media: TempDir,
}

pub async fn setup() -> TestContext {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
    }
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    kanban::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let media = tempfile::tempdir().expect("Failed to create media dir");
    let store = BlobStore::new(media.path());
    TestContext { pool, store, media }
}

/// Builds the full application the way `main` does, minus CORS and logging.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.pool.clone()))
                .app_data(actix_web::web::Data::new($ctx.store.clone()))
                .service(kanban::routes::health::health)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(kanban::auth::AuthMiddleware)
                        .configure(kanban::routes::config),
                ),
        )
        .await
    };
}
pub(crate) use init_app;

pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

/// A username no other test run has used.
pub fn unique_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..12])
}

/// Sends `req` and returns the status with the JSON body (`Null` when empty).
/// Errors raised by middleware are turned into their response status.
pub async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            let json = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body).unwrap_or(Value::Null)
            };
            (status, json)
        }
        Err(err) => (err.as_response_error().status_code(), Value::Null),
    }
}

pub async fn register<S, B>(app: &S, prefix: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let username = unique_name(prefix);
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "Password123!"
        }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    TestUser {
        id: body["user_id"].as_i64().expect("user_id") as i32,
        username,
        token: body["access_token"].as_str().expect("access_token").to_string(),
    }
}

/// Authenticated JSON request as `user`.
pub fn as_user(user: &TestUser, method: &str, uri: &str, payload: Option<Value>) -> Request {
    let builder = match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "PATCH" => test::TestRequest::patch(),
        "DELETE" => test::TestRequest::delete(),
        other => panic!("unsupported method {}", other),
    };
    let builder = builder.uri(uri).insert_header(user.bearer());
    match payload {
        Some(payload) => builder.set_json(payload).to_request(),
        None => builder.to_request(),
    }
}

pub async fn create_board<S, B>(app: &S, owner: &TestUser, title: &str) -> i32
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(
        app,
        as_user(owner, "POST", "/api/boards", Some(json!({ "title": title }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create board failed: {}", body);
    body["id"].as_i64().expect("board id") as i32
}

pub async fn add_member<S, B>(app: &S, actor: &TestUser, board_id: i32, user: &TestUser, role: &str) -> i32
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(
        app,
        as_user(
            actor,
            "POST",
            &format!("/api/boards/{}/members", board_id),
            Some(json!({ "user_id": user.id, "role": role })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add member failed: {}", body);
    body["id"].as_i64().expect("membership id") as i32
}

pub async fn create_list<S, B>(app: &S, user: &TestUser, board_id: i32, title: &str, order: i32) -> i32
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(
        app,
        as_user(
            user,
            "POST",
            &format!("/api/boards/{}/lists", board_id),
            Some(json!({ "title": title, "order": order })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create list failed: {}", body);
    body["id"].as_i64().expect("list id") as i32
}

pub async fn create_card<S, B>(app: &S, user: &TestUser, list_id: i32, payload: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(
        app,
        as_user(user, "POST", &format!("/api/lists/{}/cards", list_id), Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create card failed: {}", body);
    body
}

/// The notifications `user` sees, newest first.
pub async fn notifications_of<S, B>(app: &S, user: &TestUser) -> Vec<Value>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(app, as_user(user, "GET", "/api/notifications", None)).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap_or_default()
}
