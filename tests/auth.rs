mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{call, init_app, register, setup, unique_name};
use serde_json::json;

#[actix_rt::test]
async fn test_register_login_refresh_flow() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let username = unique_name("flow");
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "Password123!",
            "first_name": "Flow"
        }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let user_id = body["user_id"].as_i64().unwrap();

    // Same username again
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": format!("other_{}@example.com", username),
            "password": "Password123!"
        }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong password
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": "WrongPassword!" }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": "Password123!" }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"].as_i64().unwrap(), user_id);
    let access = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    // A refresh token is not accepted as a bearer token.
    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", format!("Bearer {}", refresh)))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "refresh_token": refresh }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    // An access token is not accepted for refresh.
    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["first_name"], "Flow");
    assert!(body.get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_protected_routes_need_a_token() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/boards").to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/boards")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .set_json(json!({ "title": "Nope" }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays public.
    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[actix_rt::test]
async fn test_profile_update_and_user_search() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let user = register(&app, "prof").await;

    let (status, body) = call(
        &app,
        common::as_user(
            &user,
            "PUT",
            "/api/profile",
            Some(json!({ "first_name": "Ada", "last_name": "Lovelace" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "Lovelace");
    assert_eq!(body["email"], format!("{}@example.com", user.username));

    let (status, body) = call(
        &app,
        common::as_user(
            &user,
            "GET",
            &format!("/api/users?search={}", user.username.to_uppercase()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"].as_i64().unwrap() as i32, user.id);
}

#[actix_rt::test]
async fn test_handles_resolve_exactly() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let user = register(&app, "handle").await;

    let mut conn = ctx.pool.acquire().await.unwrap();
    let found = kanban::services::identity::resolve_by_handle(&mut conn, &user.username)
        .await
        .unwrap()
        .expect("registered handle resolves");
    assert_eq!(found.id, user.id);

    let upper = user.username.to_uppercase();
    let missing = kanban::services::identity::resolve_by_handle(&mut conn, &upper)
        .await
        .unwrap();
    assert!(missing.is_none());
}
