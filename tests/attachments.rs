mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{add_member, as_user, call, create_board, create_card, create_list, init_app, register, setup};
use serde_json::json;

#[actix_rt::test]
async fn test_upload_download_and_delete() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let board_id = create_board(&app, &alice, "Files").await;
    add_member(&app, &alice, board_id, &bob, "admin").await;
    let list_id = create_list(&app, &alice, board_id, "Todo", 0).await;
    let card = create_card(&app, &alice, list_id, json!({ "title": "Invoice" })).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/cards/{}/attachments?filename=invoice%20march.pdf", card["id"]))
        .insert_header(alice.bearer())
        .set_payload("%PDF-1.4 fake")
        .to_request();
    let (status, attachment) = call(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {}", attachment);
    assert_eq!(attachment["file_name"], "invoice march.pdf");
    assert_eq!(attachment["size_bytes"], 13);
    assert_eq!(attachment["uploaded_by"].as_i64().unwrap(), alice.id as i64);
    assert!(attachment.get("file_path").is_none());
    let attachment_id = attachment["id"].as_i64().unwrap();

    let stored: String = sqlx::query_scalar("SELECT file_path FROM attachments WHERE id = $1")
        .bind(attachment_id as i32)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert!(ctx.media.path().join(&stored).exists());

    let (status, listed) = call(&app, as_user(&bob, "GET", &format!("/api/cards/{}/attachments", card["id"]), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/attachments/{}/download", attachment_id))
        .insert_header(bob.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("invoice_march.pdf"), "got {}", disposition);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"%PDF-1.4 fake");

    // Even an admin cannot delete someone else's upload.
    let uri = format!("/api/attachments/{}", attachment_id);
    let (status, _) = call(&app, as_user(&bob, "DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, as_user(&alice, "DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!ctx.media.path().join(&stored).exists());
}

#[actix_rt::test]
async fn test_upload_rejects_empty_body_and_outsiders() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let alice = register(&app, "alice").await;
    let mallory = register(&app, "mallory").await;
    let board_id = create_board(&app, &alice, "Files").await;
    let list_id = create_list(&app, &alice, board_id, "Todo", 0).await;
    let card = create_card(&app, &alice, list_id, json!({ "title": "Contract" })).await;
    let uri = format!("/api/cards/{}/attachments?filename=a.txt", card["id"]);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(alice.bearer())
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(mallory.bearer())
        .set_payload("hello")
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_card_delete_releases_blobs() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let alice = register(&app, "alice").await;
    let board_id = create_board(&app, &alice, "Files").await;
    let list_id = create_list(&app, &alice, board_id, "Todo", 0).await;
    let card = create_card(&app, &alice, list_id, json!({ "title": "Scratch" })).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/cards/{}/attachments?filename=notes.txt", card["id"]))
        .insert_header(alice.bearer())
        .set_payload("scratch notes")
        .to_request();
    let (status, attachment) = call(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let stored: String = sqlx::query_scalar("SELECT file_path FROM attachments WHERE id = $1")
        .bind(attachment["id"].as_i64().unwrap() as i32)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert!(ctx.media.path().join(&stored).exists());

    let (status, _) = call(&app, as_user(&alice, "DELETE", &format!("/api/cards/{}", card["id"]), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!ctx.media.path().join(&stored).exists());
}
