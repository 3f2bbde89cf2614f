use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::UploadQuery,
    services::attachments,
    storage::{sanitize_file_name, BlobStore},
};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

#[get("/cards/{card_id}/attachments")]
pub async fn list_attachments(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let attachments = attachments::list_attachments(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(attachments))
}

/// Uploads the raw request body as an attachment.
///
/// ## Query Parameters:
/// - `filename`: the name shown to users and offered on download.
///
/// ## Responses:
/// - `201 Created`: the new `Attachment`.
/// - `413 Payload Too Large`: the body exceeds `MAX_UPLOAD_BYTES`.
/// - `422 Unprocessable Entity`: empty body or missing file name.
#[post("/cards/{card_id}/attachments")]
pub async fn upload_attachment(
    pool: web::Data<PgPool>,
    store: web::Data<BlobStore>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    query.validate()?;
    let mut tx = pool.begin().await?;
    let attachment = attachments::upload_attachment(
        &mut tx,
        &store,
        &user.0,
        path.into_inner(),
        &query.filename,
        &body,
    )
    .await?;
    // The blob is already on disk; drop it again if the row never lands.
    store
        .release_on_err(tx.commit().await, &[attachment.file_path.clone()])
        .await?;
    Ok(HttpResponse::Created().json(attachment))
}

#[get("/attachments/{attachment_id}/download")]
pub async fn download_attachment(
    pool: web::Data<PgPool>,
    store: web::Data<BlobStore>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let (attachment, bytes) =
        attachments::download_attachment(&mut conn, &store, &user.0, path.into_inner()).await?;

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(sanitize_file_name(
            &attachment.file_name,
        ))],
    };
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(disposition)
        .body(bytes))
}

/// Only the uploader may delete an attachment.
#[delete("/attachments/{attachment_id}")]
pub async fn delete_attachment(
    pool: web::Data<PgPool>,
    store: web::Data<BlobStore>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    let blob = attachments::delete_attachment(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    store.release(&[blob]).await;
    Ok(HttpResponse::NoContent().finish())
}
