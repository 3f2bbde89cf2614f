use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::NotificationQuery,
    services::notifications,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// The caller's notifications, newest first.
///
/// ## Query Parameters:
/// - `unread` (optional): `true` to only list unread notifications.
#[get("/notifications")]
pub async fn list_notifications(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<NotificationQuery>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let feed = notifications::list_notifications(&mut conn, &user.0, query.unread).await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[post("/notifications/read-all")]
pub async fn mark_all_read(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let updated = notifications::mark_all_read(&mut conn, &user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

#[post("/notifications/{notification_id}/read")]
pub async fn mark_read(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let notification = notifications::mark_read(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notification))
}

#[delete("/notifications/{notification_id}")]
pub async fn delete_notification(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    notifications::delete_notification(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
