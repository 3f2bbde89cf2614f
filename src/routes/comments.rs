use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::CommentInput,
    services::{comments, events},
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

#[get("/cards/{card_id}/comments")]
pub async fn list_comments(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let comments = comments::list_comments(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Posts a comment as the caller. Every `@username` in the text that resolves to
/// another user produces a `mention` notification.
#[post("/cards/{card_id}/comments")]
pub async fn create_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let outcome =
        comments::create_comment(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    let comment = events::commit(tx, outcome).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[delete("/comments/{comment_id}")]
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    comments::delete_comment(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::NoContent().finish())
}
