use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{LabelInput, LabelUpdate},
    services::labels,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

#[get("/boards/{board_id}/labels")]
pub async fn list_labels(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let labels = labels::list_labels(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(labels))
}

#[post("/boards/{board_id}/labels")]
pub async fn create_label(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<LabelInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let label =
        labels::create_label(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Created().json(label))
}

#[put("/labels/{label_id}")]
pub async fn update_label(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<LabelUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let label =
        labels::update_label(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(label))
}

#[delete("/labels/{label_id}")]
pub async fn delete_label(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    labels::delete_label(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::NoContent().finish())
}
