use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ListInput, ListUpdate},
    services::lists,
    storage::BlobStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

#[get("/boards/{board_id}/lists")]
pub async fn list_lists(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let lists = lists::list_lists(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[post("/boards/{board_id}/lists")]
pub async fn create_list(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<ListInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let list = lists::create_list(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Created().json(list))
}

/// Renames or reorders a list.
#[put("/lists/{list_id}")]
pub async fn update_list(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<ListUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let list = lists::update_list(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(list))
}

#[delete("/lists/{list_id}")]
pub async fn delete_list(
    pool: web::Data<PgPool>,
    store: web::Data<BlobStore>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    let blobs = lists::delete_list(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    store.release(&blobs).await;
    Ok(HttpResponse::NoContent().finish())
}
