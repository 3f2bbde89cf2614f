use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ChecklistInput, ChecklistItemInput, ChecklistItemUpdate},
    services::checklists,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Checklists of a card with their items.
#[get("/cards/{card_id}/checklists")]
pub async fn list_checklists(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let checklists = checklists::list_checklists(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(checklists))
}

#[post("/cards/{card_id}/checklists")]
pub async fn create_checklist(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<ChecklistInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let checklist =
        checklists::create_checklist(&mut tx, &user.0, path.into_inner(), input.into_inner())
            .await?;
    tx.commit().await?;
    Ok(HttpResponse::Created().json(checklist))
}

#[put("/checklists/{checklist_id}")]
pub async fn rename_checklist(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<ChecklistInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let checklist =
        checklists::rename_checklist(&mut tx, &user.0, path.into_inner(), input.into_inner())
            .await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(checklist))
}

#[delete("/checklists/{checklist_id}")]
pub async fn delete_checklist(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    checklists::delete_checklist(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/checklists/{checklist_id}/items")]
pub async fn add_item(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<ChecklistItemInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let item =
        checklists::add_item(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Created().json(item))
}

/// Edits an item's text or toggles it done.
#[put("/checklist-items/{item_id}")]
pub async fn update_item(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<ChecklistItemUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let item =
        checklists::update_item(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(item))
}

#[delete("/checklist-items/{item_id}")]
pub async fn delete_item(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    checklists::delete_item(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::NoContent().finish())
}
