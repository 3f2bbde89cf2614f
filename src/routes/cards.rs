use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CardInput, CardUpdate},
    services::{cards, events},
    storage::BlobStore,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Cards of a list ordered by `(order, id)`.
#[get("/lists/{list_id}/cards")]
pub async fn list_cards(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let cards = cards::list_cards(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(cards))
}

/// Creates a card in a list.
///
/// Users mentioned in the description and every initial assignee are notified in the
/// same transaction.
///
/// ## Responses:
/// - `201 Created`: the new `Card`.
/// - `403 Forbidden`: the caller is not a member of the list's board.
/// - `422 Unprocessable Entity`: invalid fields, unknown assignees, or labels from
///   another board.
#[post("/lists/{list_id}/cards")]
pub async fn create_card(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<CardInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let outcome = cards::create_card(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    let card = events::commit(tx, outcome).await?;
    Ok(HttpResponse::Created().json(card))
}

#[get("/cards/{card_id}")]
pub async fn get_card(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let card = cards::get_card(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(card))
}

/// Partially updates a card; omitted fields keep their value. `assignee_ids` and
/// `label_ids` replace the whole set when present.
#[patch("/cards/{card_id}")]
pub async fn update_card(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<CardUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let outcome = cards::update_card(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    let card = events::commit(tx, outcome).await?;
    Ok(HttpResponse::Ok().json(card))
}

#[delete("/cards/{card_id}")]
pub async fn delete_card(
    pool: web::Data<PgPool>,
    store: web::Data<BlobStore>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    let blobs = cards::delete_card(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    store.release(&blobs).await;
    Ok(HttpResponse::NoContent().finish())
}
