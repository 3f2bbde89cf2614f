use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{BoardInput, BoardUpdate},
    services::boards,
    storage::BlobStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Boards the caller is a member of, newest first.
#[get("/boards")]
pub async fn list_boards(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let boards = boards::list_boards(&mut conn, &user.0).await?;
    Ok(HttpResponse::Ok().json(boards))
}

/// Creates a board owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new `Board`.
/// - `422 Unprocessable Entity`: the title is empty or too long.
#[post("/boards")]
pub async fn create_board(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    input: web::Json<BoardInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let board = boards::create_board(&mut tx, &user.0, input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Created().json(board))
}

/// The board page: the board, its lists with their cards, and its members.
///
/// ## Responses:
/// - `200 OK`: `BoardDetail`.
/// - `403 Forbidden`: the caller is not a member.
/// - `404 Not Found`: no such board.
#[get("/boards/{board_id}")]
pub async fn get_board(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let detail = boards::get_board(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[put("/boards/{board_id}")]
pub async fn update_board(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<BoardUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut tx = pool.begin().await?;
    let board =
        boards::update_board(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(board))
}

/// Deletes the board with everything on it, then removes its attachment blobs.
#[delete("/boards/{board_id}")]
pub async fn delete_board(
    pool: web::Data<PgPool>,
    store: web::Data<BlobStore>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    let blobs = boards::delete_board(&mut tx, &user.0, path.into_inner()).await?;
    tx.commit().await?;
    store.release(&blobs).await;
    Ok(HttpResponse::NoContent().finish())
}
