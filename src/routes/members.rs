use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{AddMemberInput, ChangeRoleInput},
    services::{events, membership},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;

#[get("/boards/{board_id}/members")]
pub async fn list_members(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let members = membership::list_members(&mut conn, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(members))
}

/// Adds a user to the board. Only owners and admins may add members, and the
/// granted role is `admin` or `member`.
///
/// ## Responses:
/// - `201 Created`: the new `MemberDetail`.
/// - `400 Bad Request`: unknown or non-grantable role.
/// - `403 Forbidden`: the caller is not a manager of the board.
/// - `404 Not Found`: no such board or user.
/// - `409 Conflict`: the user is already a member.
#[post("/boards/{board_id}/members")]
pub async fn add_member(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<AddMemberInput>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;
    let outcome = membership::add_member(&mut tx, &user.0, path.into_inner(), input.into_inner()).await?;
    let member = events::commit(tx, outcome).await?;
    Ok(HttpResponse::Created().json(member))
}

/// Changes a member's role. Demoting the last owner answers `409 Conflict`.
#[put("/boards/{board_id}/members/{membership_id}")]
pub async fn change_role(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
    input: web::Json<ChangeRoleInput>,
) -> Result<impl Responder, AppError> {
    let (board_id, membership_id) = path.into_inner();
    let mut tx = pool.begin().await?;
    let member =
        membership::change_role(&mut tx, &user.0, board_id, membership_id, &input.role).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(member))
}

/// Removes a member, or lets the caller leave the board.
#[delete("/boards/{board_id}/members/{membership_id}")]
pub async fn remove_member(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
) -> Result<impl Responder, AppError> {
    let (board_id, membership_id) = path.into_inner();
    let mut tx = pool.begin().await?;
    membership::remove_member(&mut tx, &user.0, board_id, membership_id).await?;
    tx.commit().await?;
    Ok(HttpResponse::NoContent().finish())
}
