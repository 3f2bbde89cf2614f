use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ProfileInput, UserQuery},
    services::identity,
};
use actix_web::{get, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// The caller's own profile.
#[get("/profile")]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let profile = identity::find_user(&mut conn, user.id()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/profile")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    input: web::Json<ProfileInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let mut conn = pool.acquire().await?;
    let profile = identity::update_profile(&mut conn, user.id(), input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// User directory used to pick new board members.
///
/// ## Query Parameters:
/// - `search` (optional): case-insensitive match on username or email.
#[get("/users")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let users = identity::search_users(&mut conn, query.search.as_deref()).await?;
    Ok(HttpResponse::Ok().json(users))
}
