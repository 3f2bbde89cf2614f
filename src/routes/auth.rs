use crate::{
    auth::{
        generate_access_token, generate_refresh_token, hash_password, verify_password,
        verify_refresh_token, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest,
    },
    error::AppError,
    models::UserIdentity,
    services::{error::is_unique_violation, identity, BoardError},
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

fn issue_tokens(user: &UserIdentity) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        access_token: generate_access_token(user)?,
        refresh_token: generate_refresh_token(user)?,
        user_id: user.id,
    })
}

/// Register a new user
///
/// Creates a new user account and returns an access/refresh token pair.
///
/// ## Responses:
/// - `201 Created`: `AuthResponse`.
/// - `400 Bad Request`: The username or email is already registered.
/// - `422 Unprocessable Entity`: Input validation failed.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let mut conn = pool.acquire().await?;
    if identity::identity_taken(&mut conn, &register_data.username, &register_data.email).await? {
        return Err(AppError::BadRequest(
            "Username or email already registered".into(),
        ));
    }

    let password_hash = hash_password(&register_data.password)?;
    let created = identity::create_user(
        &mut conn,
        identity::NewUser {
            username: &register_data.username,
            email: &register_data.email,
            password_hash: &password_hash,
            first_name: register_data.first_name.as_deref().unwrap_or_default(),
            last_name: register_data.last_name.as_deref().unwrap_or_default(),
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same name.
        Err(BoardError::StoreFailure(e)) if is_unique_violation(&e) => {
            return Err(AppError::BadRequest(
                "Username or email already registered".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("registered user {} ({})", user.id, user.username);
    Ok(HttpResponse::Created().json(issue_tokens(&user)?))
}

/// Login user
///
/// Authenticates by username and password.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let mut conn = pool.acquire().await?;
    match identity::find_credentials(&mut conn, &login_data.username).await? {
        Some(credentials) if verify_password(&login_data.password, &credentials.password_hash)? => {
            Ok(HttpResponse::Ok().json(issue_tokens(&credentials.identity)?))
        }
        _ => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Exchanges a refresh token for a fresh token pair.
#[post("/refresh")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    body: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let claims = verify_refresh_token(&body.refresh_token)?;

    // The account may have been deleted since the token was issued.
    let mut conn = pool.acquire().await?;
    let user = identity::find_user(&mut conn, claims.sub)
        .await
        .map_err(|_| AppError::Unauthorized("Unknown user".into()))?;

    let identity = UserIdentity {
        id: user.id,
        username: user.username,
    };
    Ok(HttpResponse::Ok().json(issue_tokens(&identity)?))
}
