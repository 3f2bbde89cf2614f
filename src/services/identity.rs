//! Identity lookups used by the core. Passwords and tokens stay in `crate::auth`.

use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use crate::models::{ProfileInput, User, UserIdentity, UserSummary};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, avatar, created_at";

/// Stored login material for a username.
pub struct Credentials {
    pub identity: UserIdentity,
    pub password_hash: String,
}

pub async fn find_user(conn: &mut PgConnection, user_id: i32) -> BoardResult<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BoardError::NotFound("User"))
}

/// Exact, case-sensitive username lookup.
pub async fn resolve_by_handle(
    conn: &mut PgConnection,
    handle: &str,
) -> BoardResult<Option<UserIdentity>> {
    let row = sqlx::query_as::<_, (i32, String)>("SELECT id, username FROM users WHERE username = $1")
        .bind(handle)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|(id, username)| UserIdentity { id, username }))
}

/// Resolves many handles at once; unknown handles are simply absent from the result.
pub async fn resolve_handles(
    conn: &mut PgConnection,
    handles: &[String],
) -> BoardResult<Vec<UserIdentity>> {
    if handles.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, (i32, String)>(
        "SELECT id, username FROM users WHERE username = ANY($1) ORDER BY id",
    )
    .bind(handles)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, username)| UserIdentity { id, username })
        .collect())
}

pub async fn find_credentials(
    conn: &mut PgConnection,
    username: &str,
) -> BoardResult<Option<Credentials>> {
    let row = sqlx::query_as::<_, (i32, String, String)>(
        "SELECT id, username, password_hash FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|(id, username, password_hash)| Credentials {
        identity: UserIdentity { id, username },
        password_hash,
    }))
}

/// Ids from `user_ids` that do not belong to any user.
pub async fn missing_users(conn: &mut PgConnection, user_ids: &[i32]) -> BoardResult<Vec<i32>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
        .bind(user_ids)
        .fetch_all(&mut *conn)
        .await?;
    Ok(user_ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect())
}

pub async fn search_users(
    conn: &mut PgConnection,
    search: Option<&str>,
) -> BoardResult<Vec<UserSummary>> {
    let users = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            sqlx::query_as::<_, UserSummary>(
                "SELECT id, username, email FROM users
                 WHERE username ILIKE $1 OR email ILIKE $1
                 ORDER BY username LIMIT 50",
            )
            .bind(format!("%{}%", escape_like(term)))
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, UserSummary>(
                "SELECT id, username, email FROM users ORDER BY username LIMIT 50",
            )
            .fetch_all(&mut *conn)
            .await?
        }
    };
    Ok(users)
}

pub async fn update_profile(
    conn: &mut PgConnection,
    user_id: i32,
    input: ProfileInput,
) -> BoardResult<User> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            avatar = COALESCE($4, avatar)
         WHERE id = $1
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(input.first_name)
    .bind(input.last_name)
    .bind(input.avatar)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("User"))
}

/// A validated registration, with the password already hashed.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Whether `username` or `email` is already taken.
pub async fn identity_taken(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
) -> BoardResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(&mut *conn)
    .await?;
    Ok(taken)
}

pub async fn create_user(conn: &mut PgConnection, user: NewUser<'_>) -> BoardResult<UserIdentity> {
    let (id, username) = sqlx::query_as::<_, (i32, String)>(
        "INSERT INTO users (username, email, password_hash, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, username",
    )
    .bind(user.username)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.first_name)
    .bind(user.last_name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(UserIdentity { id, username })
}

/// Escapes `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
