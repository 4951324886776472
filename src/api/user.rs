use actix_web::{HttpResponse, Responder, web};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{AppError, AppResult},
    model::user::User,
    models::CreateUserReq,
    store,
};

/// Create an operator account. Admins only.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Operator created", body = User),
        (status = 400, description = "Name, email or password missing"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already exists")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(pool, payload), fields(email = %payload.email))]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateUserReq>,
) -> AppResult<impl Responder> {
    auth.require_admin()?;

    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::validation("Name, email and password are required"));
    }

    let hash = hash_password(&payload.password)?;
    let user = store::user::insert(
        pool.get_ref(),
        &payload.name,
        &payload.email,
        &hash,
        payload.role,
    )
    .await?;

    info!(user_id = user.id, role = %user.role, "Operator created");
    Ok(HttpResponse::Created().json(user))
}
