use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::{
    auth::{
        auth::{AuthUser, bearer_token},
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    error::{AppError, AppResult},
    model::user::User,
    models::{LoginReqDto, TokenType},
    store,
};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

fn signing_error(e: jsonwebtoken::errors::Error) -> AppError {
    AppError::Internal(format!("token signing failed: {e}"))
}

async fn issue_tokens(pool: &SqlitePool, config: &Config, user: &User) -> AppResult<LoginResponse> {
    let access_token = generate_access_token(user, &config.jwt_secret, config.access_token_ttl)
        .map_err(signing_error)?;
    let (refresh_token, refresh_claims) =
        generate_refresh_token(user, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(signing_error)?;

    debug!(user_id = user.id, jti = %refresh_claims.jti, "Storing refresh token");
    store::token::store_refresh_token(pool, &refresh_claims).await?;

    Ok(LoginResponse {
        access_token,
        refresh_token,
    })
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, user), fields(email = %user.email))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> AppResult<impl Responder> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    // unknown email and wrong password are indistinguishable to the caller
    let db_user = match store::user::find_by_email(pool.get_ref(), &user.email).await? {
        Some(found) if verify_password(&user.password, &found.password_hash) => found,
        Some(_) => {
            info!("Invalid credentials: password mismatch");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            info!("Invalid credentials: user not found");
            return Err(AppError::InvalidCredentials);
        }
    };

    let tokens = issue_tokens(pool.get_ref(), &config, &db_user).await?;

    info!(user_id = db_user.id, "Login successful");
    Ok(HttpResponse::Ok().json(tokens))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Tokens rotated", body = LoginResponse),
        (status = 401, description = "Refresh token missing, invalid or revoked")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> AppResult<impl Responder> {
    let token = bearer_token(&req)?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized("Refresh token required".to_string()));
    }

    let user = store::user::find(pool.get_ref(), claims.user_id)
        .await
        .map_err(|_| AppError::Unauthorized("Unknown operator".to_string()))?;

    let access_token = generate_access_token(&user, &config.jwt_secret, config.access_token_ttl)
        .map_err(signing_error)?;
    let (new_refresh_token, new_claims) =
        generate_refresh_token(&user, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(signing_error)?;

    if !store::token::rotate_refresh_token(pool.get_ref(), &claims.jti, &new_claims).await? {
        return Err(AppError::Unauthorized("Refresh token revoked".to_string()));
    }

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token: new_refresh_token,
    }))
}

/// Revokes the presented refresh token. Always answers 204.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> AppResult<impl Responder> {
    let Ok(token) = bearer_token(&req) else {
        return Ok(HttpResponse::NoContent().finish());
    };

    let Ok(claims) = verify_token(token, &config.jwt_secret) else {
        return Ok(HttpResponse::NoContent().finish());
    };

    if claims.token_type == TokenType::Refresh {
        store::token::revoke_refresh_token(pool.get_ref(), &claims.jti).await?;
    }

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current operator", body = User),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, pool: web::Data<SqlitePool>) -> AppResult<impl Responder> {
    let user = store::user::find(pool.get_ref(), auth.user_id).await?;
    Ok(web::Json(user))
}
