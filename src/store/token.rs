use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::AppResult;
use crate::models::Claims;

pub async fn store_refresh_token(pool: &SqlitePool, claims: &Claims) -> AppResult<()> {
    sqlx::query("INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, ?)")
        .bind(claims.user_id)
        .bind(&claims.jti)
        .bind(claims.exp as i64)
        .execute(pool)
        .await?;

    Ok(())
}

/// Revoke `old_jti` and record `replacement` in one transaction.
///
/// Returns `false` when the old token is unknown or already revoked; nothing
/// is written in that case.
pub async fn rotate_refresh_token(
    pool: &SqlitePool,
    old_jti: &str,
    replacement: &Claims,
) -> AppResult<bool> {
    let mut tx: Transaction<'_, Sqlite> = pool.begin().await?;

    let revoked = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ? AND revoked = 0")
        .bind(old_jti)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if revoked == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, ?)")
        .bind(replacement.user_id)
        .bind(&replacement.jti)
        .bind(replacement.exp as i64)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Idempotent.
pub async fn revoke_refresh_token(pool: &SqlitePool, jti: &str) -> AppResult<()> {
    sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(jti)
        .execute(pool)
        .await?;

    Ok(())
}
