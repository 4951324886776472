use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    auth::password::hash_password, config::Config, error::AppResult, model::role::Role, store,
};

/// Seeds the first administrator from the environment when no operator
/// exists yet. Returns whether an account was created.
pub async fn ensure_admin(pool: &SqlitePool, config: &Config) -> AppResult<bool> {
    if store::user::count(pool).await? > 0 {
        return Ok(false);
    }

    let Some(admin) = &config.bootstrap_admin else {
        warn!(
            "No operator accounts exist. Set BOOTSTRAP_ADMIN_EMAIL and \
             BOOTSTRAP_ADMIN_PASSWORD to create the first admin"
        );
        return Ok(false);
    };

    let hash = hash_password(&admin.password)?;
    let user = store::user::insert(pool, &admin.name, &admin.email, &hash, Role::Admin).await?;

    info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::password::verify_password, config::BootstrapAdmin, db::test_pool};

    fn with_admin() -> Config {
        Config {
            bootstrap_admin: Some(BootstrapAdmin {
                name: "Root".to_string(),
                email: "Root@Example.com".to_string(),
                password: "first-login".to_string(),
            }),
            ..Config::for_tests()
        }
    }

    #[actix_web::test]
    async fn test_creates_admin_on_empty_store() {
        let pool = test_pool().await;

        assert!(ensure_admin(&pool, &with_admin()).await.unwrap());

        let admin = store::user::find_by_email(&pool, "root@example.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("first-login", &admin.password_hash));

        // second start is a no-op
        assert!(!ensure_admin(&pool, &with_admin()).await.unwrap());
        assert_eq!(store::user::count(&pool).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_no_credentials_means_no_account() {
        let pool = test_pool().await;

        assert!(!ensure_admin(&pool, &Config::for_tests()).await.unwrap());
        assert_eq!(store::user::count(&pool).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_existing_operators_are_left_alone() {
        let pool = test_pool().await;
        store::user::insert(&pool, "Pat", "pat@example.com", "hash", Role::Clerk).await.unwrap();

        assert!(!ensure_admin(&pool, &with_admin()).await.unwrap());
        assert!(store::user::find_by_email(&pool, "root@example.com").await.unwrap().is_none());
    }
}
