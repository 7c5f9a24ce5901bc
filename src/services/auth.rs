use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{Auth, User, ADMIN_ROLE};
use crate::services::user::UserService;
use crate::utils::misc::generate_uuid;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::time::current_timestamp_seconds;

pub struct AuthService<'a> {
    db: &'a Database,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database) -> Self {
        AuthService { db }
    }

    pub async fn create_auth(&self, id: &str, email: &str, password: &str) -> AppResult<()> {
        let password_hash = hash_password(password)?;
        let now = current_timestamp_seconds();

        sqlx::query(
            r#"
            INSERT INTO auth (id, email, password, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        Ok(())
    }

    pub async fn get_auth_by_email(&self, email: &str) -> AppResult<Option<Auth>> {
        let result = sqlx::query_as::<_, Auth>(
            r#"
            SELECT id, email, password, active, created_at, updated_at
            FROM auth
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn get_auth_by_id(&self, id: &str) -> AppResult<Option<Auth>> {
        let result = sqlx::query_as::<_, Auth>(
            r#"
            SELECT id, email, password, active, created_at, updated_at
            FROM auth
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<String>> {
        let auth = self.get_auth_by_email(email).await?;

        if let Some(auth) = auth {
            if !auth.active {
                return Err(AppError::Unauthorized("Account is not active".to_string()));
            }

            if verify_password(password, &auth.password)? {
                Ok(Some(auth.id))
            } else {
                Ok(None)
            }
        } else {
            Ok(None)
        }
    }

    /// Re-check that a session still belongs to an active admin, for
    /// destructive operations where the token alone is not trusted.
    pub async fn ensure_active_session(&self, user_id: &str) -> AppResult<User> {
        let auth = self
            .get_auth_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session is no longer valid".to_string()))?;

        if !auth.active {
            return Err(AppError::Unauthorized("Account is not active".to_string()));
        }

        let user = UserService::new(self.db)
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session is no longer valid".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(user)
    }

    #[cfg(test)]
    pub async fn set_active(&self, id: &str, active: bool) -> AppResult<()> {
        sqlx::query("UPDATE auth SET active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(current_timestamp_seconds())
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }

    /// Create the first admin when the user table is empty. Returns whether
    /// an account was created.
    pub async fn bootstrap_admin(&self, name: &str, email: &str, password: &str) -> AppResult<bool> {
        let user_service = UserService::new(self.db);
        if user_service.get_user_count().await? > 0 {
            return Ok(false);
        }

        let email = email.trim().to_lowercase();
        let id = generate_uuid();
        self.create_auth(&id, &email, password).await?;
        user_service.create_user(&id, name, &email, ADMIN_ROLE).await?;

        tracing::info!("Created bootstrap admin account {}", email);
        Ok(true)
    }
}
