use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::utils::time::current_timestamp_seconds;

pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        UserService { db }
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, updated_at, created_at
            FROM "user"
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    #[cfg(test)]
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, updated_at, created_at
            FROM "user"
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn get_user_count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM "user""#)
            .fetch_one(&self.db.pool)
            .await?;

        Ok(count)
    }

    pub async fn create_user(&self, id: &str, name: &str, email: &str, role: &str) -> AppResult<User> {
        let now = current_timestamp_seconds();

        sqlx::query(
            r#"
            INSERT INTO "user" (id, name, email, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(now)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Failed to create user".to_string()))
    }
}
