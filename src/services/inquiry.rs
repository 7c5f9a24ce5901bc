use tracing::{info, warn};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{Inquiry, InquiryForm};
use crate::utils::misc::generate_uuid;
use crate::utils::time::current_timestamp_seconds;

const TABLE: &str = "customer_inquiries";

pub struct InquiryService<'a> {
    db: &'a Database,
}

impl<'a> InquiryService<'a> {
    pub fn new(db: &'a Database) -> Self {
        InquiryService { db }
    }

    /// Store an already normalized form.
    pub async fn create_inquiry(&self, form: &InquiryForm) -> AppResult<Inquiry> {
        let inquiry = Inquiry {
            id: generate_uuid(),
            name: form.name.clone(),
            email: form.email.clone(),
            fitness_goal: form.goal.clone(),
            message: form.message.clone(),
            created_at: current_timestamp_seconds(),
        };

        sqlx::query(
            r#"
            INSERT INTO customer_inquiries (id, name, email, fitness_goal, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&inquiry.id)
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.fitness_goal)
        .bind(&inquiry.message)
        .bind(inquiry.created_at)
        .execute(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        info!("Stored inquiry {} from {}", inquiry.id, inquiry.email);
        Ok(inquiry)
    }

    /// Newest first.
    pub async fn get_inquiries(&self) -> AppResult<Vec<Inquiry>> {
        let inquiries = sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT id, name, email, fitness_goal, message, created_at
            FROM customer_inquiries
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(inquiries)
    }

    pub async fn count_inquiries(&self) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customer_inquiries")
            .fetch_one(&self.db.pool)
            .await
            .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(count.0)
    }

    pub async fn get_inquiry_by_id(&self, id: &str) -> AppResult<Option<Inquiry>> {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT id, name, email, fitness_goal, message, created_at
            FROM customer_inquiries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(inquiry)
    }

    /// Delete and confirm the row is really gone. A store whose policies
    /// silently drop the delete reports success with zero affected rows, so
    /// the row is looked up again afterwards.
    pub async fn delete_inquiry_verified(&self, id: &str) -> AppResult<()> {
        if self.get_inquiry_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Inquiry {} not found", id)));
        }

        let result = sqlx::query("DELETE FROM customer_inquiries WHERE id = ?")
            .bind(id)
            .execute(&self.db.pool)
            .await
            .map_err(|e| AppError::from_store(e, TABLE))?;

        if self.get_inquiry_by_id(id).await?.is_some() {
            warn!(
                "Delete of inquiry {} reported {} row(s) but the row is still present",
                id,
                result.rows_affected()
            );
            return Err(AppError::policy_denied(TABLE));
        }

        info!("Deleted inquiry {}", id);
        Ok(())
    }
}
