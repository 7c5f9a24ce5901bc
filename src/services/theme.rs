use futures::future::join_all;
use tracing::warn;

use crate::db::Database;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{
    BatchSaveReport, FieldValue, Theme, ThemeForm, ThemeKey, ThemeSetting, UpsertOutcome,
};
use crate::utils::misc::generate_uuid;
use crate::utils::time::current_timestamp_seconds;

/// Also the `section` reported for failed keys.
const TABLE: &str = "theme_settings";

pub struct ThemeService<'a> {
    db: &'a Database,
}

impl<'a> ThemeService<'a> {
    pub fn new(db: &'a Database) -> Self {
        ThemeService { db }
    }

    pub async fn get_all_settings(&self) -> AppResult<Vec<ThemeSetting>> {
        let rows = sqlx::query_as::<_, ThemeSetting>(
            r#"SELECT id, "key", value, updated_at FROM theme_settings ORDER BY "key""#,
        )
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(rows)
    }

    pub async fn upsert_setting(&self, key: ThemeKey, value: &str) -> AppResult<UpsertOutcome> {
        let existing: Option<(String,)> =
            sqlx::query_as(r#"SELECT id FROM theme_settings WHERE "key" = ?"#)
                .bind(key.as_str())
                .fetch_optional(&self.db.pool)
                .await
                .map_err(|e| AppError::from_store(e, TABLE))?;

        if existing.is_some() {
            self.update_value(key, value).await?;
            return Ok(UpsertOutcome::Updated);
        }

        let inserted = sqlx::query(
            r#"INSERT INTO theme_settings (id, "key", value, updated_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(generate_uuid())
        .bind(key.as_str())
        .bind(value)
        .bind(current_timestamp_seconds())
        .execute(&self.db.pool)
        .await;

        match inserted {
            Ok(_) => Ok(UpsertOutcome::Inserted),
            Err(e) if is_unique_violation(&e) => {
                self.update_value(key, value).await?;
                Ok(UpsertOutcome::Updated)
            }
            Err(e) => Err(AppError::from_store(e, TABLE)),
        }
    }

    async fn update_value(&self, key: ThemeKey, value: &str) -> AppResult<()> {
        sqlx::query(r#"UPDATE theme_settings SET value = ?, updated_at = ? WHERE "key" = ?"#)
            .bind(value)
            .bind(current_timestamp_seconds())
            .bind(key.as_str())
            .execute(&self.db.pool)
            .await
            .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(())
    }

    /// Persist the given keys and report per key. Unknown keys reject the
    /// whole form before anything is written; blank values are skipped.
    pub async fn save_theme(&self, form: &ThemeForm) -> AppResult<(BatchSaveReport, Theme)> {
        let mut updates = Vec::with_capacity(form.values.len());
        for (name, value) in &form.values {
            let key = ThemeKey::parse(name)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown theme setting: {}", name)))?;
            let value = value.trim();
            if !value.is_empty() {
                updates.push((key, value.to_string()));
            }
        }

        let report = if updates.is_empty() {
            BatchSaveReport::nothing_to_save()
        } else {
            self.upsert_all(updates).await
        };

        Ok((report, self.load_resolved().await.0))
    }

    /// Write all four defaults back.
    pub async fn revert_theme(&self) -> (BatchSaveReport, Theme) {
        let report = self.upsert_all(Theme::default().entries()).await;
        (report, self.load_resolved().await.0)
    }

    async fn upsert_all(&self, updates: Vec<(ThemeKey, String)>) -> BatchSaveReport {
        let results = join_all(updates.into_iter().map(|(key, value)| async move {
            let result = self.upsert_setting(key, &value).await;
            if let Err(ref e) = result {
                warn!("Failed to save theme setting {}: {}", key.as_str(), e);
            }
            (FieldValue::new(TABLE, key.as_str(), value), result)
        }))
        .await;

        BatchSaveReport::from_results(results)
    }

    pub async fn load_resolved(&self) -> (Theme, bool) {
        match self.get_all_settings().await {
            Ok(rows) => (resolve_theme(&rows), false),
            Err(e) => {
                warn!("Failed to load theme, serving defaults: {}", e);
                (Theme::default(), true)
            }
        }
    }
}

/// Overlay stored settings onto the default theme. Unknown keys and empty
/// values are ignored so the result always carries all four keys.
pub fn resolve_theme(rows: &[ThemeSetting]) -> Theme {
    let mut theme = Theme::default();
    for row in rows {
        if row.value.is_empty() {
            continue;
        }
        if let Some(key) = ThemeKey::parse(&row.key) {
            theme.set(key, row.value.as_str());
        }
    }
    theme
}
