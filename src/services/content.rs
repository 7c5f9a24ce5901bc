use futures::future::join_all;
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{
    validate_key_name, BatchSaveReport, ContentField, ContentMap, FieldValue, Section,
    UpsertOutcome,
};
use crate::utils::misc::generate_uuid;
use crate::utils::time::current_timestamp_seconds;

const TABLE: &str = "section_content";

/// Accessor for the sparse `(section, field) -> value` override table.
///
/// Writes follow a check-then-update-or-insert protocol: the existence check
/// decides which statement runs. Concurrent writers to the same key are
/// last-write-wins; there is no versioning.
pub struct ContentService<'a> {
    db: &'a Database,
}

impl<'a> ContentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        ContentService { db }
    }

    pub async fn get_all_rows(&self) -> AppResult<Vec<ContentField>> {
        let rows = sqlx::query_as::<_, ContentField>(
            r#"
            SELECT id, section, field, value, image_url, created_at, updated_at
            FROM section_content
            ORDER BY section, field
            "#,
        )
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(rows)
    }

    #[cfg(test)]
    pub async fn get_row(&self, section: &str, field: &str) -> AppResult<Option<ContentField>> {
        let row = sqlx::query_as::<_, ContentField>(
            r#"
            SELECT id, section, field, value, image_url, created_at, updated_at
            FROM section_content
            WHERE section = ? AND field = ?
            "#,
        )
        .bind(section)
        .bind(field)
        .fetch_optional(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(row)
    }

    pub async fn upsert_field(
        &self,
        section: &str,
        field: &str,
        value: &str,
        image_url: Option<&str>,
    ) -> AppResult<UpsertOutcome> {
        validate_key_name("section", section)?;
        validate_key_name("field", field)?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM section_content WHERE section = ? AND field = ?")
                .bind(section)
                .bind(field)
                .fetch_optional(&self.db.pool)
                .await
                .map_err(|e| AppError::from_store(e, TABLE))?;

        if existing.is_some() {
            self.update_value(section, field, value, image_url).await?;
            debug!("Updated {}.{}", section, field);
            return Ok(UpsertOutcome::Updated);
        }

        let now = current_timestamp_seconds();
        let inserted = sqlx::query(
            r#"
            INSERT INTO section_content (id, section, field, value, image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_uuid())
        .bind(section)
        .bind(field)
        .bind(value)
        .bind(image_url)
        .bind(now)
        .bind(now)
        .execute(&self.db.pool)
        .await;

        match inserted {
            Ok(_) => {
                debug!("Inserted {}.{}", section, field);
                Ok(UpsertOutcome::Inserted)
            }
            Err(e) if is_unique_violation(&e) => {
                // another writer inserted the key after our check; the later write wins
                debug!("Lost insert race on {}.{}, updating instead", section, field);
                self.update_value(section, field, value, image_url).await?;
                Ok(UpsertOutcome::Updated)
            }
            Err(e) => Err(AppError::from_store(e, TABLE)),
        }
    }

    async fn update_value(
        &self,
        section: &str,
        field: &str,
        value: &str,
        image_url: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE section_content
            SET value = ?, image_url = COALESCE(?, image_url), updated_at = ?
            WHERE section = ? AND field = ?
            "#,
        )
        .bind(value)
        .bind(image_url)
        .bind(current_timestamp_seconds())
        .bind(section)
        .bind(field)
        .execute(&self.db.pool)
        .await
        .map_err(|e| AppError::from_store(e, TABLE))?;

        Ok(())
    }

    /// "Save all": empty values are skipped, the rest are written concurrently
    /// and reported per field.
    pub async fn save_fields(&self, fields: &[FieldValue]) -> BatchSaveReport {
        let pending: Vec<&FieldValue> = fields.iter().filter(|f| !f.value.is_empty()).collect();
        if pending.is_empty() {
            return BatchSaveReport::nothing_to_save();
        }

        self.upsert_all(pending).await
    }

    /// Write the section's defaults back through the regular upsert path.
    pub async fn revert_section(&self, section: Section) -> BatchSaveReport {
        let records: Vec<FieldValue> = section
            .defaults()
            .iter()
            .map(|(field, value)| FieldValue::new(section.as_str(), *field, *value))
            .collect();

        self.upsert_all(records.iter().collect()).await
    }

    async fn upsert_all(&self, records: Vec<&FieldValue>) -> BatchSaveReport {
        let results = join_all(records.into_iter().map(|record| async move {
            let result = self
                .upsert_field(&record.section, &record.field, &record.value, None)
                .await;
            if let Err(ref e) = result {
                warn!("Failed to save {}: {}", record.key(), e);
            }
            (record.clone(), result)
        }))
        .await;

        BatchSaveReport::from_results(results)
    }

    /// Effective content for the page. A failed read degrades to the defaults
    /// (second tuple element is `true`) instead of surfacing an error.
    pub async fn load_resolved(&self) -> (ContentMap, bool) {
        match self.get_all_rows().await {
            Ok(rows) => (resolve_content(&rows), false),
            Err(e) => {
                warn!("Failed to load content, serving defaults: {}", e);
                (default_content(), true)
            }
        }
    }
}

pub fn default_content() -> ContentMap {
    Section::ALL
        .into_iter()
        .map(|section| {
            let fields = section
                .defaults()
                .iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect();
            (section.as_str().to_string(), fields)
        })
        .collect()
}

/// Overlay stored rows onto the defaults. Empty stored values never replace a
/// default; sections without defaults pass through from storage.
pub fn resolve_content(rows: &[ContentField]) -> ContentMap {
    let mut resolved = default_content();

    for row in rows {
        if row.value.is_empty() {
            continue;
        }

        if Section::parse(&row.section).is_none() {
            debug!("Passing through content for unknown section {}", row.section);
        }

        resolved
            .entry(row.section.clone())
            .or_default()
            .insert(row.field.clone(), row.value.clone());
    }

    resolved
}
