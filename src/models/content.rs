use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;

use super::defaults::{section_defaults, FieldDefaults};
use super::theme::Theme;
use crate::error::{AppError, AppResult};
use crate::utils::misc::is_valid_key_name;

/// Editable regions of the public page that ship with defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Services,
    Testimonials,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Hero,
        Section::About,
        Section::Services,
        Section::Testimonials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Services => "services",
            Section::Testimonials => "testimonials",
        }
    }

    pub fn parse(name: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn defaults(&self) -> FieldDefaults {
        section_defaults(*self)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// section -> field -> value
pub type ContentMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentField {
    pub id: String,
    pub section: String,
    pub field: String,
    pub value: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub section: String,
    pub field: String,
    pub value: String,
}

impl FieldValue {
    pub fn new(section: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        FieldValue {
            section: section.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.section, self.field)
    }
}

/// Where a single-field write came from; only used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    #[default]
    Editor,
    Ai,
    Upload,
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdateForm {
    pub section: String,
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub source: FieldSource,
}

#[derive(Debug, Deserialize)]
pub struct BatchSaveForm {
    pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Serialize)]
pub struct FieldSaveResponse {
    pub section: String,
    pub field: String,
    pub value: String,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldFailure {
    pub section: String,
    pub field: String,
    pub error: String,
}

impl FieldFailure {
    pub fn key(&self) -> String {
        format!("{}.{}", self.section, self.field)
    }
}

/// Outcome of a set of independent upserts. Successful writes stay committed
/// regardless of failures elsewhere in the set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchSaveReport {
    pub success: bool,
    pub saved: usize,
    pub failed: usize,
    pub failures: Vec<FieldFailure>,
    pub message: String,
}

impl BatchSaveReport {
    pub fn nothing_to_save() -> Self {
        BatchSaveReport {
            success: true,
            saved: 0,
            failed: 0,
            failures: Vec::new(),
            message: "No content to save".to_string(),
        }
    }

    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (FieldValue, AppResult<UpsertOutcome>)>,
    {
        let mut saved = 0;
        let mut failures = Vec::new();

        for (record, result) in results {
            match result {
                Ok(_) => saved += 1,
                Err(e) => failures.push(FieldFailure {
                    section: record.section,
                    field: record.field,
                    error: e.status_and_detail().1,
                }),
            }
        }

        let failed = failures.len();
        let message = if failed == 0 {
            format!("Successfully saved {} record(s)!", saved)
        } else {
            let reasons = failures
                .iter()
                .map(|f| format!("{}: {}", f.key(), f.error))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Failed to save {} record(s): {}", failed, reasons)
        };

        BatchSaveReport {
            success: failed == 0,
            saved,
            failed,
            failures,
            message,
        }
    }
}

/// Everything the public page needs in one read.
#[derive(Debug, Clone, Serialize)]
pub struct PagePayload {
    pub content: ContentMap,
    pub theme: Theme,
    /// True when the store could not be read and defaults were served instead.
    pub degraded: bool,
}

pub fn validate_key_name(kind: &str, name: &str) -> AppResult<()> {
    if is_valid_key_name(name) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid {} name: {:?}",
            kind, name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parse() {
        assert_eq!(Section::parse("hero"), Some(Section::Hero));
        assert_eq!(Section::parse("testimonials"), Some(Section::Testimonials));
        assert_eq!(Section::parse("Hero"), None);
        assert_eq!(Section::parse("contact"), None);
    }

    #[test]
    fn test_batch_report_counts_failures_per_field() {
        let report = BatchSaveReport::from_results(vec![
            (FieldValue::new("hero", "title", "a"), Ok(UpsertOutcome::Updated)),
            (
                FieldValue::new("hero", "subtitle", "b"),
                Err(AppError::PolicyDenied("denied".to_string())),
            ),
            (FieldValue::new("about", "title", "c"), Ok(UpsertOutcome::Inserted)),
            (
                FieldValue::new("about", "image", "d"),
                Err(AppError::BadRequest("bad".to_string())),
            ),
        ]);

        assert!(!report.success);
        assert_eq!(report.saved, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failures[0].section, "hero");
        assert_eq!(report.failures[0].field, "subtitle");
        assert_eq!(
            report.message,
            "Failed to save 2 record(s): hero.subtitle: denied, about.image: bad"
        );
    }

    #[test]
    fn test_batch_report_all_saved() {
        let report = BatchSaveReport::from_results(vec![(
            FieldValue::new("hero", "title", "a"),
            Ok(UpsertOutcome::Inserted),
        )]);
        assert!(report.success);
        assert_eq!(report.message, "Successfully saved 1 record(s)!");
    }

    #[test]
    fn test_field_form_source_defaults_to_editor() {
        let form: FieldUpdateForm =
            serde_json::from_str(r#"{"section":"hero","field":"title","value":"Hi"}"#).unwrap();
        assert_eq!(form.source, FieldSource::Editor);

        let form: FieldUpdateForm = serde_json::from_str(
            r#"{"section":"hero","field":"title","value":"Hi","source":"ai"}"#,
        )
        .unwrap();
        assert_eq!(form.source, FieldSource::Ai);
    }
}
