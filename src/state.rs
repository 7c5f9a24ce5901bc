//! Admin editor state as a plain struct with a pure reducer.
//!
//! Every action that starts a round trip has a `*Finished` counterpart that
//! clears the matching in-flight flag whether the request succeeded or not,
//! so an error can never leave the editor stuck in a loading state.
//!
//! The dashboard endpoint builds the initial state with `reduce`; clients
//! drive every later transition.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{BatchSaveReport, ContentMap, Theme, ThemeKey, UserResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Pending AI rewrite for one field, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub section: String,
    pub field: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditorState {
    pub session: Option<UserResponse>,
    pub content: ContentMap,
    pub theme: Theme,
    pub degraded: bool,
    /// `(section, field)` pairs edited since the last successful save.
    pub dirty: BTreeSet<(String, String)>,
    pub loading: bool,
    pub saving: bool,
    /// Field currently receiving an image, if any.
    pub uploading: Option<(String, String)>,
    pub generating: bool,
    pub suggestion: Option<Suggestion>,
    pub inquiry_count: i64,
    pub notices: Vec<Notice>,
}

// only the load actions are raised server-side
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum EditorAction {
    SessionChanged(Option<UserResponse>),
    LoadStarted,
    LoadFinished(Result<(ContentMap, Theme, bool), String>),
    FieldEdited {
        section: String,
        field: String,
        value: String,
    },
    ThemeEdited {
        key: ThemeKey,
        value: String,
    },
    SaveStarted,
    SaveFinished(Result<BatchSaveReport, String>),
    RevertFinished {
        section: String,
        result: Result<BatchSaveReport, String>,
    },
    UploadStarted {
        section: String,
        field: String,
    },
    UploadFinished(Result<String, String>),
    GenerateStarted,
    GenerateFinished {
        section: String,
        field: String,
        result: Result<String, String>,
    },
    SuggestionApplied,
    SuggestionDiscarded,
    InquiryCountRefreshed(i64),
    NoticeDismissed(usize),
}

fn set_field(state: &mut EditorState, section: &str, field: &str, value: String) {
    state
        .content
        .entry(section.to_string())
        .or_default()
        .insert(field.to_string(), value);
}

pub fn reduce(state: EditorState, action: EditorAction) -> EditorState {
    let mut next = state;

    match action {
        EditorAction::SessionChanged(session) => {
            if session.is_none() {
                next = EditorState::default();
            } else {
                next.session = session;
            }
        }
        EditorAction::LoadStarted => next.loading = true,
        EditorAction::LoadFinished(result) => {
            next.loading = false;
            match result {
                Ok((content, theme, degraded)) => {
                    next.content = content;
                    next.theme = theme;
                    next.degraded = degraded;
                    next.dirty.clear();
                    if degraded {
                        next.notices
                            .push(Notice::error("Showing default content; the store could not be read"));
                    }
                }
                Err(message) => next.notices.push(Notice::error(message)),
            }
        }
        EditorAction::FieldEdited {
            section,
            field,
            value,
        } => {
            set_field(&mut next, &section, &field, value);
            next.dirty.insert((section, field));
        }
        EditorAction::ThemeEdited { key, value } => next.theme.set(key, value),
        EditorAction::SaveStarted => next.saving = true,
        EditorAction::SaveFinished(result) => {
            next.saving = false;
            match result {
                Ok(report) => {
                    if report.success {
                        next.dirty.clear();
                        next.notices.push(Notice::success(report.message));
                    } else {
                        // keep failed fields dirty so they can be retried
                        next.dirty = report
                            .failures
                            .iter()
                            .map(|f| (f.section.clone(), f.field.clone()))
                            .collect();
                        next.notices.push(Notice::error(report.message));
                    }
                }
                Err(message) => next.notices.push(Notice::error(message)),
            }
        }
        EditorAction::RevertFinished { section, result } => match result {
            Ok(report) if report.success => {
                next.dirty.retain(|(s, _)| *s != section);
                next.notices.push(Notice::success(format!(
                    "{} reverted to defaults",
                    section
                )));
            }
            Ok(report) => next.notices.push(Notice::error(report.message)),
            Err(message) => next.notices.push(Notice::error(message)),
        },
        EditorAction::UploadStarted { section, field } => {
            next.uploading = Some((section, field));
        }
        EditorAction::UploadFinished(result) => {
            let target = next.uploading.take();
            match (result, target) {
                (Ok(url), Some((section, field))) => {
                    set_field(&mut next, &section, &field, url);
                    next.notices.push(Notice::success("Image uploaded"));
                }
                (Ok(_), None) => {}
                (Err(message), _) => next.notices.push(Notice::error(message)),
            }
        }
        EditorAction::GenerateStarted => next.generating = true,
        EditorAction::GenerateFinished {
            section,
            field,
            result,
        } => {
            next.generating = false;
            match result {
                Ok(text) => {
                    next.suggestion = Some(Suggestion {
                        section,
                        field,
                        text,
                    })
                }
                Err(message) => next.notices.push(Notice::error(message)),
            }
        }
        EditorAction::SuggestionApplied => {
            // applying saves the field right away, so it does not become dirty
            if let Some(suggestion) = next.suggestion.take() {
                set_field(
                    &mut next,
                    &suggestion.section,
                    &suggestion.field,
                    suggestion.text,
                );
            }
        }
        EditorAction::SuggestionDiscarded => next.suggestion = None,
        EditorAction::InquiryCountRefreshed(count) => next.inquiry_count = count,
        EditorAction::NoticeDismissed(index) => {
            if index < next.notices.len() {
                next.notices.remove(index);
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldFailure, FieldValue, UpsertOutcome};
    use crate::services::content::default_content;

    fn loaded() -> EditorState {
        reduce(
            EditorState::default(),
            EditorAction::LoadFinished(Ok((default_content(), Theme::default(), false))),
        )
    }

    fn edit(state: EditorState, section: &str, field: &str, value: &str) -> EditorState {
        reduce(
            state,
            EditorAction::FieldEdited {
                section: section.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            },
        )
    }

    #[test]
    fn test_load_failure_resets_loading() {
        let state = reduce(EditorState::default(), EditorAction::LoadStarted);
        assert!(state.loading);

        let state = reduce(state, EditorAction::LoadFinished(Err("offline".to_string())));
        assert!(!state.loading);
        assert_eq!(state.notices, vec![Notice::error("offline")]);
    }

    #[test]
    fn test_edit_marks_dirty_and_save_clears() {
        let state = edit(loaded(), "hero", "title", "New");
        assert_eq!(state.content["hero"]["title"], "New");
        assert!(state.dirty.contains(&("hero".to_string(), "title".to_string())));

        let state = reduce(state, EditorAction::SaveStarted);
        assert!(state.saving);
        let report = BatchSaveReport::from_results(vec![(
            FieldValue::new("hero", "title", "New"),
            Ok(UpsertOutcome::Updated),
        )]);
        let state = reduce(state, EditorAction::SaveFinished(Ok(report)));
        assert!(!state.saving);
        assert!(state.dirty.is_empty());
        assert_eq!(state.notices[0].kind, NoticeKind::Success);
    }

    #[test]
    fn test_partial_save_keeps_failed_fields_dirty() {
        let state = edit(loaded(), "hero", "title", "A");
        let state = edit(state, "about", "title", "B");
        let state = reduce(state, EditorAction::SaveStarted);

        let report = BatchSaveReport {
            success: false,
            saved: 1,
            failed: 1,
            failures: vec![FieldFailure {
                section: "about".to_string(),
                field: "title".to_string(),
                error: "denied".to_string(),
            }],
            message: "Failed to save 1 record(s): about.title: denied".to_string(),
        };
        let state = reduce(state, EditorAction::SaveFinished(Ok(report)));

        assert!(!state.saving);
        assert_eq!(state.dirty.len(), 1);
        assert!(state.dirty.contains(&("about".to_string(), "title".to_string())));
        assert_eq!(state.notices[0].kind, NoticeKind::Error);
    }

    #[test]
    fn test_save_transport_error_resets_flag() {
        let state = reduce(loaded(), EditorAction::SaveStarted);
        let state = reduce(state, EditorAction::SaveFinished(Err("timeout".to_string())));
        assert!(!state.saving);
    }

    #[test]
    fn test_upload_sets_field_url() {
        let state = reduce(
            loaded(),
            EditorAction::UploadStarted {
                section: "about".to_string(),
                field: "image".to_string(),
            },
        );
        assert!(state.uploading.is_some());

        let state = reduce(
            state,
            EditorAction::UploadFinished(Ok("http://x/storage/b/images/a.jpg".to_string())),
        );
        assert!(state.uploading.is_none());
        assert_eq!(state.content["about"]["image"], "http://x/storage/b/images/a.jpg");
    }

    #[test]
    fn test_generate_then_apply() {
        let state = reduce(loaded(), EditorAction::GenerateStarted);
        let state = reduce(
            state,
            EditorAction::GenerateFinished {
                section: "hero".to_string(),
                field: "subtitle".to_string(),
                result: Ok("Shorter subtitle".to_string()),
            },
        );
        assert!(!state.generating);
        assert!(state.suggestion.is_some());

        let state = reduce(state, EditorAction::SuggestionApplied);
        assert!(state.suggestion.is_none());
        assert_eq!(state.content["hero"]["subtitle"], "Shorter subtitle");
        assert!(state.dirty.is_empty());
    }

    #[test]
    fn test_generate_failure_resets_flag() {
        let state = reduce(loaded(), EditorAction::GenerateStarted);
        let state = reduce(
            state,
            EditorAction::GenerateFinished {
                section: "hero".to_string(),
                field: "title".to_string(),
                result: Err("No response from AI".to_string()),
            },
        );
        assert!(!state.generating);
        assert!(state.suggestion.is_none());
        assert_eq!(state.notices.len(), 1);
    }

    #[test]
    fn test_sign_out_clears_state() {
        let state = reduce(
            loaded(),
            EditorAction::SessionChanged(Some(UserResponse {
                id: "u1".to_string(),
                name: "Sophie".to_string(),
                email: "sophie@example.com".to_string(),
                role: "admin".to_string(),
            })),
        );
        let state = reduce(state, EditorAction::InquiryCountRefreshed(3));
        assert_eq!(state.inquiry_count, 3);

        let state = reduce(state, EditorAction::SessionChanged(None));
        assert_eq!(state, EditorState::default());
    }

    #[test]
    fn test_theme_edit_and_dismiss_notice() {
        let state = reduce(
            loaded(),
            EditorAction::ThemeEdited {
                key: ThemeKey::AccentColor,
                value: "#000000".to_string(),
            },
        );
        assert_eq!(state.theme.accent_color, "#000000");

        let state = reduce(state, EditorAction::LoadFinished(Err("x".to_string())));
        let state = reduce(state, EditorAction::NoticeDismissed(0));
        assert!(state.notices.is_empty());
        let state = reduce(state, EditorAction::NoticeDismissed(5));
        assert!(state.notices.is_empty());
    }
}
