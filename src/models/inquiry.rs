use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::utils::misc::is_valid_email;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Inquiry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub fitness_goal: String,
    pub message: String,
    pub created_at: i64,
}

/// Public contact form payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InquiryForm {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 320))]
    pub email: String,

    #[serde(default, alias = "fitness_goal")]
    #[validate(length(max = 500))]
    pub goal: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub message: String,
}

impl InquiryForm {
    /// Trim every field and enforce the form rules.
    pub fn normalized(&self) -> AppResult<InquiryForm> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let form = InquiryForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            goal: self.goal.trim().to_string(),
            message: self.message.trim().to_string(),
        };

        if form.name.is_empty()
            || form.email.is_empty()
            || form.goal.is_empty()
            || form.message.is_empty()
        {
            return Err(AppError::BadRequest("Please fill in all fields".to_string()));
        }

        if !is_valid_email(&form.email) {
            return Err(AppError::BadRequest(
                "Please enter a valid email address".to_string(),
            ));
        }

        Ok(form)
    }
}

#[derive(Debug, Serialize)]
pub struct InquiryCountResponse {
    pub count: i64,
}

/// Delete result plus the list as re-read from the store.
#[derive(Debug, Serialize)]
pub struct InquiryDeleteResponse {
    pub deleted: bool,
    pub id: String,
    pub inquiries: Vec<Inquiry>,
}
