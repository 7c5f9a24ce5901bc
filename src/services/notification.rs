use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::{Config, EmailJsSettings};
use crate::models::Inquiry;

#[derive(Debug, Serialize, PartialEq)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub fitness_goal: String,
    pub message: String,
    pub to_email: String,
    pub admin_dashboard_url: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EmailPayload {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: TemplateParams,
}

/// Best-effort admin email for new inquiries via the EmailJS REST API.
/// Delivery problems are logged and never reach the caller.
#[derive(Clone)]
pub struct EmailNotifier {
    client: Client,
    settings: Option<EmailJsSettings>,
    api_url: String,
    to_email: String,
    dashboard_url: String,
}

impl EmailNotifier {
    pub fn new(
        settings: Option<EmailJsSettings>,
        api_url: impl Into<String>,
        to_email: impl Into<String>,
        dashboard_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build notification client, using defaults: {}", e);
                Client::new()
            });

        EmailNotifier {
            client,
            settings,
            api_url: api_url.into(),
            to_email: to_email.into(),
            dashboard_url: dashboard_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        EmailNotifier::new(
            config.emailjs.clone(),
            &config.emailjs_api_url,
            &config.notification_email,
            config.dashboard_url(),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    pub fn payload(&self, settings: &EmailJsSettings, inquiry: &Inquiry) -> EmailPayload {
        EmailPayload {
            service_id: settings.service_id.clone(),
            template_id: settings.template_id.clone(),
            user_id: settings.public_key.clone(),
            template_params: TemplateParams {
                from_name: inquiry.name.clone(),
                from_email: inquiry.email.clone(),
                fitness_goal: inquiry.fitness_goal.clone(),
                message: inquiry.message.clone(),
                to_email: self.to_email.clone(),
                admin_dashboard_url: self.dashboard_url.clone(),
            },
        }
    }

    /// Returns whether the provider accepted the email.
    pub async fn notify_new_inquiry(&self, inquiry: &Inquiry) -> bool {
        let Some(settings) = &self.settings else {
            debug!("EmailJS is not configured, skipping notification");
            return false;
        };

        let payload = self.payload(settings, inquiry);
        match self.client.post(&self.api_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Inquiry notification sent for {}", inquiry.id);
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "Inquiry notification rejected with status {}: {}",
                    status, body
                );
                false
            }
            Err(e) => {
                error!("Failed to send inquiry notification: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inquiry() -> Inquiry {
        Inquiry {
            id: "inq-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            fitness_goal: "Run a 10k".to_string(),
            message: "Can you help?".to_string(),
            created_at: 0,
        }
    }

    fn settings() -> EmailJsSettings {
        EmailJsSettings {
            service_id: "service_x".to_string(),
            template_id: "template_y".to_string(),
            public_key: "pk_z".to_string(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let notifier = EmailNotifier::new(
            Some(settings()),
            "http://localhost/send",
            "sophie@example.com",
            "http://localhost:8080/admin",
        );
        let json = serde_json::to_value(notifier.payload(&settings(), &inquiry())).unwrap();

        assert_eq!(json["service_id"], "service_x");
        assert_eq!(json["user_id"], "pk_z");
        assert_eq!(json["template_params"]["from_name"], "Ana");
        assert_eq!(json["template_params"]["fitness_goal"], "Run a 10k");
        assert_eq!(json["template_params"]["to_email"], "sophie@example.com");
        assert_eq!(
            json["template_params"]["admin_dashboard_url"],
            "http://localhost:8080/admin"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_skips() {
        let notifier = EmailNotifier::from_config(&Config::default());
        assert!(!notifier.is_enabled());
        assert!(!notifier.notify_new_inquiry(&inquiry()).await);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_swallowed() {
        let notifier = EmailNotifier::new(
            Some(settings()),
            "http://127.0.0.1:9/api/v1.0/email/send",
            "sophie@example.com",
            "http://localhost:8080/admin",
        );
        assert!(!notifier.notify_new_inquiry(&inquiry()).await);
    }
}
