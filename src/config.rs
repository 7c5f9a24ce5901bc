use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::env;

/// EmailJS credentials. Notifications are only sent when all three are set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailJsSettings {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub cors_allow_origin: String,
    pub public_base_url: String,

    // Sessions
    pub webui_secret_key: String,
    pub jwt_expires_in: String,

    // Bootstrap admin, created when the user table is empty
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    // Object storage
    pub storage_dir: String,
    pub storage_bucket: String,
    pub max_upload_bytes: usize,

    // Content rewrite provider
    pub openai_api_key: Option<String>,
    pub openai_api_base_url: String,
    pub openai_model: String,
    pub ai_request_timeout_secs: u64,

    // Inquiry notifications
    pub emailjs: Option<EmailJsSettings>,
    pub emailjs_api_url: String,
    pub notification_email: String,
    pub admin_dashboard_url: Option<String>,

    pub inquiry_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite://data/site.db?mode=rwc".to_string(),
            cors_allow_origin: "*".to_string(),
            public_base_url: "http://localhost:8080".to_string(),

            webui_secret_key: String::new(),
            jwt_expires_in: "7d".to_string(),

            admin_name: "Admin".to_string(),
            admin_email: None,
            admin_password: None,

            storage_dir: "data/storage".to_string(),
            storage_bucket: "website-assets".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,

            openai_api_key: None,
            openai_api_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            ai_request_timeout_secs: 60,

            emailjs: None,
            emailjs_api_url: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            notification_email: "admin@example.com".to_string(),
            admin_dashboard_url: None,

            inquiry_refresh_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?;
        }

        if let Ok(database_url) = env::var("DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Ok(origin) = env::var("CORS_ALLOW_ORIGIN") {
            config.cors_allow_origin = origin;
        }

        if let Ok(base_url) = env::var("PUBLIC_BASE_URL") {
            config.public_base_url = base_url.trim_end_matches('/').to_string();
        }

        config.webui_secret_key = match non_empty_var("WEBUI_SECRET_KEY") {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "WEBUI_SECRET_KEY is not set; generated a per-process key, sessions will not survive restarts"
                );
                random_secret()
            }
        };

        if let Ok(expires_in) = env::var("JWT_EXPIRES_IN") {
            config.jwt_expires_in = expires_in;
        }

        if let Some(name) = non_empty_var("ADMIN_NAME") {
            config.admin_name = name;
        }
        config.admin_email = non_empty_var("ADMIN_EMAIL");
        config.admin_password = non_empty_var("ADMIN_PASSWORD");

        if let Ok(dir) = env::var("STORAGE_DIR") {
            config.storage_dir = dir;
        }

        if let Ok(bucket) = env::var("STORAGE_BUCKET") {
            config.storage_bucket = bucket;
        }

        if let Ok(max) = env::var("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = max
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))?;
        }

        config.openai_api_key = non_empty_var("OPENAI_API_KEY");

        if let Some(base_url) = non_empty_var("OPENAI_API_BASE_URL") {
            config.openai_api_base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(model) = non_empty_var("OPENAI_MODEL") {
            config.openai_model = model;
        }

        if let Ok(timeout) = env::var("AI_REQUEST_TIMEOUT_SECS") {
            config.ai_request_timeout_secs = timeout
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid AI_REQUEST_TIMEOUT_SECS: {}", e))?;
        }

        config.emailjs = match (
            non_empty_var("EMAILJS_SERVICE_ID"),
            non_empty_var("EMAILJS_TEMPLATE_ID"),
            non_empty_var("EMAILJS_PUBLIC_KEY"),
        ) {
            (Some(service_id), Some(template_id), Some(public_key)) => Some(EmailJsSettings {
                service_id,
                template_id,
                public_key,
            }),
            _ => None,
        };

        if let Some(url) = non_empty_var("EMAILJS_API_URL") {
            config.emailjs_api_url = url;
        }

        if let Some(email) = non_empty_var("ADMIN_NOTIFICATION_EMAIL") {
            config.notification_email = email;
        }

        config.admin_dashboard_url = non_empty_var("ADMIN_DASHBOARD_URL");

        if let Ok(secs) = env::var("INQUIRY_REFRESH_SECS") {
            config.inquiry_refresh_secs = secs
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid INQUIRY_REFRESH_SECS: {}", e))?;
        }

        Ok(config)
    }

    pub fn dashboard_url(&self) -> String {
        self.admin_dashboard_url
            .clone()
            .unwrap_or_else(|| format!("{}/admin", self.public_base_url))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn random_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
