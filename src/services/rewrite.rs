use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::utils::misc::strip_wrapping_quotes;

const SYSTEM_PROMPT: &str = "You are a professional copywriter specializing in fitness and wellness content. You help improve website content while maintaining the brand voice and tone.";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;

/// A chat-completion backend. Returns the first choice's text, if any.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> AppResult<Option<String>>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(OpenAiProvider {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, system: &str, prompt: &str) -> AppResult<Option<String>> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Completion provider returned {}: {}", status, error_text);
            return Err(AppError::ExternalServiceError(format!(
                "Completion provider error: {} - {}",
                status, error_text
            )));
        }

        let data: Value = response.json().await?;
        let text = data
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteRequest {
    pub current_text: Option<String>,
    pub instruction: Option<String>,
    pub field_name: Option<String>,
    pub section_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub improved_text: String,
}

pub fn build_prompt(current_text: &str, instruction: &str, field_name: Option<&str>) -> String {
    let label = field_name.filter(|f| !f.is_empty()).unwrap_or("content");
    format!(
        "You are helping to edit website content for a personal fitness trainer's website.\n\n\
         Current {}: \"{}\"\n\n\
         User instruction: \"{}\"\n\n\
         Please provide an improved version of the content based on the user's instruction. \
         Keep the same tone and style appropriate for a fitness trainer's website. \
         Return only the revised text without any explanations, additional commentary, or quotation marks. \
         Do not wrap the response in quotes.",
        label, current_text, instruction
    )
}

/// Proxies rewrite requests to the configured provider. Stateless; the
/// suggestion is only persisted if the editor applies it.
#[derive(Clone)]
pub struct RewriteService {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl RewriteService {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        RewriteService { provider }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let provider = match &config.openai_api_key {
            Some(key) => {
                let provider = OpenAiProvider::new(
                    &config.openai_api_base_url,
                    key,
                    &config.openai_model,
                    Duration::from_secs(config.ai_request_timeout_secs),
                )?;
                Some(Arc::new(provider) as Arc<dyn CompletionProvider>)
            }
            None => None,
        };

        Ok(RewriteService::new(provider))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn rewrite(&self, request: &RewriteRequest) -> AppResult<RewriteResponse> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            AppError::Config(
                "OpenAI API key is not configured. Please set OPENAI_API_KEY in your environment variables."
                    .to_string(),
            )
        })?;

        let current_text = request.current_text.as_deref().unwrap_or_default().trim();
        let instruction = request.instruction.as_deref().unwrap_or_default().trim();
        if current_text.is_empty() || instruction.is_empty() {
            return Err(AppError::BadRequest(
                "Missing required fields: currentText and instruction".to_string(),
            ));
        }

        debug!(
            "Rewriting {}.{}",
            request.section_name.as_deref().unwrap_or("-"),
            request.field_name.as_deref().unwrap_or("-")
        );

        let prompt = build_prompt(current_text, instruction, request.field_name.as_deref());
        let text = provider
            .complete(SYSTEM_PROMPT, &prompt)
            .await?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::InternalServerError("No response from AI".to_string()))?;

        Ok(RewriteResponse {
            improved_text: strip_wrapping_quotes(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubProvider {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(reply: Option<&str>) -> Arc<Self> {
            Arc::new(StubProvider {
                reply: reply.map(|r| r.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    fn service_with(reply: Option<&str>) -> RewriteService {
        let provider: Arc<dyn CompletionProvider> = StubProvider::new(reply);
        RewriteService::new(Some(provider))
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, _system: &str, prompt: &str) -> AppResult<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn request(text: &str, instruction: &str) -> RewriteRequest {
        RewriteRequest {
            current_text: Some(text.to_string()),
            instruction: Some(instruction.to_string()),
            field_name: Some("title".to_string()),
            section_name: Some("hero".to_string()),
        }
    }

    #[tokio::test]
    async fn test_rewrite_strips_quotes() {
        let stub = StubProvider::new(Some("  \"Hello there, future champion!\"\n"));
        let provider: Arc<dyn CompletionProvider> = stub.clone();
        let service = RewriteService::new(Some(provider));

        let response = service
            .rewrite(&request("Hello", "Make it longer"))
            .await
            .unwrap();
        assert_eq!(response.improved_text, "Hello there, future champion!");

        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains("Current title: \"Hello\""));
        assert!(prompts[0].contains("User instruction: \"Make it longer\""));
    }

    #[tokio::test]
    async fn test_missing_provider_checked_first() {
        let service = RewriteService::new(None);
        let err = service.rewrite(&RewriteRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let service = service_with(Some("x"));
        let err = service.rewrite(&request("  ", "shorter")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_empty_completion_is_error() {
        let service = service_with(Some("   "));
        let err = service.rewrite(&request("Hi", "shorter")).await.unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(msg) if msg == "No response from AI"));
    }

    #[test]
    fn test_prompt_defaults_label() {
        assert!(build_prompt("a", "b", None).contains("Current content: \"a\""));
        assert!(build_prompt("a", "b", Some("")).contains("Current content: \"a\""));
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let req: RewriteRequest =
            serde_json::from_str(r#"{"currentText":"Hi","instruction":"longer"}"#).unwrap();
        assert_eq!(req.current_text.as_deref(), Some("Hi"));
        assert!(req.field_name.is_none());
    }
}
