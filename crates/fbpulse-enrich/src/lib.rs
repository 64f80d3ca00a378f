//! Text-enrichment collaborator.
//!
//! Given a feedback body, the enricher produces a sentiment label, a theme
//! set, and a one-sentence summary. The hosted model replies in a plain
//! line-oriented format (`Sentiment:` / `Themes:` / `Summary:`) that we
//! parse tolerantly — a malformed completion degrades to neutral/general
//! rather than failing the record.

mod drain;
mod parse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fbpulse_core::Enrichment;

pub use drain::{enrich_pending, DrainOutcome};
pub use parse::parse_completion;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("enrichment endpoint returned status {0}")]
    BadStatus(u16),
    #[error("malformed enrichment response: {0}")]
    Malformed(String),
}

/// Enrichment capability, injected into the server, scheduler, and CLI.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, text: &str) -> Result<Enrichment, EnrichError>;
}

/// Settings for the hosted-model client.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl EnrichConfig {
    #[must_use]
    pub fn from_app_config(config: &fbpulse_core::AppConfig) -> Self {
        Self {
            url: config.enrich_url.clone(),
            model: config.enrich_model.clone(),
            api_key: config.enrich_api_key.clone(),
            timeout_secs: config.enrich_timeout_secs,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// HTTP client for the hosted generative-model endpoint.
pub struct HttpEnricher {
    client: reqwest::Client,
    config: EnrichConfig,
}

impl HttpEnricher {
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the client cannot be built.
    pub fn new(config: EnrichConfig) -> Result<Self, EnrichError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn prompt_for(text: &str) -> String {
        format!(
            "Analyze this customer feedback and provide:\n\
             1. Sentiment (positive/negative/neutral)\n\
             2. Themes (comma-separated short keywords)\n\
             3. A brief one-sentence summary\n\n\
             Feedback: \"{text}\"\n\n\
             Respond in this exact format:\n\
             Sentiment: [positive/negative/neutral]\n\
             Themes: [comma,separated,themes]\n\
             Summary: [one sentence]"
        )
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    async fn enrich(&self, text: &str) -> Result<Enrichment, EnrichError> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt: Self::prompt_for(text),
            max_tokens: 200,
        };

        let mut builder = self.client.post(&self.config.url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::BadStatus(status.as_u16()));
        }

        let body: CompletionResponse = response.json().await?;
        let completion = body
            .response
            .or_else(|| body.choices.into_iter().next().map(|c| c.text))
            .ok_or_else(|| {
                EnrichError::Malformed("no completion text in response".to_string())
            })?;

        let enrichment = parse_completion(&completion, text);
        tracing::debug!(
            sentiment = %enrichment.sentiment,
            theme_count = enrichment.themes.len(),
            "enrichment parsed"
        );
        Ok(enrichment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbpulse_core::Sentiment;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> EnrichConfig {
        EnrichConfig {
            url: format!("{}/v1/completions", server.uri()),
            model: "test-model".to_string(),
            api_key: None,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn enrich_parses_a_well_formed_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Sentiment: negative\nThemes: performance, cold-start\nSummary: Cold starts are too slow."
            })))
            .mount(&server)
            .await;

        let enricher = HttpEnricher::new(config_for(&server)).expect("client");
        let enrichment = enricher
            .enrich("cold starts are killing my use case")
            .await
            .expect("enrich");

        assert_eq!(enrichment.sentiment, Sentiment::Negative);
        assert_eq!(
            enrichment.themes,
            vec!["performance".to_string(), "cold-start".to_string()]
        );
        assert_eq!(enrichment.summary, "Cold starts are too slow.");
    }

    #[tokio::test]
    async fn enrich_reads_openai_style_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"text": "Sentiment: positive\nThemes: dx\nSummary: Loves the tooling."}]
            })))
            .mount(&server)
            .await;

        let enricher = HttpEnricher::new(config_for(&server)).expect("client");
        let enrichment = enricher.enrich("the DX is amazing").await.expect("enrich");
        assert_eq!(enrichment.sentiment, Sentiment::Positive);
    }

    #[tokio::test]
    async fn server_error_surfaces_as_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let enricher = HttpEnricher::new(config_for(&server)).expect("client");
        let err = enricher.enrich("anything").await.expect_err("should fail");
        assert!(matches!(err, EnrichError::BadStatus(503)));
    }

    #[tokio::test]
    async fn missing_completion_text_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let enricher = HttpEnricher::new(config_for(&server)).expect("client");
        let err = enricher.enrich("anything").await.expect_err("should fail");
        assert!(matches!(err, EnrichError::Malformed(_)));
    }
}
