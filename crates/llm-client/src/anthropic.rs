use analysis_core::Narrator;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Messages API client producing plain narrative text.
#[derive(Debug, Clone)]
pub struct AnthropicNarrator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicNarrator {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout: Duration) -> Self {
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        }
    }

    async fn create_message(&self, req: &CreateMessageRequest) -> Result<String, String> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key).map_err(|e| e.to_string())?;
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("status={status}: {text}"));
        }

        let parsed: CreateMessageResponse =
            serde_json::from_str(&text).map_err(|e| e.to_string())?;

        let mut out = String::new();
        for block in parsed.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&text);
            }
        }
        Ok(out)
    }

    fn build_prompt(persona: &str, prompt: &str, context: &serde_json::Value) -> String {
        let mut full = format!("You are a {persona}.\n\n{prompt}\n\n");
        if !context.is_null() {
            full.push_str(&format!("Here is the data to analyze:\n{context}\n\n"));
        }
        full.push_str(
            "Provide a clear, concise analysis. Focus on key insights and actionable information.",
        );
        full
    }
}

#[async_trait]
impl Narrator for AnthropicNarrator {
    async fn narrate(&self, persona: &str, prompt: &str, context: &serde_json::Value) -> String {
        let req = CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: Self::build_prompt(persona, prompt, context),
            }],
        };

        match self.create_message(&req).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "Narrative generation failed");
                format!("Error generating insight: {err}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Unknown,
}
