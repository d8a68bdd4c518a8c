//! Gemini API client for the car-buying assistant
//!
//! Uses a long-lived reqwest::Client for connection pooling. Failures are
//! classified into [`UpstreamErrorKind`] from HTTP status and transport
//! errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::advisor::Advisor;
use crate::config::GeminiSettings;
use crate::error::{AdvisorError, UpstreamErrorKind};
use crate::models::{ChatRole, ChatTurn};
use crate::Result;

const SERVICE: &str = "gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const SYSTEM_INSTRUCTION: &str = r#"You are 6ixBot, an expert Canadian car buying assistant. You specialize in:

1. Canadian Car Market: Provide insights on car prices, availability, and market trends across Canada
2. Provincial Differences: Explain insurance rates, registration costs, and regulations for all 13 provinces/territories
3. Winter Readiness: Assess vehicles for Canadian winters (AWD, ground clearance, heating features)
4. Financial Advice: Help with budgeting, financing options, lease vs buy decisions
5. Total Cost of Ownership: Break down insurance, fuel, maintenance, and hidden costs
6. Canadian Banks: Provide info on RBC, TD, Scotia, BMO, CIBC financing options

Always:
- Use Canadian dollars (CAD)
- Consider provincial differences
- Emphasize winter readiness for harsh climates
- Provide practical, actionable advice
- Be friendly and conversational
- Ask clarifying questions when needed

Never:
- Make up specific pricing without data
- Guarantee specific loan approvals"#;

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(AdvisorError::Config("GEMINI_API_KEY not configured".to_string()));
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/{}:generateContent", BASE_URL, settings.model),
        })
    }

    /// First characters of the key, for diagnostics
    pub fn masked_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(10).collect();
        format!("{}...", prefix)
    }

    async fn generate(&self, contents: Vec<Content>) -> Result<String> {
        let request = GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 1024,
                response_mime_type: "text/plain",
            },
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
        };

        info!(turns = request.contents.len(), "Calling Gemini API");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                AdvisorError::upstream(SERVICE, UpstreamErrorKind::from_transport(&e), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(AdvisorError::upstream(
                SERVICE,
                UpstreamErrorKind::from_status(status),
                format!("{}: {}", status, error_text),
            ));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            AdvisorError::upstream(SERVICE, UpstreamErrorKind::Unknown, format!("parse error: {}", e))
        })?;

        let answer = extract_text(gemini_response)?;
        info!(chars = answer.len(), "Gemini response received");
        Ok(answer)
    }
}

#[async_trait]
impl Advisor for GeminiClient {
    async fn reply(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::user(message));
        self.generate(contents).await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.generate(vec![Content::user(prompt)]).await
    }

    fn key_hint(&self) -> Option<String> {
        Some(self.masked_key())
    }
}

/// Pull the answer text out of a response, rejecting safety blocks and
/// empty candidates.
fn extract_text(response: GeminiResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
        .filter(|r| *r != "BLOCK_REASON_UNSPECIFIED")
    {
        warn!(reason, "Gemini blocked the prompt");
        return Err(AdvisorError::upstream(
            SERVICE,
            UpstreamErrorKind::Unknown,
            format!("response blocked by safety: {}", reason),
        ));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        AdvisorError::upstream(SERVICE, UpstreamErrorKind::Unknown, "no candidates returned")
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AdvisorError::upstream(
            SERVICE,
            UpstreamErrorKind::Unknown,
            format!(
                "empty response from model, finishReason={}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        ));
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: Content,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

impl From<&ChatTurn> for Content {
    fn from(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::User => "user",
            _ => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: turn.content.clone(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
