//! Conversational advisor boundary
//!
//! The [`Advisor`] trait is the seam to the text-completion provider.
//! History is windowed and normalised here before any provider sees it.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AdvisorError, UpstreamErrorKind};
use crate::models::{ChatRole, ChatTurn, RecommendationRequest};
use crate::rates::province;
use crate::Result;

/// Number of prior turns forwarded with each message
pub const HISTORY_WINDOW: usize = 10;

const DIAGNOSTIC_PROMPT: &str = "Say \"Hello, 6ixKar is working!\" in 5 words.";

/// Text-completion provider
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Answer a user message given prior turns (already normalised)
    async fn reply(&self, message: &str, history: &[ChatTurn]) -> Result<String>;

    /// Single-shot completion without history
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Credential prefix shown by the diagnostic, if the provider uses one
    fn key_hint(&self) -> Option<String> {
        None
    }
}

/// Keep the most recent turns, drop system turns and any leading assistant
/// turns so the first turn sent is from the user.
pub fn prepare_history(history: &[ChatTurn], window: usize) -> Vec<ChatTurn> {
    let start = history.len().saturating_sub(window);

    history[start..]
        .iter()
        .filter(|turn| turn.role != ChatRole::System)
        .skip_while(|turn| turn.role == ChatRole::Assistant)
        .cloned()
        .collect()
}

/// Validate a chat message, window its history and ask the advisor.
pub async fn chat(advisor: &dyn Advisor, message: &str, history: &[ChatTurn]) -> Result<String> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AdvisorError::validation(
            "message",
            "message is required and must be a non-empty string",
        ));
    }

    let history = prepare_history(history, HISTORY_WINDOW);
    info!(history_turns = history.len(), "Forwarding chat message to advisor");
    advisor.reply(message, &history).await
}

/// Ask the advisor for car recommendations within a budget.
pub async fn recommend(advisor: &dyn Advisor, req: &RecommendationRequest) -> Result<String> {
    if req.budget.is_nan() || req.budget <= 0.0 {
        return Err(AdvisorError::validation("budget", "a budget greater than 0 is required"));
    }
    let profile = province(&req.province).ok_or_else(|| {
        AdvisorError::validation("province", format!("unknown province code '{}'", req.province))
    })?;

    let prompt = build_recommendation_prompt(req.budget, profile.name, &req.requirements);
    advisor.complete(&prompt).await
}

fn build_recommendation_prompt(budget: f64, province_name: &str, requirements: &[String]) -> String {
    let requirements = if requirements.is_empty() {
        "none specified".to_string()
    } else {
        requirements.join(", ")
    };

    format!(
        "User needs a car recommendation:\n\
         - Budget: ${} CAD\n\
         - Province: {}\n\
         - Requirements: {}\n\n\
         Please provide 3-5 specific car recommendations with:\n\
         1. Make and model\n\
         2. Approximate price range\n\
         3. Why it's a good fit for their needs\n\
         4. Winter readiness score (if in cold province)\n\
         5. Estimated insurance cost for their province",
        format_thousands(budget.round() as i64),
        province_name,
        requirements
    )
}

fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Outcome of a provider round-trip check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorDiagnostic {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<UpstreamErrorKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub possible_causes: Vec<&'static str>,
}

impl AdvisorDiagnostic {
    pub fn is_ok(&self) -> bool {
        self.status == "success"
    }
}

/// Send a fixed prompt and report whether the provider answers.
pub async fn diagnose(advisor: &dyn Advisor) -> AdvisorDiagnostic {
    match advisor.complete(DIAGNOSTIC_PROMPT).await {
        Ok(text) => AdvisorDiagnostic {
            status: "success",
            message: "Gemini API is working!".to_string(),
            test_response: Some(text),
            api_key_prefix: advisor.key_hint(),
            error_kind: None,
            possible_causes: Vec::new(),
        },
        Err(e) => {
            warn!("Advisor diagnostic failed: {}", e);
            let kind = e.upstream_kind().unwrap_or(UpstreamErrorKind::Unknown);
            AdvisorDiagnostic {
                status: "error",
                message: e.user_hint(),
                test_response: None,
                api_key_prefix: None,
                error_kind: Some(kind),
                possible_causes: possible_causes(kind),
            }
        }
    }
}

fn possible_causes(kind: UpstreamErrorKind) -> Vec<&'static str> {
    match kind {
        UpstreamErrorKind::Unauthenticated => vec![
            "Invalid API key",
            "API key not activated yet",
        ],
        UpstreamErrorKind::RateLimited => vec!["API key quota exceeded"],
        UpstreamErrorKind::Unreachable => vec!["Network issue reaching the provider"],
        UpstreamErrorKind::Unknown => vec![
            "Invalid API key",
            "API key quota exceeded",
            "API key not activated yet",
            "Network issue reaching the provider",
        ],
    }
}
