//! Site chat assistant: prompt construction from store content and an LLM
//! call that always degrades to a canned reply.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::{
    defaults::default_settings,
    domain::{Property, SiteSettings},
};

pub const GREETING: &str = "Hello! I am Model AI. I can help you find plots, explain payment plans, or book a site visit. How can I assist you today?";
pub const UNAVAILABLE_REPLY: &str =
    "I'm sorry, my connection is currently unavailable. Please try again later.";
pub const CONNECTION_ERROR_REPLY: &str =
    "I'm having trouble connecting to the server right now. Please call us directly.";
pub const EMPTY_REPLY: &str = "I didn't catch that. Could you please rephrase?";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    /// `true` when `text` is a canned message rather than model output.
    pub fallback: bool,
}

impl ChatReply {
    fn fallback(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fallback: true,
        }
    }
}

#[derive(Debug)]
pub enum ChatError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http error: {e}"),
            Self::Status { status, body } => write!(f, "upstream status {status}: {body}"),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

#[axum::async_trait]
pub trait ChatClient: Send + Sync {
    /// Returns the model's text; an empty string means the model said nothing usable.
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, ChatError>;
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

pub fn build_system_instruction(properties: &[Property], settings: &SiteSettings) -> String {
    let defaults = default_settings();
    let phone = or_default(&settings.contact_phone, &defaults.contact_phone);
    let email = or_default(&settings.contact_email, &defaults.contact_email);

    let portfolio = properties
        .iter()
        .enumerate()
        .map(|(index, p)| {
            format!(
                "{}. \"{}\" - Location: {}. Price: {}. Deposit: {}. Plan: {}. Status: {}.",
                index + 1,
                p.title,
                p.location,
                p.price,
                or_default(&p.deposit, "N/A"),
                or_default(&p.payment_plan, "Cash"),
                p.status.as_str(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are 'Model AI', the intelligent and professional virtual assistant for Model Land Investment.
Your role is to assist clients in finding their dream land in Kenya.

**Instructions for Answering:**
1.  **Systematic Structure**: Structure your responses logically.
2.  **Formatting**:
    *   Use numbered lists for steps or multiple points.
    *   Use hyphens (-) for bullet points.
    *   Separate distinct ideas with a blank line for readability.
3.  **Tone**: Professional, warm, encouraging, and trustworthy.
4.  **Conciseness**: Keep answers clear and to the point (under 100 words unless detail is requested).

**Company Details:**
*   **Mission**: To provide affordable, secure, and accessible land solutions.
*   **Location**: Betty Business Center, Kitengela. Opposite Kitengela Mall. 2nd Floor Room No.215.
*   **Contact**: {phone}, {email}.

**Current Project Portfolio (Real-time):**
{portfolio}

If asked about site visits, instruct them to call us or visit the office to book a free site visit.
"
    )
}

/// Answers `message`, substituting a labeled canned reply on any failure.
pub async fn reply(
    client: Option<&dyn ChatClient>,
    properties: &[Property],
    settings: &SiteSettings,
    history: &[ChatTurn],
    message: &str,
) -> ChatReply {
    let Some(client) = client else {
        warn!("chat requested but no chat api key is configured");
        return ChatReply::fallback(UNAVAILABLE_REPLY);
    };

    let system_instruction = build_system_instruction(properties, settings);
    match client.generate(&system_instruction, history, message).await {
        Ok(text) if text.trim().is_empty() => ChatReply::fallback(EMPTY_REPLY),
        Ok(text) => ChatReply {
            text,
            fallback: false,
        },
        Err(err) => {
            warn!(error = %err, "chat request failed");
            ChatReply::fallback(CONNECTION_ERROR_REPLY)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("modelland/{}", crate::version::VERSION))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[axum::async_trait]
impl ChatClient for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, ChatError> {
        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| json!({ "role": turn.role, "parts": [{ "text": turn.text }] }))
            .collect();
        contents.push(json!({ "role": ChatRole::User, "parts": [{ "text": message }] }));

        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": contents,
        });

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::defaults::default_properties;

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", "test-model", server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn system_instruction_lists_portfolio_and_contacts() {
        let mut properties = default_properties();
        properties[1].deposit.clear();
        properties[1].payment_plan.clear();
        let mut settings = default_settings();
        settings.contact_phone = "+254 700 000 000".to_string();
        settings.contact_email = String::new();

        let text = build_system_instruction(&properties, &settings);
        assert!(text.contains(
            "1. \"Hope Gardens Phase I\" - Location: Naserian, next to Naserian primary. Price: KES 350,000. Deposit: KES 50,000. Plan: 12 Months. Status: Selling Fast."
        ));
        assert!(text.contains("Deposit: N/A. Plan: Cash. Status: Available."));
        assert!(text.contains("**Contact**: +254 700 000 000, modelland18@gmail.com."));

        properties[1].deposit = " ".to_string();
        let text = build_system_instruction(&properties, &settings);
        assert!(text.contains("Deposit:  . Plan: Cash."));
    }

    #[tokio::test]
    async fn missing_client_returns_unavailable_fallback() {
        let out = reply(None, &[], &default_settings(), &[], "hi").await;
        assert_eq!(out, ChatReply::fallback(UNAVAILABLE_REPLY));
    }

    #[tokio::test]
    async fn gemini_client_returns_model_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Karibu! " }, { "text": "Plots start at KES 350,000." }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let out = reply(
            Some(&client),
            &default_properties(),
            &default_settings(),
            &[ChatTurn {
                role: ChatRole::Model,
                text: GREETING.to_string(),
            }],
            "How much is a plot?",
        )
        .await;
        assert_eq!(out.text, "Karibu! Plots start at KES 350,000.");
        assert!(!out.fallback);
    }

    #[tokio::test]
    async fn upstream_error_degrades_to_connection_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let out = reply(Some(&client), &[], &default_settings(), &[], "hi").await;
        assert_eq!(out, ChatReply::fallback(CONNECTION_ERROR_REPLY));
    }

    #[tokio::test]
    async fn empty_candidates_degrade_to_rephrase_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let out = reply(Some(&client), &[], &default_settings(), &[], "hi").await;
        assert_eq!(out, ChatReply::fallback(EMPTY_REPLY));
    }
}
