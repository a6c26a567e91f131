//! Client for the text-generation service that suggests coping strategies
//! for bad habits. Callers always get at least one [`Recommendation`] back;
//! every failure is folded into a fallback record.

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::models::Recommendation;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = r#"
You are a supportive AI habit coach. For each bad habit, provide 3 specific recommendations.
Return your response in this exact JSON format:
{
  "recommendations": [
    {
      "title": "Short actionable title",
      "description": "Detailed explanation of the strategy"
    }
  ]
}

Your recommendations should:
1. Be practical and immediately actionable
2. Focus on positive replacement behaviors
3. Include specific triggers and strategies
4. Be encouraging and non-judgmental
5. Emphasize gradual progress

Avoid:
- Medical or professional health advice
- Extreme measures
- Shame or criticism
- Unrealistic expectations
"#;

pub fn habit_prompt(habit_name: &str) -> String {
    format!("Please provide recommendations for breaking the bad habit of {habit_name}")
}

pub fn configuration_fallback() -> Recommendation {
    Recommendation::new("Configuration Error", "OpenAI API key is not configured.")
}

pub fn unavailable_fallback() -> Recommendation {
    Recommendation::new(
        "Error Loading Recommendations",
        "Unable to load recommendations at this time. Please try again later.",
    )
}

pub fn default_recommendation() -> Recommendation {
    Recommendation::new(
        "Default Recommendation",
        "Try replacing this habit with a positive alternative activity.",
    )
}

impl GatewayError {
    pub fn fallback(self) -> Vec<Recommendation> {
        let record = match self {
            GatewayError::Configuration => configuration_fallback(),
            GatewayError::Parse { raw, .. } => Recommendation::new("General Advice", raw),
            GatewayError::Transport(_) | GatewayError::Status { .. } | GatewayError::NoChoices => {
                unavailable_fallback()
            }
        };
        vec![record]
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct RecommendationReply {
    #[serde(default)]
    recommendations: Option<Vec<Recommendation>>,
}

pub struct Gateway {
    client: Client,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("falling back to default http client: {err}");
                Client::new()
            });
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Suggestions for breaking the named habit.
    pub async fn recommendations(&self, habit_name: &str) -> Vec<Recommendation> {
        self.generate(&habit_prompt(habit_name)).await
    }

    /// Sends `user_content` as the user turn and normalises the reply.
    pub async fn generate(&self, user_content: &str) -> Vec<Recommendation> {
        match self.request(user_content).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!("recommendation request failed: {err}");
                err.fallback()
            }
        }
    }

    async fn request(&self, user_content: &str) -> Result<Vec<Recommendation>, GatewayError> {
        let api_key = self.config.api_key.as_deref().ok_or(GatewayError::Configuration)?;

        let payload = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(%url, model = %self.config.model, "requesting recommendations");
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::NoChoices)?
            .message
            .content
            .unwrap_or_default();

        parse_reply(&content)
    }
}

/// Parses the model's reply text. An empty list becomes the default record.
///
/// A reply that is not JSON by itself is only rescued from its embedded
/// `{ ... }` span when that object carries a `recommendations` field.
pub fn parse_reply(raw: &str) -> Result<Vec<Recommendation>, GatewayError> {
    let reply = match serde_json::from_str::<RecommendationReply>(raw) {
        Ok(reply) => reply,
        Err(source) => extract_json_object(raw)
            .and_then(|json| serde_json::from_str::<RecommendationReply>(json).ok())
            .filter(|reply| reply.recommendations.is_some())
            .ok_or_else(|| GatewayError::Parse {
                raw: raw.to_string(),
                source,
            })?,
    };

    match reply.recommendations {
        Some(recommendations) if !recommendations.is_empty() => Ok(recommendations),
        _ => Ok(vec![default_recommendation()]),
    }
}

/// Outermost `{ ... }` span, so fenced or prefixed JSON still parses.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
