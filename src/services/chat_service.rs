use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::ChatConfig;
use crate::services::profile::DeveloperProfile;

/// Canned reply used whenever the upstream model cannot answer
pub const FALLBACK_REPLY: &str = "Sorry! I'm not able to respond right now.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat API key is not configured")]
    NotConfigured,

    #[error("Chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Chat API returned no text")]
    EmptyReply,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Text handed back to the visitor; `is_fallback` marks the canned reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub is_fallback: bool,
}

/// Forwards single visitor questions to the generative-language API.
///
/// Holds the shared "API reachable" flag that chat calls and the periodic
/// health probe both update.
pub struct ChatProxy {
    client: reqwest::Client,
    config: ChatConfig,
    profile: DeveloperProfile,
    online: Arc<AtomicBool>,
}

impl ChatProxy {
    pub fn new(config: &ChatConfig, profile: DeveloperProfile) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            profile,
            online: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::Relaxed);
        if was != online {
            tracing::info!("Chat API is now {}", if online { "online" } else { "offline" });
        }
    }

    pub fn build_prompt(&self, user_text: &str) -> String {
        format!(
            "{}\n\nUser: {}\n\nAssistant:",
            self.profile.persona_context(),
            user_text
        )
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.config.base_url, self.config.model)
    }

    fn api_key(&self) -> Result<&str, ChatError> {
        self.config.api_key.as_deref().ok_or(ChatError::NotConfigured)
    }

    /// One upstream call, no retry. Updates the online flag either way.
    pub async fn generate(&self, user_text: &str) -> Result<String, ChatError> {
        let result = self.call_upstream(user_text).await;
        self.set_online(result.is_ok());
        result
    }

    async fn call_upstream(&self, user_text: &str) -> Result<String, ChatError> {
        let api_key = self.api_key()?;
        let prompt = self.build_prompt(user_text);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(text)
    }

    /// The model's reply, or `FALLBACK_REPLY` when anything goes wrong.
    pub async fn respond(&self, user_text: &str) -> ChatReply {
        match self.generate(user_text).await {
            Ok(text) => ChatReply {
                text,
                is_fallback: false,
            },
            Err(e) => {
                tracing::warn!("Chat generation failed: {}", e);
                ChatReply {
                    text: FALLBACK_REPLY.to_string(),
                    is_fallback: true,
                }
            }
        }
    }

    /// Cheap reachability check against the model metadata endpoint.
    pub async fn probe(&self) -> bool {
        let reachable = match self.api_key() {
            Ok(api_key) => match self
                .client
                .get(self.model_url())
                .header("x-goog-api-key", api_key)
                .send()
                .await
            {
                Ok(resp) => resp.status().is_success(),
                Err(e) => {
                    tracing::debug!("Chat probe failed: {}", e);
                    false
                }
            },
            Err(_) => false,
        };
        self.set_online(reachable);
        reachable
    }

    /// Re-probe on a fixed interval for the life of the process.
    pub fn spawn_health_probe(self: &Arc<Self>) -> JoinHandle<()> {
        let proxy = Arc::clone(self);
        let period = proxy.config.probe_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                proxy.probe().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn proxy(api_key: Option<&str>) -> ChatProxy {
        let mut config = AppConfig::development().chat;
        config.api_key = api_key.map(str::to_string);
        // Nothing listens on port 9 in CI
        config.base_url = "http://127.0.0.1:9/v1beta".to_string();
        config.timeout_secs = 2;
        ChatProxy::new(&config, DeveloperProfile::default()).unwrap()
    }

    #[test]
    fn prompt_wraps_user_text_in_persona() {
        let prompt = proxy(None).build_prompt("What do you build?");
        assert!(prompt.starts_with("You are an AI assistant representing"));
        assert!(prompt.ends_with("\n\nUser: What do you build?\n\nAssistant:"));
    }

    #[tokio::test]
    async fn missing_key_falls_back_and_goes_offline() {
        let chat = proxy(None);
        assert!(chat.is_online());
        let reply = chat.respond("hi").await;
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(reply.is_fallback);
        assert!(!chat.is_online());
        assert!(!chat.probe().await);
    }

    #[tokio::test]
    async fn unreachable_upstream_falls_back() {
        let chat = proxy(Some("key"));
        assert!(matches!(chat.generate("hi").await, Err(ChatError::Http(_))));
        let reply = chat.respond("hi").await;
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(reply.is_fallback);
        assert!(!chat.is_online());
    }

    #[test]
    fn parses_candidate_text_parts() {
        let parsed: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello" }, { "text": " there" }] } }]
        }))
        .unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "Hello there");
    }
}
