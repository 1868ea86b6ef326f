//! Minimal OpenAI-compatible chat-completions client.

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Always requests JSON mode; callers parse the returned content into
/// their typed contract and treat any mismatch as an error.
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Creates a client for the given endpoint and model.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::NotConfigured`] if `api_key` is `None`,
    /// or [`InferenceError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
    ) -> Result<Self, InferenceError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(InferenceError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Sends one system+user exchange and returns the raw JSON content
    /// string from the first choice.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::Api`] — non-2xx status from the endpoint.
    /// - [`InferenceError::EmptyResponse`] — no choices or null content.
    /// - [`InferenceError::Deserialize`] — envelope is not valid JSON.
    pub async fn chat_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 4096,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::Deserialize {
                context: "chat completions envelope".to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(InferenceError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_not_configured() {
        let err = LlmClient::new("https://api.openai.com/v1", None, "gpt-4o").unwrap_err();
        assert!(matches!(err, InferenceError::NotConfigured));
    }

    #[test]
    fn empty_api_key_is_not_configured() {
        let err = LlmClient::new("https://api.openai.com/v1", Some(""), "gpt-4o").unwrap_err();
        assert!(matches!(err, InferenceError::NotConfigured));
    }

    #[test]
    fn debug_redacts_the_api_key() {
        let client =
            LlmClient::new("https://api.openai.com/v1", Some("sk-secret"), "gpt-4o").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
