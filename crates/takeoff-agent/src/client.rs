//! OpenAI-compatible chat completions client.
//!
//! The endpoint is typically an LLM gateway that authenticates via extra
//! request headers rather than (or in addition to) a bearer key.

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Chat client against one model behind one endpoint.
pub struct AgentClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
    extra_headers: HashMap<String, String>,
}

impl AgentClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            api_key: None,
            extra_headers: HashMap::new(),
        }
    }

    /// Set the bearer API key.
    pub fn with_api_key(mut self, api_key: Option<impl Into<String>>) -> Self {
        self.api_key = api_key.map(|k| k.into());
        self
    }

    /// Set extra request headers (gateway api/virtual keys).
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = headers;
        self
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request a completion and return the assistant content. The request
    /// asks for a JSON object response, matching the agent's plan format.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let body = ApiRequest {
            model: &self.model,
            messages,
            temperature: 0.1,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let mut request = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        for (name, value) in &self.extra_headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(AgentError::Remote {
                status: status.as_u16(),
                body: raw,
            });
        }

        let content = extract_assistant_content(&raw)?;
        debug!(chars = content.len(), "model reply received");
        Ok(content)
    }
}

/// Pull `choices[0].message.content` out of a chat completions body.
fn extract_assistant_content(raw: &str) -> Result<String, AgentError> {
    #[derive(Deserialize)]
    struct Completion {
        choices: Vec<Choice>,
    }
    #[derive(Deserialize)]
    struct Choice {
        message: AssistantMessage,
    }
    #[derive(Deserialize)]
    struct AssistantMessage {
        content: Option<String>,
    }

    let completion: Completion = serde_json::from_str(raw)
        .map_err(|e| AgentError::InvalidResponse(format!("JSON parse error: {}", e)))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AgentError::InvalidResponse("missing choices[0].message.content".to_string()))
}
