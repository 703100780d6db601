use crate::config::TransformerConfig;
use crate::error::{Result, TransformError};
use crate::Transformer;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// One instance (and its connection pool) is shared by every worker task.
pub struct ChatTransformer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatTransformer {
    pub fn new(config: &TransformerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TransformError::config("chat mode needs an API token"))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
        })
    }

    fn request<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "user",
                    content: &self.prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            stream: false,
        }
    }
}

#[async_trait]
impl Transformer for ChatTransformer {
    fn name(&self) -> &str {
        "chat"
    }

    async fn transform(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransformError::Status {
                status: status.as_u16(),
                body: truncate(&body, 512),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        first_content(parsed)
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(TransformError::EmptyResponse)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
