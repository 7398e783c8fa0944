//! Wire payloads for each backend.
//!
//! Response types mark the reply field optional on purpose: a well-formed
//! body that simply lacks the field is "no response", not a decode failure.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-style `POST /chat/completions` body.
#[derive(Serialize, Debug)]
pub struct HostedChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HostedReplyMessage {
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct HostedChatChoice {
    #[serde(default)]
    pub message: Option<HostedReplyMessage>,
}

#[derive(Deserialize, Debug)]
pub struct HostedChatResponse {
    #[serde(default)]
    pub choices: Vec<HostedChatChoice>,
}

impl HostedChatResponse {
    pub fn reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// Ollama-style `POST /api/generate` body.
#[derive(Serialize, Debug)]
pub struct LocalGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
pub struct LocalGenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Body posted to a user-supplied remote endpoint.
#[derive(Serialize, Debug)]
pub struct RemoteChatRequest {
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct RemoteChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}

/// One entry of an OpenAI-style `GET /models` listing.
#[derive(Deserialize, Debug)]
pub struct ModelInfo {
    pub id: String,
    pub created: Option<u64>,
    pub owned_by: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ModelsResponse {
    pub data: Vec<ModelInfo>,
}

/// One entry of an Ollama-style `GET /api/tags` listing.
#[derive(Deserialize, Debug)]
pub struct LocalModelTag {
    pub name: String,
    pub size: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct LocalTagsResponse {
    pub models: Vec<LocalModelTag>,
}

pub mod models;
