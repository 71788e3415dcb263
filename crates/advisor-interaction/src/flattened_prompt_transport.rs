//! FlattenedPromptTransport - single-prompt `generateText` adapter.
//!
//! Older text endpoints take one prompt string instead of a turn list, so the
//! history is flattened into role-marked blocks:
//!
//! ```text
//! SYSTEM:
//! <instruction>
//!
//! USER:
//! <text>
//!
//! ASSISTANT:
//! ```
//!
//! The trailing `ASSISTANT:` marker asks the model to continue as the
//! assistant. Grounding is not available on this endpoint and is ignored.

use advisor_core::config::ApiKey;
use advisor_core::{ChatRequest, TurnRole};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::post_json;
use crate::transport::{ChatTransport, RawOutputItem, RawReply, TransportError};

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta3/models";

#[derive(Clone)]
pub struct FlattenedPromptTransport {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl FlattenedPromptTransport {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

fn role_marker(role: TurnRole) -> &'static str {
    match role {
        TurnRole::Instruction => "SYSTEM",
        TurnRole::User => "USER",
        TurnRole::Assistant => "ASSISTANT",
    }
}

/// Flattens the request into one role-marked prompt.
pub fn flatten_prompt(request: &ChatRequest) -> String {
    let separate = request
        .system_instruction
        .as_deref()
        .map(|text| (TurnRole::Instruction, text));
    let history = request
        .history
        .iter()
        .map(|turn| (turn.role, turn.text.as_str()));

    let blocks: Vec<String> = separate
        .into_iter()
        .chain(history)
        .map(|(role, text)| format!("{}:\n{text}\n", role_marker(role)))
        .collect();

    format!("{}\nASSISTANT:\n", blocks.join("\n"))
}

#[async_trait]
impl ChatTransport for FlattenedPromptTransport {
    fn name(&self) -> &str {
        "flattened"
    }

    async fn send_conversation(&self, request: &ChatRequest) -> Result<RawReply, TransportError> {
        let body = GenerateTextRequest {
            prompt: TextPrompt {
                text: flatten_prompt(request),
            },
            temperature: request.generation.temperature,
            max_output_tokens: request.generation.max_output_tokens,
        };
        let url = format!("{}/{}:generateText", self.base_url, request.model);
        let parsed: GenerateTextResponse =
            post_json(&self.client, url, self.api_key.expose(), &body, "text").await?;

        Ok(parsed.into())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest {
    prompt: TextPrompt,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateTextResponse {
    #[serde(default)]
    candidates: Vec<TextCandidate>,
    #[serde(default)]
    filters: Vec<ContentFilter>,
}

#[derive(Debug, Deserialize)]
struct TextCandidate {
    output: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentFilter {
    reason: Option<String>,
}

impl From<GenerateTextResponse> for RawReply {
    fn from(response: GenerateTextResponse) -> Self {
        let output: Vec<RawOutputItem> = response
            .candidates
            .into_iter()
            .map(|candidate| RawOutputItem {
                content: candidate.output,
            })
            .collect();

        // Filters only withhold the answer when no candidate survived them.
        let block_reason = if output.is_empty() {
            response
                .filters
                .into_iter()
                .find_map(|filter| filter.reason)
        } else {
            None
        };

        RawReply {
            output,
            block_reason,
            ..RawReply::default()
        }
    }
}
