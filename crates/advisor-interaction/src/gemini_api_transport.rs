//! GeminiApiTransport - multi-turn `generateContent` adapter.
//!
//! Sends the history as `contents` with `user`/`model` roles. Under the
//! separate-field convention the instruction travels as `systemInstruction`;
//! under the inline convention it is the first `user` content. The credential
//! goes in the `x-goog-api-key` header, never in the URL.

use advisor_core::config::ApiKey;
use advisor_core::{ChatRequest, TurnRole};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::post_json;
use crate::transport::{ChatTransport, RawCandidate, RawOutputItem, RawReply, TransportError};

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Transport that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiTransport {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl GeminiApiTransport {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the transport at another endpoint root (e.g. a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<RawReply, TransportError> {
        let url = format!("{}/{model}:generateContent", self.base_url);
        let parsed: GenerateContentResponse =
            post_json(&self.client, url, self.api_key.expose(), body, "Gemini").await?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl ChatTransport for GeminiApiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send_conversation(&self, request: &ChatRequest) -> Result<RawReply, TransportError> {
        let body = GenerateContentRequest::from(request);
        self.send_request(&request.model, &body).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfigBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

fn wire_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::Assistant => "model",
        TurnRole::User | TurnRole::Instruction => "user",
    }
}

impl From<&ChatRequest> for GenerateContentRequest {
    fn from(request: &ChatRequest) -> Self {
        let contents = request
            .history
            .iter()
            .map(|turn| Content {
                role: Some(wire_role(turn.role)),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part { text: text.clone() }],
        });

        let tools = if request.grounding {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents,
            system_instruction,
            generation_config: GenerationConfigBody {
                max_output_tokens: request.generation.max_output_tokens,
                temperature: request.generation.temperature,
            },
            tools,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    text: Option<String>,
    candidates: Option<Vec<Candidate>>,
    output: Option<Vec<OutputItem>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OutputItem {
    Plain(String),
    Structured { content: Option<String> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl From<GenerateContentResponse> for RawReply {
    fn from(response: GenerateContentResponse) -> Self {
        let candidates = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .map(|candidate| RawCandidate {
                finish_reason: candidate.finish_reason,
                fragments: candidate
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .map(|part| part.text.unwrap_or_default())
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        let output = response
            .output
            .unwrap_or_default()
            .into_iter()
            .map(|item| RawOutputItem {
                content: match item {
                    OutputItem::Plain(text) => Some(text),
                    OutputItem::Structured { content } => content,
                },
            })
            .collect();

        RawReply {
            text: response.text,
            candidates,
            output,
            block_reason: response.prompt_feedback.and_then(|feedback| feedback.block_reason),
        }
    }
}
