//! HTTP client for the hosted assistant service.
//!
//! This module provides a blocking client for the OpenAI-style threads, runs,
//! messages and chat completions endpoints.

use super::{AssistantService, Message, Role, Run};
use crate::constants::{ASSISTANTS_BETA_HEADER, HTTP_REQUEST_TIMEOUT_SECS};
use crate::errors::{AIError, AppResult};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Request body for adding a message to a thread.
#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for starting a run.
#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_instructions: Option<&'a str>,
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Any object that only needs its id read back.
#[derive(Debug, Deserialize)]
struct ObjectId {
    id: String,
}

/// Response from listing the messages of a thread.
#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for interacting with the hosted assistant API.
pub struct OpenAIClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAIClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API including the version segment
    ///   (e.g., "https://api.openai.com/v1"); a trailing slash is ignored
    /// * `api_key` - Secret used as bearer token
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(AIError::Http)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
    }

    /// Sends a request and decodes a successful JSON body.
    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> AppResult<T> {
        let response = self
            .authorized(request)
            .send()
            .map_err(AIError::Http)?;

        let response = Self::check_status(response)?;

        response.json::<T>().map_err(|e| {
            AIError::InvalidResponse(format!("Failed to parse {} response: {}", what, e)).into()
        })
    }

    fn check_status(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            return Err(AIError::Unauthorized.into());
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);

        Err(AIError::Api {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

impl AssistantService for OpenAIClient {
    fn create_thread(&self) -> AppResult<String> {
        debug!("Creating conversation thread");
        let thread: ObjectId = self.send(
            self.client
                .post(self.url("threads"))
                .json(&serde_json::json!({})),
            "thread",
        )?;
        debug!("Created thread {}", thread.id);
        Ok(thread.id)
    }

    fn add_message(&self, thread_id: &str, role: Role, content: &str) -> AppResult<()> {
        // Threads only accept user and assistant messages.
        let role = match role {
            Role::Assistant => Role::Assistant,
            Role::User | Role::System => Role::User,
        };
        debug!("Adding {} message to thread {}", role, thread_id);

        let request = CreateMessageRequest {
            role: role.as_str(),
            content,
        };
        let _: ObjectId = self.send(
            self.client
                .post(self.url(&format!("threads/{}/messages", thread_id)))
                .json(&request),
            "message",
        )?;
        Ok(())
    }

    fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        additional_instructions: Option<&str>,
    ) -> AppResult<Run> {
        debug!(
            "Starting run of assistant {} on thread {}",
            assistant_id, thread_id
        );
        let request = CreateRunRequest {
            assistant_id,
            additional_instructions,
        };
        self.send(
            self.client
                .post(self.url(&format!("threads/{}/runs", thread_id)))
                .json(&request),
            "run",
        )
    }

    fn retrieve_run(&self, thread_id: &str, run_id: &str) -> AppResult<Run> {
        self.send(
            self.client
                .get(self.url(&format!("threads/{}/runs/{}", thread_id, run_id))),
            "run",
        )
    }

    fn latest_message(&self, thread_id: &str) -> AppResult<String> {
        let list: MessageList = self.send(
            self.client
                .get(self.url(&format!("threads/{}/messages", thread_id)))
                .query(&[("order", "desc"), ("limit", "1")]),
            "message list",
        )?;

        let message = list.data.into_iter().next().ok_or_else(|| {
            AIError::InvalidResponse(format!("Thread {} has no messages", thread_id))
        })?;

        let text = message
            .content
            .into_iter()
            .filter_map(|part| part.text.map(|t| t.value))
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(AIError::InvalidResponse(format!(
                "Latest message in thread {} has no text content",
                thread_id
            ))
            .into());
        }

        Ok(text)
    }

    fn chat_completion(&self, model: &str, messages: &[Message]) -> AppResult<String> {
        debug!("Sending chat completion request with model: {}", model);
        let request = ChatRequest { model, messages };

        let response: ChatResponse = self.send(
            self.client
                .post(self.url("chat/completions"))
                .json(&request),
            "chat completion",
        )?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AIError::InvalidResponse("Chat completion returned no content".to_string()).into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = OpenAIClient::new("http://localhost:8080/v1/", "sk-test").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.url("threads"), "http://localhost:8080/v1/threads");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = OpenAIClient::new("http://localhost:8080/v1", "sk-secret-value").unwrap();
        let debug_output = format!("{:?}", client);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-secret-value"));
    }

    #[test]
    fn test_run_request_omits_missing_instructions() {
        let request = CreateRunRequest {
            assistant_id: "asst_1",
            additional_instructions: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"assistant_id": "asst_1"}));
    }

    #[test]
    fn test_message_list_parses_text_parts() {
        let body = r#"{
            "object": "list",
            "data": [{
                "id": "msg_1",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": {"value": "What is your age?", "annotations": []}},
                    {"type": "image_file", "image_file": {"file_id": "file_1"}}
                ]
            }]
        }"#;
        let list: MessageList = serde_json::from_str(body).unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(
            list.data[0].content[0].text.as_ref().unwrap().value,
            "What is your age?"
        );
        assert!(list.data[0].content[1].text.is_none());
    }
}
