use crate::config::Config;
use crate::gateway::TextGenerator;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Text generator backed by an OpenAI-compatible chat completions endpoint.
///
/// Each prompt is sent as a single user message. One request per call, no
/// retry: any transport, status or parse failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
            max_tokens: config.openai_max_tokens,
        }
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_completion_tokens: if is_reasoning {
                16000
            } else {
                self.max_tokens
            },
            temperature: if is_reasoning {
                None
            } else {
                Some(self.temperature)
            },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        debug!("Sending {} chars to {}", prompt.chars().count(), self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("OpenAI response contained no choices")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn create_test_config(api_url: &str) -> Config {
        Config {
            openai_api_key: "test-openai-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: api_url.to_string(),
            openai_temperature: 0.3,
            openai_max_tokens: 4096,
            source_dir: PathBuf::from("posts"),
            output_root: PathBuf::from("docs"),
            ledger_path: PathBuf::from("processed_list.txt"),
            max_chunk_length: 1800,
            dry_run: false,
        }
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn generator_for(server: &MockServer) -> OpenAiGenerator {
        let config = create_test_config(&format!("{}/v1/chat/completions", server.uri()));
        OpenAiGenerator::new(reqwest::Client::new(), &config)
    }

    // ==================== Request Structure Tests ====================

    #[test]
    fn test_request_serialization() {
        let generator =
            OpenAiGenerator::new(reqwest::Client::new(), &create_test_config("http://x"));
        let request = generator.build_request("Translate this");

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("0.3"));
        assert!(json.contains("max_completion_tokens"));
        assert!(json.contains("4096"));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("Translate this"));
        // reasoning_effort should not be serialized when None
        assert!(!json.contains("reasoning_effort"));
    }

    #[test]
    fn test_request_serialization_reasoning_model() {
        let mut config = create_test_config("http://x");
        config.openai_model = "gpt-5-mini".to_string();
        let generator = OpenAiGenerator::new(reqwest::Client::new(), &config);

        let json = serde_json::to_string(&generator.build_request("Test")).expect("Should serialize");
        assert!(json.contains("16000"));
        assert!(json.contains("reasoning_effort"));
        // temperature should not be serialized when None
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("gpt-5"));
        assert!(is_reasoning_model("o1-mini"));
        assert!(is_reasoning_model("o3"));
        assert!(is_reasoning_model("o4-mini"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
        assert!(!is_reasoning_model("gpt-3.5-turbo"));
    }

    // ==================== ChatResponse Deserialization Tests ====================

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "Hola"}}]}"#;

        let response: ChatResponse = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content, "Hola");
    }

    // ==================== generate Tests with Wiremock ====================

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("Hola mundo")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = generator_for(&mock_server)
            .generate("Translate the following text into Spanish")
            .await
            .expect("Should succeed");

        assert_eq!(result, "Hola mundo");
    }

    #[tokio::test]
    async fn test_generate_api_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1) // Single-shot: no retries
            .mount(&mock_server)
            .await;

        let result = generator_for(&mock_server).generate("Test").await;

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("500"), "Error should mention 500: {}", err);
    }

    #[tokio::test]
    async fn test_generate_rate_limited_fails_immediately() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string(r#"{"error": {"message": "Rate limit"}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = generator_for(&mock_server).generate("Test").await;

        assert!(result.unwrap_err().to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_generate_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let result = generator_for(&mock_server).generate("Test").await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = generator_for(&mock_server).generate("Test").await;

        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }
}
