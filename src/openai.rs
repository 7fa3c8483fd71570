use crate::models::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use tracing::debug;

/// The single remote operation the orchestrator needs: system turn plus user
/// turn in, generated text out.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Generate for OpenAiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;
        debug!("Sent request to OpenAI");

        if !response.status().is_success() {
            let status = response.status();
            let body: ApiErrorResponse = response.json().await?;
            let error_msg = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(format!("OpenAI API error: {} - {}", status, error_msg).into());
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            return Err("No response from OpenAI".into());
        }

        Ok(content)
    }
}
