// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use super::LanguageModel;
use crate::config::LlmConfig;
use crate::error::{LLMError, LLMResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// OpenAI-compatible chat-completions client. One request per call, no
/// retries.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChatModel {
    pub fn new(api_key: String, config: &LlmConfig) -> LLMResult<Self> {
        if api_key.trim().is_empty() {
            return Err(LLMError::Configuration("API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LLMError::Configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Reads the key from the environment variable named in `config`.
    pub fn from_env(config: &LlmConfig) -> LLMResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            LLMError::Configuration(format!("{} is not set", config.api_key_env))
        })?;
        Self::new(api_key, config)
    }

    fn build_payload(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    fn parse_response(response_data: &Value) -> LLMResult<String> {
        response_data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                LLMError::Provider("Failed to extract content from chat response".to_string())
            })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn ask(&self, prompt: &str) -> LLMResult<String> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending chat completion");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_payload(prompt))
            .send()
            .await
            .map_err(|e| LLMError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LLMError::Provider(format!("API error {status}: {body}")));
        }

        let response_data: Value = response
            .json()
            .await
            .map_err(|e| LLMError::Serialisation(format!("Failed to parse response: {e}")))?;
        Self::parse_response(&response_data)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_model_settings() {
        let model = OpenAiChatModel::new("key".to_string(), &LlmConfig::default()).unwrap();
        let payload = model.build_payload("hello");
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][0]["content"], "hello");
        assert_eq!(payload["max_tokens"], 2000);
    }

    #[test]
    fn empty_key_is_a_configuration_error() {
        let err = OpenAiChatModel::new(" ".to_string(), &LlmConfig::default()).unwrap_err();
        assert!(matches!(err, LLMError::Configuration(_)));
    }

    #[test]
    fn missing_content_is_a_provider_error() {
        let err = OpenAiChatModel::parse_response(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, LLMError::Provider(_)));
    }
}
