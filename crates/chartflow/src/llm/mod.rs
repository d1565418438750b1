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

#[cfg(feature = "openai")]
pub mod openai;

use crate::error::{LLMError, LLMResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "openai")]
pub use openai::OpenAiChatModel;

/// Single-shot text completion. No streaming and no conversation state.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn ask(&self, prompt: &str) -> LLMResult<String>;

    fn name(&self) -> &str;
}

/// Runs a model-bound future under a deadline, abandoning it early if
/// `cancel` fires.
pub async fn guarded<T, F>(future: F, timeout: Duration, cancel: &CancellationToken) -> LLMResult<T>
where
    F: Future<Output = LLMResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(LLMError::Cancelled),
        result = tokio::time::timeout(timeout, future) => {
            result.unwrap_or_else(|_| Err(LLMError::Timeout(timeout.as_secs())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_future_times_out() {
        let token = CancellationToken::new();
        let result: LLMResult<()> = guarded(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            Duration::from_millis(20),
            &token,
        )
        .await;
        assert!(matches!(result, Err(LLMError::Timeout(_))));
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let token = CancellationToken::new();
        token.cancel();
        let result = guarded(async { Ok(1) }, Duration::from_secs(1), &token).await;
        assert!(matches!(result, Err(LLMError::Cancelled)));
    }
}
