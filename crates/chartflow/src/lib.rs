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

pub mod analysis;
pub mod assisted;
pub mod classifier;
pub mod config;
pub mod context;
pub mod dataset;
pub mod document;
pub mod error;
pub mod generators;
pub mod llm;
pub mod pipeline;
pub mod resolver;
pub mod stats;
pub mod styling;

pub use classifier::{classify, ChartKind, Classification, RequestKind};
pub use config::{ChartflowConfig, GenerationConfig, LlmConfig};
pub use context::{context, describe, ColumnDescriptor, ColumnFacts, DatasetContext};
pub use dataset::{Dataset, DatasetColumn, SemanticType};
pub use document::ChartDocument;
pub use error::{
    ChartError, ChartResult, ChartflowError, ConfigError, DataError, DataResult, LLMError,
    LLMResult, Result,
};
pub use llm::LanguageModel;
#[cfg(feature = "openai")]
pub use llm::OpenAiChatModel;
pub use pipeline::{ChartOutcome, ChartPipeline, PipelineResponse, Strategy};
pub use resolver::{find_mentioned, suggest, ColumnPolicy};
