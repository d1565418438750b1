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

use crate::dataset::SemanticType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartflowError {
    #[error("Dataset error: {0}")]
    Data(#[from] DataError),
    #[error("Chart generation error: {0}")]
    Chart(#[from] ChartError),
    #[error("Language model error: {0}")]
    Llm(#[from] LLMError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read data file '{path}': {source}")]
    DataFileError {
        path: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Failed to read column '{column}': {source}")]
    ColumnReadError {
        column: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("Unsupported data format: {format}")]
    UnsupportedFormat { format: String },
    #[error("Empty dataset provided")]
    EmptyDataset,
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Column not found: {column}. Available columns: {available}")]
    ColumnNotFound { column: String, available: String },
    #[error("No {semantic} column available for '{chart}'")]
    MissingSemanticColumn {
        chart: String,
        semantic: SemanticType,
    },
    #[error("Dataset has no rows or no columns to chart")]
    EmptyDataset,
    #[error("Chart serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Serialisation error: {0}")]
    Serialisation(String),
    #[error("Timeout error after {0}s")]
    Timeout(u64),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Invalid chart response: {0}")]
    InvalidChart(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    FileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML configuration: {0}")]
    YamlParseError(#[from] serde_yaml::Error),
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}

pub type Result<T> = std::result::Result<T, ChartflowError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ChartResult<T> = std::result::Result<T, ChartError>;
pub type LLMResult<T> = std::result::Result<T, LLMError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl ChartflowError {
    pub fn category(&self) -> &'static str {
        match self {
            ChartflowError::Data(_) => "Data",
            ChartflowError::Chart(_) => "Chart",
            ChartflowError::Llm(_) => "LLM",
            ChartflowError::Config(_) => "Configuration",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            ChartflowError::Chart(e) => e.is_recoverable(),
            ChartflowError::Llm(e) => e.is_recoverable(),
            ChartflowError::Data(_) | ChartflowError::Config(_) => false,
        }
    }
}

impl ChartError {
    /// Errors a lower-information chart can still answer.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ChartError::EmptyDataset)
    }

    pub fn is_column_resolution(&self) -> bool {
        matches!(
            self,
            ChartError::ColumnNotFound { .. } | ChartError::MissingSemanticColumn { .. }
        )
    }
}

impl LLMError {
    /// Every model failure routes to the deterministic generators, but only
    /// transient ones are worth a later retry by a caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LLMError::Network(_) | LLMError::Timeout(_) | LLMError::Provider(_)
        )
    }
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        LLMError::Serialisation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_the_wrapped_error() {
        let err: ChartflowError = ChartError::EmptyDataset.into();
        assert_eq!(err.category(), "Chart");
        assert!(!err.is_recoverable());

        let err: ChartflowError = LLMError::Timeout(30).into();
        assert_eq!(err.category(), "LLM");
        assert!(err.is_recoverable());
    }

    #[test]
    fn column_not_found_message_lists_available_columns() {
        let err = ChartError::ColumnNotFound {
            column: "revenue".to_string(),
            available: "region, units".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Column not found: revenue. Available columns: region, units"
        );
        assert!(err.is_column_resolution());
    }
}
