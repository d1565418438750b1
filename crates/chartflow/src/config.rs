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

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChartflowConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_bar_top_n")]
    pub bar_top_n: usize,
    #[serde(default = "default_pie_top_n")]
    pub pie_top_n: usize,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_scatter_sample_limit")]
    pub scatter_sample_limit: usize,
    #[serde(default = "default_line_max_points")]
    pub line_max_points: usize,
    #[serde(default = "default_box_max_groups")]
    pub box_max_groups: usize,
    #[serde(default = "default_fallback_top_n")]
    pub fallback_top_n: usize,
    #[serde(default)]
    pub sample_seed: Option<u64>,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_timeout_seconds() -> u64 {
    30
}
fn default_bar_top_n() -> usize {
    10
}
fn default_pie_top_n() -> usize {
    8
}
fn default_histogram_bins() -> usize {
    30
}
fn default_scatter_sample_limit() -> usize {
    1000
}
fn default_line_max_points() -> usize {
    100
}
fn default_box_max_groups() -> usize {
    5
}
fn default_fallback_top_n() -> usize {
    5
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            bar_top_n: default_bar_top_n(),
            pie_top_n: default_pie_top_n(),
            histogram_bins: default_histogram_bins(),
            scatter_sample_limit: default_scatter_sample_limit(),
            line_max_points: default_line_max_points(),
            box_max_groups: default_box_max_groups(),
            fallback_top_n: default_fallback_top_n(),
            sample_seed: None,
        }
    }
}

impl ChartflowConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // An empty document deserialises to unit, not to an empty mapping.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let g = &self.generation;
        let limits = [
            ("generation.bar_top_n", g.bar_top_n),
            ("generation.pie_top_n", g.pie_top_n),
            ("generation.histogram_bins", g.histogram_bins),
            ("generation.scatter_sample_limit", g.scatter_sample_limit),
            ("generation.line_max_points", g.line_max_points),
            ("generation.box_max_groups", g.box_max_groups),
            ("generation.fallback_top_n", g.fallback_top_n),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ValidationFailed {
                reason: format!("{name} must be greater than zero"),
            });
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "llm.timeout_seconds must be greater than zero".to_string(),
            });
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "llm.max_tokens must be greater than zero".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "llm.temperature must be within 0.0..=2.0, got {}",
                    self.llm.temperature
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ChartflowConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ChartflowConfig::default());
        assert_eq!(config.llm.timeout_seconds, 30);
        assert_eq!(config.generation.scatter_sample_limit, 1000);
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let config = ChartflowConfig::from_yaml_str(
            "llm:\n  model: local-model\ngeneration:\n  pie_top_n: 6\n  sample_seed: 7\n",
        )
        .unwrap();
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.generation.pie_top_n, 6);
        assert_eq!(config.generation.bar_top_n, 10);
        assert_eq!(config.generation.sample_seed, Some(7));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = ChartflowConfig::from_yaml_str("generation:\n  histogram_bins: 0\n").unwrap_err();
        assert!(err.to_string().contains("generation.histogram_bins"));

        let err = ChartflowConfig::from_yaml_str("llm:\n  timeout_seconds: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chartflow.yml");
        std::fs::write(&path, "llm:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(ChartflowConfig::from_file(&path).unwrap().llm.timeout_seconds, 5);

        let missing = ChartflowConfig::from_file(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(missing, ConfigError::FileError { .. }));
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let sample = include_str!("../../../config/chartflow.yml");
        assert_eq!(
            ChartflowConfig::from_yaml_str(sample).unwrap(),
            ChartflowConfig::default()
        );
    }
}
