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

//! Dataset summaries handed to the language model and to callers.

use crate::dataset::{format_number, parse_datetime, ColumnValues, Dataset, DatasetColumn, SemanticType};
use crate::stats;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const TOP_VALUE_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnFacts {
    Numeric {
        min: f64,
        max: f64,
        mean: f64,
    },
    Categorical {
        unique_count: usize,
        top_values: Vec<String>,
    },
    Datetime {
        min: Option<String>,
        max: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub semantic: SemanticType,
    pub non_null_count: usize,
    pub facts: ColumnFacts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetContext {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnDescriptor>,
}

pub fn describe(dataset: &Dataset) -> DatasetContext {
    let columns = dataset
        .columns()
        .par_iter()
        .map(describe_column)
        .collect();
    DatasetContext {
        row_count: dataset.row_count(),
        column_count: dataset.column_count(),
        columns,
    }
}

pub fn describe_column(column: &DatasetColumn) -> ColumnDescriptor {
    let facts = match column.semantic() {
        SemanticType::Numeric => {
            let numbers = column.numbers();
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            match stats::mean(&numbers) {
                Some(mean) => ColumnFacts::Numeric { min, max, mean },
                None => ColumnFacts::Numeric {
                    min: 0.0,
                    max: 0.0,
                    mean: 0.0,
                },
            }
        }
        SemanticType::Categorical => {
            let counts = stats::value_counts(column.labels());
            ColumnFacts::Categorical {
                unique_count: counts.len(),
                top_values: counts
                    .into_iter()
                    .take(TOP_VALUE_COUNT)
                    .map(|(value, _)| value)
                    .collect(),
            }
        }
        SemanticType::Datetime => {
            let (min, max) = datetime_range(column);
            ColumnFacts::Datetime { min, max }
        }
    };
    ColumnDescriptor {
        name: column.name().to_string(),
        semantic: column.semantic(),
        non_null_count: column.non_null_count(),
        facts,
    }
}

fn datetime_range(column: &DatasetColumn) -> (Option<String>, Option<String>) {
    let ColumnValues::Text(values) = column.values() else {
        return (None, None);
    };
    let mut parsed: Vec<(chrono::NaiveDateTime, &str)> = values
        .iter()
        .flatten()
        .filter_map(|raw| parse_datetime(raw).map(|dt| (dt, raw.as_str())))
        .collect();
    if parsed.is_empty() {
        let mut raw: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
        raw.sort_unstable();
        return (
            raw.first().map(|s| s.to_string()),
            raw.last().map(|s| s.to_string()),
        );
    }
    parsed.sort_by_key(|(dt, _)| *dt);
    (
        parsed.first().map(|(_, raw)| raw.to_string()),
        parsed.last().map(|(_, raw)| raw.to_string()),
    )
}

impl DatasetContext {
    pub fn render(&self) -> String {
        let mut parts = vec![
            "DATASET INFO:".to_string(),
            format!("- Total rows: {}", self.row_count),
            format!("- Total columns: {}", self.column_count),
            String::new(),
            "AVAILABLE COLUMNS:".to_string(),
        ];
        if self.columns.is_empty() {
            parts.push("(none)".to_string());
        }
        for column in &self.columns {
            parts.push(format!("\n• {}:", column.name));
            parts.push(format!("  Type: {}", column.semantic));
            parts.push(format!(
                "  Non-null: {}/{}",
                column.non_null_count, self.row_count
            ));
            match &column.facts {
                ColumnFacts::Numeric { min, max, mean } => {
                    parts.push(format!(
                        "  Range: {} to {}",
                        format_number(*min),
                        format_number(*max)
                    ));
                    parts.push(format!("  Mean: {mean:.2}"));
                }
                ColumnFacts::Categorical {
                    unique_count,
                    top_values,
                } => {
                    parts.push(format!("  Unique values: {unique_count}"));
                    parts.push(format!("  Top values: {}", top_values.join(", ")));
                }
                ColumnFacts::Datetime { min, max } => {
                    parts.push(format!(
                        "  Date range: {} to {}",
                        min.as_deref().unwrap_or("N/A"),
                        max.as_deref().unwrap_or("N/A")
                    ));
                }
            }
        }
        parts.join("\n")
    }

    pub fn columns_of(&self, semantic: SemanticType) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(move |c| c.semantic == semantic)
    }
}

impl std::fmt::Display for DatasetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Text block describing `dataset`, as embedded in model prompts.
pub fn context(dataset: &Dataset) -> String {
    describe(dataset).render()
}
