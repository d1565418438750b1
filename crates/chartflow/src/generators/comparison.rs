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

//! Cross-tabulated bar charts comparing two categorical columns.

use crate::config::GenerationConfig;
use crate::dataset::SemanticType;
use crate::document::ChartDocument;
use crate::error::{ChartError, ChartResult};
use crate::resolver::ColumnPolicy;
use crate::stats;
use crate::styling;
use serde_json::{json, Value};

const SERIES_COLORS: usize = 6;

/// Counts of column A within each value of column B, bars laid out
/// horizontally. A single categorical column gives a plain horizontal
/// count chart.
pub fn horizontal_bar(
    policy: &ColumnPolicy<'_>,
    config: &GenerationConfig,
) -> ChartResult<ChartDocument> {
    let first = policy.pick(SemanticType::Categorical, &[]);
    let second = first.and_then(|a| policy.pick(SemanticType::Categorical, &[a.name()]));

    if let (Some(a), Some(b)) = (first, second) {
        let tab = stats::crosstab(a, b);
        let traces: Vec<Value> = tab
            .series
            .iter()
            .zip(&tab.counts)
            .enumerate()
            .map(|(i, (name, counts))| {
                json!({
                    "x": counts,
                    "y": tab.rows,
                    "type": "bar",
                    "orientation": "h",
                    "name": name,
                    "marker": { "color": styling::color(i, SERIES_COLORS) },
                })
            })
            .collect();
        if !traces.is_empty() {
            return Ok(ChartDocument::new(
                traces,
                json!({
                    "title": format!("{} Distribution by {}", a.name(), b.name()),
                    "barmode": "group",
                    "xaxis": { "title": "Count" },
                    "yaxis": { "title": a.name() },
                    "showlegend": true,
                }),
            ));
        }
    }

    let column = match first {
        Some(column) => column,
        None => policy.any_column()?,
    };
    let (labels, counts): (Vec<String>, Vec<usize>) =
        stats::top_values(column, config.bar_top_n).into_iter().unzip();
    Ok(ChartDocument::new(
        vec![json!({
            "x": counts,
            "y": labels,
            "type": "bar",
            "orientation": "h",
            "marker": { "color": styling::PRIMARY },
        })],
        json!({
            "title": format!("Distribution of {}", column.name()),
            "xaxis": { "title": "Count" },
            "yaxis": { "title": column.name() },
        }),
    ))
}

/// Rows are the first column's values; one trace per value of the second.
pub fn grouped_bar(
    policy: &ColumnPolicy<'_>,
    _config: &GenerationConfig,
) -> ChartResult<ChartDocument> {
    let pair = policy.pick_many(SemanticType::Categorical, 2);
    let &[rows, series] = &pair[..] else {
        return Err(ChartError::MissingSemanticColumn {
            chart: "grouped_bar".to_string(),
            semantic: SemanticType::Categorical,
        });
    };
    let tab = stats::crosstab(rows, series);
    if tab.series.is_empty() {
        return Err(ChartError::MissingSemanticColumn {
            chart: "grouped_bar".to_string(),
            semantic: SemanticType::Categorical,
        });
    }
    let traces: Vec<Value> = tab
        .series
        .iter()
        .zip(&tab.counts)
        .enumerate()
        .map(|(i, (name, counts))| {
            json!({
                "x": tab.rows,
                "y": counts,
                "type": "bar",
                "name": name,
                "marker": { "color": styling::color(i, SERIES_COLORS) },
            })
        })
        .collect();
    Ok(ChartDocument::new(
        traces,
        json!({
            "title": format!("{} by {}", series.name(), rows.name()),
            "barmode": "group",
            "xaxis": { "title": rows.name() },
            "yaxis": { "title": "Count" },
            "showlegend": true,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use polars::prelude::*;

    fn survey() -> Dataset {
        let df = df! {
            "region" => ["n", "s", "n", "s", "n"],
            "tier" => ["gold", "gold", "basic", "basic", "gold"],
            "spend" => [1.0, 2.0, 3.0, 4.0, 5.0],
        }
        .unwrap();
        Dataset::from_frame(&df).unwrap()
    }

    #[test]
    fn grouped_bar_emits_one_trace_per_series_value() {
        let dataset = survey();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = grouped_bar(&policy, &GenerationConfig::default()).unwrap();

        assert_eq!(doc.trace_count(), 2);
        assert_eq!(doc.layout["barmode"], "group");
        assert_eq!(doc.title(), Some("tier by region"));
        assert_eq!(doc.data[0]["name"], "basic");
        assert_eq!(doc.data[0]["x"], json!(["n", "s"]));
        assert_eq!(doc.data[0]["y"], json!([1, 1]));
        assert_eq!(doc.data[1]["y"], json!([2, 1]));
    }

    #[test]
    fn grouped_bar_needs_two_categorical_columns() {
        let df = df! { "region" => ["n", "s"], "spend" => [1.0, 2.0] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let err = grouped_bar(&policy, &GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, ChartError::MissingSemanticColumn { .. }));
    }

    #[test]
    fn horizontal_bar_compares_two_columns() {
        let dataset = survey();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = horizontal_bar(&policy, &GenerationConfig::default()).unwrap();
        assert_eq!(doc.trace_count(), 2);
        assert_eq!(doc.data[0]["orientation"], "h");
        assert_eq!(doc.data[0]["y"], json!(["n", "s"]));
        assert_eq!(doc.title(), Some("region Distribution by tier"));
    }

    #[test]
    fn horizontal_bar_with_one_categorical_column_is_transposed_count() {
        let df = df! { "region" => ["n", "s", "s"], "spend" => [1.0, 2.0, 3.0] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = horizontal_bar(&policy, &GenerationConfig::default()).unwrap();
        assert_eq!(doc.trace_count(), 1);
        assert_eq!(doc.data[0]["x"], json!([2, 1]));
        assert_eq!(doc.data[0]["y"], json!(["s", "n"]));
        assert_eq!(doc.title(), Some("Distribution of region"));
    }
}
