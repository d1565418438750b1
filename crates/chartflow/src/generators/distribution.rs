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

//! Single-variable distributions: histogram and box plot.

use crate::config::GenerationConfig;
use crate::dataset::SemanticType;
use crate::document::ChartDocument;
use crate::error::ChartResult;
use crate::resolver::ColumnPolicy;
use crate::stats;
use crate::styling;
use serde_json::{json, Value};

const BOX_COLORS: usize = 5;

pub fn histogram(policy: &ColumnPolicy<'_>, config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let column = policy.require("histogram", SemanticType::Numeric, &[])?;
    Ok(ChartDocument::new(
        vec![json!({
            "x": column.numbers(),
            "type": "histogram",
            "marker": {
                "color": styling::PRIMARY,
                "line": { "color": "#fff", "width": 1 },
            },
            "nbinsx": config.histogram_bins,
        })],
        json!({
            "title": format!("Distribution of {}", column.name()),
            "xaxis": { "title": column.name() },
            "yaxis": { "title": "Frequency" },
            "bargap": 0.05,
        }),
    ))
}

/// Numeric distribution, split by the first few distinct values of a
/// categorical column when the dataset has one.
pub fn box_plot(policy: &ColumnPolicy<'_>, config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let y = policy.require("box", SemanticType::Numeric, &[])?;
    let split = policy.pick(SemanticType::Categorical, &[]);

    let groups: Vec<String> = split
        .map(|x| {
            let mut groups = stats::distinct_in_order(x);
            groups.truncate(config.box_max_groups);
            groups
        })
        .unwrap_or_default();

    let (traces, title) = match split {
        Some(x) if !groups.is_empty() => {
            let traces: Vec<Value> = groups
                .iter()
                .enumerate()
                .map(|(i, group)| {
                    let values: Vec<f64> = (0..y.len())
                        .filter(|&row| x.label_at(row).as_deref() == Some(group.as_str()))
                        .filter_map(|row| y.number_at(row))
                        .collect();
                    json!({
                        "y": values,
                        "type": "box",
                        "name": group,
                        "marker": { "color": styling::color(i, BOX_COLORS) },
                    })
                })
                .collect();
            (traces, format!("Distribution of {} by {}", y.name(), x.name()))
        }
        _ => (
            vec![json!({
                "y": y.numbers(),
                "type": "box",
                "marker": { "color": styling::PRIMARY },
            })],
            format!("Distribution of {}", y.name()),
        ),
    };

    Ok(ChartDocument::new(
        traces,
        json!({
            "title": title,
            "yaxis": { "title": y.name() },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use polars::prelude::*;

    #[test]
    fn histogram_passes_non_null_values_and_bin_count() {
        let df = df! { "age" => [Some(30.0), None, Some(41.0)] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = histogram(&policy, &GenerationConfig::default()).unwrap();
        assert_eq!(doc.data[0]["x"], json!([30.0, 41.0]));
        assert_eq!(doc.data[0]["nbinsx"], 30);
        assert_eq!(doc.title(), Some("Distribution of age"));
    }

    #[test]
    fn box_splits_by_first_distinct_categories() {
        let df = df! {
            "team" => ["a", "b", "c", "d", "e", "f", "a"],
            "score" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0), None],
        }
        .unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = box_plot(&policy, &GenerationConfig::default()).unwrap();

        assert_eq!(doc.trace_count(), 5);
        assert_eq!(doc.data[0]["name"], "a");
        assert_eq!(doc.data[0]["y"], json!([1.0]));
        assert_eq!(doc.title(), Some("Distribution of score by team"));
    }

    #[test]
    fn box_without_categories_is_a_single_box() {
        let df = df! { "score" => [1.0, 2.0, 3.0] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = box_plot(&policy, &GenerationConfig::default()).unwrap();
        assert_eq!(doc.trace_count(), 1);
        assert_eq!(doc.title(), Some("Distribution of score"));
    }
}
