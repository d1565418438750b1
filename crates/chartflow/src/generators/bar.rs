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

use crate::config::GenerationConfig;
use crate::dataset::{DatasetColumn, SemanticType};
use crate::document::ChartDocument;
use crate::error::ChartResult;
use crate::resolver::ColumnPolicy;
use crate::stats;
use crate::styling;
use serde_json::json;

/// Category counts of the chosen categorical column. With no categorical
/// column at all, counts the first available column whatever its type.
pub fn generate(policy: &ColumnPolicy<'_>, config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let column = match policy.pick(SemanticType::Categorical, &[]) {
        Some(column) => column,
        None => policy.any_column()?,
    };
    Ok(count_bar(column, config.bar_top_n))
}

pub fn count_bar(column: &DatasetColumn, limit: usize) -> ChartDocument {
    let (labels, counts): (Vec<String>, Vec<usize>) =
        stats::top_values(column, limit).into_iter().unzip();
    let colors = styling::colors(labels.len());
    ChartDocument::new(
        vec![json!({
            "x": labels,
            "y": counts,
            "type": "bar",
            "marker": { "color": colors },
        })],
        json!({
            "title": format!("Count of {}", column.name()),
            "xaxis": { "title": column.name() },
            "yaxis": { "title": "Count" },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use polars::prelude::*;

    #[test]
    fn counts_top_categories_with_palette_colours() {
        let df = df! {
            "units" => [1i64, 2, 3, 4],
            "shop" => ["x", "y", "x", "x"],
        }
        .unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = generate(&policy, &GenerationConfig::default()).unwrap();

        assert_eq!(doc.title(), Some("Count of shop"));
        assert_eq!(doc.data[0]["x"], json!(["x", "y"]));
        assert_eq!(doc.data[0]["y"], json!([3, 1]));
        assert_eq!(doc.data[0]["marker"]["color"], json!(["#8b5cf6", "#3b82f6"]));
    }

    #[test]
    fn limits_to_top_n() {
        let labels: Vec<String> = (0..15).map(|i| format!("c{i}")).collect();
        let df = df! { "c" => labels }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = generate(&policy, &GenerationConfig::default()).unwrap();
        assert_eq!(doc.data[0]["x"].as_array().unwrap().len(), 10);
    }
}
