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
use crate::dataset::SemanticType;
use crate::document::ChartDocument;
use crate::error::ChartResult;
use crate::resolver::ColumnPolicy;
use crate::stats;
use crate::styling;
use serde_json::json;

const DONUT_HOLE: f64 = 0.4;

pub fn generate(policy: &ColumnPolicy<'_>, config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let column = policy.require("pie", SemanticType::Categorical, &[])?;
    let (labels, values): (Vec<String>, Vec<usize>) =
        stats::top_values(column, config.pie_top_n).into_iter().unzip();
    Ok(ChartDocument::new(
        vec![json!({
            "labels": labels,
            "values": values,
            "type": "pie",
            "hole": DONUT_HOLE,
            "marker": { "colors": styling::colors(config.pie_top_n) },
        })],
        json!({ "title": format!("{} Distribution", column.name()) }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::error::ChartError;
    use polars::prelude::*;

    #[test]
    fn slices_follow_frequency_order() {
        let df = df! { "category" => ["A", "B", "A", "C", "B", "B"] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = generate(&policy, &GenerationConfig::default()).unwrap();

        assert_eq!(doc.trace_types(), vec!["pie"]);
        assert_eq!(doc.data[0]["labels"], json!(["B", "A", "C"]));
        assert_eq!(doc.data[0]["values"], json!([3, 2, 1]));
        assert_eq!(doc.data[0]["hole"], 0.4);
        assert_eq!(doc.title(), Some("category Distribution"));
    }

    #[test]
    fn requires_a_categorical_column() {
        let df = df! { "n" => [1i64, 2] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let err = generate(&policy, &GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, ChartError::MissingSemanticColumn { .. }));
    }
}
