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
use crate::error::{ChartError, ChartResult};
use crate::resolver::ColumnPolicy;
use crate::stats;
use serde_json::json;

/// Pearson correlation matrix over every numeric column. Undefined
/// correlations are emitted as `null`.
pub fn generate(policy: &ColumnPolicy<'_>, _config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let numeric: Vec<&DatasetColumn> = policy
        .dataset()
        .columns_of(SemanticType::Numeric)
        .collect();
    if numeric.len() < 2 {
        return Err(ChartError::MissingSemanticColumn {
            chart: "heatmap".to_string(),
            semantic: SemanticType::Numeric,
        });
    }
    let names: Vec<&str> = numeric.iter().map(|c| c.name()).collect();
    let z = stats::correlation_matrix(&numeric);
    Ok(ChartDocument::new(
        vec![json!({
            "z": z,
            "x": names,
            "y": names,
            "type": "heatmap",
            "colorscale": "RdBu",
            "zmid": 0,
        })],
        json!({ "title": "Correlation Matrix" }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use polars::prelude::*;

    #[test]
    fn matrix_is_square_with_unit_diagonal() {
        let df = df! {
            "a" => [1.0, 2.0, 3.0, 4.0],
            "b" => [2.0, 4.0, 6.0, 8.0],
            "c" => [4.0, 3.0, 2.0, 1.0],
        }
        .unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        let doc = generate(&policy, &GenerationConfig::default()).unwrap();

        assert_eq!(doc.data[0]["x"], json!(["a", "b", "c"]));
        assert_eq!(
            doc.data[0]["z"],
            json!([[1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, -1.0, 1.0]])
        );
    }

    #[test]
    fn needs_two_numeric_columns() {
        let df = df! { "a" => [1.0, 2.0], "c" => ["x", "y"] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let policy = ColumnPolicy::new(&dataset, &[]).unwrap();
        assert!(generate(&policy, &GenerationConfig::default()).is_err());
    }
}
