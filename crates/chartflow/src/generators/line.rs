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
use crate::styling;
use serde_json::json;

/// Leading non-null values of a numeric column, plotted by position.
pub fn generate(policy: &ColumnPolicy<'_>, config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let column = policy.require("line", SemanticType::Numeric, &[])?;
    let values: Vec<f64> = column
        .numbers()
        .into_iter()
        .take(config.line_max_points)
        .collect();
    Ok(ChartDocument::new(
        vec![json!({
            "y": values,
            "type": "scatter",
            "mode": "lines+markers",
            "name": column.name(),
            "line": { "color": styling::PRIMARY, "width": 2 },
            "marker": { "size": 4 },
        })],
        json!({
            "title": format!("Trend of {}", column.name()),
            "xaxis": { "title": "Index" },
            "yaxis": { "title": column.name() },
        }),
    ))
}
