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
use crate::error::{ChartError, ChartResult};
use crate::resolver::ColumnPolicy;
use crate::stats;
use crate::styling;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::debug;

/// Point cloud of two numeric columns with a least-squares trend line.
///
/// Pairs with a null on either side are dropped. Above
/// `scatter_sample_limit` pairs a uniform sample is plotted, and the trend
/// is fitted on that same sample.
pub fn generate(policy: &ColumnPolicy<'_>, config: &GenerationConfig) -> ChartResult<ChartDocument> {
    let pair = policy.pick_many(SemanticType::Numeric, 2);
    let Some(&x) = pair.first() else {
        return Err(ChartError::MissingSemanticColumn {
            chart: "scatter".to_string(),
            semantic: SemanticType::Numeric,
        });
    };
    let y = pair.get(1).copied().unwrap_or(x);

    let paired = stats::paired_numbers(x, y);
    let points = sample(paired, config.scatter_sample_limit, config.sample_seed);
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();

    let mut traces = vec![json!({
        "x": xs,
        "y": ys,
        "type": "scatter",
        "mode": "markers",
        "name": "Data",
        "marker": { "color": styling::PRIMARY, "size": 8, "opacity": 0.6 },
    })];

    if let Some((slope, intercept)) = stats::linear_fit(&points) {
        let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        traces.push(json!({
            "x": [x_min, x_max],
            "y": [slope * x_min + intercept, slope * x_max + intercept],
            "type": "scatter",
            "mode": "lines",
            "name": "Trend",
            "line": { "color": styling::TREND, "width": 2, "dash": "dash" },
        }));
    }

    Ok(ChartDocument::new(
        traces,
        json!({
            "title": format!("{} vs {}", y.name(), x.name()),
            "xaxis": { "title": x.name() },
            "yaxis": { "title": y.name() },
            "showlegend": true,
        }),
    ))
}

/// Uniform sample of `limit` items without replacement, kept in row order.
fn sample<T: Copy>(items: Vec<T>, limit: usize, seed: Option<u64>) -> Vec<T> {
    if items.len() <= limit {
        return items;
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices = rand::seq::index::sample(&mut rng, items.len(), limit).into_vec();
    indices.sort_unstable();
    debug!(total = items.len(), sampled = limit, "Sampled scatter points");
    indices.into_iter().map(|i| items[i]).collect()
}
