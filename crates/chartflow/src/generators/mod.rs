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

//! Deterministic chart generators, one per [`ChartKind`].
//!
//! Every generator reads the dataset through a [`ColumnPolicy`] and never
//! touches the network. When a generator lacks a column of the semantic
//! type it needs, [`generate`] degrades to the bar generator; a resolved
//! column name that does not exist surfaces as
//! [`ChartError::ColumnNotFound`].

pub mod bar;
pub mod comparison;
pub mod distribution;
pub mod heatmap;
pub mod line;
pub mod pie;
pub mod scatter;

use crate::classifier::ChartKind;
use crate::config::GenerationConfig;
use crate::dataset::{Dataset, SemanticType};
use crate::document::ChartDocument;
use crate::error::{ChartError, ChartResult};
use crate::resolver::{find_mentioned, ColumnPolicy};
use crate::stats;
use serde_json::json;
use tracing::{debug, warn};

/// Runs the generator for `kind`.
///
/// `columns` are explicit column names; when empty, columns mentioned in
/// `request` are used instead.
pub fn generate(
    dataset: &Dataset,
    request: &str,
    kind: ChartKind,
    columns: &[String],
    config: &GenerationConfig,
) -> ChartResult<ChartDocument> {
    if dataset.is_empty() {
        return Err(ChartError::EmptyDataset);
    }
    let resolved = if columns.is_empty() {
        find_mentioned(dataset, request)
    } else {
        columns.to_vec()
    };
    let policy = ColumnPolicy::new(dataset, &resolved)?;
    debug!(chart_kind = %kind, resolved = ?resolved, "Running deterministic generator");

    let result = match kind {
        ChartKind::Bar => bar::generate(&policy, config),
        ChartKind::HorizontalBar => comparison::horizontal_bar(&policy, config),
        ChartKind::GroupedBar => comparison::grouped_bar(&policy, config),
        ChartKind::Pie => pie::generate(&policy, config),
        ChartKind::Histogram => distribution::histogram(&policy, config),
        ChartKind::Box => distribution::box_plot(&policy, config),
        ChartKind::Scatter => scatter::generate(&policy, config),
        ChartKind::Line => line::generate(&policy, config),
        ChartKind::Heatmap => heatmap::generate(&policy, config),
    };

    match result {
        Err(ChartError::MissingSemanticColumn { chart, semantic }) => {
            warn!(
                chart_kind = %kind,
                semantic = %semantic,
                "No {semantic} column for {chart}, degrading to bar"
            );
            bar::generate(&policy, config)
        }
        other => other,
    }
}

/// Last-resort chart: the top categories of the first categorical column.
/// Returns the empty sentinel when there is nothing to count.
pub fn terminal_fallback(dataset: &Dataset, config: &GenerationConfig) -> ChartDocument {
    let column = match dataset.first_of(SemanticType::Categorical) {
        Some(column) if dataset.row_count() > 0 => column,
        _ => return ChartDocument::empty(),
    };
    let (labels, counts): (Vec<String>, Vec<usize>) =
        stats::top_values(column, config.fallback_top_n).into_iter().unzip();
    if labels.is_empty() {
        return ChartDocument::empty();
    }
    ChartDocument::new(
        vec![json!({ "x": labels, "y": counts, "type": "bar" })],
        json!({ "title": column.name() }),
    )
}
