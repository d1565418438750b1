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

use crate::dataset::DatasetColumn;
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeMap, BTreeSet};

/// Frequency table, most frequent first. Ties keep first-appearance order.
pub fn value_counts<I>(labels: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for label in labels.into_iter().flatten() {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn top_values(column: &DatasetColumn, limit: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(column.labels());
    counts.truncate(limit);
    counts
}

pub fn distinct_in_order(column: &DatasetColumn) -> Vec<String> {
    column
        .labels()
        .flatten()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Co-occurrence counts of two columns. Keys are sorted; `counts[s][r]` is
/// the number of rows holding series value `s` and row value `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub series: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

pub fn crosstab(row_column: &DatasetColumn, series_column: &DatasetColumn) -> CrossTab {
    let mut cells: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut rows: BTreeSet<String> = BTreeSet::new();
    for (row_label, series_label) in row_column.labels().zip(series_column.labels()) {
        let (Some(row_label), Some(series_label)) = (row_label, series_label) else {
            continue;
        };
        rows.insert(row_label.clone());
        *cells
            .entry(series_label)
            .or_default()
            .entry(row_label)
            .or_insert(0) += 1;
    }
    let rows: Vec<String> = rows.into_iter().collect();
    let series: Vec<String> = cells.keys().cloned().collect();
    let counts = cells
        .values()
        .map(|by_row| {
            rows.iter()
                .map(|r| by_row.get(r).copied().unwrap_or(0))
                .collect()
        })
        .collect();
    CrossTab {
        rows,
        series,
        counts,
    }
}

/// Rows where both columns hold a number, in row order.
pub fn paired_numbers(x: &DatasetColumn, y: &DatasetColumn) -> Vec<(f64, f64)> {
    (0..x.len().min(y.len()))
        .filter_map(|row| Some((x.number_at(row)?, y.number_at(row)?)))
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom < f64::EPSILON {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pairwise-complete Pearson matrix rounded to two decimals. The diagonal
/// is always 1.0; undefined correlations (constant columns) are `None`.
pub fn correlation_matrix(columns: &[&DatasetColumn]) -> Vec<Vec<Option<f64>>> {
    let n = columns.len();
    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        matrix[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&paired_numbers(columns[i], columns[j])).map(round2);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

/// Degree-1 least-squares fit, returned as `(slope, intercept)`.
pub fn linear_fit(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx < f64::EPSILON {
        return None;
    }
    let sxy: f64 = pairs.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}
