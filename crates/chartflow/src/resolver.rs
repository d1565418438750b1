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

//! Maps free-text requests onto dataset columns.
//!
//! [`find_mentioned`] and [`suggest`] work on names only. [`ColumnPolicy`]
//! is the single selection rule every chart generator goes through: prefer
//! a resolved column of the right semantic type, else the first dataset
//! column of that type.

use crate::dataset::{Dataset, DatasetColumn, SemanticType};
use crate::error::{ChartError, ChartResult};
use tracing::debug;

const DEFAULT_HINTS_PER_TYPE: usize = 2;

/// Columns whose name appears (case-insensitively) inside `text`, in
/// column order.
pub fn find_mentioned(dataset: &Dataset, text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    dataset
        .columns()
        .iter()
        .map(DatasetColumn::name)
        .filter(|name| !name.is_empty() && text.contains(&name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Loose column hints for prompt enrichment. Never a hard constraint.
pub fn suggest(dataset: &Dataset, text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let words: Vec<&str> = text.split_whitespace().collect();
    let suggested: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|column| {
            let name = column.name().to_lowercase();
            !name.is_empty()
                && words
                    .iter()
                    .any(|word| name.contains(word) || word.contains(name.as_str()))
        })
        .map(|column| column.name().to_string())
        .collect();
    if !suggested.is_empty() {
        return suggested;
    }

    dataset
        .columns_of(SemanticType::Categorical)
        .take(DEFAULT_HINTS_PER_TYPE)
        .chain(
            dataset
                .columns_of(SemanticType::Numeric)
                .take(DEFAULT_HINTS_PER_TYPE),
        )
        .map(|column| column.name().to_string())
        .collect()
}

/// Shared column-selection policy for one generation request.
#[derive(Debug, Clone)]
pub struct ColumnPolicy<'a> {
    dataset: &'a Dataset,
    resolved: Vec<&'a DatasetColumn>,
}

impl<'a> ColumnPolicy<'a> {
    /// Fails with [`ChartError::ColumnNotFound`] when a resolved name is not
    /// a dataset column.
    pub fn new(dataset: &'a Dataset, resolved: &[String]) -> ChartResult<Self> {
        let resolved = resolved
            .iter()
            .map(|name| {
                dataset
                    .column(name)
                    .ok_or_else(|| ChartError::ColumnNotFound {
                        column: name.clone(),
                        available: dataset.column_names().join(", "),
                    })
            })
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(Self { dataset, resolved })
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn resolved(&self) -> &[&'a DatasetColumn] {
        &self.resolved
    }

    /// First column of `semantic` not named in `exclude`, resolved columns
    /// first.
    pub fn pick(&self, semantic: SemanticType, exclude: &[&str]) -> Option<&'a DatasetColumn> {
        let eligible =
            |column: &&'a DatasetColumn| column.is(semantic) && !exclude.contains(&column.name());
        let picked = self
            .resolved
            .iter()
            .copied()
            .find(eligible)
            .or_else(|| self.dataset.columns().iter().find(eligible));
        debug!(
            semantic = %semantic,
            column = picked.map(DatasetColumn::name),
            "Column policy pick"
        );
        picked
    }

    /// Up to `arity` distinct columns of `semantic`, resolved columns first.
    pub fn pick_many(&self, semantic: SemanticType, arity: usize) -> Vec<&'a DatasetColumn> {
        let mut picked: Vec<&'a DatasetColumn> = Vec::with_capacity(arity);
        while picked.len() < arity {
            let exclude: Vec<&str> = picked.iter().map(|c| c.name()).collect();
            match self.pick(semantic, &exclude) {
                Some(column) => picked.push(column),
                None => break,
            }
        }
        picked
    }

    pub fn require(
        &self,
        chart: &str,
        semantic: SemanticType,
        exclude: &[&str],
    ) -> ChartResult<&'a DatasetColumn> {
        self.pick(semantic, exclude)
            .ok_or_else(|| ChartError::MissingSemanticColumn {
                chart: chart.to_string(),
                semantic,
            })
    }

    /// Type-agnostic last resort: first resolved column, else the first
    /// dataset column.
    pub fn any_column(&self) -> ChartResult<&'a DatasetColumn> {
        self.resolved
            .first()
            .copied()
            .or_else(|| self.dataset.columns().first())
            .ok_or(ChartError::EmptyDataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sales() -> Dataset {
        let df = df! {
            "Region" => ["n", "s", "n"],
            "product" => ["a", "b", "a"],
            "units" => [1i64, 2, 3],
            "revenue" => [1.0, 2.0, 3.0],
            "cost" => [0.5, 1.0, 1.5],
        }
        .unwrap();
        Dataset::from_frame(&df).unwrap()
    }

    #[test]
    fn mentioned_columns_match_case_insensitively_in_column_order() {
        let found = find_mentioned(&sales(), "Revenue by region please");
        assert_eq!(found, vec!["Region", "revenue"]);
    }

    #[test]
    fn suggestions_fall_back_to_leading_columns() {
        let dataset = sales();
        assert_eq!(suggest(&dataset, "units sold"), vec!["units"]);
        assert_eq!(
            suggest(&dataset, "zzz"),
            vec!["Region", "product", "units", "revenue"]
        );
    }

    #[test]
    fn policy_prefers_resolved_columns_of_the_right_type() {
        let dataset = sales();
        let policy = ColumnPolicy::new(&dataset, &["revenue".to_string()]).unwrap();
        assert_eq!(policy.pick(SemanticType::Numeric, &[]).unwrap().name(), "revenue");
        assert_eq!(
            policy.pick(SemanticType::Numeric, &["revenue"]).unwrap().name(),
            "units"
        );
        assert_eq!(policy.pick(SemanticType::Categorical, &[]).unwrap().name(), "Region");

        let pair: Vec<&str> = policy
            .pick_many(SemanticType::Numeric, 2)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(pair, vec!["revenue", "units"]);
        assert!(policy.pick(SemanticType::Datetime, &[]).is_none());
    }

    #[test]
    fn unknown_resolved_column_is_column_not_found() {
        let dataset = sales();
        let err = ColumnPolicy::new(&dataset, &["profit".to_string()]).unwrap_err();
        assert!(matches!(err, ChartError::ColumnNotFound { ref column, .. } if column == "profit"));
        assert!(err.to_string().contains("Region, product, units, revenue, cost"));
    }
}
