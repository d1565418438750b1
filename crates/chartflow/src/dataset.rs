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

//! Read-only, column-ordered view of a tabular dataset.
//!
//! A [`Dataset`] is materialised once from a polars [`DataFrame`] and is
//! never mutated afterwards; every chart generator borrows it. Each column
//! carries an inferred [`SemanticType`] that drives column selection.

use crate::error::{DataError, DataResult};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const TEMPORAL_CONFIDENCE_THRESHOLD: f64 = 0.8;

const TEMPORAL_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%SZ",
    "%m/%d/%Y",
    "%d/%m/%Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Categorical,
    Datetime,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Categorical => "categorical",
            SemanticType::Datetime => "datetime",
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Text(values) => values.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetColumn {
    name: String,
    semantic: SemanticType,
    values: ColumnValues,
}

impl DatasetColumn {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            semantic: SemanticType::Numeric,
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            semantic: SemanticType::Categorical,
            values: ColumnValues::Text(values),
        }
    }

    pub fn datetime(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            semantic: SemanticType::Datetime,
            values: ColumnValues::Text(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semantic(&self) -> SemanticType {
        self.semantic
    }

    pub fn is(&self, semantic: SemanticType) -> bool {
        self.semantic == semantic
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::Text(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Numeric cell at `row`; text columns always yield `None`.
    pub fn number_at(&self, row: usize) -> Option<f64> {
        match &self.values {
            ColumnValues::Numeric(values) => values.get(row).copied().flatten(),
            ColumnValues::Text(_) => None,
        }
    }

    /// Display label of the cell at `row`, used for counting and grouping.
    pub fn label_at(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::Numeric(values) => values.get(row).copied().flatten().map(format_number),
            ColumnValues::Text(values) => values.get(row).cloned().flatten(),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = Option<String>> + '_ {
        (0..self.len()).map(move |row| self.label_at(row))
    }

    /// Non-null numeric values in row order.
    pub fn numbers(&self) -> Vec<f64> {
        match &self.values {
            ColumnValues::Numeric(values) => values.iter().flatten().copied().collect(),
            ColumnValues::Text(_) => Vec::new(),
        }
    }

    fn from_series(series: &Series) -> DataResult<Self> {
        let name = series.name().to_string();
        let read_error = |source| DataError::ColumnReadError {
            column: name.clone(),
            source,
        };
        let dtype = series.dtype();
        if dtype.is_integer() || dtype.is_float() {
            let cast = series.cast(&DataType::Float64).map_err(read_error)?;
            let values: Vec<Option<f64>> = cast
                .f64()
                .map_err(read_error)?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            return Ok(Self::numeric(name, values));
        }
        let cast = series.cast(&DataType::String).map_err(read_error)?;
        let values: Vec<Option<String>> = cast
            .str()
            .map_err(read_error)?
            .into_iter()
            .map(|v| v.map(String::from))
            .collect();
        if dtype.is_temporal() || temporal_confidence(&values) >= TEMPORAL_CONFIDENCE_THRESHOLD {
            Ok(Self::datetime(name, values))
        } else {
            Ok(Self::categorical(name, values))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<DatasetColumn>,
    row_count: usize,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<DatasetColumn>) -> DataResult<Self> {
        let row_count = columns.first().map_or(0, DatasetColumn::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(DataError::LengthMismatch {
                column: bad.name.clone(),
                expected: row_count,
                found: bad.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    pub fn from_frame(df: &DataFrame) -> DataResult<Self> {
        let columns = df
            .get_columns()
            .par_iter()
            .map(|column| DatasetColumn::from_series(column.as_materialized_series()))
            .collect::<DataResult<Vec<_>>>()?;
        Ok(Self {
            columns,
            row_count: df.height(),
        })
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .finish()
            .map_err(|source| file_error(path, source))?;
        Self::from_frame(&df)
    }

    pub fn from_parquet<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|source| file_error(path, source))?;
        Self::from_frame(&df)
    }

    pub fn from_json<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = JsonReader::new(file)
            .finish()
            .map_err(|source| file_error(path, source))?;
        Self::from_frame(&df)
    }

    /// Loads a file, picking the reader from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Self::from_csv(path),
            "parquet" => Self::from_parquet(path),
            "json" => Self::from_json(path),
            other => Err(DataError::UnsupportedFormat {
                format: if other.is_empty() {
                    "<none>".to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count == 0
    }

    pub fn columns(&self) -> &[DatasetColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&DatasetColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require(&self, name: &str) -> DataResult<&DatasetColumn> {
        self.column(name).ok_or_else(|| DataError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns_of(&self, semantic: SemanticType) -> impl Iterator<Item = &DatasetColumn> {
        self.columns.iter().filter(move |c| c.semantic == semantic)
    }

    pub fn first_of(&self, semantic: SemanticType) -> Option<&DatasetColumn> {
        self.columns_of(semantic).next()
    }

    /// Plain-text rendering of the first `rows` rows, one line per row.
    pub fn preview(&self, rows: usize) -> String {
        let mut lines = vec![self.column_names().join(" | ")];
        for row in 0..rows.min(self.row_count) {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.label_at(row).unwrap_or_else(|| "null".to_string()))
                .collect();
            lines.push(cells.join(" | "));
        }
        lines.join("\n")
    }
}

fn file_error(path: &Path, source: polars::error::PolarsError) -> DataError {
    DataError::DataFileError {
        path: path.display().to_string(),
        source,
    }
}

/// Renders a float the way a category label should read: `3` not `3.0`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TEMPORAL_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    })
}

fn temporal_confidence(values: &[Option<String>]) -> f64 {
    let non_null: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    if non_null.is_empty() {
        return 0.0;
    }
    let parsed = non_null
        .par_iter()
        .filter(|v| parse_datetime(v).is_some())
        .count();
    parsed as f64 / non_null.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_semantic_types_from_frame() {
        let df = df! {
            "region" => ["north", "south", "north"],
            "units" => [3i64, 5, 8],
            "price" => [Some(1.5), None, Some(2.0)],
            "day" => ["2024-01-01", "2024-01-02", "2024-01-03"],
        }
        .unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_names(), vec!["region", "units", "price", "day"]);
        assert_eq!(dataset.column("region").unwrap().semantic(), SemanticType::Categorical);
        assert_eq!(dataset.column("units").unwrap().semantic(), SemanticType::Numeric);
        assert_eq!(dataset.column("day").unwrap().semantic(), SemanticType::Datetime);

        let price = dataset.column("price").unwrap();
        assert_eq!(price.null_count(), 1);
        assert_eq!(price.numbers(), vec![1.5, 2.0]);
    }

    #[test]
    fn numeric_labels_drop_trailing_zero() {
        let column = DatasetColumn::numeric("n", vec![Some(3.0), Some(2.5), None]);
        assert_eq!(column.label_at(0).as_deref(), Some("3"));
        assert_eq!(column.label_at(1).as_deref(), Some("2.5"));
        assert_eq!(column.label_at(2), None);
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let result = Dataset::new(vec![
            DatasetColumn::numeric("a", vec![Some(1.0)]),
            DatasetColumn::numeric("b", vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_frame_is_empty_dataset() {
        let dataset = Dataset::from_frame(&DataFrame::empty()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.column_count(), 0);
        assert_eq!(dataset.row_count(), 0);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = Dataset::from_path("data.xlsx").unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat { format } if format == "xlsx"));
    }

    #[test]
    fn loads_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "region,units\nnorth,3\nsouth,5\n").unwrap();

        let dataset = Dataset::from_path(&path).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.first_of(SemanticType::Numeric).unwrap().name(), "units");
    }
}
