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

//! Answers for non-chart requests: canned statistics matched by phrase,
//! otherwise a short prose answer from the language model.

use crate::context;
use crate::dataset::{Dataset, DatasetColumn, SemanticType};
use crate::llm::{self, LanguageModel};
use crate::stats;
use std::fmt::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const SAMPLE_ROWS: usize = 5;
const HIGH_NULL_PERCENT: f64 = 30.0;
const UNIQUE_PREVIEW: usize = 10;

/// Canned computation for common questions, or `None` when the question
/// needs the model.
pub fn quick_answer(dataset: &Dataset, request: &str) -> Option<String> {
    let text = request.to_lowercase();
    let has = |needle: &str| text.contains(needle);

    if has("null") || has("missing") {
        return Some(null_summary(dataset, has("30%") || has("30 %")));
    }
    if has("how many row") {
        return Some(format!("The dataset has **{} rows**.", dataset.row_count()));
    }
    if has("how many column") || has("how many feature") {
        return Some(format!(
            "The dataset has **{} columns/features**.",
            dataset.column_count()
        ));
    }
    if has("list") && has("column") {
        return Some(format!("**Columns:** {}", dataset.column_names().join(", ")));
    }
    if has("data type") || has("dtype") {
        let mut out = "**Data types:**\n".to_string();
        for column in dataset.columns() {
            let _ = write!(out, "\n- {}: {}", column.name(), column.semantic());
        }
        return Some(out);
    }
    if has("mean") || has("average") {
        return Some(means(dataset, &text));
    }
    if has("unique") {
        return Some(unique_values(dataset, &text));
    }
    if has("value count") || has("distribution") {
        return value_distribution(dataset, &text);
    }
    None
}

fn mentioned<'a>(
    dataset: &'a Dataset,
    text: &str,
    semantic: Option<SemanticType>,
) -> Option<&'a DatasetColumn> {
    dataset.columns().iter().find(|column| {
        semantic.map_or(true, |s| column.is(s))
            && !column.name().is_empty()
            && text.contains(&column.name().to_lowercase())
    })
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn null_summary(dataset: &Dataset, high_only: bool) -> String {
    let rows = dataset.row_count();
    let nulls: Vec<(&str, usize, f64)> = dataset
        .columns()
        .iter()
        .map(|c| (c.name(), c.null_count(), percent(c.null_count(), rows)))
        .collect();

    if high_only {
        let high: Vec<_> = nulls
            .iter()
            .filter(|(_, _, pct)| *pct > HIGH_NULL_PERCENT)
            .collect();
        if high.is_empty() {
            return "No features have more than 30% null values.".to_string();
        }
        let mut out = format!("**{} features** have more than 30% null values:\n", high.len());
        for (name, _, pct) in high {
            let _ = write!(out, "\n- {name}: {pct:.1}% missing");
        }
        return out;
    }

    let with_nulls: Vec<_> = nulls.iter().filter(|(_, count, _)| *count > 0).collect();
    if with_nulls.is_empty() {
        return "No missing values in the dataset.".to_string();
    }
    let mut out = "**Null value summary:**\n".to_string();
    for (name, count, pct) in with_nulls {
        let _ = write!(out, "\n- {name}: {pct:.1}% ({count} values)");
    }
    out
}

fn means(dataset: &Dataset, text: &str) -> String {
    if let Some(column) = mentioned(dataset, text, Some(SemanticType::Numeric)) {
        return match stats::mean(&column.numbers()) {
            Some(mean) => format!("The mean of **{}** is **{mean:.2}**", column.name()),
            None => format!("**{}** has no values to average.", column.name()),
        };
    }
    let mut out = "**Mean values:**\n".to_string();
    for column in dataset.columns_of(SemanticType::Numeric) {
        match stats::mean(&column.numbers()) {
            Some(mean) => {
                let _ = write!(out, "\n- {}: {mean:.2}", column.name());
            }
            None => {
                let _ = write!(out, "\n- {}: n/a", column.name());
            }
        }
    }
    out
}

fn unique_values(dataset: &Dataset, text: &str) -> String {
    if let Some(column) = mentioned(dataset, text, None) {
        let distinct = stats::distinct_in_order(column);
        let preview: Vec<&str> = distinct
            .iter()
            .take(UNIQUE_PREVIEW)
            .map(String::as_str)
            .collect();
        return format!(
            "**{}** has **{}** unique values: {}",
            column.name(),
            distinct.len(),
            preview.join(", ")
        );
    }
    let mut out = "**Unique value counts:**\n".to_string();
    for column in dataset.columns() {
        let _ = write!(
            out,
            "\n- {}: {}",
            column.name(),
            stats::distinct_in_order(column).len()
        );
    }
    out
}

fn value_distribution(dataset: &Dataset, text: &str) -> Option<String> {
    let column = mentioned(dataset, text, Some(SemanticType::Categorical))?;
    let rows = dataset.row_count();
    let mut out = format!("**{} distribution:**\n", column.name());
    for (value, count) in stats::value_counts(column.labels()) {
        let _ = write!(out, "\n- {value}: {count} ({:.1}%)", percent(count, rows));
    }
    Some(out)
}

pub fn build_prompt(dataset: &Dataset, question: &str) -> String {
    format!(
        r#"You are a data analyst. Answer the following question about the dataset.

QUESTION: {question}

{context}

SAMPLE DATA (first {SAMPLE_ROWS} rows):
{sample}

RULES:
1. Give a SHORT, DIRECT answer in 1-3 sentences
2. Include specific numbers when relevant
3. Use markdown formatting (bold for key numbers)
4. NO recommendations, insights sections, or verbose explanations
5. Just answer the question"#,
        context = context::context(dataset),
        sample = dataset.preview(SAMPLE_ROWS),
    )
}

/// Quick answer when one applies, otherwise the model's answer. Never
/// fails: model problems become a short apology.
pub async fn answer(
    model: Option<&dyn LanguageModel>,
    dataset: &Dataset,
    request: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> String {
    if let Some(quick) = quick_answer(dataset, request) {
        debug!("Answered from quick statistics");
        return quick;
    }
    let Some(model) = model else {
        return "I can't answer that without a language model. Try asking about rows, columns, \
                missing values, means or unique values."
            .to_string();
    };
    let prompt = build_prompt(dataset, request);
    match llm::guarded(model.ask(&prompt), timeout, cancel).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, model = model.name(), "Analysis answer failed");
            format!("Sorry, I couldn't analyse the data right now ({e}).")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn people() -> Dataset {
        let df = df! {
            "team" => [Some("red"), Some("blue"), Some("red"), None],
            "age" => [Some(30.0), None, None, Some(40.0)],
            "score" => [1.0, 2.0, 3.0, 4.0],
        }
        .unwrap();
        Dataset::from_frame(&df).unwrap()
    }

    #[test]
    fn counts_rows_and_columns() {
        let dataset = people();
        assert_eq!(
            quick_answer(&dataset, "How many rows are there?").as_deref(),
            Some("The dataset has **4 rows**.")
        );
        assert_eq!(
            quick_answer(&dataset, "how many columns?").as_deref(),
            Some("The dataset has **3 columns/features**.")
        );
        assert_eq!(
            quick_answer(&dataset, "list the columns").as_deref(),
            Some("**Columns:** team, age, score")
        );
    }

    #[test]
    fn null_summaries() {
        let dataset = people();
        let all = quick_answer(&dataset, "any missing values?").unwrap();
        assert!(all.contains("- team: 25.0% (1 values)"));
        assert!(all.contains("- age: 50.0% (2 values)"));

        let high = quick_answer(&dataset, "features with more than 30% null").unwrap();
        assert!(high.starts_with("**1 features**"));
        assert!(high.contains("- age: 50.0% missing"));
    }

    #[test]
    fn mean_of_named_column() {
        assert_eq!(
            quick_answer(&people(), "average age").as_deref(),
            Some("The mean of **age** is **35.00**")
        );
    }

    #[test]
    fn distribution_of_categorical_column() {
        let text = quick_answer(&people(), "value counts of team").unwrap();
        assert!(text.contains("- red: 2 (50.0%)"));
        assert!(text.contains("- blue: 1 (25.0%)"));
    }

    #[test]
    fn open_questions_need_the_model() {
        assert!(quick_answer(&people(), "which team performs best?").is_none());
    }

    #[tokio::test]
    async fn without_a_model_open_questions_get_guidance() {
        let reply = answer(
            None,
            &people(),
            "which team performs best?",
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await;
        assert!(reply.contains("without a language model"));
    }

    #[test]
    fn prompt_includes_sample_rows() {
        let prompt = build_prompt(&people(), "who scored highest?");
        assert!(prompt.contains("QUESTION: who scored highest?"));
        assert!(prompt.contains("SAMPLE DATA (first 5 rows):\nteam | age | score\nred | 30 | 1"));
    }
}
