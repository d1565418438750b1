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

//! Model-assisted chart generation.
//!
//! The model sees the dataset context, column hints, styling rules and a
//! skeleton for the requested kind, and must answer with a chart document.
//! Any invocation, parse or validation failure fails the whole attempt;
//! there is no partial output and no retry here.

use crate::classifier::ChartKind;
use crate::context;
use crate::dataset::Dataset;
use crate::document::ChartDocument;
use crate::error::{LLMError, LLMResult};
use crate::llm::LanguageModel;
use crate::resolver;
use crate::styling;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

pub fn build_prompt(dataset: &Dataset, request: &str, kind: ChartKind) -> String {
    let suggested = resolver::suggest(dataset, request);
    let prompt = format!(
        r#"You are a Plotly data visualization expert. Generate a valid Plotly JSON configuration.

USER REQUEST: {request}

CHART TYPE: {kind}

{context}

SUGGESTED COLUMNS TO USE: {suggested}

{styling}

TEMPLATE STRUCTURE:
{template}

INSTRUCTIONS:
1. ONLY use column names that exist in the AVAILABLE COLUMNS section above
2. Use the data to create realistic values (you can estimate based on the column info)
3. Follow the styling guidelines
4. Return ONLY valid JSON, no markdown, no explanation
5. The JSON must have "data" (array) and "layout" (object) keys

If a column mentioned in the request doesn't exist, use the closest matching column from AVAILABLE COLUMNS.

IMPORTANT: Return ONLY the Plotly JSON object, nothing else."#,
        context = context::context(dataset),
        suggested = suggested.join(", "),
        styling = styling::directive(kind),
        template = styling::template(kind),
    );
    debug!(chart_kind = %kind, prompt_chars = prompt.len(), "Built assisted chart prompt");
    prompt
}

/// One model call, then parse and validate. The caller owns timeouts.
pub async fn generate(
    model: &dyn LanguageModel,
    dataset: &Dataset,
    request: &str,
    kind: ChartKind,
) -> LLMResult<ChartDocument> {
    let prompt = build_prompt(dataset, request, kind);
    let response = model.ask(&prompt).await?;
    parse_document(&response)
}

/// Parses a model response, tolerating markdown code fences and
/// surrounding prose, and validates the result.
pub fn parse_document(response: &str) -> LLMResult<ChartDocument> {
    let value = extract_json(response)?;
    validate(&value)?;
    serde_json::from_value(value).map_err(LLMError::from)
}

fn extract_json(text: &str) -> LLMResult<Value> {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let fence = Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```")
        .map_err(|e| LLMError::InvalidChart(format!("Fence pattern failed to compile: {e}")))?;
    for body in fence.captures_iter(text).filter_map(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) {
            debug!("Extracted chart JSON from code fence");
            return Ok(value);
        }
    }

    if let Some(object) = outermost_object(text) {
        if let Ok(value) = serde_json::from_str::<Value>(object) {
            debug!("Extracted chart JSON object from surrounding text");
            return Ok(value);
        }
    }

    Err(LLMError::InvalidChart(
        "Response does not contain a JSON object".to_string(),
    ))
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Shape checks on a candidate document: a non-empty `data` array of typed
/// traces, a `layout` object, and usable value arrays for trace types that
/// need them. Column names are not checked against the dataset.
pub fn validate(value: &Value) -> LLMResult<()> {
    let invalid = |reason: String| Err(LLMError::InvalidChart(reason));

    let Some(data) = value.get("data").and_then(Value::as_array) else {
        return invalid("missing 'data' array".to_string());
    };
    if data.is_empty() {
        return invalid("'data' array is empty".to_string());
    }
    if !value.get("layout").is_some_and(Value::is_object) {
        return invalid("missing 'layout' object".to_string());
    }

    for (index, trace) in data.iter().enumerate() {
        let Some(trace_type) = trace.get("type").and_then(Value::as_str) else {
            return invalid(format!("trace {index} has no 'type'"));
        };
        if let Err(reason) = check_trace(trace_type, trace) {
            return invalid(format!("trace {index} ({trace_type}): {reason}"));
        }
    }
    Ok(())
}

fn check_trace(trace_type: &str, trace: &Value) -> Result<(), &'static str> {
    match trace_type {
        "pie" => require(numeric_array(trace.get("values")), "'values' must be non-empty numbers"),
        "heatmap" => require(numeric_matrix(trace.get("z")), "'z' must be a non-empty numeric matrix"),
        "bar" => {
            let horizontal = trace.get("orientation").and_then(Value::as_str) == Some("h");
            let axis = if horizontal { "x" } else { "y" };
            require(numeric_array(trace.get(axis)), "value axis must be non-empty numbers")
        }
        "histogram" => require(
            numeric_array(trace.get("x")) || numeric_array(trace.get("y")),
            "'x' or 'y' must be non-empty numbers",
        ),
        "scatter" | "box" => require(
            non_empty_array(trace.get("x")) || non_empty_array(trace.get("y")),
            "'x' or 'y' must be a non-empty array",
        ),
        _ => Ok(()),
    }
}

fn require(ok: bool, reason: &'static str) -> Result<(), &'static str> {
    if ok {
        Ok(())
    } else {
        Err(reason)
    }
}

fn non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

/// Non-empty, only numbers or nulls, at least one number.
fn numeric_array(value: Option<&Value>) -> bool {
    let Some(items) = value.and_then(Value::as_array) else {
        return false;
    };
    items.iter().all(|v| v.is_number() || v.is_null()) && items.iter().any(Value::is_number)
}

fn numeric_matrix(value: Option<&Value>) -> bool {
    let Some(rows) = value.and_then(Value::as_array) else {
        return false;
    };
    !rows.is_empty() && rows.iter().all(|row| numeric_array(Some(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use serde_json::json;

    #[test]
    fn prompt_embeds_context_hints_and_template() {
        let df = df! { "category" => ["A", "B"], "amount" => [1.0, 2.0] }.unwrap();
        let dataset = Dataset::from_frame(&df).unwrap();
        let prompt = build_prompt(&dataset, "pie chart of category", ChartKind::Pie);

        assert!(prompt.contains("USER REQUEST: pie chart of category"));
        assert!(prompt.contains("CHART TYPE: pie"));
        assert!(prompt.contains("AVAILABLE COLUMNS:"));
        assert!(prompt.contains("SUGGESTED COLUMNS TO USE: category"));
        assert!(prompt.contains("PIE CHART STYLING:"));
        assert!(prompt.contains("\"hole\": 0.4"));
        assert!(prompt.ends_with("Return ONLY the Plotly JSON object, nothing else."));
    }

    #[test]
    fn accepts_fenced_json() {
        let response = "Here you go:\n```json\n{\"data\": [{\"type\": \"pie\", \"labels\": [\"a\"], \"values\": [1]}], \"layout\": {\"title\": \"t\"}}\n```";
        let doc = parse_document(response).unwrap();
        assert_eq!(doc.trace_types(), vec!["pie"]);
        assert_eq!(doc.title(), Some("t"));
    }

    #[test]
    fn accepts_json_wrapped_in_prose() {
        let response = "Sure. {\"data\": [{\"type\": \"box\", \"y\": [1, 2]}], \"layout\": {}} Done.";
        assert!(parse_document(response).is_ok());
    }

    #[test]
    fn rejects_malformed_or_badly_shaped_output() {
        let cases = [
            "not json at all",
            r#"{"layout": {}}"#,
            r#"{"data": [], "layout": {}}"#,
            r#"{"data": [{"x": [1]}], "layout": {}}"#,
            r#"{"data": [{"type": "bar", "x": ["a"], "y": []}], "layout": {}}"#,
            r#"{"data": [{"type": "pie", "labels": ["a"], "values": ["many"]}], "layout": {}}"#,
            r#"{"data": [{"type": "heatmap", "z": []}], "layout": {}}"#,
            r#"{"data": [{"type": "bar", "x": ["a"], "y": [1]}]}"#,
        ];
        for response in cases {
            let err = parse_document(response).unwrap_err();
            assert!(matches!(err, LLMError::InvalidChart(_)), "{response}");
        }
    }

    #[test]
    fn horizontal_bar_values_live_on_x() {
        let value = json!({
            "data": [{ "type": "bar", "orientation": "h", "x": [3, 1], "y": ["a", "b"] }],
            "layout": { "title": "h" },
        });
        assert!(validate(&value).is_ok());
    }
}
