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

//! Chart documents: a trace array plus a layout object, in
//! the shape a Plotly-compatible renderer consumes.

use crate::error::ChartResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const EMPTY_TITLE: &str = "No data";
pub const ERROR_TITLE: &str = "Chart Generation Error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub data: Vec<Value>,
    pub layout: Map<String, Value>,
}

impl ChartDocument {
    /// `layout` is expected to be a JSON object; anything else yields an
    /// empty layout.
    pub fn new(data: Vec<Value>, layout: Value) -> Self {
        let layout = match layout {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { data, layout }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), json!({ "title": EMPTY_TITLE }))
    }

    /// In-chart annotation carrying `message`, axes hidden.
    pub fn error(message: &str) -> Self {
        let hidden_axis = json!({ "visible": false, "range": [0, 1] });
        Self::new(
            vec![json!({
                "x": [0.5],
                "y": [0.5],
                "mode": "text",
                "text": [format!("⚠️ {message}")],
                "textfont": { "size": 14, "color": "#ef4444" },
                "type": "scatter",
            })],
            json!({
                "title": ERROR_TITLE,
                "xaxis": hidden_axis,
                "yaxis": hidden_axis,
                "annotations": [{
                    "text": message,
                    "showarrow": false,
                    "x": 0.5,
                    "y": 0.5,
                    "font": { "size": 12 },
                }],
            }),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// Title text, whether stored as a string or as `{ "text": ... }`.
    pub fn title(&self) -> Option<&str> {
        match self.layout.get("title")? {
            Value::String(title) => Some(title.as_str()),
            Value::Object(title) => title.get("text").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn trace_types(&self) -> Vec<&str> {
        self.data
            .iter()
            .filter_map(|trace| trace.get("type").and_then(Value::as_str))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        json!({ "data": self.data, "layout": self.layout })
    }

    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
