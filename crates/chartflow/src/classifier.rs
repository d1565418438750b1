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

use serde::{Deserialize, Serialize};
use std::str::FromStr;

const VISUALIZATION_TRIGGERS: &[&str] = &[
    "chart", "plot", "graph", "bar", "pie", "histogram", "scatter", "visualiz", "show",
    "display", "heatmap", "box",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Analysis,
    Visualization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    GroupedBar,
    Pie,
    Histogram,
    Scatter,
    Line,
    Heatmap,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        ChartKind::Bar,
        ChartKind::HorizontalBar,
        ChartKind::GroupedBar,
        ChartKind::Pie,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Line,
        ChartKind::Heatmap,
        ChartKind::Box,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal_bar",
            ChartKind::GroupedBar => "grouped_bar",
            ChartKind::Pie => "pie",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Box => "box",
        }
    }

    /// Lenient lookup used at the API edge: unknown names become `Bar`.
    pub fn parse_or_bar(name: &str) -> Self {
        name.parse().unwrap_or(ChartKind::Bar)
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace(['-', ' '], "_");
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| format!("unknown chart kind '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: RequestKind,
    pub chart_kind: Option<ChartKind>,
}

impl Classification {
    pub fn analysis() -> Self {
        Self {
            kind: RequestKind::Analysis,
            chart_kind: None,
        }
    }

    pub fn visualization(chart_kind: ChartKind) -> Self {
        Self {
            kind: RequestKind::Visualization,
            chart_kind: Some(chart_kind),
        }
    }

    pub fn is_visualization(&self) -> bool {
        self.kind == RequestKind::Visualization
    }
}

/// Ordered keyword classification. Never fails; anything without a
/// visualisation trigger is an analysis request.
pub fn classify(request: &str) -> Classification {
    let text = request.to_lowercase();
    if !VISUALIZATION_TRIGGERS.iter().any(|w| text.contains(w)) {
        return Classification::analysis();
    }
    Classification::visualization(chart_kind_of(&text))
}

fn chart_kind_of(text: &str) -> ChartKind {
    let has = |needle: &str| text.contains(needle);
    if has("scatter") || has("relationship") || has(" vs ") {
        ChartKind::Scatter
    } else if has("horizontal") {
        ChartKind::HorizontalBar
    } else if has("pie") || has("proportion") {
        ChartKind::Pie
    } else if has("histogram") {
        ChartKind::Histogram
    } else if has("heatmap") || has("correlation matrix") {
        ChartKind::Heatmap
    } else if has("box") {
        ChartKind::Box
    } else if has("line") && (has("trend") || has("time")) {
        ChartKind::Line
    } else if has(" by ") || has("across") || has("within") {
        ChartKind::GroupedBar
    } else {
        ChartKind::Bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_without_triggers_are_analysis() {
        let c = classify("What is the average revenue?");
        assert_eq!(c, Classification::analysis());
        assert!(!c.is_visualization());
    }

    #[test]
    fn rule_order_decides_chart_kind() {
        let cases = [
            ("plot price vs rating", ChartKind::Scatter),
            ("show a horizontal bar of city", ChartKind::HorizontalBar),
            ("pie chart of the scatter", ChartKind::Scatter),
            ("show proportion of segment", ChartKind::Pie),
            ("histogram of age", ChartKind::Histogram),
            ("display the correlation matrix", ChartKind::Heatmap),
            ("box plot of salary", ChartKind::Box),
            ("line chart of sales over time", ChartKind::Line),
            ("line chart of sales", ChartKind::Bar),
            ("chart revenue by region", ChartKind::GroupedBar),
            ("graph the categories", ChartKind::Bar),
        ];
        for (request, expected) in cases {
            assert_eq!(classify(request).chart_kind, Some(expected), "{request}");
        }
    }

    #[test]
    fn chart_kind_names_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.as_str().parse::<ChartKind>(), Ok(kind));
        }
        assert_eq!("Horizontal Bar".parse::<ChartKind>(), Ok(ChartKind::HorizontalBar));
        assert_eq!(ChartKind::parse_or_bar("sunburst"), ChartKind::Bar);
    }
}
