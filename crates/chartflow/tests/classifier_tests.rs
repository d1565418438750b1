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

use chartflow::{classify, ChartKind, Classification, RequestKind};
use proptest::prelude::*;

#[test]
fn test_scatter_rule_beats_pie_rule() {
    let result = classify("show a pie chart and a scatter plot");
    assert_eq!(result, Classification::visualization(ChartKind::Scatter));
}

#[test]
fn test_pie_request_from_end_to_end_scenario() {
    let result = classify("show a pie chart of category");
    assert_eq!(result.kind, RequestKind::Visualization);
    assert_eq!(result.chart_kind, Some(ChartKind::Pie));
}

#[test]
fn test_case_is_ignored() {
    assert_eq!(
        classify("SHOW A HISTOGRAM OF AGE").chart_kind,
        Some(ChartKind::Histogram)
    );
}

#[test]
fn test_vs_needs_surrounding_spaces() {
    assert_eq!(classify("plot price vs cost").chart_kind, Some(ChartKind::Scatter));
    assert_eq!(classify("plot canvas size").chart_kind, Some(ChartKind::Bar));
}

#[test]
fn test_by_within_and_across_request_grouped_bars() {
    for request in [
        "chart sales by region",
        "plot spread across teams",
        "graph counts within segments",
    ] {
        assert_eq!(classify(request).chart_kind, Some(ChartKind::GroupedBar), "{request}");
    }
}

#[test]
fn test_line_needs_trend_or_time() {
    assert_eq!(
        classify("line chart showing the trend").chart_kind,
        Some(ChartKind::Line)
    );
    assert_eq!(classify("line chart").chart_kind, Some(ChartKind::Bar));
}

#[test]
fn test_plain_questions_are_analysis() {
    for request in ["what is the median income?", "how many rows?", ""] {
        assert_eq!(classify(request), Classification::analysis(), "{request}");
    }
}

proptest! {
    #[test]
    fn prop_classification_is_deterministic(request in ".{0,80}") {
        prop_assert_eq!(classify(&request), classify(&request));
    }

    #[test]
    fn prop_chart_kind_only_for_visualization(request in "[a-z ]{0,60}") {
        let result = classify(&request);
        prop_assert_eq!(result.chart_kind.is_some(), result.is_visualization());
    }

    #[test]
    fn prop_scatter_keyword_always_wins(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
        let request = format!("{prefix} scatter {suffix}");
        prop_assert_eq!(classify(&request).chart_kind, Some(ChartKind::Scatter));
    }
}
