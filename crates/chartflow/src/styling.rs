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

//! Colour palette, styling directives and structural templates shared by
//! the deterministic generators and the model prompt.

use crate::classifier::ChartKind;

pub const PRIMARY: &str = "#8b5cf6";
pub const TREND: &str = "#ef4444";

pub const PALETTE: [&str; 10] = [
    "#8b5cf6", "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#ec4899", "#6366f1", "#14b8a6",
    "#f97316", "#a855f7",
];

/// Palette colour for the `index`th series, cycling through the first
/// `span` entries.
pub fn color(index: usize, span: usize) -> &'static str {
    let span = span.clamp(1, PALETTE.len());
    PALETTE[index % span]
}

/// The first `n` palette colours, cycling when `n` exceeds the palette.
pub fn colors(n: usize) -> Vec<&'static str> {
    (0..n).map(|i| color(i, PALETTE.len())).collect()
}

struct StyleRules {
    heading: &'static str,
    rules: &'static [&'static str],
}

const GENERAL: StyleRules = StyleRules {
    heading: "GENERAL STYLING RULES",
    rules: &[
        "Always use dark background colors (#0a0a0a for background)",
        "Use white/light gray text for labels",
        "Primary color: #8b5cf6 (purple)",
        "Secondary colors: #3b82f6 (blue), #10b981 (green), #f59e0b (amber)",
        "Always include a descriptive title",
        "Format large numbers as K (thousands) or M (millions)",
        "Show percentages with 2 decimal places and '%' sign",
    ],
};

fn rules_for(kind: ChartKind) -> StyleRules {
    match kind {
        ChartKind::Bar => StyleRules {
            heading: "BAR CHART STYLING",
            rules: &[
                "Use colorful bars with the primary color palette",
                "Add value annotations on top of bars",
                "Keep x-axis labels readable (rotate if needed)",
                "For grouped bars, use barmode='group' and legend",
            ],
        },
        ChartKind::HorizontalBar => StyleRules {
            heading: "HORIZONTAL BAR CHART STYLING",
            rules: &[
                "Use orientation='h' for all traces",
                "Add value annotations at end of bars",
                "Order bars by value if possible",
                "Good for comparing categories with long names",
            ],
        },
        ChartKind::GroupedBar => StyleRules {
            heading: "GROUPED BAR CHART STYLING",
            rules: &[
                "Use barmode='group'",
                "Each group should have distinct colors",
                "Include legend for group labels",
                "Keep bar width consistent",
            ],
        },
        ChartKind::Scatter => StyleRules {
            heading: "SCATTER PLOT STYLING",
            rules: &[
                "Use mode='markers' for scatter points",
                "Add a trendline in a contrasting color (#ef4444 red, dashed)",
                "Include axis labels for both x and y",
                "Use opacity=0.6-0.8 for overlapping points",
                "Add correlation coefficient in annotation if relevant",
            ],
        },
        ChartKind::Histogram => StyleRules {
            heading: "HISTOGRAM STYLING",
            rules: &[
                "Use 20-30 bins for smooth distribution",
                "Add mean line as vertical annotation",
                "Include count on y-axis",
                "Use single color with slight transparency",
            ],
        },
        ChartKind::Pie => StyleRules {
            heading: "PIE CHART STYLING",
            rules: &[
                "Limit to 6-8 slices, combine small values as 'Other'",
                "Use hole=0.4 for donut style",
                "Add percentage labels on slices",
                "Use contrasting colors for adjacent slices",
            ],
        },
        ChartKind::Line => StyleRules {
            heading: "LINE CHART STYLING",
            rules: &[
                "Use mode='lines+markers' for visibility",
                "Add markers at data points",
                "Annotate min and max values",
                "Use different colors for multiple lines",
            ],
        },
        ChartKind::Heatmap => StyleRules {
            heading: "HEATMAP STYLING",
            rules: &[
                "Use 'RdBu' colorscale for correlation matrices",
                "Set zmid=0 for diverging colors",
                "Add text annotations for values",
                "Include colorbar",
            ],
        },
        ChartKind::Box => StyleRules {
            heading: "BOX PLOT STYLING",
            rules: &[
                "Show individual points if data is small",
                "Use different colors for each box",
                "Include outliers",
                "Add mean marker",
            ],
        },
    }
}

impl StyleRules {
    fn render(&self) -> String {
        let mut out = format!("{}:", self.heading);
        for rule in self.rules {
            out.push_str("\n- ");
            out.push_str(rule);
        }
        out
    }
}

/// General rules followed by the rules for `kind`.
pub fn directive(kind: ChartKind) -> String {
    format!("{}\n\n{}", GENERAL.render(), rules_for(kind).render())
}

const BAR_TEMPLATE: &str = r##"{
    "data": [{
        "x": ["Category1", "Category2", "Category3"],
        "y": [value1, value2, value3],
        "type": "bar",
        "marker": {"color": ["#8b5cf6", "#3b82f6", "#10b981"]},
        "text": [value1, value2, value3],
        "textposition": "outside"
    }],
    "layout": {
        "title": "Chart Title",
        "xaxis": {"title": "X Label"},
        "yaxis": {"title": "Y Label"}
    }
}"##;

const HORIZONTAL_BAR_TEMPLATE: &str = r##"{
    "data": [{
        "x": [value1, value2, value3],
        "y": ["Category1", "Category2", "Category3"],
        "type": "bar",
        "orientation": "h",
        "marker": {"color": "#8b5cf6"}
    }],
    "layout": {
        "title": "Chart Title",
        "xaxis": {"title": "Count"},
        "yaxis": {"title": "Category"}
    }
}"##;

const GROUPED_BAR_TEMPLATE: &str = r##"{
    "data": [
        {"x": ["Group1", "Group2"], "y": [v1, v2], "type": "bar", "name": "Series1", "marker": {"color": "#8b5cf6"}},
        {"x": ["Group1", "Group2"], "y": [v3, v4], "type": "bar", "name": "Series2", "marker": {"color": "#3b82f6"}}
    ],
    "layout": {
        "title": "Grouped Chart Title",
        "barmode": "group",
        "showlegend": true
    }
}"##;

const SCATTER_TEMPLATE: &str = r##"{
    "data": [
        {"x": [x_values], "y": [y_values], "type": "scatter", "mode": "markers", "name": "Data", "marker": {"color": "#8b5cf6", "opacity": 0.7}},
        {"x": [x_trend], "y": [y_trend], "type": "scatter", "mode": "lines", "name": "Trend", "line": {"color": "#ef4444", "dash": "dash"}}
    ],
    "layout": {
        "title": "Scatter Plot Title",
        "xaxis": {"title": "X Variable"},
        "yaxis": {"title": "Y Variable"}
    }
}"##;

const HISTOGRAM_TEMPLATE: &str = r##"{
    "data": [{
        "x": [numeric_values],
        "type": "histogram",
        "marker": {"color": "#8b5cf6"},
        "nbinsx": 25
    }],
    "layout": {
        "title": "Distribution of Variable",
        "xaxis": {"title": "Value"},
        "yaxis": {"title": "Frequency"}
    }
}"##;

const PIE_TEMPLATE: &str = r##"{
    "data": [{
        "labels": ["Label1", "Label2", "Label3"],
        "values": [value1, value2, value3],
        "type": "pie",
        "hole": 0.4,
        "marker": {"colors": ["#8b5cf6", "#3b82f6", "#10b981"]}
    }],
    "layout": {"title": "Pie Chart Title"}
}"##;

/// Example document skeleton for the prompt. Kinds without their own
/// skeleton use the bar one.
pub fn template(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::HorizontalBar => HORIZONTAL_BAR_TEMPLATE,
        ChartKind::GroupedBar => GROUPED_BAR_TEMPLATE,
        ChartKind::Scatter => SCATTER_TEMPLATE,
        ChartKind::Histogram => HISTOGRAM_TEMPLATE,
        ChartKind::Pie => PIE_TEMPLATE,
        ChartKind::Bar | ChartKind::Line | ChartKind::Heatmap | ChartKind::Box => BAR_TEMPLATE,
    }
}
