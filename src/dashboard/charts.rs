//! Chart generation for the dashboard.
//!
//! This module creates the ECharts visualizations shown on the dashboard:
//! - **Budget vs Actual**: Planned and actual spending per category as bars
//! - **Expense Breakdown**: This month's expenses per category as a doughnut
//! - **Monthly Trend**: Income, expenses and savings per month as lines
//!
//! Charts are built with `charming` and handed to the host's [ChartHost],
//! which applies the shared [ChartDefaults] and renders them.

use charming::{
    Chart,
    component::{Axis, Grid, Legend},
    element::{
        AreaStyle, AxisLabel, AxisType, Color, ItemStyle, JsFunction, LineStyle, Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    context::{ChartHost, Document},
    dashboard::data::{BudgetComparison, DashboardData, ExpenseBreakdown, MonthlyTrend},
    format::js_number_string,
};

/// The element that holds the budget vs actual chart.
pub const BUDGET_VS_ACTUAL_CHART_ID: &str = "budgetVsActualChart";
/// The element that holds the expense breakdown chart.
pub const EXPENSE_CHART_ID: &str = "expensePieChart";
/// The element that holds the monthly trend chart.
pub const MONTHLY_TREND_CHART_ID: &str = "monthlyTrendChart";

/// CSS custom property with the colour of chart text.
pub const TEXT_LIGHT_VAR: &str = "--text-light";
/// CSS custom property with the border colour of the budget series.
pub const PRIMARY_COLOR_VAR: &str = "--primary-color";
/// CSS custom property with the fill colour of the budget series.
pub const PRIMARY_TRANSPARENT_VAR: &str = "--primary-transparent";
/// CSS custom property with the border colour of the actual series.
pub const SECONDARY_COLOR_VAR: &str = "--secondary-color";
/// CSS custom property with the fill colour of the actual series.
pub const SECONDARY_TRANSPARENT_VAR: &str = "--secondary-transparent";

/// Slice colours of the expense breakdown, in order.
pub const EXPENSE_PALETTE: [&str; 8] = [
    "#4caf50", // Green
    "#2196f3", // Blue
    "#ff9800", // Orange
    "#9c27b0", // Purple
    "#f44336", // Red
    "#00bcd4", // Cyan
    "#3f51b5", // Indigo
    "#e91e63", // Pink
];

const INCOME_COLOR: &str = "#4caf50";
const INCOME_FILL: &str = "rgba(76, 175, 80, 0.1)";
const EXPENSES_COLOR: &str = "#f44336";
const EXPENSES_FILL: &str = "rgba(244, 67, 54, 0.1)";
const SAVINGS_COLOR: &str = "#2196f3";
const SAVINGS_FILL: &str = "rgba(33, 150, 243, 0.1)";

/// Formats currency like [crate::format::format_currency], shared by the embedded formatters.
const FORMAT_CURRENCY_JS: &str =
    "const formatCurrency = (value) => '$' + Number.parseFloat(value).toFixed(2);";

/// Visual defaults shared by every chart on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDefaults {
    /// The font family of all chart text.
    pub font_family: String,
    /// The font size of all chart text in pixels.
    pub font_size: u32,
    /// The colour of all chart text, read from `--text-light`.
    pub text_color: String,
    /// Tooltip styling.
    pub tooltip: TooltipDefaults,
    /// Legend styling.
    pub legend: LegendDefaults,
}

/// Tooltip styling shared by every chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipDefaults {
    /// The tooltip's background, a translucent dark grey.
    pub background_color: String,
    /// Colour of the tooltip's first line.
    pub title_color: String,
    /// Colour of the remaining lines.
    pub body_color: String,
    /// Space between the border and the text, in pixels.
    pub padding: u32,
    /// Border radius, in pixels.
    pub corner_radius: u32,
    /// Show the series colour marker next to each value.
    pub display_colors: bool,
    /// Space between the colour marker and the value, in pixels.
    pub box_padding: u32,
}

/// Legend styling shared by every chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendDefaults {
    /// Use a round marker instead of a box.
    pub use_point_style: bool,
    /// Size of the marker, in pixels.
    pub point_style_width: u32,
    /// Space between legend entries, in pixels.
    pub padding: u32,
}

impl ChartDefaults {
    /// The dashboard's defaults with chart text in `text_color`.
    pub fn new(text_color: impl Into<String>) -> Self {
        Self {
            font_family: "'Inter', sans-serif".to_owned(),
            font_size: 12,
            text_color: text_color.into(),
            tooltip: TooltipDefaults {
                background_color: "rgba(0, 0, 0, 0.7)".to_owned(),
                title_color: "#fff".to_owned(),
                body_color: "#fff".to_owned(),
                padding: 10,
                corner_radius: 6,
                display_colors: true,
                box_padding: 6,
            },
            legend: LegendDefaults {
                use_point_style: true,
                point_style_width: 10,
                padding: 15,
            },
        }
    }

    /// The defaults expressed as a partial ECharts option.
    ///
    /// Hosts merge this under every chart's own option, so values set by the
    /// chart itself take precedence.
    pub fn echarts_option(&self) -> Value {
        let tooltip = &self.tooltip;
        let legend = &self.legend;
        let text_style = json!({
            "fontFamily": self.font_family,
            "fontSize": self.font_size,
            "color": self.text_color,
        });

        json!({
            "textStyle": text_style,
            "tooltip": {
                "backgroundColor": tooltip.background_color,
                "borderWidth": 0,
                "padding": tooltip.padding,
                "extraCssText": format!("border-radius: {}px;", tooltip.corner_radius),
                "textStyle": {
                    "fontFamily": self.font_family,
                    "fontSize": self.font_size,
                    "color": tooltip.body_color,
                },
            },
            "legend": {
                "icon": if legend.use_point_style { "circle" } else { "rect" },
                "itemWidth": legend.point_style_width,
                "itemHeight": legend.point_style_width,
                "itemGap": legend.padding,
                "textStyle": text_style,
            },
        })
    }
}

/// Border and fill colours of the budget vs actual series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesColors {
    pub primary: String,
    pub primary_transparent: String,
    pub secondary: String,
    pub secondary_transparent: String,
}

impl SeriesColors {
    /// Reads the colours from the document's CSS custom properties.
    pub fn from_document<D: Document>(document: &D) -> Self {
        Self {
            primary: document.css_variable(PRIMARY_COLOR_VAR),
            primary_transparent: document.css_variable(PRIMARY_TRANSPARENT_VAR),
            secondary: document.css_variable(SECONDARY_COLOR_VAR),
            secondary_transparent: document.css_variable(SECONDARY_TRANSPARENT_VAR),
        }
    }
}

/// Sets the chart defaults and mounts every chart whose element is on the page.
///
/// Does nothing if the host has no charting library. Charts whose element is
/// missing are skipped silently. A chart the host fails to mount is logged
/// and skipped without affecting the others.
///
/// # Returns
/// The ids of the elements that received a chart.
pub fn initialize_charts<C>(context: &mut C, data: &DashboardData) -> Vec<&'static str>
where
    C: Document + ChartHost,
{
    if !context.is_available() {
        tracing::debug!("No charting library on the page, skipping charts.");
        return Vec::new();
    }

    let defaults = ChartDefaults::new(context.css_variable(TEXT_LIGHT_VAR));
    context.apply_defaults(&defaults);

    let mut mounted = Vec::new();

    if context.get_element_by_id(BUDGET_VS_ACTUAL_CHART_ID).is_some() {
        let colors = SeriesColors::from_document(context);
        let chart = budget_vs_actual_chart(&data.budget_vs_actual, &colors, &defaults.tooltip);
        mount_chart(context, BUDGET_VS_ACTUAL_CHART_ID, chart, &mut mounted);
    }

    if context.get_element_by_id(EXPENSE_CHART_ID).is_some() {
        let chart = expense_breakdown_chart(&data.expense_breakdown, &defaults.tooltip);
        mount_chart(context, EXPENSE_CHART_ID, chart, &mut mounted);
    }

    if context.get_element_by_id(MONTHLY_TREND_CHART_ID).is_some() {
        let chart = monthly_trend_chart(&data.monthly_trend, &defaults.tooltip);
        mount_chart(context, MONTHLY_TREND_CHART_ID, chart, &mut mounted);
    }

    mounted
}

fn mount_chart<C: ChartHost>(
    context: &mut C,
    element_id: &'static str,
    chart: Chart,
    mounted: &mut Vec<&'static str>,
) {
    match context.mount(element_id, chart) {
        Ok(()) => mounted.push(element_id),
        Err(error) => tracing::warn!("Could not create the chart in #{element_id}: {error}"),
    }
}

/// Bars of the allocated and spent amount per category.
pub fn budget_vs_actual_chart(
    data: &BudgetComparison,
    colors: &SeriesColors,
    tooltip: &TooltipDefaults,
) -> Chart {
    Chart::new()
        .tooltip(series_tooltip(tooltip))
        .legend(Legend::new())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(data.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Budget")
                .item_style(
                    ItemStyle::new()
                        .color(colors.primary_transparent.as_str())
                        .border_color(colors.primary.as_str())
                        .border_width(1),
                )
                .data(data.budget.clone()),
        )
        .series(
            Bar::new()
                .name("Actual")
                .item_style(
                    ItemStyle::new()
                        .color(colors.secondary_transparent.as_str())
                        .border_color(colors.secondary.as_str())
                        .border_width(1),
                )
                .data(data.actual.clone()),
        )
}

/// A doughnut with one slice per expense category.
///
/// Values without a label get an empty label.
pub fn expense_breakdown_chart(data: &ExpenseBreakdown, tooltip: &TooltipDefaults) -> Chart {
    let slices: Vec<(f64, &str)> = data
        .values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let label = data.labels.get(index).map(String::as_str).unwrap_or("");
            (value, label)
        })
        .collect();

    Chart::new()
        .color(EXPENSE_PALETTE.iter().map(|&hex| Color::from(hex)).collect())
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .formatter(JsFunction::new_with_args(
                    "params",
                    &expense_tooltip_body(data.total(), tooltip),
                )),
        )
        .legend(Legend::new())
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["50%", "70%"])
                .item_style(ItemStyle::new().border_color("#fff").border_width(1))
                .data(slices),
        )
}

/// Smoothed, filled lines of income, expenses and savings per month.
pub fn monthly_trend_chart(data: &MonthlyTrend, tooltip: &TooltipDefaults) -> Chart {
    Chart::new()
        .tooltip(series_tooltip(tooltip))
        .legend(Legend::new())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(data.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(trend_line("Income", INCOME_COLOR, INCOME_FILL, &data.income))
        .series(trend_line(
            "Expenses",
            EXPENSES_COLOR,
            EXPENSES_FILL,
            &data.expenses,
        ))
        .series(trend_line("Savings", SAVINGS_COLOR, SAVINGS_FILL, &data.savings))
}

fn trend_line(name: &str, color: &str, fill: &str, values: &[f64]) -> Line {
    Line::new()
        .name(name)
        .smooth(true)
        .item_style(ItemStyle::new().color(color))
        .line_style(LineStyle::new().color(color))
        .area_style(AreaStyle::new().color(fill))
        .data(values.to_vec())
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args("value", "return '$' + Number.parseFloat(value).toFixed(2);")
}

/// An axis tooltip: the category, then `"<series>: $<value>"` per series.
fn series_tooltip(tooltip: &TooltipDefaults) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .formatter(JsFunction::new_with_args("params", &series_tooltip_body(tooltip)))
}

/// The JavaScript that renders a series marker, or nothing when markers are hidden.
fn marker_js(tooltip: &TooltipDefaults, marker: &str) -> String {
    if tooltip.display_colors {
        format!(
            "'<span style=\"display: inline-block; margin-right: {}px;\">' + {marker} + '</span>'",
            tooltip.box_padding
        )
    } else {
        "''".to_owned()
    }
}

fn series_tooltip_body(tooltip: &TooltipDefaults) -> String {
    format!(
        "{FORMAT_CURRENCY_JS} \
        const items = Array.isArray(params) ? params : [params]; \
        if (items.length === 0) return ''; \
        const title = '<span style=\"color: {title_color};\">' + items[0].name + '</span>'; \
        const lines = items.map((item) => {marker} + item.seriesName + ': ' + formatCurrency(item.value)); \
        return [title].concat(lines).join('<br/>');",
        title_color = tooltip.title_color,
        marker = marker_js(tooltip, "item.marker"),
    )
}

/// The slice tooltip, `"<label>: $<value> (<percentage>%)"`.
///
/// The percentage is the slice's share of `total` rounded to a whole number.
/// A missing label is shown as empty and a missing value as zero.
fn expense_tooltip_body(total: f64, tooltip: &TooltipDefaults) -> String {
    format!(
        "{FORMAT_CURRENCY_JS} \
        const total = {total}; \
        const label = params.name || ''; \
        const value = params.value || 0; \
        const percentage = Math.round((value / total) * 100); \
        return {marker} + label + ': ' + formatCurrency(value) + ' (' + percentage + '%)';",
        total = js_number_string(total),
        marker = marker_js(tooltip, "params.marker"),
    )
}
