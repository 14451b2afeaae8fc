//! Dashboard module
//!
//! The budget dashboard: its data model, the charts, the budget progress
//! bars and the small interactive widgets on the page. [initialize] wires
//! all of it up against a [RenderContext] once the page has loaded.
//!
//! On the server the module also renders the dashboard page itself.

mod charts;
mod data;
mod interactions;
mod progress;
mod theme;

#[cfg(not(target_arch = "wasm32"))]
mod cards;
#[cfg(not(target_arch = "wasm32"))]
mod handlers;

pub use charts::{
    BUDGET_VS_ACTUAL_CHART_ID, ChartDefaults, EXPENSE_CHART_ID, LegendDefaults,
    MONTHLY_TREND_CHART_ID, SeriesColors, TooltipDefaults, budget_vs_actual_chart,
    expense_breakdown_chart, initialize_charts, monthly_trend_chart,
};
pub use data::{
    BudgetComparison, BudgetId, BudgetPeriod, BudgetStatus, DashboardData, ExpenseBreakdown,
    Message, MessageLevel, MonthSummary, MonthlyTrend, Palette, RecentTransaction, TopExpense,
    percentage_change,
};
pub use interactions::{
    handle_event, initialize_date_pickers, initialize_dropdowns, run_task,
    schedule_message_dismissal,
};
pub use progress::{BudgetProgress, Severity, budget_element_id, update_budget_progress};
pub use theme::{DARK_THEME_CLASS, THEME_KEY, THEME_TOGGLE_ID, Theme, initialize_theme_toggle};

#[cfg(not(target_arch = "wasm32"))]
pub use handlers::{get_dashboard_api, get_dashboard_page};

use crate::context::RenderContext;

/// The id of the `<script type="application/json">` element holding the page's data.
pub const DASHBOARD_DATA_ID: &str = "dashboard-data";

/// What [initialize] set up on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitSummary {
    /// The ids of the elements that received a chart.
    pub charts: Vec<&'static str>,
    /// The number of event listeners attached.
    pub listeners: usize,
    /// The number of budgets whose progress bar was updated.
    pub budgets: usize,
}

/// Sets up the whole dashboard once the page has loaded.
///
/// Runs every step exactly once and in this order: charts, date pickers,
/// dropdowns, the message timer, the theme toggle and finally the progress
/// bar of every budget in `data`. Steps whose elements are missing from the
/// page do nothing.
pub fn initialize<C: RenderContext>(context: &mut C, data: &DashboardData) -> InitSummary {
    let charts = initialize_charts(context, data);

    let mut listeners = initialize_date_pickers(context);
    listeners += initialize_dropdowns(context);
    schedule_message_dismissal(context);
    if initialize_theme_toggle(context) {
        listeners += 1;
    }

    let budgets = data
        .budgets
        .iter()
        .filter(|budget| update_budget_progress(context, budget.id, budget.spent, budget.allocated))
        .count();

    let summary = InitSummary {
        charts,
        listeners,
        budgets,
    };
    tracing::debug!("Initialized dashboard: {summary:?}");

    summary
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        context::{Document, PreferenceStore},
        dom::VirtualDocument,
    };

    fn full_page() -> VirtualDocument {
        let mut document = VirtualDocument::new();
        document.set_palette(&Palette::default());
        let body = document.body_element();

        let nav = document.append_element(body, "nav", None, &[]);
        document.append_element(nav, "a", None, &["dropdown-trigger"]);
        document.append_element(nav, "ul", None, &["dropdown"]);
        let toggle = document.append_element(nav, "input", Some(THEME_TOGGLE_ID), &[]);
        document.set_input_type(&toggle, "checkbox");

        document.append_element(body, "div", None, &["message"]);
        document.append_element(body, "input", None, &["date-picker"]);
        document.append_element(body, "input", None, &["date-picker"]);

        let card = document.append_element(body, "div", Some("budget-7"), &[]);
        document.append_element(card, "div", None, &["progress-bar"]);
        document.append_element(card, "span", None, &["percentage"]);
        document.append_element(card, "span", None, &["remaining"]);

        for id in [
            BUDGET_VS_ACTUAL_CHART_ID,
            EXPENSE_CHART_ID,
            MONTHLY_TREND_CHART_ID,
        ] {
            document.append_element(body, "div", Some(id), &[]);
        }

        document
    }

    fn data_with_budget() -> DashboardData {
        DashboardData {
            budgets: vec![BudgetStatus {
                id: 7,
                category: "Groceries".to_owned(),
                period: BudgetPeriod::Monthly,
                spent: 80.0,
                allocated: 100.0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn initializes_every_part_of_the_page() {
        let mut document = full_page();
        document.set_item(THEME_KEY, "dark");

        let summary = initialize(&mut document, &data_with_budget());

        assert_eq!(
            summary,
            InitSummary {
                charts: vec![
                    BUDGET_VS_ACTUAL_CHART_ID,
                    EXPENSE_CHART_ID,
                    MONTHLY_TREND_CHART_ID
                ],
                // Two per date picker, one trigger, the document and the theme toggle.
                listeners: 7,
                budgets: 1,
            }
        );
        assert_eq!(document.listener_count(), 7);

        let body = document.body_element();
        assert!(document.has_class(&body, DARK_THEME_CLASS));

        let bar = document.query_selector("#budget-7 .progress-bar").unwrap();
        assert_eq!(document.style(bar, "width").as_deref(), Some("80%"));
        assert!(document.has_class(&bar, "progress-bar-warning"));
    }

    #[test]
    fn message_timer_runs_after_initialization() {
        let mut document = full_page();
        initialize(&mut document, &DashboardData::default());

        document.advance(Duration::from_millis(5500));

        assert!(document.query_selector(".message").is_none());
    }

    #[test]
    fn empty_page_initializes_nothing_but_the_timer() {
        let mut document = VirtualDocument::new();

        let summary = initialize(&mut document, &data_with_budget());

        assert_eq!(summary.charts, Vec::<&str>::new());
        assert_eq!(summary.listeners, 0);
        assert_eq!(summary.budgets, 0);
        assert_eq!(document.pending_timers(), 1);
    }
}
