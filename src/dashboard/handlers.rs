//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and serving its data
//! - HTML view functions for rendering the dashboard UI
//! - State and query types used by the handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    dashboard::{
        DASHBOARD_DATA_ID,
        cards::{
            budget_cards_view, recent_transactions_view, summary_cards_view, top_expenses_view,
        },
        charts::{BUDGET_VS_ACTUAL_CHART_ID, EXPENSE_CHART_ID, MONTHLY_TREND_CHART_ID},
        data::{DashboardData, Message},
    },
    endpoints,
    html::{
        ECHARTS_SCRIPT, HeadElement, base, json_script, link, palette_style, wasm_bootstrap,
    },
    navigation::NavBar,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The data shown on the dashboard.
    pub data: Arc<DashboardData>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            data: state.dashboard_data.clone(),
        }
    }
}

/// The date range picked in the dashboard's filter form.
///
/// Values are echoed back into the form as typed. Empty fields stay empty so
/// the date pickers show their placeholder.
#[derive(Debug, Default, Deserialize)]
pub struct DateFilter {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// A chart container on the dashboard page.
struct ChartContainer {
    id: &'static str,
    title: &'static str,
}

const CHART_CONTAINERS: [ChartContainer; 3] = [
    ChartContainer {
        id: BUDGET_VS_ACTUAL_CHART_ID,
        title: "Budget vs Actual",
    },
    ChartContainer {
        id: EXPENSE_CHART_ID,
        title: "Expense Breakdown",
    },
    ChartContainer {
        id: MONTHLY_TREND_CHART_ID,
        title: "Monthly Trend",
    },
];

/// Display a page with an overview of the user's budgets and spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(filter): Query<DateFilter>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);
    let data = state.data.as_ref();

    if data.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, data).into_response());
    }

    let data_json = data
        .to_json()
        .inspect_err(|error| tracing::error!("could not serialize dashboard data: {error}"))?;

    Ok(dashboard_view(nav_bar, data, &data_json, &filter, local_today()).into_response())
}

/// Get the dashboard data as JSON.
pub async fn get_dashboard_api(State(state): State<DashboardState>) -> Json<DashboardData> {
    Json(state.data.as_ref().clone())
}

/// Today's date in the server's local timezone, or in UTC if that is unknown.
fn local_today() -> Date {
    OffsetDateTime::now_local()
        .inspect_err(|error| tracing::debug!("could not get local time, using UTC: {error}"))
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Renders the dashboard page when there is no data to show.
fn dashboard_no_data_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();
    let api_link = link(endpoints::DASHBOARD_API, "dashboard data");

    let content = html!(
        (nav_bar)
        (messages_view(&data.messages))

        main class="dashboard empty"
        {
            h2 { "Nothing here yet..." }

            p
            {
                "Charts and budgets will show up here once the server is given
                some " (api_link) "."
            }
        }
    );

    base("Dashboard", &[palette_style(&data.palette), wasm_bootstrap()], &content)
}

/// Renders the main dashboard page with cards, charts and the filter form.
fn dashboard_view(
    nav_bar: NavBar,
    data: &DashboardData,
    data_json: &str,
    filter: &DateFilter,
    today: Date,
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)
        (messages_view(&data.messages))

        main id="dashboard-content" class="dashboard"
        {
            (date_filter_view(filter))
            (summary_cards_view(data.summary.as_ref()))

            section id="charts" class="chart-grid"
            {
                @for chart in &CHART_CONTAINERS {
                    div class="card chart-card"
                    {
                        h2 class="section-title" { (chart.title) }
                        div id=(chart.id) class="chart" {}
                    }
                }
            }

            div class="dashboard-columns"
            {
                (budget_cards_view(&data.budgets, today))
                (top_expenses_view(&data.top_expenses))
            }

            (recent_transactions_view(&data.recent_transactions))
        }

        (json_script(DASHBOARD_DATA_ID, data_json))
    );

    let head_elements = [
        palette_style(&data.palette),
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        wasm_bootstrap(),
    ];
    base("Dashboard", &head_elements, &content)
}

fn messages_view(messages: &[Message]) -> Markup {
    html!(
        @if !messages.is_empty() {
            div class="messages"
            {
                @for message in messages {
                    div class=(format!("message {}", message.level.css_class())) role="status"
                    {
                        (message.text)
                    }
                }
            }
        }
    )
}

/// The date range form.
///
/// The inputs start out as text inputs so the placeholder shows, the page
/// script turns them into date inputs while focused.
fn date_filter_view(filter: &DateFilter) -> Markup {
    html!(
        form method="get" action=(endpoints::DASHBOARD_VIEW) class="date-filter"
        {
            label for="start_date" { "From" }
            input
                type="text"
                id="start_date"
                name="start_date"
                class="date-picker"
                placeholder="Start date"
                value=(filter.start_date);

            label for="end_date" { "To" }
            input
                type="text"
                id="end_date"
                name="end_date"
                class="date-picker"
                placeholder="End date"
                value=(filter.end_date);

            button type="submit" class="button" { "Filter" }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        Json,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};
    use time::macros::date;

    use super::{DashboardState, DateFilter, get_dashboard_api, get_dashboard_page};
    use crate::{
        context::{Document, PreferenceStore},
        dashboard::{
            BudgetComparison, BudgetPeriod, BudgetStatus, DARK_THEME_CLASS, DASHBOARD_DATA_ID,
            DashboardData, ExpenseBreakdown, Message, MessageLevel, MonthSummary, MonthlyTrend,
            RecentTransaction, THEME_KEY, TopExpense, initialize,
        },
        dom::VirtualDocument,
        test_utils::{assert_exists, assert_valid_html, parse_html_document, select_text},
    };

    fn sample_data() -> DashboardData {
        DashboardData {
            budget_vs_actual: BudgetComparison {
                labels: vec!["Groceries".to_owned(), "Rent".to_owned()],
                budget: vec![400.0, 1500.0],
                actual: vec![320.0, 1500.0],
            },
            expense_breakdown: ExpenseBreakdown {
                labels: vec!["Groceries".to_owned(), "Rent".to_owned()],
                values: vec![320.0, 1500.0],
            },
            monthly_trend: MonthlyTrend {
                labels: vec!["Jan".to_owned(), "Feb".to_owned()],
                income: vec![4000.0, 4100.0],
                expenses: vec![2900.0, 3100.0],
                savings: vec![1100.0, 1000.0],
            },
            budgets: vec![
                BudgetStatus {
                    id: 1,
                    category: "Groceries".to_owned(),
                    period: BudgetPeriod::Monthly,
                    spent: 320.0,
                    allocated: 400.0,
                },
                BudgetStatus {
                    id: 2,
                    category: "Eating out".to_owned(),
                    period: BudgetPeriod::Weekly,
                    spent: 90.0,
                    allocated: 60.0,
                },
            ],
            summary: Some(MonthSummary {
                income: 4100.0,
                expenses: 3100.0,
                previous_income: 4000.0,
                previous_expenses: 2900.0,
            }),
            top_expenses: vec![TopExpense {
                category: "Rent".to_owned(),
                total: 1500.0,
            }],
            recent_transactions: vec![RecentTransaction {
                date: date!(2024 - 02 - 14),
                description: "Weekly shop".to_owned(),
                category: "Groceries".to_owned(),
                amount: 82.4,
            }],
            messages: vec![Message {
                level: MessageLevel::Success,
                text: "Budget saved".to_owned(),
            }],
            ..Default::default()
        }
    }

    fn state_with(data: DashboardData) -> State<DashboardState> {
        State(DashboardState {
            data: Arc::new(data),
        })
    }

    async fn render_page(data: DashboardData) -> Html {
        let response = get_dashboard_page(state_with(data), Query(DateFilter::default()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        parse_html_document(response).await
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let html = render_page(sample_data()).await;

        assert_valid_html(&html);
        for selector in [
            "#budgetVsActualChart",
            "#expensePieChart",
            "#monthlyTrendChart",
            ".dropdown-trigger + .dropdown",
            "#theme-toggle-checkbox",
            ".message.message-success",
            "input.date-picker[type=text]",
            "#budget-1 .progress-bar",
            "#budget-1 .percentage",
            "#budget-1 .remaining",
            "#budget-2 .progress-bar.progress-bar-danger",
            "#recent-transactions .transaction-row",
            "script[type=\"application/json\"]#dashboard-data",
            "script[src=\"/static/echarts.min.js\"]",
            "script[type=module]",
        ] {
            assert_exists(&html, selector);
        }
    }

    #[tokio::test]
    async fn embedded_data_round_trips() {
        let data = sample_data();
        let html = render_page(data.clone()).await;

        let json = select_text(&html, &format!("#{DASHBOARD_DATA_ID}"));

        assert_eq!(DashboardData::from_json(&json).unwrap(), data);
    }

    #[tokio::test]
    async fn palette_is_published_as_css_variables() {
        let html = render_page(sample_data()).await;

        let selector = Selector::parse("style").unwrap();
        let css: String = html.select(&selector).flat_map(|style| style.text()).collect();

        assert!(css.contains("--primary-color: #4361ee;"));
    }

    #[tokio::test]
    async fn date_filter_is_echoed_back() {
        let filter = DateFilter {
            start_date: "2024-01-01".to_owned(),
            end_date: String::new(),
        };

        let response = get_dashboard_page(state_with(sample_data()), Query(filter))
            .await
            .unwrap();
        let html = parse_html_document(response).await;

        let selector = Selector::parse("input#start_date").unwrap();
        let input = html.select(&selector).next().unwrap();
        assert_eq!(input.value().attr("value"), Some("2024-01-01"));
    }

    #[tokio::test]
    async fn empty_data_shows_empty_state() {
        let html = render_page(DashboardData::default()).await;

        assert_valid_html(&html);
        assert_eq!(select_text(&html, "h2"), "Nothing here yet...");

        let chart = Selector::parse("#budgetVsActualChart").unwrap();
        assert!(html.select(&chart).next().is_none());
    }

    #[tokio::test]
    async fn api_returns_the_data() {
        let data = sample_data();

        let Json(got) = get_dashboard_api(state_with(data.clone())).await;

        assert_eq!(got, data);
    }

    #[tokio::test]
    async fn rendered_page_initializes_in_the_browser_model() {
        let data = sample_data();
        let response = get_dashboard_page(state_with(data.clone()), Query(DateFilter::default()))
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let mut document = VirtualDocument::from_html(&String::from_utf8_lossy(&body));
        document.set_item(THEME_KEY, "dark");

        let summary = initialize(&mut document, &data);

        assert_eq!(summary.charts.len(), 3);
        assert_eq!(summary.budgets, 2);
        let body = document.body_element();
        assert!(document.has_class(&body, DARK_THEME_CLASS));

        let trigger = document.query_selector(".dropdown-trigger").unwrap();
        document.click(trigger);
        let dropdown = document.query_selector(".dropdown").unwrap();
        assert!(document.has_class(&dropdown, "open"));

        document.advance(Duration::from_millis(5500));
        assert!(document.query_selector(".message").is_none());
    }
}
