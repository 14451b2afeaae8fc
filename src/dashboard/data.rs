//! The data the dashboard displays.
//!
//! Everything here is supplied from outside (a JSON file on the server, an
//! embedded JSON document in the browser) and treated as read-only. Every
//! collection defaults to empty so partial documents still load.

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::Error;

/// The identifier of a budget, used in the `budget-<id>` element ids.
pub type BudgetId = i64;

/// All data shown on the dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    /// Planned vs actual spending per category.
    pub budget_vs_actual: BudgetComparison,
    /// This month's expenses per category.
    pub expense_breakdown: ExpenseBreakdown,
    /// Income, expenses and savings per month.
    pub monthly_trend: MonthlyTrend,
    /// The budgets to show progress bars for.
    pub budgets: Vec<BudgetStatus>,
    /// Month-to-date totals compared with the previous month.
    pub summary: Option<MonthSummary>,
    /// The categories with the largest expenses this month.
    pub top_expenses: Vec<TopExpense>,
    /// The latest transactions, in any order.
    pub recent_transactions: Vec<RecentTransaction>,
    /// Flash messages shown as banners at the top of the page.
    pub messages: Vec<Message>,
    /// The colours exposed to the page as CSS custom properties.
    pub palette: Palette,
}

impl DashboardData {
    /// Parses dashboard data from a JSON document.
    ///
    /// # Errors
    /// Returns [Error::InvalidDashboardData] if `json` is not valid dashboard data.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|error| Error::InvalidDashboardData(error.to_string()))
    }

    /// Serializes the data as a JSON document.
    ///
    /// # Errors
    /// Returns [Error::JsonSerialization] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|error| Error::JsonSerialization(error.to_string()))
    }

    /// Whether there is nothing to chart or track.
    pub fn is_empty(&self) -> bool {
        self.budget_vs_actual.labels.is_empty()
            && self.expense_breakdown.labels.is_empty()
            && self.monthly_trend.labels.is_empty()
            && self.budgets.is_empty()
            && self.summary.is_none()
            && self.top_expenses.is_empty()
            && self.recent_transactions.is_empty()
    }
}

/// Datasets for the budget vs actual bar chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetComparison {
    /// Category names along the x axis.
    pub labels: Vec<String>,
    /// The allocated amount per category.
    pub budget: Vec<f64>,
    /// The amount spent per category.
    pub actual: Vec<f64>,
}

/// Datasets for the expense breakdown doughnut chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseBreakdown {
    /// Category names, one per slice.
    pub labels: Vec<String>,
    /// The amount spent per category.
    pub values: Vec<f64>,
}

impl ExpenseBreakdown {
    /// The sum of all slices.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Datasets for the monthly trend line chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyTrend {
    /// Month names along the x axis.
    pub labels: Vec<String>,
    /// Total income per month.
    pub income: Vec<f64>,
    /// Total expenses per month.
    pub expenses: Vec<f64>,
    /// Income minus expenses per month.
    pub savings: Vec<f64>,
}

/// How often a budget's allocation resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Resets every day.
    Daily,
    /// Resets every Monday.
    Weekly,
    /// Resets on the first of every month.
    #[default]
    Monthly,
}

impl BudgetPeriod {
    /// The first day of the period that contains `today`.
    pub fn start_date(self, today: Date) -> Date {
        match self {
            BudgetPeriod::Daily => today,
            BudgetPeriod::Weekly => {
                today - Duration::days(i64::from(today.weekday().number_days_from_monday()))
            }
            BudgetPeriod::Monthly => today - Duration::days(i64::from(today.day()) - 1),
        }
    }

    /// A human readable name, e.g. "Weekly".
    pub fn label(self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "Daily",
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Monthly => "Monthly",
        }
    }
}

/// How much of a budget has been used in the current period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// The budget's identifier.
    pub id: BudgetId,
    /// The category the budget applies to.
    pub category: String,
    /// How often the budget resets.
    #[serde(default)]
    pub period: BudgetPeriod,
    /// The amount spent so far this period.
    pub spent: f64,
    /// The amount planned for the period.
    pub allocated: f64,
}

/// Month-to-date totals and the previous month's totals for comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthSummary {
    /// Income so far this month.
    pub income: f64,
    /// Expenses so far this month.
    pub expenses: f64,
    /// Last month's income.
    pub previous_income: f64,
    /// Last month's expenses.
    pub previous_expenses: f64,
}

impl MonthSummary {
    /// Income minus expenses so far this month.
    pub fn savings(&self) -> f64 {
        self.income - self.expenses
    }

    /// Last month's income minus expenses.
    pub fn previous_savings(&self) -> f64 {
        self.previous_income - self.previous_expenses
    }

    /// Percentage change in income since last month.
    pub fn income_change(&self) -> f64 {
        percentage_change(self.income, self.previous_income)
    }

    /// Percentage change in expenses since last month.
    pub fn expense_change(&self) -> f64 {
        percentage_change(self.expenses, self.previous_expenses)
    }

    /// Percentage change in savings since last month.
    pub fn savings_change(&self) -> f64 {
        percentage_change(self.savings(), self.previous_savings())
    }
}

/// The change from `previous` to `current` as a percentage of `previous`.
///
/// Zero when `previous` is not positive, since there is nothing meaningful
/// to compare against.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// A category and how much was spent on it this month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopExpense {
    /// The category name.
    pub category: String,
    /// The amount spent.
    pub total: f64,
}

time::serde::format_description!(transaction_date, Date, "[year]-[month]-[day]");

/// A transaction in the recent activity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransaction {
    /// The day the transaction happened, written as `YYYY-MM-DD`.
    #[serde(with = "transaction_date")]
    pub date: Date,
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The category name.
    #[serde(default)]
    pub category: String,
    /// The transaction amount.
    pub amount: f64,
}

/// The severity of a flash message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    /// An action completed.
    Success,
    /// Neutral information.
    #[default]
    Info,
    /// Something needs attention.
    Warning,
    /// An action failed.
    Error,
}

impl MessageLevel {
    /// The CSS class that styles a banner of this level.
    pub fn css_class(self) -> &'static str {
        match self {
            MessageLevel::Success => "message-success",
            MessageLevel::Info => "message-info",
            MessageLevel::Warning => "message-warning",
            MessageLevel::Error => "message-error",
        }
    }
}

/// A flash message shown once at the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// How the banner is styled.
    #[serde(default)]
    pub level: MessageLevel,
    /// The text to show.
    pub text: String,
}

/// Colours published on the page root as CSS custom properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// `--text-light`, used for chart text.
    pub text_light: String,
    /// `--primary-color`, the budget series border.
    pub primary_color: String,
    /// `--primary-transparent`, the budget series fill.
    pub primary_transparent: String,
    /// `--secondary-color`, the actual series border.
    pub secondary_color: String,
    /// `--secondary-transparent`, the actual series fill.
    pub secondary_transparent: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text_light: "#6b7280".to_owned(),
            primary_color: "#4361ee".to_owned(),
            primary_transparent: "rgba(67, 97, 238, 0.2)".to_owned(),
            secondary_color: "#f72585".to_owned(),
            secondary_transparent: "rgba(247, 37, 133, 0.2)".to_owned(),
        }
    }
}

impl Palette {
    /// The custom property names paired with their values.
    pub fn css_variables(&self) -> [(&'static str, &str); 5] {
        [
            ("--text-light", &self.text_light),
            ("--primary-color", &self.primary_color),
            ("--primary-transparent", &self.primary_transparent),
            ("--secondary-color", &self.secondary_color),
            ("--secondary-transparent", &self.secondary_transparent),
        ]
    }
}
