//! Card components for the dashboard page.
//!
//! Provides the server-rendered cards:
//! - Month-to-date income, expenses and savings compared with last month
//! - One progress card per budget, already showing the current progress
//! - The categories with the largest expenses this month
//! - The latest transactions

use maud::{Markup, html};
use time::Date;

use crate::{
    dashboard::{
        data::{BudgetStatus, MonthSummary, RecentTransaction, TopExpense},
        progress::{BudgetProgress, budget_element_id},
    },
    format::{format_currency, format_percentage},
};

/// The most rows shown in the top expenses and recent transactions lists.
const LIST_LIMIT: usize = 5;

/// Whether an increase in a figure is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    HigherIsBetter,
    LowerIsBetter,
}

/// Renders the month summary cards, or nothing if there is no summary.
pub(super) fn summary_cards_view(summary: Option<&MonthSummary>) -> Markup {
    let Some(summary) = summary else {
        return html!();
    };

    html! {
        section id="summary" class="summary-cards" {
            (summary_card("Income", summary.income, summary.income_change(), Trend::HigherIsBetter))
            (summary_card("Expenses", summary.expenses, summary.expense_change(), Trend::LowerIsBetter))
            (summary_card("Savings", summary.savings(), summary.savings_change(), Trend::HigherIsBetter))
        }
    }
}

fn summary_card(title: &str, amount: f64, change: f64, trend: Trend) -> Markup {
    let is_good = match trend {
        Trend::HigherIsBetter => change >= 0.0,
        Trend::LowerIsBetter => change <= 0.0,
    };
    let change_class = if is_good {
        "change change-positive"
    } else {
        "change change-negative"
    };
    let arrow = if change >= 0.0 { "↑" } else { "↓" };

    html! {
        div class="card summary-card" {
            h3 class="card-title" { (title) }
            div class="card-amount" { (format_currency(amount)) }
            div class=(change_class) {
                (arrow) " " (format_percentage(change.abs())) " from last month"
            }
        }
    }
}

/// Renders a progress card for every budget.
///
/// The bars are rendered with their current progress so the page is
/// correct before any script runs.
pub(super) fn budget_cards_view(budgets: &[BudgetStatus], today: Date) -> Markup {
    html! {
        section id="budgets" class="budget-cards" {
            h2 class="section-title" { "Budgets" }

            @if budgets.is_empty() {
                p class="empty-state" { "No budgets set up yet." }
            } @else {
                div class="card-grid" {
                    @for budget in budgets {
                        (budget_card(budget, today))
                    }
                }
            }
        }
    }
}

fn budget_card(budget: &BudgetStatus, today: Date) -> Markup {
    let progress = BudgetProgress::new(budget.spent, budget.allocated);
    let period_start = budget.period.start_date(today);

    html! {
        div id=(budget_element_id(budget.id)) class="card budget-card" {
            div class="budget-header" {
                h3 class="card-title" { (budget.category) }
                span class="budget-period" {
                    (budget.period.label()) " since " (period_start)
                }
            }

            (progress_bar(&progress))

            div class="budget-details" {
                span class="spent" {
                    (format_currency(budget.spent)) " of " (format_currency(budget.allocated))
                }
                span class="percentage" { (progress.percentage_label()) }
            }

            div class="budget-remaining" {
                "Remaining: " span class="remaining" { (progress.remaining_label()) }
            }
        }
    }
}

/// Renders a progress bar in the state [crate::dashboard::update_budget_progress] leaves it.
fn progress_bar(progress: &BudgetProgress) -> Markup {
    html! {
        div class="progress" role="progressbar" aria-valuemin="0" aria-valuemax="100" {
            div
                class=(format!("progress-bar {}", progress.severity().css_class()))
                style=(format!("width: {}", progress.width()))
            {}
        }
    }
}

/// Renders the largest expenses this month, largest first.
pub(super) fn top_expenses_view(expenses: &[TopExpense]) -> Markup {
    let mut expenses: Vec<&TopExpense> = expenses.iter().collect();
    expenses.sort_by(|a, b| b.total.total_cmp(&a.total));
    expenses.truncate(LIST_LIMIT);

    html! {
        section id="top-expenses" class="card top-expenses" {
            h2 class="section-title" { "Top Expenses" }

            @if expenses.is_empty() {
                p class="empty-state" { "No expenses this month." }
            } @else {
                ol class="expense-list" {
                    @for expense in expenses {
                        li class="expense-item" {
                            span class="expense-category" { (expense.category) }
                            span class="expense-amount" { (format_currency(expense.total)) }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the latest transactions, newest first.
///
/// Transactions on the same day keep the order they were given in.
pub(super) fn recent_transactions_view(transactions: &[RecentTransaction]) -> Markup {
    let mut transactions: Vec<&RecentTransaction> = transactions.iter().collect();
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions.truncate(LIST_LIMIT);

    html! {
        section id="recent-transactions" class="card recent-transactions" {
            h2 class="section-title" { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="empty-state" { "No transactions yet." }
            } @else {
                table class="transaction-table" {
                    thead {
                        tr {
                            th { "Date" }
                            th { "Description" }
                            th { "Category" }
                            th class="amount" { "Amount" }
                        }
                    }
                    tbody {
                        @for transaction in &transactions {
                            tr class="transaction-row" {
                                td class="transaction-date" { (transaction.date) }
                                td class="transaction-description" { (transaction.description) }
                                td class="transaction-category" { (transaction.category) }
                                td class="amount" { (format_currency(transaction.amount)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
