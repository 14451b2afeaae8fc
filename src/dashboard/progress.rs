//! Budget progress bars.
//!
//! [BudgetProgress] holds the pure calculation shared by the server-rendered
//! cards and [update_budget_progress], which writes the result into a budget
//! container on the page.

use std::fmt::Display;

use crate::{
    context::Document,
    format::{format_currency, format_percentage, js_number_string},
};

/// Percentage of the allocation at which a budget turns into a warning.
const WARNING_THRESHOLD: f64 = 75.0;
/// Percentage of the allocation at which a budget is overspent.
const DANGER_THRESHOLD: f64 = 100.0;

/// How close a budget is to being used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Less than 75% used.
    Success,
    /// At least 75% used.
    Warning,
    /// The whole allocation used, or more.
    Danger,
}

impl Severity {
    /// Every severity, in the order the thresholds are checked.
    pub const ALL: [Severity; 3] = [Severity::Danger, Severity::Warning, Severity::Success];

    /// Picks the severity for a usage percentage, the first matching threshold wins.
    ///
    /// `NaN` matches no threshold and so counts as [Severity::Success].
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= DANGER_THRESHOLD {
            Severity::Danger
        } else if percentage >= WARNING_THRESHOLD {
            Severity::Warning
        } else {
            Severity::Success
        }
    }

    /// The class that colours the progress bar.
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Success => "progress-bar-success",
            Severity::Warning => "progress-bar-warning",
            Severity::Danger => "progress-bar-danger",
        }
    }
}

/// The display state of one budget's progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetProgress {
    /// `spent / allocated * 100`, unbounded and possibly non-finite.
    pub percentage: f64,
    /// `allocated - spent`, negative when overspent.
    pub remaining: f64,
}

impl BudgetProgress {
    /// Computes the progress for `spent` out of `allocated`.
    ///
    /// Inputs are not validated: an allocation of zero gives a `NaN` or
    /// infinite percentage, which is displayed as-is.
    pub fn new(spent: f64, allocated: f64) -> Self {
        Self {
            percentage: spent / allocated * 100.0,
            remaining: allocated - spent,
        }
    }

    /// The bar width with the percentage capped at 100, e.g. `"50%"`.
    ///
    /// A `NaN` percentage stays `NaN` rather than being capped.
    pub fn width(&self) -> String {
        let capped = if self.percentage.is_nan() {
            self.percentage
        } else {
            self.percentage.min(DANGER_THRESHOLD)
        };

        format!("{}%", js_number_string(capped))
    }

    /// The percentage label, e.g. `"80.0%"`.
    pub fn percentage_label(&self) -> String {
        format_percentage(self.percentage)
    }

    /// The remaining amount label, e.g. `"$20.00"`.
    pub fn remaining_label(&self) -> String {
        format_currency(self.remaining)
    }

    /// The colour of the bar.
    pub fn severity(&self) -> Severity {
        Severity::from_percentage(self.percentage)
    }
}

/// The id of the element that wraps a budget's progress bar and labels.
pub fn budget_element_id(budget_id: impl Display) -> String {
    format!("budget-{budget_id}")
}

/// Writes the progress of a budget into its `#budget-<id>` container.
///
/// Sets the width and severity class of `.progress-bar`, the text of
/// `.percentage` and the text of `.remaining`. Does nothing at all if any of
/// the three elements is missing.
///
/// # Returns
/// Whether the elements were found and updated.
pub fn update_budget_progress<D: Document>(
    document: &mut D,
    budget_id: impl Display,
    spent: f64,
    allocated: f64,
) -> bool {
    let container = budget_element_id(budget_id);
    let progress_bar = document.query_selector(&format!("#{container} .progress-bar"));
    let percentage_element = document.query_selector(&format!("#{container} .percentage"));
    let remaining_element = document.query_selector(&format!("#{container} .remaining"));

    let (Some(progress_bar), Some(percentage_element), Some(remaining_element)) =
        (progress_bar, percentage_element, remaining_element)
    else {
        return false;
    };

    let progress = BudgetProgress::new(spent, allocated);

    document.set_style(&progress_bar, "width", &progress.width());
    document.set_text(&percentage_element, &progress.percentage_label());
    document.set_text(&remaining_element, &progress.remaining_label());

    for severity in Severity::ALL {
        document.remove_class(&progress_bar, severity.css_class());
    }
    document.add_class(&progress_bar, progress.severity().css_class());

    true
}
