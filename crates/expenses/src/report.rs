//! Aggregations feeding the dashboard, charts and notification cards.
//!
//! Everything here is a pure function of the expense list, the budget and
//! "today"; nothing reads the clock or the store.

use chrono::NaiveDate;
use serde::Serialize;

use pocketledger_core::format_amount;

use crate::date::{month_index, parse_date, weekday_index};
use crate::expense::Expense;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Amount from which an expense is reported as large.
pub const DEFAULT_LARGE_EXPENSE_THRESHOLD: f64 = 2000.0;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Placeholder shown where a card has no time to display.
pub const NO_TIME: &str = "—";

/// Presentation knobs for notification texts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub large_expense_threshold: f64,
    pub currency_symbol: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            large_expense_threshold: DEFAULT_LARGE_EXPENSE_THRESHOLD,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

pub fn total_amount(expenses: &[Expense]) -> f64 {
    expenses.iter().map(Expense::amount_value).sum()
}

/// Spend per weekday, Monday first. Expenses with unparseable dates are left out.
pub fn weekly_totals(expenses: &[Expense]) -> [f64; 7] {
    let mut totals = [0.0; 7];
    for expense in expenses {
        if let Some(date) = parse_date(&expense.date) {
            totals[weekday_index(date)] += expense.amount_value();
        }
    }
    totals
}

/// Spend per calendar month, January first, across all years.
pub fn monthly_totals(expenses: &[Expense]) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for expense in expenses {
        if let Some(date) = parse_date(&expense.date) {
            totals[month_index(date)] += expense.amount_value();
        }
    }
    totals
}

/// "Today", "Yesterday", "N days ago"; "Recently" when the date is unreadable.
pub fn relative_time(raw_date: &str, today: NaiveDate) -> String {
    let Some(date) = parse_date(raw_date) else {
        return "Recently".to_string();
    };
    match (today - date).num_days() {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d => format!("{d} days ago"),
    }
}

/// Share of the monthly budget already spent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum BudgetStatus {
    Exceeded(i64),
    Used(i64),
}

impl BudgetStatus {
    pub fn percent(self) -> i64 {
        match self {
            BudgetStatus::Exceeded(p) | BudgetStatus::Used(p) => p,
        }
    }

    pub fn message(self) -> String {
        match self {
            BudgetStatus::Exceeded(_) => "You have exceeded your monthly budget!".to_string(),
            BudgetStatus::Used(p) => format!("You have used {p}% of your monthly budget."),
        }
    }
}

/// `None` without a positive budget. The percentage is rounded half up, and
/// 100% or more counts as exceeded.
pub fn budget_status(budget: f64, total: f64) -> Option<BudgetStatus> {
    if budget <= 0.0 {
        return None;
    }
    let percent = round_half_up(total / budget * 100.0);
    Some(if percent >= 100 {
        BudgetStatus::Exceeded(percent)
    } else {
        BudgetStatus::Used(percent)
    })
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Budget left over, or the amount by which it was overshot.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum SavingsStatus {
    Saved(f64),
    Overspent(f64),
}

impl SavingsStatus {
    pub fn message(self, currency_symbol: &str) -> String {
        match self {
            SavingsStatus::Saved(v) => {
                format!("You saved {currency_symbol}{} this month.", format_amount(v))
            }
            SavingsStatus::Overspent(v) => {
                format!("You overspent by {currency_symbol}{}.", format_amount(v))
            }
        }
    }
}

pub fn savings_status(budget: f64, total: f64) -> SavingsStatus {
    let saved = budget - total;
    if saved >= 0.0 {
        SavingsStatus::Saved(saved)
    } else {
        SavingsStatus::Overspent(saved.abs())
    }
}

/// First expense, in list order, at or above `threshold`.
pub fn largest_recent_expense(expenses: &[Expense], threshold: f64) -> Option<&Expense> {
    expenses.iter().find(|e| e.amount_value() >= threshold)
}

/// A notification card: text plus a time label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notifications {
    /// Absent when no positive budget is set.
    pub budget: Option<String>,
    pub large_expense: Notification,
    pub savings: Notification,
}

pub fn notifications(
    expenses: &[Expense],
    budget: f64,
    today: NaiveDate,
    options: &ReportOptions,
) -> Notifications {
    let total = total_amount(expenses);
    let symbol = options.currency_symbol.as_str();

    let large_expense = match largest_recent_expense(expenses, options.large_expense_threshold) {
        Some(e) => Notification {
            message: format!("You spent {symbol}{} on {}.", e.amount, e.category),
            time: relative_time(&e.date, today),
        },
        None => Notification {
            message: "No large expenses recently.".to_string(),
            time: NO_TIME.to_string(),
        },
    };

    let savings = Notification {
        message: savings_status(budget, total).message(symbol),
        time: expenses
            .last()
            .map(|latest| relative_time(&latest.date, today))
            .unwrap_or_else(|| NO_TIME.to_string()),
    };

    Notifications {
        budget: budget_status(budget, total).map(BudgetStatus::message),
        large_expense,
        savings,
    }
}

/// Headline figures of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub monthly_budget: f64,
    pub total_expenses: f64,
    pub transactions: usize,
    pub remaining_budget: f64,
}

pub fn dashboard_summary(expenses: &[Expense], budget: f64) -> DashboardSummary {
    let total = total_amount(expenses);
    DashboardSummary {
        monthly_budget: budget,
        total_expenses: total,
        transactions: expenses.len(),
        remaining_budget: budget - total,
    }
}

/// Data for one chart: a value per label, with one bucket highlighted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    pub highlight: usize,
}

/// Weekly line chart; today's weekday is highlighted.
pub fn weekly_chart(expenses: &[Expense], today: NaiveDate) -> ChartSeries {
    ChartSeries {
        labels: WEEKDAY_LABELS.to_vec(),
        values: weekly_totals(expenses).to_vec(),
        highlight: weekday_index(today),
    }
}

/// Monthly bar chart; the current month is highlighted.
pub fn monthly_chart(expenses: &[Expense], today: NaiveDate) -> ChartSeries {
    ChartSeries {
        labels: MONTH_LABELS.to_vec(),
        values: monthly_totals(expenses).to_vec(),
        highlight: month_index(today),
    }
}
