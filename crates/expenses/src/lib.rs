//! `pocketledger-expenses`: the expense ledger and its aggregations.

pub mod date;
pub mod expense;
pub mod ledger;
pub mod report;

pub use date::parse_date;
pub use expense::{Expense, ExpenseDraft};
pub use ledger::{Ledger, LedgerError};
pub use report::{
    BudgetStatus, ChartSeries, DashboardSummary, Notification, Notifications, ReportOptions,
    SavingsStatus,
};
