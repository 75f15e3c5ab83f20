//! Expense records.

use serde::{Deserialize, Serialize};

use pocketledger_core::{DomainError, DomainResult, ExpenseId, parse_amount};

/// One expense as stored in a user's ledger.
///
/// `amount` is the string the user entered; [`Expense::amount_value`] reads
/// it numerically. `version` starts at 1 and is bumped on every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub version: u64,
    pub date: String,
    pub category: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub amount: String,
}

impl Expense {
    pub fn new(draft: ExpenseDraft) -> Self {
        Self {
            id: ExpenseId::new(),
            version: 1,
            date: draft.date,
            category: draft.category,
            description: draft.description,
            amount: draft.amount,
        }
    }

    pub fn amount_value(&self) -> f64 {
        parse_amount(&self.amount)
    }

    pub fn draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            date: self.date.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            amount: self.amount.clone(),
        }
    }
}

/// User input for a new or edited expense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

impl ExpenseDraft {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            description: description.into(),
            amount: amount.into(),
        }
    }

    /// Trim every field and require all of them.
    pub fn validate(self) -> DomainResult<Self> {
        let draft = Self {
            date: self.date.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
            amount: self.amount.trim().to_string(),
        };
        if draft.date.is_empty()
            || draft.category.is_empty()
            || draft.description.is_empty()
            || draft.amount.is_empty()
        {
            return Err(DomainError::validation("all fields required"));
        }
        Ok(draft)
    }
}

/// On-disk shape, tolerant of records written before ids and versions.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredExpense {
    #[serde(default)]
    id: Option<ExpenseId>,
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    date: String,
    #[serde(default)]
    category: String,
    #[serde(default, rename = "desc")]
    description: String,
    #[serde(default)]
    amount: String,
}

impl StoredExpense {
    /// Whether the record lacked an id or version and was given one.
    pub(crate) fn needs_upgrade(&self) -> bool {
        self.id.is_none() || self.version.is_none()
    }

    pub(crate) fn into_expense(self) -> Expense {
        Expense {
            id: self.id.unwrap_or_default(),
            version: self.version.unwrap_or(1),
            date: self.date,
            category: self.category,
            description: self.description,
            amount: self.amount,
        }
    }
}
