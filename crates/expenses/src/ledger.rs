//! Per-user expense ledger over the key-value store.

use thiserror::Error;

use pocketledger_core::{
    DomainError, ExpectedVersion, ExpenseId, Session, is_numeric, parse_amount,
};
use pocketledger_storage::{KeyValueStore, Namespace, Storage, StorageError, StorageKey};

use crate::date::parse_date;
use crate::expense::{Expense, ExpenseDraft, StoredExpense};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::Storage(_) => None,
        }
    }
}

/// Ordered expense list stored under `expenses_<email>`.
///
/// Insertion order is preserved; the last record is the most recent entry.
/// Every mutation is a read-modify-write of the whole list, persisted before
/// the call returns.
#[derive(Debug, Clone)]
pub struct Ledger<S> {
    storage: Storage<S>,
}

impl<S> Ledger<S>
where
    S: KeyValueStore,
{
    pub fn new(storage: Storage<S>) -> Self {
        Self { storage }
    }

    /// All expenses of the session user, in insertion order.
    pub fn list(&self, session: &Session) -> Result<Vec<Expense>, LedgerError> {
        let key = StorageKey::scoped(Namespace::Expenses, session.email());
        let stored: Vec<StoredExpense> = self.storage.get_json(key)?.unwrap_or_default();

        let upgrade = stored.iter().any(StoredExpense::needs_upgrade);
        let expenses: Vec<Expense> = stored.into_iter().map(StoredExpense::into_expense).collect();
        if upgrade {
            // Pin the ids handed out to legacy records.
            self.save(session, &expenses)?;
            tracing::info!(email = %session.email(), count = expenses.len(), "assigned ids to legacy expenses");
        }
        Ok(expenses)
    }

    pub fn get(&self, session: &Session, id: ExpenseId) -> Result<Option<Expense>, LedgerError> {
        Ok(self.list(session)?.into_iter().find(|e| e.id == id))
    }

    /// Append a new expense.
    pub fn add(&self, session: &Session, draft: ExpenseDraft) -> Result<Expense, LedgerError> {
        let draft = draft.validate()?;
        warn_on_loose_input(&draft);

        let mut expenses = self.list(session)?;
        let expense = Expense::new(draft);
        expenses.push(expense.clone());
        self.save(session, &expenses)?;

        tracing::info!(email = %session.email(), id = %expense.id, "expense added");
        Ok(expense)
    }

    /// Replace an expense in place.
    ///
    /// An unknown id is a no-op (`Ok(None)`). A version other than the
    /// expected one means someone else edited the record first.
    pub fn update(
        &self,
        session: &Session,
        id: ExpenseId,
        draft: ExpenseDraft,
        expected: ExpectedVersion,
    ) -> Result<Option<Expense>, LedgerError> {
        let draft = draft.validate()?;

        let mut expenses = self.list(session)?;
        let Some(slot) = expenses.iter_mut().find(|e| e.id == id) else {
            tracing::debug!(email = %session.email(), %id, "update of unknown expense ignored");
            return Ok(None);
        };
        if let Err(e) = expected.check(slot.version) {
            tracing::warn!(email = %session.email(), %id, actual = slot.version, "stale expense edit");
            return Err(e.into());
        }
        warn_on_loose_input(&draft);

        *slot = Expense {
            id,
            version: slot.version + 1,
            date: draft.date,
            category: draft.category,
            description: draft.description,
            amount: draft.amount,
        };
        let updated = slot.clone();
        self.save(session, &expenses)?;

        tracing::info!(email = %session.email(), %id, version = updated.version, "expense updated");
        Ok(Some(updated))
    }

    /// Delete an expense; the others keep their relative order. An unknown id
    /// is a no-op (`Ok(None)`).
    pub fn remove(&self, session: &Session, id: ExpenseId) -> Result<Option<Expense>, LedgerError> {
        let mut expenses = self.list(session)?;
        let Some(pos) = expenses.iter().position(|e| e.id == id) else {
            tracing::debug!(email = %session.email(), %id, "removal of unknown expense ignored");
            return Ok(None);
        };
        let removed = expenses.remove(pos);
        self.save(session, &expenses)?;

        tracing::info!(email = %session.email(), %id, "expense removed");
        Ok(Some(removed))
    }

    /// Sum of all amounts; non-numeric amounts count as zero.
    pub fn total_amount(&self, session: &Session) -> Result<f64, LedgerError> {
        Ok(self.list(session)?.iter().map(|e| parse_amount(&e.amount)).sum())
    }

    fn save(&self, session: &Session, expenses: &[Expense]) -> Result<(), StorageError> {
        self.storage
            .set_json(StorageKey::scoped(Namespace::Expenses, session.email()), expenses)
    }
}

// Amount and date are free text; they are stored as typed but flagged.
fn warn_on_loose_input(draft: &ExpenseDraft) {
    if !is_numeric(&draft.amount) {
        tracing::warn!(amount = %draft.amount, "non-numeric expense amount counts as zero");
    }
    if parse_date(&draft.date).is_none() {
        tracing::warn!(date = %draft.date, "expense date is not DD-MM-YYYY; excluded from charts");
    }
}
