//! Application facade over auth, profiles, the ledger and reports.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, Utc};
use thiserror::Error;

use pocketledger_auth::{
    Access, AuthError, AuthService, Destination, IssuedOtp, Page, ProfileStore, UserProfile,
};
use pocketledger_core::{DomainError, EmailAddress, ExpectedVersion, ExpenseId, Session};
use pocketledger_expenses::report::{self, ChartSeries, DashboardSummary, Notifications};
use pocketledger_expenses::{Expense, ExpenseDraft, Ledger, LedgerError, ReportOptions};
use pocketledger_storage::{InMemoryStore, JsonFileStore, KeyValueStore, Storage, StorageError};

use crate::config::AppConfig;

/// Store handle shared by every component of the tracker.
pub type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl TrackerError {
    /// The user-facing failure, if this is one.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            TrackerError::Auth(e) => e.domain(),
            TrackerError::Ledger(e) => e.domain(),
            TrackerError::Storage(_) => None,
            TrackerError::Domain(e) => Some(e),
        }
    }
}

/// The date used for charts and relative times when none is given.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// One user-facing handle on the whole tracker.
///
/// The session is restored from the store once, when the tracker is built,
/// and afterwards only changes through [`Tracker::login`] and
/// [`Tracker::logout`]. Ledger and report calls made without a session
/// return empty results and write nothing.
pub struct Tracker {
    auth: AuthService<SharedStore>,
    profiles: ProfileStore<SharedStore>,
    ledger: Ledger<SharedStore>,
    report: ReportOptions,
    session: Option<Session>,
}

impl Tracker {
    /// Open the store named by `config` and restore the session.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let store: SharedStore = match &config.data_file {
            Some(path) => Arc::new(
                JsonFileStore::open(path)
                    .with_context(|| format!("failed to open data file {}", path.display()))?,
            ),
            None => {
                tracing::warn!("no data file configured; data will not outlive the process");
                Arc::new(InMemoryStore::new())
            }
        };
        Self::with_store(store, config).context("failed to restore session")
    }

    pub fn with_store(store: SharedStore, config: &AppConfig) -> Result<Self, TrackerError> {
        let storage = Storage::new(store);
        let auth = AuthService::new(storage.clone(), config.auth_policy());
        let session = auth.current_session()?;
        if let Some(session) = &session {
            tracing::debug!(email = %session.email(), "session restored");
        }

        Ok(Self {
            auth,
            profiles: ProfileStore::new(storage.clone()),
            ledger: Ledger::new(storage),
            report: config.report_options(),
            session,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<EmailAddress, TrackerError> {
        Ok(self.auth.register(email, password, confirm_password)?)
    }

    /// Whether `email` has an account; the forgot-password page checks this
    /// before offering a reset.
    pub fn is_registered(&self, email: &str) -> Result<bool, TrackerError> {
        Ok(self.auth.is_registered(email)?)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Destination, TrackerError> {
        let outcome = self.auth.login(email, password)?;
        self.session = Some(outcome.session);
        Ok(outcome.destination)
    }

    pub fn logout(&mut self) -> Result<(), TrackerError> {
        self.auth.logout()?;
        self.session = None;
        Ok(())
    }

    pub fn gate(&self, page: &Page) -> Result<Access, TrackerError> {
        Ok(self.auth.gate(page)?)
    }

    pub fn request_otp(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedOtp, TrackerError> {
        Ok(self.auth.request_otp(email, now)?)
    }

    pub fn reset_password(&self, email: &str, new_password: &str) -> Result<(), TrackerError> {
        Ok(self.auth.reset_password(email, new_password)?)
    }

    pub fn verify_otp_and_reset(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        Ok(self
            .auth
            .verify_otp_and_reset(email, otp, new_password, now)?)
    }

    /// Profile of the logged-in user, if one was saved.
    pub fn profile(&self) -> Result<Option<UserProfile>, TrackerError> {
        match &self.session {
            Some(session) => Ok(self.profiles.load(session.email())?),
            None => Ok(None),
        }
    }

    /// Saving needs a session: there is no user to attach the profile to otherwise.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), TrackerError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| DomainError::unauthorized("not logged in"))?;
        Ok(self.profiles.save(session, profile)?)
    }

    pub fn expenses(&self) -> Result<Vec<Expense>, TrackerError> {
        match &self.session {
            Some(session) => Ok(self.ledger.list(session)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn add_expense(&self, draft: ExpenseDraft) -> Result<Option<Expense>, TrackerError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        Ok(Some(self.ledger.add(session, draft)?))
    }

    pub fn update_expense(
        &self,
        id: ExpenseId,
        draft: ExpenseDraft,
        expected: ExpectedVersion,
    ) -> Result<Option<Expense>, TrackerError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        Ok(self.ledger.update(session, id, draft, expected)?)
    }

    pub fn remove_expense(&self, id: ExpenseId) -> Result<Option<Expense>, TrackerError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        Ok(self.ledger.remove(session, id)?)
    }

    fn budget(&self) -> Result<f64, TrackerError> {
        match &self.session {
            Some(session) => Ok(self.profiles.budget(session)?),
            None => Ok(0.0),
        }
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, TrackerError> {
        Ok(report::dashboard_summary(&self.expenses()?, self.budget()?))
    }

    pub fn notifications(&self, today: NaiveDate) -> Result<Notifications, TrackerError> {
        Ok(report::notifications(
            &self.expenses()?,
            self.budget()?,
            today,
            &self.report,
        ))
    }

    pub fn weekly_chart(&self, today: NaiveDate) -> Result<ChartSeries, TrackerError> {
        Ok(report::weekly_chart(&self.expenses()?, today))
    }

    pub fn monthly_chart(&self, today: NaiveDate) -> Result<ChartSeries, TrackerError> {
        Ok(report::monthly_chart(&self.expenses()?, today))
    }
}
