//! Optimistic concurrency stamps for stored records.

use crate::error::{DomainError, DomainResult};

/// Optimistic concurrency expectation for a record.
///
/// Several tabs may share one store with no locking; a caller that read a
/// record at version `n` passes `Exact(n)` so a concurrent edit is reported
/// instead of silently overwritten.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (last writer wins).
    Any,
    /// Require the record to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
