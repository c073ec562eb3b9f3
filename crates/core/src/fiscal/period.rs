//! Fiscal year rules: valid ranges, non-overlap, posting windows and
//! closing order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AccountingError;

/// A fiscal year. `Open -> Closed` is its only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: i64,
    /// First day of the year, inclusive.
    pub start_date: NaiveDate,
    /// Last day of the year, inclusive.
    pub end_date: NaiveDate,
    /// Whether the year has been closed.
    pub closed: bool,
}

impl FiscalYear {
    /// Returns true if transactions may still be posted into this year.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.closed
    }

    /// Returns true if the given date falls within this year.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if this year intersects `[start, end]`.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        date_ranges_overlap(self.start_date, self.end_date, start, end)
    }
}

/// Closed-interval intersection test.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Validates that `end` is strictly after `start`.
///
/// # Errors
///
/// Returns `AccountingError::InvalidRange` otherwise.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AccountingError> {
    if end <= start {
        return Err(AccountingError::InvalidRange { start, end });
    }
    Ok(())
}

/// Validates that `[start, end]` does not intersect any existing year.
///
/// # Errors
///
/// Returns `AccountingError::OverlapsExistingPeriod` on the first intersection.
pub fn ensure_no_overlap<'a, I>(
    start: NaiveDate,
    end: NaiveDate,
    existing: I,
) -> Result<(), AccountingError>
where
    I: IntoIterator<Item = &'a FiscalYear>,
{
    if existing.into_iter().any(|year| year.overlaps(start, end)) {
        return Err(AccountingError::OverlapsExistingPeriod { start, end });
    }
    Ok(())
}

/// Validates that `covering` is an open year containing `date`.
///
/// `covering` is whatever the store returned for "open year containing date".
///
/// # Errors
///
/// Returns `AccountingError::PostingProhibited` if there is no such year.
pub fn ensure_posting_allowed(
    date: NaiveDate,
    covering: Option<&FiscalYear>,
) -> Result<(), AccountingError> {
    match covering {
        Some(year) if year.is_open() && year.contains_date(date) => Ok(()),
        _ => Err(AccountingError::PostingProhibited(date)),
    }
}

/// Validates that `target` is the year that must close next.
///
/// # Errors
///
/// - `FiscalYearClosed` if `target` is already closed
/// - `CloseProhibited` if an earlier year is still open
pub fn ensure_closable(
    target: &FiscalYear,
    earliest_open: Option<&FiscalYear>,
) -> Result<(), AccountingError> {
    if target.closed {
        return Err(AccountingError::FiscalYearClosed(target.id));
    }

    match earliest_open {
        Some(earliest) if earliest.id != target.id => Err(AccountingError::CloseProhibited {
            requested: target.id,
            earliest_open: earliest.id,
        }),
        _ => Ok(()),
    }
}
