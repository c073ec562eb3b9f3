//! Fiscal year closing entries.
//!
//! A closing journal carries a single line that moves the negative of the
//! year's balance-sheet movement into retained earnings. It is the one journal
//! shape exempt from the zero-sum rule, so it is built here rather than through
//! [`PostingService::prepare`](super::PostingService::prepare).

use rust_decimal::Decimal;
use uuid::Uuid;

use super::posting::PostingService;
use super::types::{PostingRow, PreparedPosting};
use crate::error::AccountingError;
use crate::fiscal::FiscalYear;

/// Builds the closing journal for `year`.
///
/// The journal is dated on the last day of the year. Returns `Ok(None)` when
/// the balance-sheet movement is zero and there is nothing to close out.
///
/// # Errors
///
/// Returns `CreatorRequired` if `closed_by` is nil.
pub fn prepare_closing(
    year: &FiscalYear,
    retained_earnings_account: i64,
    balance_sheet_amount: Decimal,
    closed_by: Uuid,
) -> Result<Option<PreparedPosting>, AccountingError> {
    if closed_by.is_nil() {
        return Err(AccountingError::CreatorRequired);
    }

    if balance_sheet_amount.is_zero() {
        return Ok(None);
    }

    let row = PostingRow::new(retained_earnings_account, -balance_sheet_amount);
    let memo = format!(
        "Closing fiscal year {} to {}",
        year.start_date, year.end_date
    );

    Ok(Some(PostingService::build(
        closed_by,
        year.end_date,
        &memo,
        &[row],
    )))
}
