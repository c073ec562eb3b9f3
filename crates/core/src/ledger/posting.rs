//! Posting service for journal validation and preparation.
//!
//! This module holds the pure half of posting: everything that can be
//! decided without the database. The open-period check needs a fiscal year
//! lookup and lives in [`crate::fiscal::ensure_posting_allowed`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook_shared::types::{JournalId, LedgerLineId};
use uuid::Uuid;

use super::types::{JournalStatus, PostingRequest, PostingRow, PreparedLine, PreparedPosting};
use crate::error::AccountingError;

/// Decimal places kept by the ledger's amount columns.
pub const AMOUNT_SCALE: u32 = 4;

/// Exclusive bound on an amount's magnitude: 15 integer digits (10^15).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Posting service for journal validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct PostingService;

impl PostingService {
    /// Validate a posting request and build the journal to write.
    ///
    /// Steps:
    /// 1. Rejects a nil creator
    /// 2. Rejects amounts the ledger columns cannot store exactly
    /// 3. Drops zero rows; if nothing is left there is nothing to post
    /// 4. Rejects row sets that do not sum to zero
    /// 5. Derives the journal amount and assigns ids
    ///
    /// # Returns
    ///
    /// `Ok(None)` when every row is zero.
    ///
    /// # Errors
    ///
    /// Returns `CreatorRequired`, `AmountOutOfRange` or `TransactionNotBalance`.
    pub fn prepare(request: &PostingRequest) -> Result<Option<PreparedPosting>, AccountingError> {
        if request.created_by.is_nil() {
            return Err(AccountingError::CreatorRequired);
        }

        for row in &request.rows {
            Self::ensure_storable(row.amount)?;
        }

        let rows = Self::non_zero_rows(&request.rows);
        if rows.is_empty() {
            return Ok(None);
        }

        let total = Self::checked_total(rows.iter().map(|row| row.amount))?;
        if !total.is_zero() {
            return Err(AccountingError::TransactionNotBalance { total });
        }

        Ok(Some(Self::build(
            request.created_by,
            request.trans_date,
            &request.memo,
            &rows,
        )))
    }

    /// Checks that an amount fits `NUMERIC(19, 4)` without rounding.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` for more than [`AMOUNT_SCALE`] decimal places
    /// or a magnitude of [`AMOUNT_LIMIT`] or more.
    pub fn ensure_storable(amount: Decimal) -> Result<(), AccountingError> {
        if amount.normalize().scale() > AMOUNT_SCALE || amount.abs() >= AMOUNT_LIMIT {
            return Err(AccountingError::AmountOutOfRange(amount));
        }
        Ok(())
    }

    /// Sums amounts, failing instead of overflowing.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` carrying the partial sum on overflow.
    pub fn checked_total<I>(amounts: I) -> Result<Decimal, AccountingError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
            total
                .checked_add(amount)
                .ok_or(AccountingError::AmountOutOfRange(total))
        })
    }

    /// Returns the rows with a non-zero amount, in order.
    #[must_use]
    pub fn non_zero_rows(rows: &[PostingRow]) -> Vec<PostingRow> {
        rows.iter().copied().filter(|row| !row.amount.is_zero()).collect()
    }

    /// Sum of the strictly positive amounts (the debit total).
    ///
    /// Saturates at [`Decimal::MAX`]; rows that passed [`Self::prepare`] never
    /// get near it.
    #[must_use]
    pub fn journal_amount(rows: &[PostingRow]) -> Decimal {
        rows.iter()
            .map(|row| row.amount)
            .filter(|amount| *amount > Decimal::ZERO)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Checks that a stored journal can still be voided.
    ///
    /// # Errors
    ///
    /// Returns `JournalAlreadyVoided` for voided journals.
    pub fn ensure_voidable(journal_id: Uuid, status: JournalStatus) -> Result<(), AccountingError> {
        match status {
            JournalStatus::Posted => Ok(()),
            JournalStatus::Voided => Err(AccountingError::JournalAlreadyVoided(journal_id)),
        }
    }

    /// Assigns ids and derives the amount. Rows are assumed validated.
    pub(crate) fn build(
        created_by: Uuid,
        trans_date: NaiveDate,
        memo: &str,
        rows: &[PostingRow],
    ) -> PreparedPosting {
        let lines = rows
            .iter()
            .map(|row| PreparedLine {
                id: LedgerLineId::new(),
                account_id: row.account_id,
                amount: row.amount,
            })
            .collect();

        PreparedPosting {
            journal_id: JournalId::new(),
            amount: Self::journal_amount(rows),
            trans_date,
            memo: memo.to_string(),
            created_by,
            lines,
        }
    }
}
