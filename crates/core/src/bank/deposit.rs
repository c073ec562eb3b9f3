//! Bank deposit preparation.
//!
//! A deposit credits each source row and debits the bank's own ledger account
//! with the total, then goes through the regular posting rules. The bank
//! transaction row keeps a running balance per bank account.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{BankAccountInfo, BankTransactionType};
use crate::error::AccountingError;
use crate::ledger::{PostingRequest, PostingRow, PostingService, PreparedPosting};

/// Input for a bank deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    /// Internal type tag; only `Deposit` is accepted on this path.
    pub transaction_type: BankTransactionType,
    /// The acting user.
    pub created_by: Uuid,
    /// Receiving bank account.
    pub bank_account_id: i64,
    /// Transaction date.
    pub trans_date: NaiveDate,
    /// Memo for the journal and the bank transaction.
    pub memo: String,
    /// Source rows, all strictly positive.
    pub rows: Vec<PostingRow>,
}

/// A validated deposit ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDeposit {
    /// Journal and lines, including the bank debit line.
    pub posting: PreparedPosting,
    /// Receiving bank account.
    pub bank_account_id: i64,
    /// Total deposited.
    pub total: Decimal,
}

/// Bank deposit service.
pub struct DepositService;

impl DepositService {
    /// Checks the parts of a deposit that need no stored data.
    ///
    /// # Errors
    ///
    /// In order: `InvalidTransactionType`, `InvalidUser`, `InvalidAmount`,
    /// then `AmountOutOfRange` for a row or total the ledger cannot store.
    pub fn validate_request(request: &DepositRequest) -> Result<Decimal, AccountingError> {
        if request.transaction_type != BankTransactionType::Deposit {
            return Err(AccountingError::InvalidTransactionType);
        }

        if request.created_by.is_nil() {
            return Err(AccountingError::InvalidUser);
        }

        if request.rows.is_empty() || request.rows.iter().any(|row| row.amount <= Decimal::ZERO) {
            return Err(AccountingError::InvalidAmount);
        }

        for row in &request.rows {
            PostingService::ensure_storable(row.amount)?;
        }

        let total = PostingService::checked_total(request.rows.iter().map(|row| row.amount))?;
        PostingService::ensure_storable(total)?;
        Ok(total)
    }

    /// Validate a deposit and build its journal.
    ///
    /// # Arguments
    ///
    /// * `request` - The deposit input
    /// * `bank_account` - The stored bank account, `None` if the lookup found nothing
    /// * `is_bank_linked` - Returns true if a ledger account is tagged as a bank account
    ///
    /// # Errors
    ///
    /// Everything [`Self::validate_request`] returns, then `BankAccountNotFound`,
    /// then `BankAccountProhibited`.
    pub fn prepare<F>(
        request: &DepositRequest,
        bank_account: Option<&BankAccountInfo>,
        is_bank_linked: F,
    ) -> Result<PreparedDeposit, AccountingError>
    where
        F: Fn(i64) -> bool,
    {
        let total = Self::validate_request(request)?;

        let bank_account =
            bank_account.ok_or(AccountingError::BankAccountNotFound(request.bank_account_id))?;

        if let Some(row) = request
            .rows
            .iter()
            .find(|row| row.account_id == bank_account.account_id || is_bank_linked(row.account_id))
        {
            return Err(AccountingError::BankAccountProhibited(row.account_id));
        }

        let mut rows: Vec<PostingRow> = request
            .rows
            .iter()
            .map(|row| PostingRow::new(row.account_id, -row.amount))
            .collect();
        rows.push(PostingRow::new(bank_account.account_id, total));

        let posting = PostingService::prepare(&PostingRequest {
            created_by: request.created_by,
            trans_date: request.trans_date,
            memo: request.memo.clone(),
            rows,
        })?
        .ok_or(AccountingError::InvalidAmount)?;

        Ok(PreparedDeposit {
            posting,
            bank_account_id: bank_account.id,
            total,
        })
    }

    /// Running balance after a deposit of `amount`.
    ///
    /// `previous` is the sum of the bank account's transactions whose journals
    /// are not voided, `None` when there are none.
    #[must_use]
    pub fn next_running_balance(previous: Option<Decimal>, amount: Decimal) -> Decimal {
        previous.unwrap_or(Decimal::ZERO) + amount
    }
}
