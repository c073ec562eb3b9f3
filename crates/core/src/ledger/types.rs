//! Ledger domain types for posting.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{JournalId, LedgerLineId};
use uuid::Uuid;

/// One signed row of a posting. Positive amounts are debits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRow {
    /// Target account.
    pub account_id: i64,
    /// Signed amount.
    pub amount: Decimal,
}

impl PostingRow {
    /// Creates a new row.
    #[must_use]
    pub const fn new(account_id: i64, amount: Decimal) -> Self {
        Self { account_id, amount }
    }
}

/// Input for posting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    /// The acting user, recorded on every line.
    pub created_by: Uuid,
    /// Transaction date; must fall inside an open fiscal year.
    pub trans_date: NaiveDate,
    /// Free-form memo stored on the journal.
    pub memo: String,
    /// Rows to post. Zero rows are dropped.
    pub rows: Vec<PostingRow>,
}

/// A ledger line ready to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedLine {
    /// New line id.
    pub id: LedgerLineId,
    /// Target account.
    pub account_id: i64,
    /// Signed amount.
    pub amount: Decimal,
}

/// A journal with its lines, validated and ready to be written atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPosting {
    /// New journal id (UUID v7).
    pub journal_id: JournalId,
    /// Sum of the strictly positive line amounts.
    pub amount: Decimal,
    /// Transaction date.
    pub trans_date: NaiveDate,
    /// Journal memo.
    pub memo: String,
    /// The acting user.
    pub created_by: Uuid,
    /// Lines in submission order.
    pub lines: Vec<PreparedLine>,
}

impl PreparedPosting {
    /// Returns the signed sum of all lines.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// Lifecycle state of a stored journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Counted by every read path.
    Posted,
    /// Excluded from read paths; lines are kept untouched.
    Voided,
}

impl JournalStatus {
    /// Derives the status from the journal's `voided_at` column.
    #[must_use]
    pub const fn from_voided<T>(voided_at: Option<&T>) -> Self {
        if voided_at.is_some() {
            Self::Voided
        } else {
            Self::Posted
        }
    }
}
