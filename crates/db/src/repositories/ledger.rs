//! Ledger repository: journals and their general ledger lines.
//!
//! Posting runs the pure checks in [`PostingService`] first, then opens one
//! database transaction that locks the covering fiscal year `FOR SHARE`,
//! re-checks it is open, and writes the journal header with all its lines.
//! A concurrent close takes the same row `FOR UPDATE`, so the two serialize.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tallybook_core::AccountingError;
use tallybook_core::fiscal::{FiscalYear, ensure_posting_allowed};
use tallybook_core::ledger::{JournalStatus, PostingRequest, PostingService, PreparedPosting};
use tracing::{info, warn};
use uuid::Uuid;

use super::RepositoryResult;
use crate::entities::{accounts, fiscal_years, general_ledgers, journals};

/// A journal header with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct JournalWithLines {
    /// The journal header.
    pub journal: journals::Model,
    /// Lines in insertion order.
    pub lines: Vec<general_ledgers::Model>,
}

/// Returns true if any ledger line references the account.
pub(crate) async fn account_has_lines<C>(conn: &C, account_id: i64) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let count = general_ledgers::Entity::find()
        .filter(general_ledgers::Column::AccountId.eq(account_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Finds the open fiscal year containing `date` and locks it `FOR SHARE`.
pub(crate) async fn lock_open_year_covering<C>(
    conn: &C,
    date: NaiveDate,
) -> Result<Option<FiscalYear>, DbErr>
where
    C: ConnectionTrait,
{
    let year = fiscal_years::Entity::find()
        .filter(fiscal_years::Column::StartDate.lte(date))
        .filter(fiscal_years::Column::EndDate.gte(date))
        .filter(fiscal_years::Column::Closed.eq(false))
        .lock_shared()
        .one(conn)
        .await?;
    Ok(year.as_ref().map(FiscalYear::from))
}

/// Checks that every referenced account exists.
async fn ensure_accounts_exist<C>(conn: &C, posting: &PreparedPosting) -> RepositoryResult<()>
where
    C: ConnectionTrait,
{
    let requested: Vec<i64> = posting.lines.iter().map(|line| line.account_id).collect();

    let found: HashSet<i64> = accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .filter(accounts::Column::Id.is_in(requested.iter().copied()))
        .into_tuple::<i64>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    match requested.into_iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AccountingError::AccountNotFound(missing).into()),
        None => Ok(()),
    }
}

/// Writes a prepared journal and its lines. Callers own the transaction.
pub(crate) async fn write_posting<C>(
    conn: &C,
    posting: &PreparedPosting,
    is_closing: bool,
) -> Result<JournalWithLines, DbErr>
where
    C: ConnectionTrait,
{
    let now = Utc::now().into();

    let journal = journals::ActiveModel {
        id: Set(posting.journal_id.into_inner()),
        amount: Set(posting.amount),
        trans_date: Set(posting.trans_date),
        memo: Set(posting.memo.clone()),
        is_closing: Set(is_closing),
        created_at: Set(now),
        voided_at: Set(None),
    }
    .insert(conn)
    .await?;

    let mut lines = Vec::with_capacity(posting.lines.len());
    for line in &posting.lines {
        let line = general_ledgers::ActiveModel {
            id: Set(line.id.into_inner()),
            journal_id: Set(journal.id),
            account_id: Set(line.account_id),
            amount: Set(line.amount),
            created_by: Set(posting.created_by),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;
        lines.push(line);
    }

    Ok(JournalWithLines { journal, lines })
}

/// Runs the period and account checks for a prepared posting and writes it.
pub(crate) async fn post_prepared<C>(
    conn: &C,
    posting: &PreparedPosting,
) -> RepositoryResult<JournalWithLines>
where
    C: ConnectionTrait,
{
    let covering = lock_open_year_covering(conn, posting.trans_date).await?;
    if let Err(err) = ensure_posting_allowed(posting.trans_date, covering.as_ref()) {
        warn!(trans_date = %posting.trans_date, "Posting rejected, no open fiscal year");
        return Err(err.into());
    }

    ensure_accounts_exist(conn, posting).await?;

    Ok(write_posting(conn, posting, false).await?)
}

/// Ledger repository for posting and reading journals.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a transaction.
    ///
    /// Returns `Ok(None)` when every row is zero; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The acting user is nil (`CreatorRequired`)
    /// - The rows do not sum to zero (`TransactionNotBalance`)
    /// - No open fiscal year covers the date (`PostingProhibited`)
    /// - A row references a missing account (`AccountNotFound`)
    pub async fn post(&self, request: &PostingRequest) -> RepositoryResult<Option<JournalWithLines>> {
        let Some(posting) = PostingService::prepare(request)? else {
            info!(
                created_by = %request.created_by,
                trans_date = %request.trans_date,
                "All rows are zero, no transaction created"
            );
            return Ok(None);
        };

        let txn = self.db.begin().await?;
        let written = post_prepared(&txn, &posting).await?;
        txn.commit().await?;

        info!(
            journal_id = %written.journal.id,
            amount = %written.journal.amount,
            lines = written.lines.len(),
            "Transaction posted"
        );
        Ok(Some(written))
    }

    /// Gets a posted journal with its lines.
    ///
    /// Voided journals read as not found.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` if there is no such posted journal.
    pub async fn get_journal(&self, id: Uuid) -> RepositoryResult<JournalWithLines> {
        let journal = journals::Entity::find_by_id(id)
            .filter(journals::Column::VoidedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AccountingError::JournalNotFound(id))?;

        let lines = general_ledgers::Entity::find()
            .filter(general_ledgers::Column::JournalId.eq(id))
            .order_by_asc(general_ledgers::Column::Id)
            .all(&self.db)
            .await?;

        Ok(JournalWithLines { journal, lines })
    }

    /// Voids a journal by stamping `voided_at` on its header.
    ///
    /// Lines are left untouched. The journal date must still fall inside an
    /// open fiscal year.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `JournalAlreadyVoided` or `PostingProhibited`.
    pub async fn void_journal(&self, id: Uuid) -> RepositoryResult<journals::Model> {
        let txn = self.db.begin().await?;

        let journal = journals::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::JournalNotFound(id))?;

        PostingService::ensure_voidable(id, JournalStatus::from_voided(journal.voided_at.as_ref()))?;

        let covering = lock_open_year_covering(&txn, journal.trans_date).await?;
        ensure_posting_allowed(journal.trans_date, covering.as_ref())?;

        let mut active: journals::ActiveModel = journal.into();
        active.voided_at = Set(Some(Utc::now().into()));
        let journal = active.update(&txn).await?;

        txn.commit().await?;

        info!(journal_id = %id, "Journal voided");
        Ok(journal)
    }

    /// Returns true if any ledger line references the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn account_has_transaction(&self, account_id: i64) -> RepositoryResult<bool> {
        Ok(account_has_lines(&self.db, account_id).await?)
    }
}
