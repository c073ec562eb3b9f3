//! Fiscal year repository for database operations.
//!
//! Creation enforces the non-overlap rule; the `excl_fiscal_year_overlap`
//! constraint backs it up against concurrent inserts. Closing runs at
//! SERIALIZABLE isolation with the year locked `FOR UPDATE`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tallybook_core::AccountingError;
use tallybook_core::chart::AccountClassType;
use tallybook_core::fiscal::{FiscalYear, ensure_closable, ensure_no_overlap, validate_date_range};
use tallybook_core::ledger::prepare_closing;
use tallybook_shared::types::{PageRequest, PageResponse};
use tracing::{info, warn};
use uuid::Uuid;

use super::RepositoryResult;
use super::ledger::{JournalWithLines, write_posting};
use super::preference::load_retained_earnings;
use crate::entities::{account_classes, account_groups, accounts, fiscal_years, general_ledgers, journals};
use crate::filter::Filter;

/// Filter options for listing fiscal years.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiscalYearFilter {
    /// Filter by closed flag.
    pub closed: Option<bool>,
    /// Years starting on or after this date.
    pub start_from: Option<NaiveDate>,
    /// Years ending on or before this date.
    pub end_to: Option<NaiveDate>,
}

impl FiscalYearFilter {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .eq(fiscal_years::Column::Closed, self.closed)
            .gte(fiscal_years::Column::StartDate, self.start_from)
            .lte(fiscal_years::Column::EndDate, self.end_to)
    }
}

/// Result of closing a fiscal year.
#[derive(Debug, Clone, Serialize)]
pub struct CloseOutcome {
    /// The year, now closed.
    pub fiscal_year: fiscal_years::Model,
    /// Balance-sheet movement over the year.
    pub balance_sheet_amount: Decimal,
    /// The closing journal, absent when the movement was zero.
    pub closing_journal: Option<JournalWithLines>,
}

/// Sums the lines of non-voided journals dated in `[start, end]` whose account
/// belongs to a balance-sheet class.
pub(crate) async fn balance_sheet_sum<C>(
    conn: &C,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal, DbErr>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = general_ledgers::Entity::find()
        .select_only()
        .column_as(
            Expr::col((general_ledgers::Entity, general_ledgers::Column::Amount)).sum(),
            "total",
        )
        .join(JoinType::InnerJoin, general_ledgers::Relation::Journals.def())
        .join(JoinType::InnerJoin, general_ledgers::Relation::Accounts.def())
        .join(JoinType::InnerJoin, accounts::Relation::AccountGroups.def())
        .join(JoinType::InnerJoin, account_groups::Relation::AccountClasses.def())
        .filter(journals::Column::TransDate.between(start, end))
        .filter(journals::Column::VoidedAt.is_null())
        .filter(account_classes::Column::TypeId.lte(AccountClassType::balance_sheet_upper_bound()))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

/// Fiscal year repository.
#[derive(Debug, Clone)]
pub struct FiscalYearRepository {
    db: DatabaseConnection,
}

impl FiscalYearRepository {
    /// Creates a new fiscal year repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an open fiscal year.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` unless `end > start`, or `OverlapsExistingPeriod`
    /// if any stored year intersects `[start, end]`.
    pub async fn create(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<fiscal_years::Model> {
        validate_date_range(start_date, end_date)?;

        let txn = self.db.begin().await?;

        let candidates: Vec<FiscalYear> = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::StartDate.lte(end_date))
            .filter(fiscal_years::Column::EndDate.gte(start_date))
            .all(&txn)
            .await?
            .iter()
            .map(FiscalYear::from)
            .collect();

        if let Err(err) = ensure_no_overlap(start_date, end_date, &candidates) {
            warn!(%start_date, %end_date, "Fiscal year overlaps an existing period");
            return Err(err.into());
        }

        let year = fiscal_years::ActiveModel {
            start_date: Set(start_date),
            end_date: Set(end_date),
            closed: Set(false),
            closed_by: Set(None),
            closed_at: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(fiscal_year_id = year.id, %start_date, %end_date, "Fiscal year created");
        Ok(year)
    }

    /// Finds a fiscal year by id.
    ///
    /// # Errors
    ///
    /// Returns `FiscalYearNotFound` if there is no such year.
    pub async fn get(&self, id: i64) -> RepositoryResult<fiscal_years::Model> {
        let year = fiscal_years::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::FiscalYearNotFound(id))?;
        Ok(year)
    }

    /// Lists fiscal years ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &FiscalYearFilter,
        page: PageRequest,
    ) -> RepositoryResult<PageResponse<fiscal_years::Model>> {
        let page = page.normalized();
        let condition = filter.to_filter().into_condition();

        let total = fiscal_years::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let years = fiscal_years::Entity::find()
            .filter(condition)
            .order_by_asc(fiscal_years::Column::StartDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(years, page, total))
    }

    /// Returns the earliest open fiscal year.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveFiscalYear` if every year is closed.
    pub async fn active(&self) -> RepositoryResult<fiscal_years::Model> {
        let year = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::Closed.eq(false))
            .order_by_asc(fiscal_years::Column::StartDate)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::NoActiveFiscalYear)?;
        Ok(year)
    }

    /// Closes a fiscal year.
    ///
    /// Posts a single-line closing journal moving the negated balance-sheet
    /// movement into the retained earnings account (skipped when the movement
    /// is zero), then marks the year closed. Both happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The retained earnings preference is unset or not a balance-sheet account
    /// - The year does not exist, is already closed, or is not the earliest open year
    /// - `closed_by` is nil
    pub async fn close(&self, id: i64, closed_by: Uuid) -> RepositoryResult<CloseOutcome> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let retained_earnings = load_retained_earnings(&txn).await?;

        let target = fiscal_years::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::FiscalYearNotFound(id))?;

        let earliest_open = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::Closed.eq(false))
            .order_by_asc(fiscal_years::Column::StartDate)
            .one(&txn)
            .await?;

        let year = FiscalYear::from(&target);
        if let Err(err) = ensure_closable(&year, earliest_open.as_ref().map(FiscalYear::from).as_ref())
        {
            warn!(fiscal_year_id = id, error = %err, "Fiscal year close rejected");
            return Err(err.into());
        }

        let balance = balance_sheet_sum(&txn, year.start_date, year.end_date).await?;

        let closing_journal = match prepare_closing(&year, retained_earnings, balance, closed_by)? {
            Some(posting) => Some(write_posting(&txn, &posting, true).await?),
            None => None,
        };

        let mut active: fiscal_years::ActiveModel = target.into();
        active.closed = Set(true);
        active.closed_by = Set(Some(closed_by));
        active.closed_at = Set(Some(Utc::now().into()));
        let fiscal_year = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            fiscal_year_id = id,
            balance_sheet_amount = %balance,
            closing_journal = ?closing_journal.as_ref().map(|j| j.journal.id),
            "Fiscal year closed"
        );

        Ok(CloseOutcome {
            fiscal_year,
            balance_sheet_amount: balance,
            closing_journal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_filter_open_years_in_range() {
        let filter = FiscalYearFilter {
            closed: Some(false),
            start_from: NaiveDate::from_ymd_opt(2023, 1, 1),
            end_to: None,
        };

        let sql = fiscal_years::Entity::find()
            .filter(filter.to_filter().into_condition())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""fiscal_years"."closed" = FALSE"#), "{sql}");
        assert!(sql.contains(r#""fiscal_years"."start_date" >= '2023-01-01'"#), "{sql}");
        assert!(!sql.contains("end_date\" <="), "{sql}");
    }
}
