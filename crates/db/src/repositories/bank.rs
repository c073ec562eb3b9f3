//! Bank account repository and deposit posting.
//!
//! A deposit locks its bank account row `FOR UPDATE` for the whole
//! transaction, so running balances on the same bank account are computed one
//! at a time.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tallybook_core::AccountingError;
use tallybook_core::bank::{
    BankAccountInfo, BankAccountType, BankTransactionType, DepositRequest, DepositService,
};
use tallybook_core::ledger::PostingRow;
use tracing::{info, warn};
use uuid::Uuid;

use super::RepositoryResult;
use super::ledger::{JournalWithLines, post_prepared};
use crate::entities::{accounts, bank_accounts, bank_transactions, journals};
use crate::filter::Filter;

/// Input for creating or updating a bank account.
#[derive(Debug, Clone, Deserialize)]
pub struct BankAccountInput {
    /// Ledger account the bank account overlays.
    pub account_id: i64,
    /// One of the four bank account type ids.
    pub type_id: i32,
    /// Bank's own account number.
    #[serde(default)]
    pub bank_number: Option<String>,
    /// Whether the bank account is hidden from pickers.
    #[serde(default)]
    pub inactive: bool,
}

/// Filter options for listing bank accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BankAccountFilter {
    /// Exact bank account type.
    pub type_id: Option<i32>,
    /// Exact ledger account.
    pub account_id: Option<i64>,
    /// Case-insensitive bank number fragment.
    pub bank_number: Option<String>,
    /// Filter by inactive flag.
    pub inactive: Option<bool>,
}

impl BankAccountFilter {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .eq(bank_accounts::Column::TypeId, self.type_id)
            .eq(bank_accounts::Column::AccountId, self.account_id)
            .like(bank_accounts::Column::BankNumber, self.bank_number.as_deref())
            .eq(bank_accounts::Column::Inactive, self.inactive)
    }
}

/// Input for a bank deposit.
#[derive(Debug, Clone)]
pub struct DepositInput {
    /// The acting user.
    pub created_by: Uuid,
    /// Receiving bank account.
    pub bank_account_id: i64,
    /// Transaction date.
    pub trans_date: NaiveDate,
    /// Memo for the journal and the bank transaction.
    pub memo: String,
    /// Source rows; each amount must be positive.
    pub rows: Vec<PostingRow>,
}

/// A stored deposit.
#[derive(Debug, Clone, Serialize)]
pub struct DepositResult {
    /// Journal with the credit lines and the bank debit line.
    pub journal: JournalWithLines,
    /// Bank transaction carrying the running balance.
    pub bank_transaction: bank_transactions::Model,
}

/// Sum of a bank account's live transactions; `None` when there are none.
///
/// Voided journals drop out of the sum, so a void anywhere in the history is
/// reflected in the next running balance. Callers hold the bank account row
/// lock.
async fn previous_balance<C>(conn: &C, bank_account_id: i64) -> Result<Option<Decimal>, DbErr>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = bank_transactions::Entity::find()
        .select_only()
        .column_as(
            Expr::col((bank_transactions::Entity, bank_transactions::Column::Amount)).sum(),
            "total",
        )
        .join(JoinType::InnerJoin, bank_transactions::Relation::Journals.def())
        .filter(bank_transactions::Column::BankAccountId.eq(bank_account_id))
        .filter(journals::Column::VoidedAt.is_null())
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten())
}

/// Bank account repository.
#[derive(Debug, Clone)]
pub struct BankRepository {
    db: DatabaseConnection,
}

impl BankRepository {
    /// Creates a new bank repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Tags a ledger account as a bank account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `type_id` is not a bank account type (`InvalidBankAccountType`)
    /// - The ledger account does not exist (`AccountNotFound`)
    /// - The ledger account already backs a bank account (`BankAccountProhibited`)
    pub async fn create_account(
        &self,
        input: BankAccountInput,
    ) -> RepositoryResult<bank_accounts::Model> {
        BankAccountType::try_from_id(input.type_id)?;

        let txn = self.db.begin().await?;
        Self::ensure_linkable(&txn, input.account_id, None).await?;

        let bank_account = bank_accounts::ActiveModel {
            account_id: Set(input.account_id),
            type_id: Set(input.type_id),
            bank_number: Set(input.bank_number),
            inactive: Set(input.inactive),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            bank_account_id = bank_account.id,
            account_id = bank_account.account_id,
            "Bank account created"
        );
        Ok(bank_account)
    }

    /// Updates a bank account.
    ///
    /// # Errors
    ///
    /// Everything [`Self::create_account`] returns, plus `BankAccountNotFound`.
    pub async fn update_account(
        &self,
        id: i64,
        input: BankAccountInput,
    ) -> RepositoryResult<bank_accounts::Model> {
        BankAccountType::try_from_id(input.type_id)?;

        let txn = self.db.begin().await?;

        let existing = bank_accounts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::BankAccountNotFound(id))?;

        if existing.account_id != input.account_id {
            Self::ensure_linkable(&txn, input.account_id, Some(id)).await?;
        }

        let mut active: bank_accounts::ActiveModel = existing.into();
        active.account_id = Set(input.account_id);
        active.type_id = Set(input.type_id);
        active.bank_number = Set(input.bank_number);
        active.inactive = Set(input.inactive);
        let bank_account = active.update(&txn).await?;

        txn.commit().await?;

        info!(bank_account_id = id, "Bank account updated");
        Ok(bank_account)
    }

    /// Finds a bank account by id.
    ///
    /// # Errors
    ///
    /// Returns `BankAccountNotFound` if there is no such bank account.
    pub async fn get_account(&self, id: i64) -> RepositoryResult<bank_accounts::Model> {
        let bank_account = bank_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::BankAccountNotFound(id))?;
        Ok(bank_account)
    }

    /// Lists bank accounts ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: &BankAccountFilter,
    ) -> RepositoryResult<Vec<bank_accounts::Model>> {
        let bank_accounts = bank_accounts::Entity::find()
            .filter(filter.to_filter().into_condition())
            .order_by_asc(bank_accounts::Column::Id)
            .all(&self.db)
            .await?;
        Ok(bank_accounts)
    }

    /// Stores a bank deposit.
    ///
    /// Each row is credited, the bank's ledger account is debited with the
    /// total, and a bank transaction records the new running balance.
    ///
    /// # Errors
    ///
    /// In order: `InvalidUser`, `InvalidAmount`, `AmountOutOfRange`, `BankAccountNotFound`,
    /// `BankAccountProhibited`, then the posting errors (`PostingProhibited`,
    /// `AccountNotFound`).
    pub async fn deposit(&self, input: DepositInput) -> RepositoryResult<DepositResult> {
        let request = DepositRequest {
            transaction_type: BankTransactionType::Deposit,
            created_by: input.created_by,
            bank_account_id: input.bank_account_id,
            trans_date: input.trans_date,
            memo: input.memo,
            rows: input.rows,
        };
        DepositService::validate_request(&request)?;

        let txn = self.db.begin().await?;

        let bank_account = bank_accounts::Entity::find_by_id(request.bank_account_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        let row_accounts: Vec<i64> = request.rows.iter().map(|row| row.account_id).collect();
        let linked: HashSet<i64> = bank_accounts::Entity::find()
            .select_only()
            .column(bank_accounts::Column::AccountId)
            .filter(bank_accounts::Column::AccountId.is_in(row_accounts))
            .into_tuple::<i64>()
            .all(&txn)
            .await?
            .into_iter()
            .collect();

        let prepared = match DepositService::prepare(
            &request,
            bank_account.as_ref().map(BankAccountInfo::from).as_ref(),
            |account_id| linked.contains(&account_id),
        ) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(bank_account_id = request.bank_account_id, error = %err, "Deposit rejected");
                return Err(err.into());
            }
        };

        let journal = post_prepared(&txn, &prepared.posting).await?;

        let previous = previous_balance(&txn, prepared.bank_account_id).await?;
        let balance = DepositService::next_running_balance(previous, prepared.total);

        let bank_transaction = bank_transactions::ActiveModel {
            journal_id: Set(journal.journal.id),
            bank_account_id: Set(prepared.bank_account_id),
            type_id: Set(BankTransactionType::Deposit.id()),
            amount: Set(prepared.total),
            balance: Set(balance),
            memo: Set(request.memo),
            created_by: Set(request.created_by),
            trans_date: Set(request.trans_date),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            bank_account_id = prepared.bank_account_id,
            journal_id = %journal.journal.id,
            amount = %prepared.total,
            balance = %balance,
            "Bank deposit stored"
        );

        Ok(DepositResult {
            journal,
            bank_transaction,
        })
    }

    /// Checks that a ledger account exists and backs no other bank account.
    async fn ensure_linkable<C>(conn: &C, account_id: i64, except: Option<i64>) -> RepositoryResult<()>
    where
        C: ConnectionTrait,
    {
        accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await?
            .ok_or(AccountingError::AccountNotFound(account_id))?;

        let linked = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::AccountId.eq(account_id))
            .one(conn)
            .await?;

        match linked {
            Some(other) if Some(other.id) != except => {
                Err(AccountingError::BankAccountProhibited(account_id).into())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_filter_by_type_and_number() {
        let filter = BankAccountFilter {
            type_id: Some(BankAccountType::Saving.id()),
            bank_number: Some("00-12".into()),
            ..Default::default()
        };

        let sql = bank_accounts::Entity::find()
            .filter(filter.to_filter().into_condition())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""bank_accounts"."type_id" = 3"#), "{sql}");
        assert!(sql.contains(r#"LOWER("bank_accounts"."bank_number") LIKE '%00-12%'"#), "{sql}");
    }

    #[test]
    fn test_model_converts_to_deposit_info() {
        let model = bank_accounts::Model {
            id: 7,
            account_id: 1100,
            type_id: 2,
            bank_number: None,
            inactive: false,
        };

        let info = BankAccountInfo::from(&model);
        assert_eq!(info.id, 7);
        assert_eq!(info.account_id, 1100);
        assert_eq!(info.type_id, 2);
    }
}
