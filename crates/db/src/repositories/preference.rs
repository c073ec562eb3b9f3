//! General ledger preference repository.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tallybook_core::AccountingError;
use tallybook_core::preference::{
    GeneralLedgerRole, PreferenceAssignment, ensure_valid_preferences, retained_earnings_account,
    validate_preferences,
};
use tallybook_shared::FieldError;
use tracing::info;

use super::RepositoryResult;
use super::chart::class_type_ids;
use crate::entities::general_ledger_preferences;

/// Resolves the retained earnings account, checking it is a balance-sheet account.
pub(crate) async fn load_retained_earnings<C>(conn: &C) -> RepositoryResult<i64>
where
    C: ConnectionTrait,
{
    let role = GeneralLedgerRole::RetainedEarnings;
    let preference = general_ledger_preferences::Entity::find_by_id(role.id())
        .one(conn)
        .await?
        .ok_or(AccountingError::PreferenceNotFound(role.id()))?;

    let account_id = preference.account_id.filter(|id| *id != 0);
    let class_type = match account_id {
        Some(id) => class_type_ids(conn, &[id]).await?.get(&id).copied(),
        None => None,
    };

    Ok(retained_earnings_account(account_id, class_type)?)
}

/// General ledger preference repository.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    db: DatabaseConnection,
}

impl PreferenceRepository {
    /// Creates a new preference repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every preference ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<general_ledger_preferences::Model>> {
        let preferences = general_ledger_preferences::Entity::find()
            .order_by_asc(general_ledger_preferences::Column::Id)
            .all(&self.db)
            .await?;
        Ok(preferences)
    }

    /// Gets one preference.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceNotFound` if there is no such preference.
    pub async fn get(&self, id: i32) -> RepositoryResult<general_ledger_preferences::Model> {
        let preference = general_ledger_preferences::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::PreferenceNotFound(id))?;
        Ok(preference)
    }

    /// Checks a batch of assignments without writing anything.
    ///
    /// An empty result means the batch is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn validate(
        &self,
        assignments: &[PreferenceAssignment],
    ) -> RepositoryResult<Vec<FieldError>> {
        let account_ids: Vec<i64> = assignments.iter().filter_map(PreferenceAssignment::account).collect();
        let types = class_type_ids(&self.db, &account_ids).await?;

        Ok(validate_preferences(assignments, |id| types.get(&id).copied()))
    }

    /// Validates and stores a batch of assignments in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with every field error if any assignment is invalid.
    pub async fn update(
        &self,
        assignments: &[PreferenceAssignment],
    ) -> RepositoryResult<Vec<general_ledger_preferences::Model>> {
        let txn = self.db.begin().await?;

        let account_ids: Vec<i64> = assignments.iter().filter_map(PreferenceAssignment::account).collect();
        let types = class_type_ids(&txn, &account_ids).await?;
        ensure_valid_preferences(assignments, |id| types.get(&id).copied())?;

        for assignment in assignments {
            general_ledger_preferences::Entity::update_many()
                .col_expr(
                    general_ledger_preferences::Column::AccountId,
                    Expr::value(assignment.account()),
                )
                .filter(general_ledger_preferences::Column::Id.eq(assignment.id))
                .exec(&txn)
                .await?;
        }

        let preferences = general_ledger_preferences::Entity::find()
            .order_by_asc(general_ledger_preferences::Column::Id)
            .all(&txn)
            .await?;

        txn.commit().await?;

        info!(count = assignments.len(), "General ledger preferences updated");
        Ok(preferences)
    }
}
