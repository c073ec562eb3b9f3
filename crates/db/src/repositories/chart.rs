//! Chart of accounts repository: classes, groups and accounts.
//!
//! Group writes apply the two-level nesting rules from
//! [`tallybook_core::chart::resolve_placement`] while holding a shared lock on
//! the parent row, so a parent cannot become a child between the check and
//! the write.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tallybook_core::AccountingError;
use tallybook_core::chart::{AccountClassType, GroupDraft, GroupNode, resolve_placement};
use tracing::info;

use super::RepositoryResult;
use super::ledger::account_has_lines;
use crate::entities::{account_classes, account_groups, accounts};
use crate::filter::Filter;

/// Input for creating or updating an account class.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountClassInput {
    /// Class name.
    pub name: String,
    /// One of the six class type ids.
    pub type_id: i32,
    /// Whether the class is hidden from pickers.
    #[serde(default)]
    pub inactive: bool,
}

/// Input for creating or updating an account group.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountGroupInput {
    /// Group name.
    pub name: String,
    /// Parent group; `None` or `0` for a top-level group.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Class for top-level groups. Child groups take their parent's class.
    pub class_id: i64,
    /// Whether the group is hidden from pickers.
    #[serde(default)]
    pub inactive: bool,
}

/// Input for creating or updating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInput {
    /// Account name.
    pub name: String,
    /// Owning group.
    pub group_id: i64,
    /// Whether the account is hidden from pickers.
    #[serde(default)]
    pub inactive: bool,
}

/// Filter options for listing account classes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountClassFilter {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Exact class type.
    pub type_id: Option<i32>,
    /// Filter by inactive flag.
    pub inactive: Option<bool>,
}

impl AccountClassFilter {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .like(account_classes::Column::Name, self.name.as_deref())
            .eq(account_classes::Column::TypeId, self.type_id)
            .eq(account_classes::Column::Inactive, self.inactive)
    }
}

/// Filter options for listing account groups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountGroupFilter {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Exact class.
    pub class_id: Option<i64>,
    /// Children of this group.
    pub parent_id: Option<i64>,
    /// `true` for top-level groups only, `false` for child groups only.
    pub top_level: Option<bool>,
    /// Filter by inactive flag.
    pub inactive: Option<bool>,
}

impl AccountGroupFilter {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .like(account_groups::Column::Name, self.name.as_deref())
            .eq(account_groups::Column::ClassId, self.class_id)
            .eq(account_groups::Column::ParentId, self.parent_id)
            .is_null(account_groups::Column::ParentId, self.top_level)
            .eq(account_groups::Column::Inactive, self.inactive)
    }
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Exact group.
    pub group_id: Option<i64>,
    /// Class type of the account's class, resolved through its group.
    pub class_type_id: Option<i32>,
    /// Filter by inactive flag.
    pub inactive: Option<bool>,
}

impl AccountFilter {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .like(accounts::Column::Name, self.name.as_deref())
            .eq(accounts::Column::GroupId, self.group_id)
            .eq(account_classes::Column::TypeId, self.class_type_id)
            .eq(accounts::Column::Inactive, self.inactive)
    }
}

impl From<&account_groups::Model> for GroupNode {
    fn from(model: &account_groups::Model) -> Self {
        Self {
            id: model.id,
            parent_id: model.parent_id,
            class_id: model.class_id,
        }
    }
}

/// Resolves accounts to the `type_id` of their class (Account → Group → Class).
///
/// Accounts whose chain does not resolve are absent from the map.
pub(crate) async fn class_type_ids<C>(
    conn: &C,
    account_ids: &[i64],
) -> Result<HashMap<i64, i32>, DbErr>
where
    C: ConnectionTrait,
{
    if account_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, i32)> = accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .column(account_classes::Column::TypeId)
        .join(JoinType::InnerJoin, accounts::Relation::AccountGroups.def())
        .join(JoinType::InnerJoin, account_groups::Relation::AccountClasses.def())
        .filter(accounts::Column::Id.is_in(account_ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Chart of accounts repository.
#[derive(Debug, Clone)]
pub struct ChartRepository {
    db: DatabaseConnection,
}

impl ChartRepository {
    /// Creates a new chart repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========== Classes ==========

    /// Creates an account class.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClassType` unless `type_id` is one of the six class types.
    pub async fn create_class(
        &self,
        input: AccountClassInput,
    ) -> RepositoryResult<account_classes::Model> {
        AccountClassType::try_from_id(input.type_id)?;

        let class = account_classes::ActiveModel {
            name: Set(input.name),
            type_id: Set(input.type_id),
            inactive: Set(input.inactive),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(class_id = class.id, type_id = class.type_id, "Account class created");
        Ok(class)
    }

    /// Replaces the name, type and inactive flag of an account class.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClassType` or `AccountClassNotFound`.
    pub async fn update_class(
        &self,
        id: i64,
        input: AccountClassInput,
    ) -> RepositoryResult<account_classes::Model> {
        AccountClassType::try_from_id(input.type_id)?;

        let class = self.get_class(id).await?;
        let mut active: account_classes::ActiveModel = class.into();
        active.name = Set(input.name);
        active.type_id = Set(input.type_id);
        active.inactive = Set(input.inactive);

        let class = active.update(&self.db).await?;
        info!(class_id = id, "Account class updated");
        Ok(class)
    }

    /// Finds an account class by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountClassNotFound` if there is no such class.
    pub async fn get_class(&self, id: i64) -> RepositoryResult<account_classes::Model> {
        let class = account_classes::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::AccountClassNotFound(id))?;
        Ok(class)
    }

    /// Lists account classes ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_classes(
        &self,
        filter: &AccountClassFilter,
    ) -> RepositoryResult<Vec<account_classes::Model>> {
        let classes = account_classes::Entity::find()
            .filter(filter.to_filter().into_condition())
            .order_by_asc(account_classes::Column::Id)
            .all(&self.db)
            .await?;
        Ok(classes)
    }

    /// Deletes an account class that owns no groups.
    ///
    /// # Errors
    ///
    /// Returns `AccountClassNotFound` or `AccountClassInUse`.
    pub async fn delete_class(&self, id: i64) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;

        account_classes::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::AccountClassNotFound(id))?;

        let groups = account_groups::Entity::find()
            .filter(account_groups::Column::ClassId.eq(id))
            .count(&txn)
            .await?;
        if groups > 0 {
            return Err(AccountingError::AccountClassInUse(id).into());
        }

        account_classes::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(class_id = id, "Account class deleted");
        Ok(())
    }

    // ========== Groups ==========

    /// Creates an account group.
    ///
    /// A child group takes its parent's class; a top-level group keeps the
    /// requested one.
    ///
    /// # Errors
    ///
    /// Returns `AccountGroupNotFound` for a missing parent, `InvalidParent` if
    /// the parent is itself a child, or `AccountClassNotFound` for a top-level
    /// group with an unknown class.
    pub async fn create_group(
        &self,
        input: AccountGroupInput,
    ) -> RepositoryResult<account_groups::Model> {
        let draft = GroupDraft {
            id: None,
            parent_id: input.parent_id,
            class_id: input.class_id,
            has_children: false,
        };

        let txn = self.db.begin().await?;

        let parent = Self::load_parent(&txn, draft.requested_parent()).await?;
        let placement = resolve_placement(&draft, parent.as_ref())?;
        if placement.parent_id.is_none() {
            Self::ensure_class_exists(&txn, placement.class_id).await?;
        }

        let group = account_groups::ActiveModel {
            parent_id: Set(placement.parent_id),
            class_id: Set(placement.class_id),
            name: Set(input.name),
            inactive: Set(input.inactive),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            group_id = group.id,
            parent_id = ?group.parent_id,
            class_id = group.class_id,
            "Account group created"
        );
        Ok(group)
    }

    /// Updates an account group.
    ///
    /// When a top-level group changes class, its children follow.
    ///
    /// # Errors
    ///
    /// Everything [`Self::create_group`] returns, plus `AccountGroupNotFound`
    /// for `id` itself and `InvalidParent` when the group would parent itself
    /// or already owns children and is being moved under a parent.
    pub async fn update_group(
        &self,
        id: i64,
        input: AccountGroupInput,
    ) -> RepositoryResult<account_groups::Model> {
        let txn = self.db.begin().await?;

        let existing = account_groups::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::AccountGroupNotFound(id))?;

        let children = account_groups::Entity::find()
            .filter(account_groups::Column::ParentId.eq(id))
            .count(&txn)
            .await?;

        let draft = GroupDraft {
            id: Some(id),
            parent_id: input.parent_id,
            class_id: input.class_id,
            has_children: children > 0,
        };

        let parent = Self::load_parent(&txn, draft.requested_parent()).await?;
        let placement = resolve_placement(&draft, parent.as_ref())?;
        if placement.parent_id.is_none() {
            Self::ensure_class_exists(&txn, placement.class_id).await?;
        }

        let class_changed = existing.class_id != placement.class_id;
        let mut active: account_groups::ActiveModel = existing.into();
        active.parent_id = Set(placement.parent_id);
        active.class_id = Set(placement.class_id);
        active.name = Set(input.name);
        active.inactive = Set(input.inactive);
        let group = active.update(&txn).await?;

        if class_changed && children > 0 {
            account_groups::Entity::update_many()
                .col_expr(account_groups::Column::ClassId, Expr::value(placement.class_id))
                .filter(account_groups::Column::ParentId.eq(id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        info!(
            group_id = id,
            parent_id = ?group.parent_id,
            class_id = group.class_id,
            "Account group updated"
        );
        Ok(group)
    }

    /// Finds an account group by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountGroupNotFound` if there is no such group.
    pub async fn get_group(&self, id: i64) -> RepositoryResult<account_groups::Model> {
        let group = account_groups::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::AccountGroupNotFound(id))?;
        Ok(group)
    }

    /// Lists account groups ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_groups(
        &self,
        filter: &AccountGroupFilter,
    ) -> RepositoryResult<Vec<account_groups::Model>> {
        let groups = account_groups::Entity::find()
            .filter(filter.to_filter().into_condition())
            .order_by_asc(account_groups::Column::Id)
            .all(&self.db)
            .await?;
        Ok(groups)
    }

    /// Deletes an account group with no child groups and no accounts.
    ///
    /// # Errors
    ///
    /// Returns `AccountGroupNotFound` or `AccountGroupInUse`.
    pub async fn delete_group(&self, id: i64) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;

        account_groups::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::AccountGroupNotFound(id))?;

        let children = account_groups::Entity::find()
            .filter(account_groups::Column::ParentId.eq(id))
            .count(&txn)
            .await?;
        let members = accounts::Entity::find()
            .filter(accounts::Column::GroupId.eq(id))
            .count(&txn)
            .await?;
        if children > 0 || members > 0 {
            return Err(AccountingError::AccountGroupInUse(id).into());
        }

        account_groups::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(group_id = id, "Account group deleted");
        Ok(())
    }

    // ========== Accounts ==========

    /// Creates an account under an existing group.
    ///
    /// # Errors
    ///
    /// Returns `AccountGroupNotFound` if the group does not exist.
    pub async fn create_account(&self, input: AccountInput) -> RepositoryResult<accounts::Model> {
        self.get_group(input.group_id).await?;

        let account = accounts::ActiveModel {
            name: Set(input.name),
            group_id: Set(input.group_id),
            inactive: Set(input.inactive),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(account_id = account.id, group_id = account.group_id, "Account created");
        Ok(account)
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `AccountGroupNotFound`.
    pub async fn update_account(
        &self,
        id: i64,
        input: AccountInput,
    ) -> RepositoryResult<accounts::Model> {
        let account = self.get_account(id).await?;
        if account.group_id != input.group_id {
            self.get_group(input.group_id).await?;
        }

        let mut active: accounts::ActiveModel = account.into();
        active.name = Set(input.name);
        active.group_id = Set(input.group_id);
        active.inactive = Set(input.inactive);

        let account = active.update(&self.db).await?;
        info!(account_id = id, "Account updated");
        Ok(account)
    }

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if there is no such account.
    pub async fn get_account(&self, id: i64) -> RepositoryResult<accounts::Model> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountingError::AccountNotFound(id))?;
        Ok(account)
    }

    /// Lists accounts ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: &AccountFilter,
    ) -> RepositoryResult<Vec<accounts::Model>> {
        let accounts = accounts::Entity::find()
            .join(JoinType::InnerJoin, accounts::Relation::AccountGroups.def())
            .join(JoinType::InnerJoin, account_groups::Relation::AccountClasses.def())
            .filter(filter.to_filter().into_condition())
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Deletes an account that no ledger line references.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `AccountHasTransaction`.
    pub async fn delete_account(&self, id: i64) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;

        accounts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountingError::AccountNotFound(id))?;

        if account_has_lines(&txn, id).await? {
            return Err(AccountingError::AccountHasTransaction(id).into());
        }

        accounts::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(account_id = id, "Account deleted");
        Ok(())
    }

    /// Resolves an account to its class type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn class_type_of(&self, account_id: i64) -> RepositoryResult<Option<AccountClassType>> {
        let types = class_type_ids(&self.db, &[account_id]).await?;
        Ok(types.get(&account_id).copied().and_then(AccountClassType::from_id))
    }

    async fn load_parent<C>(conn: &C, parent_id: Option<i64>) -> Result<Option<GroupNode>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };

        let parent = account_groups::Entity::find_by_id(parent_id)
            .lock_shared()
            .one(conn)
            .await?;
        Ok(parent.as_ref().map(GroupNode::from))
    }

    async fn ensure_class_exists<C>(conn: &C, class_id: i64) -> RepositoryResult<()>
    where
        C: ConnectionTrait,
    {
        account_classes::Entity::find_by_id(class_id)
            .one(conn)
            .await?
            .ok_or(AccountingError::AccountClassNotFound(class_id))?;
        Ok(())
    }
}
