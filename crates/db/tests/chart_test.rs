//! Integration tests for the chart of accounts.

mod common;

use rust_decimal_macros::dec;
use tallybook_core::AccountingError;
use tallybook_core::chart::AccountClassType;
use tallybook_core::ledger::{PostingRequest, PostingRow};
use tallybook_db::RepositoryError;
use tallybook_db::repositories::{
    AccountClassInput, AccountFilter, AccountGroupFilter, AccountGroupInput, ChartRepository,
    LedgerRepository,
};
use uuid::Uuid;

use common::{date, fresh_database, open_year, seed_chart};

fn domain(err: RepositoryError) -> AccountingError {
    match err {
        RepositoryError::Domain(err) => err,
        RepositoryError::Database(err) => panic!("unexpected database error: {err}"),
    }
}

fn group(name: &str, parent_id: Option<i64>, class_id: i64) -> AccountGroupInput {
    AccountGroupInput {
        name: name.to_string(),
        parent_id,
        class_id,
        inactive: false,
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_class_type_is_validated() {
    let db = fresh_database().await;
    let repo = ChartRepository::new(db.clone());

    let err = repo
        .create_class(AccountClassInput {
            name: "Bogus".into(),
            type_id: 7,
            inactive: false,
        })
        .await
        .unwrap_err();
    assert_eq!(domain(err), AccountingError::InvalidClassType(7));

    let class = repo
        .create_class(AccountClassInput {
            name: "Assets".into(),
            type_id: 1,
            inactive: false,
        })
        .await
        .unwrap();

    let err = repo
        .update_class(
            class.id,
            AccountClassInput {
                name: "Assets".into(),
                type_id: 0,
                inactive: false,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(domain(err), AccountingError::InvalidClassType(0));
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_child_group_inherits_parent_class() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    let repo = ChartRepository::new(db.clone());

    let child = repo
        .create_group(group("Bank Accounts", Some(chart.asset_group), chart.equity_class))
        .await
        .unwrap();

    let parent = repo.get_group(chart.asset_group).await.unwrap();
    assert_eq!(child.parent_id, Some(parent.id));
    assert_eq!(child.class_id, parent.class_id);

    // parent_id 0 means top level.
    let top = repo.create_group(group("Reserves", Some(0), chart.equity_class)).await.unwrap();
    assert_eq!(top.parent_id, None);
    assert_eq!(top.class_id, chart.equity_class);

    let children = repo
        .list_groups(&AccountGroupFilter {
            parent_id: Some(parent.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_grandchild_groups_are_rejected() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    let repo = ChartRepository::new(db.clone());

    let child = repo
        .create_group(group("Bank Accounts", Some(chart.asset_group), 0))
        .await
        .unwrap();

    let err = repo
        .create_group(group("Savings", Some(child.id), 0))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), AccountingError::InvalidParent(_)));

    let err = repo
        .create_group(group("Orphan", Some(424_242), 0))
        .await
        .unwrap_err();
    assert_eq!(domain(err), AccountingError::AccountGroupNotFound(424_242));

    // A parent with children cannot be moved under another group.
    let other = repo.create_group(group("Fixed Assets", None, chart.equity_class)).await.unwrap();
    let err = repo
        .update_group(chart.asset_group, group("Current Assets", Some(other.id), 0))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), AccountingError::InvalidParent(_)));

    // Nor be its own parent.
    let err = repo
        .update_group(other.id, group("Fixed Assets", Some(other.id), 0))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), AccountingError::InvalidParent(_)));
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_top_level_class_change_moves_children() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    let repo = ChartRepository::new(db.clone());

    let child = repo
        .create_group(group("Bank Accounts", Some(chart.asset_group), 0))
        .await
        .unwrap();

    repo.update_group(chart.asset_group, group("Current Assets", None, chart.equity_class))
        .await
        .unwrap();

    assert_eq!(repo.get_group(child.id).await.unwrap().class_id, chart.equity_class);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_accounts_filter_by_class_type() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    let repo = ChartRepository::new(db.clone());

    let assets = repo
        .list_accounts(&AccountFilter {
            class_type_id: Some(AccountClassType::Asset.id()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<i64> = assets.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![chart.cash, chart.bank, chart.receivable]);

    let found = repo
        .list_accounts(&AccountFilter {
            name: Some("retained".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, chart.retained_earnings);

    assert_eq!(
        repo.class_type_of(chart.revenue).await.unwrap(),
        Some(AccountClassType::Income)
    );
    assert_eq!(repo.class_type_of(987_654).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_delete_rules() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = ChartRepository::new(db.clone());

    LedgerRepository::new(db.clone())
        .post(&PostingRequest {
            created_by: Uuid::new_v4(),
            trans_date: date(2024, 2, 1),
            memo: "Float".into(),
            rows: vec![
                PostingRow::new(chart.cash, dec!(50)),
                PostingRow::new(chart.payable, dec!(-50)),
            ],
        })
        .await
        .unwrap();

    assert_eq!(
        domain(repo.delete_account(chart.cash).await.unwrap_err()),
        AccountingError::AccountHasTransaction(chart.cash)
    );
    assert_eq!(
        domain(repo.delete_group(chart.asset_group).await.unwrap_err()),
        AccountingError::AccountGroupInUse(chart.asset_group)
    );
    assert_eq!(
        domain(repo.delete_class(chart.equity_class).await.unwrap_err()),
        AccountingError::AccountClassInUse(chart.equity_class)
    );

    repo.delete_account(chart.expense).await.unwrap();
    assert_eq!(
        domain(repo.get_account(chart.expense).await.unwrap_err()),
        AccountingError::AccountNotFound(chart.expense)
    );
}
