//! Integration tests for posting and voiding journals.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use tallybook_core::AccountingError;
use tallybook_core::ledger::{PostingRequest, PostingRow};
use tallybook_db::RepositoryError;
use tallybook_db::entities::{general_ledgers, journals};
use tallybook_db::repositories::LedgerRepository;
use uuid::Uuid;

use common::{date, fresh_database, open_year, seed_chart};

fn request(rows: Vec<PostingRow>) -> PostingRequest {
    PostingRequest {
        created_by: Uuid::new_v4(),
        trans_date: date(2024, 3, 15),
        memo: "Office supplies".to_string(),
        rows,
    }
}

fn domain(err: RepositoryError) -> AccountingError {
    match err {
        RepositoryError::Domain(err) => err,
        RepositoryError::Database(err) => panic!("unexpected database error: {err}"),
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_balanced_posting_is_stored() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = LedgerRepository::new(db.clone());

    let req = request(vec![
        PostingRow::new(chart.expense, dec!(100)),
        PostingRow::new(chart.cash, dec!(-100)),
    ]);
    let posted = repo.post(&req).await.unwrap().unwrap();

    assert_eq!(posted.journal.amount, dec!(100));
    assert!(!posted.journal.is_closing);
    assert_eq!(posted.lines.len(), 2);
    assert!(posted.lines.iter().all(|l| l.created_by == req.created_by));

    let stored = repo.get_journal(posted.journal.id).await.unwrap();
    let total: Decimal = stored.lines.iter().map(|l| l.amount).sum();
    assert_eq!(total, Decimal::ZERO);
    assert_eq!(stored.lines[0].account_id, chart.expense);
    assert!(repo.account_has_transaction(chart.cash).await.unwrap());
    assert!(!repo.account_has_transaction(chart.revenue).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_unbalanced_posting_writes_nothing() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = LedgerRepository::new(db.clone());

    let err = repo
        .post(&request(vec![
            PostingRow::new(chart.expense, dec!(100)),
            PostingRow::new(chart.cash, dec!(-40)),
        ]))
        .await
        .unwrap_err();

    assert_eq!(domain(err), AccountingError::TransactionNotBalance { total: dec!(60) });
    assert_eq!(journals::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(general_ledgers::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_sub_cent_rows_are_rejected_before_storage() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = LedgerRepository::new(db.clone());

    let err = repo
        .post(&request(vec![
            PostingRow::new(chart.expense, dec!(0.00006)),
            PostingRow::new(chart.revenue, dec!(0.00006)),
            PostingRow::new(chart.cash, dec!(-0.00012)),
        ]))
        .await
        .unwrap_err();

    assert_eq!(domain(err), AccountingError::AmountOutOfRange(dec!(0.00006)));
    assert_eq!(journals::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_posting_outside_open_year_is_prohibited() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2023).await;
    let repo = LedgerRepository::new(db.clone());

    let err = repo
        .post(&request(vec![
            PostingRow::new(chart.expense, dec!(10)),
            PostingRow::new(chart.cash, dec!(-10)),
        ]))
        .await
        .unwrap_err();

    assert_eq!(domain(err), AccountingError::PostingProhibited(date(2024, 3, 15)));
    assert_eq!(journals::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_all_zero_rows_create_nothing() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = LedgerRepository::new(db.clone());

    let posted = repo
        .post(&request(vec![
            PostingRow::new(chart.expense, dec!(0)),
            PostingRow::new(chart.cash, dec!(0)),
        ]))
        .await
        .unwrap();

    assert!(posted.is_none());
    assert_eq!(journals::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_unknown_account_rolls_back() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = LedgerRepository::new(db.clone());

    let err = repo
        .post(&request(vec![
            PostingRow::new(chart.expense, dec!(5)),
            PostingRow::new(999_999, dec!(-5)),
        ]))
        .await
        .unwrap_err();

    assert_eq!(domain(err), AccountingError::AccountNotFound(999_999));
    assert_eq!(journals::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_void_hides_journal_once() {
    let db = fresh_database().await;
    let chart = seed_chart(&db).await;
    open_year(&db, 2024).await;
    let repo = LedgerRepository::new(db.clone());

    let posted = repo
        .post(&request(vec![
            PostingRow::new(chart.expense, dec!(25)),
            PostingRow::new(chart.cash, dec!(-25)),
        ]))
        .await
        .unwrap()
        .unwrap();
    let id = posted.journal.id;

    let voided = repo.void_journal(id).await.unwrap();
    assert!(voided.voided_at.is_some());

    assert_eq!(domain(repo.get_journal(id).await.unwrap_err()), AccountingError::JournalNotFound(id));
    assert_eq!(
        domain(repo.void_journal(id).await.unwrap_err()),
        AccountingError::JournalAlreadyVoided(id)
    );

    // Lines stay in place.
    assert_eq!(general_ledgers::Entity::find().count(&db).await.unwrap(), 2);

    let missing = Uuid::new_v4();
    assert_eq!(
        domain(repo.void_journal(missing).await.unwrap_err()),
        AccountingError::JournalNotFound(missing)
    );
}
