//! Database seeder for Tallybook development and testing.
//!
//! Seeds a small chart of accounts covering all six class types, a bank
//! account, the retained earnings preference and an open fiscal year for the
//! current calendar year, then prints a bearer token for the dev user.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use tallybook_core::AccountingError;
use tallybook_core::bank::BankAccountType;
use tallybook_core::preference::{GeneralLedgerRole, PreferenceAssignment};
use tallybook_db::{
    AccountClassFilter, AccountClassInput, AccountGroupInput, AccountInput, BankAccountInput,
    BankRepository, ChartRepository, FiscalYearRepository, PreferenceRepository,
};
use tallybook_shared::{AppConfig, JwtConfig, JwtService};
use uuid::Uuid;

/// Dev user recorded as the creator of everything posted with the printed token.
const DEV_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

/// Ledger accounts created by the chart seed that later seeds refer to.
struct SeededAccounts {
    bank: i64,
    retained_earnings: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = tallybook_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding chart of accounts...");
    if let Some(accounts) = seed_chart(&ChartRepository::new(db.clone())).await? {
        println!("Seeding bank account...");
        seed_bank_account(&BankRepository::new(db.clone()), accounts.bank).await?;

        println!("Seeding general ledger preferences...");
        seed_preferences(&PreferenceRepository::new(db.clone()), accounts.retained_earnings)
            .await?;
    }

    println!("Seeding fiscal year...");
    seed_fiscal_year(&FiscalYearRepository::new(db.clone())).await?;

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: 60 * 24,
    });
    let token = jwt_service
        .generate_access_token(DEV_USER_ID, "accountant")
        .context("Failed to sign dev token")?;

    println!("Seeding complete!");
    println!("  Dev user:  {DEV_USER_ID}");
    println!("  Dev token: {token}");

    Ok(())
}

/// Seeds classes, groups and accounts. Returns `None` if a chart already exists.
async fn seed_chart(chart: &ChartRepository) -> anyhow::Result<Option<SeededAccounts>> {
    if !chart.list_classes(&AccountClassFilter::default()).await?.is_empty() {
        println!("  Chart already exists, skipping...");
        return Ok(None);
    }

    let mut classes = Vec::new();
    for (name, type_id) in [
        ("Assets", 1),
        ("Liabilities", 2),
        ("Equity", 3),
        ("Income", 4),
        ("Cost of Goods Sold", 5),
        ("Expenses", 6),
    ] {
        let class = chart
            .create_class(AccountClassInput {
                name: name.to_string(),
                type_id,
                inactive: false,
            })
            .await?;
        classes.push(class.id);
    }

    let group = |name: &'static str, parent_id: Option<i64>, class_id: i64| async move {
        chart
            .create_group(AccountGroupInput {
                name: name.to_string(),
                parent_id,
                class_id,
                inactive: false,
            })
            .await
            .map(|group| group.id)
    };

    let current_assets = group("Current Assets", None, classes[0]).await?;
    let cash_and_bank = group("Cash and Bank", Some(current_assets), classes[0]).await?;
    let current_liabilities = group("Current Liabilities", None, classes[1]).await?;
    let capital = group("Capital", None, classes[2]).await?;
    let sales = group("Sales", None, classes[3]).await?;
    let purchases = group("Purchases", None, classes[4]).await?;
    let operating = group("Operating Expenses", None, classes[5]).await?;

    let account = |name: &'static str, group_id: i64| async move {
        chart
            .create_account(AccountInput {
                name: name.to_string(),
                group_id,
                inactive: false,
            })
            .await
            .map(|account| account.id)
    };

    let bank = account("Main Bank", cash_and_bank).await?;
    account("Petty Cash", cash_and_bank).await?;
    account("Accounts Receivable", current_assets).await?;
    account("Accounts Payable", current_liabilities).await?;
    account("Share Capital", capital).await?;
    let retained_earnings = account("Retained Earnings", capital).await?;
    account("Sales Revenue", sales).await?;
    account("Cost of Goods Purchased", purchases).await?;
    account("Office Supplies", operating).await?;
    account("Bank Charges", operating).await?;

    println!("  Created 6 classes, 7 groups and 10 accounts");
    Ok(Some(SeededAccounts {
        bank,
        retained_earnings,
    }))
}

async fn seed_bank_account(bank: &BankRepository, account_id: i64) -> anyhow::Result<()> {
    let created = bank
        .create_account(BankAccountInput {
            account_id,
            type_id: BankAccountType::Chequing.id(),
            bank_number: Some("001-0000001".to_string()),
            inactive: false,
        })
        .await?;
    println!("  Created bank account {}", created.id);
    Ok(())
}

async fn seed_preferences(
    preferences: &PreferenceRepository,
    retained_earnings: i64,
) -> anyhow::Result<()> {
    preferences
        .update(&[PreferenceAssignment {
            id: GeneralLedgerRole::RetainedEarnings.id(),
            account_id: Some(retained_earnings),
        }])
        .await?;
    println!("  Bound retained earnings to account {retained_earnings}");
    Ok(())
}

async fn seed_fiscal_year(fiscal_years: &FiscalYearRepository) -> anyhow::Result<()> {
    let year = Utc::now().year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1).context("Invalid start date")?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).context("Invalid end date")?;

    match fiscal_years.create(start, end).await {
        Ok(created) => {
            println!("  Created fiscal year {} ({start} to {end})", created.id);
            Ok(())
        }
        Err(err)
            if matches!(
                err.as_domain(),
                Some(AccountingError::OverlapsExistingPeriod { .. })
            ) =>
        {
            println!("  Fiscal year {year} already exists, skipping...");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
