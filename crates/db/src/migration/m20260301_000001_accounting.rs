//! Accounting schema migration.
//!
//! Creates the chart of accounts, general ledger preferences, fiscal years,
//! journals with their ledger lines, and the bank overlay. The ledger triggers
//! backstop the checks done in `tallybook-core`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(EXTENSIONS_SQL).await?;
        db.execute_unprepared(ACCOUNT_CLASSES_SQL).await?;
        db.execute_unprepared(ACCOUNT_GROUPS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 2: PREFERENCES & FISCAL YEARS
        // ============================================================
        db.execute_unprepared(GENERAL_LEDGER_PREFERENCES_SQL).await?;
        db.execute_unprepared(FISCAL_YEARS_SQL).await?;

        // ============================================================
        // PART 3: JOURNALS & LEDGER
        // ============================================================
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(GENERAL_LEDGERS_SQL).await?;

        // ============================================================
        // PART 4: BANK
        // ============================================================
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & SEED
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;
        db.execute_unprepared(SEED_PREFERENCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const EXTENSIONS_SQL: &str = r"
CREATE EXTENSION IF NOT EXISTS btree_gist;
";

const ACCOUNT_CLASSES_SQL: &str = r"
CREATE TABLE account_classes (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    type_id INTEGER NOT NULL CHECK (type_id BETWEEN 1 AND 6),
    inactive BOOLEAN NOT NULL DEFAULT FALSE
);
";

const ACCOUNT_GROUPS_SQL: &str = r"
CREATE TABLE account_groups (
    id BIGSERIAL PRIMARY KEY,
    parent_id BIGINT REFERENCES account_groups(id),
    class_id BIGINT NOT NULL REFERENCES account_classes(id),
    name VARCHAR(255) NOT NULL,
    inactive BOOLEAN NOT NULL DEFAULT FALSE,

    CONSTRAINT chk_group_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_account_groups_parent ON account_groups(parent_id);
CREATE INDEX idx_account_groups_class ON account_groups(class_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    group_id BIGINT NOT NULL REFERENCES account_groups(id),
    inactive BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX idx_accounts_group ON accounts(group_id);
";

const GENERAL_LEDGER_PREFERENCES_SQL: &str = r"
CREATE TABLE general_ledger_preferences (
    id INTEGER PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    account_id BIGINT REFERENCES accounts(id)
);
";

const FISCAL_YEARS_SQL: &str = r"
CREATE TABLE fiscal_years (
    id BIGSERIAL PRIMARY KEY,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    closed BOOLEAN NOT NULL DEFAULT FALSE,
    closed_by UUID,
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_fiscal_year_dates CHECK (end_date > start_date),
    CONSTRAINT excl_fiscal_year_overlap EXCLUDE USING gist (
        daterange(start_date, end_date, '[]') WITH &&
    )
);

CREATE INDEX idx_fiscal_years_open ON fiscal_years(start_date) WHERE closed = FALSE;
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount >= 0),
    trans_date DATE NOT NULL,
    memo TEXT NOT NULL DEFAULT '',
    is_closing BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    voided_at TIMESTAMPTZ
);

CREATE INDEX idx_journals_trans_date ON journals(trans_date);
";

const GENERAL_LEDGERS_SQL: &str = r"
CREATE TABLE general_ledgers (
    id UUID PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journals(id),
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount <> 0),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_general_ledgers_journal ON general_ledgers(journal_id);
CREATE INDEX idx_general_ledgers_account ON general_ledgers(account_id);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id BIGSERIAL PRIMARY KEY,
    account_id BIGINT NOT NULL UNIQUE REFERENCES accounts(id),
    type_id INTEGER NOT NULL CHECK (type_id BETWEEN 1 AND 4),
    bank_number VARCHAR(100),
    inactive BOOLEAN NOT NULL DEFAULT FALSE
);
";

const BANK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE bank_transactions (
    id BIGSERIAL PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journals(id),
    bank_account_id BIGINT NOT NULL REFERENCES bank_accounts(id),
    type_id INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    balance NUMERIC(19, 4) NOT NULL,
    memo TEXT NOT NULL DEFAULT '',
    created_by UUID NOT NULL,
    trans_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_bank_transactions_account ON bank_transactions(bank_account_id, id DESC);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_journal_balance
-- Lines of a regular journal must sum to zero at commit
-- ============================================================
CREATE OR REPLACE FUNCTION check_journal_balance()
RETURNS TRIGGER AS $$
DECLARE
    closing BOOLEAN;
    total NUMERIC(19, 4);
BEGIN
    SELECT is_closing INTO closing
    FROM journals
    WHERE id = NEW.journal_id;

    IF NOT closing THEN
        SELECT COALESCE(SUM(amount), 0) INTO total
        FROM general_ledgers
        WHERE journal_id = NEW.journal_id;

        IF total <> 0 THEN
            RAISE EXCEPTION 'Journal % is not balanced. Sum: %', NEW.journal_id, total;
        END IF;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_journal_balance
AFTER INSERT ON general_ledgers
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_journal_balance();

-- ============================================================
-- FUNCTION: prevent_ledger_modification
-- Ledger lines are written once with their journal
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_ledger_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'General ledger lines cannot be modified. Void the journal instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_ledger_modification
BEFORE UPDATE OR DELETE ON general_ledgers
FOR EACH ROW
EXECUTE FUNCTION prevent_ledger_modification();
";

const SEED_PREFERENCES_SQL: &str = r"
INSERT INTO general_ledger_preferences (id, name, account_id) VALUES
    (1, 'Retained Earnings', NULL),
    (2, 'Profit/Loss Year', NULL),
    (3, 'Exchange Variances', NULL),
    (4, 'Bank Charges', NULL);
";

const DROP_ALL_SQL: &str = r"
-- Drop triggers and functions
DROP TRIGGER IF EXISTS trg_prevent_ledger_modification ON general_ledgers;
DROP TRIGGER IF EXISTS trg_check_journal_balance ON general_ledgers;
DROP FUNCTION IF EXISTS prevent_ledger_modification();
DROP FUNCTION IF EXISTS check_journal_balance();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS bank_transactions CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS general_ledgers CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS fiscal_years CASCADE;
DROP TABLE IF EXISTS general_ledger_preferences CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS account_groups CASCADE;
DROP TABLE IF EXISTS account_classes CASCADE;
";
