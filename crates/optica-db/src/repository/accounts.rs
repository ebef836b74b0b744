//! # Account Repository
//!
//! Chart-of-accounts access. The ledger consumes accounts, it never edits
//! them; the only write here is the first-run seeding of the system
//! accounts the posting rules depend on.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use optica_core::posting::default_account_specs;
use optica_core::types::{Account, AccountType, ChartOfAccounts};

/// Repository for chart-of-accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

/// Raw row shape; `account_type` is parsed on the way out.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    code: String,
    name: String,
    account_type: String,
    is_system: i64,
}

impl AccountRow {
    fn into_account(self) -> DbResult<Account> {
        let account_type = AccountType::parse(&self.account_type).ok_or_else(|| {
            DbError::Internal(format!("unknown account type: {}", self.account_type))
        })?;
        Ok(Account {
            id: self.id,
            code: self.code,
            name: self.name,
            account_type,
            is_system: self.is_system != 0,
        })
    }
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account (setup/seeding only).
    pub async fn insert(&self, account: &Account) -> DbResult<()> {
        debug!(code = %account.code, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (id, code, name, account_type, is_system)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(account.is_system as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an account by business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, account_type, is_system
            FROM accounts
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Lists every account, ordered by code.
    pub async fn list_all(&self) -> DbResult<Vec<Account>> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, account_type, is_system
            FROM accounts
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    /// Loads the full chart as an in-memory snapshot for the posting
    /// engine.
    pub async fn load_chart(&self) -> DbResult<ChartOfAccounts> {
        Ok(ChartOfAccounts::new(self.list_all().await?))
    }

    /// Seeds any missing system accounts the posting rules reference.
    ///
    /// Idempotent: existing codes are left untouched. Returns how many
    /// accounts were created.
    pub async fn ensure_default_accounts(&self) -> DbResult<usize> {
        let mut created = 0;

        for (code, name, account_type) in default_account_specs() {
            let existing = self.get_by_code(code).await?;
            if existing.is_some() {
                continue;
            }

            self.insert(&Account {
                id: Uuid::new_v4().to_string(),
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                is_system: true,
            })
            .await?;
            created += 1;
        }

        if created > 0 {
            info!(created, "Seeded default chart of accounts");
        }

        Ok(created)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
