use crate::domain::{self, AccountRepository, NewAccount};
use futures::{Stream, TryStreamExt};
use sqlx::{prelude::FromRow, PgPool, QueryBuilder};
use std::iter::once;
use time::OffsetDateTime;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for PgAccountRepository {
    type Error = sqlx::Error;

    #[instrument(skip(self))]
    async fn create_account(&self, account: NewAccount) -> Result<domain::Account, Self::Error> {
        let id = QueryBuilder::new(
            "INSERT INTO account (first_name, last_name, number, balance, created_at) ",
        )
        .push_values(once(&account), |mut q, account| {
            q.push_bind(account.first_name.as_str())
                .push_bind(account.last_name.as_str())
                .push_bind(account.number)
                .push_bind(account.balance)
                .push_bind(account.created_at);
        })
        .push(" RETURNING id")
        .build_query_scalar::<i64>()
        .fetch_one(&self.pool)
        .await?;

        debug!(id, number = account.number, "inserted account");
        Ok(account.with_id(id))
    }

    #[instrument(skip(self))]
    async fn accounts(
        &self,
    ) -> Result<impl Stream<Item = Result<domain::Account, Self::Error>> + Send, Self::Error> {
        let accounts = sqlx::query_as::<_, Account>("SELECT * FROM account")
            .fetch(&self.pool)
            .map_ok(domain::Account::from);
        Ok(accounts)
    }

    #[instrument(skip(self))]
    async fn account_by_id(&self, id: i64) -> Result<Option<domain::Account>, Self::Error> {
        let account = QueryBuilder::new("SELECT * FROM account WHERE id = ")
            .push_bind(id)
            .build_query_as::<Account>()
            .fetch_optional(&self.pool)
            .await?;
        let account = account.map(domain::Account::from);
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: i64) -> Result<bool, Self::Error> {
        let result = QueryBuilder::new("DELETE FROM account WHERE id = ")
            .push_bind(id)
            .build()
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            debug!(id, "deleted account");
        }
        Ok(deleted)
    }

    #[instrument(skip(self, account), fields(id = account.id))]
    async fn update_account(&self, account: &domain::Account) -> Result<bool, Self::Error> {
        let result = QueryBuilder::new("UPDATE account SET first_name = ")
            .push_bind(account.first_name.as_str())
            .push(", last_name = ")
            .push_bind(account.last_name.as_str())
            .push(" WHERE id = ")
            .push_bind(account.id)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
struct Account {
    id: i64,
    first_name: String,
    last_name: String,
    number: i64,
    balance: i64,
    created_at: OffsetDateTime,
}

impl From<Account> for domain::Account {
    fn from(account: Account) -> Self {
        let Account {
            id,
            first_name,
            last_name,
            number,
            balance,
            created_at,
        } = account;

        domain::Account {
            id,
            first_name,
            last_name,
            number,
            balance,
            created_at,
        }
    }
}
