use crate::domain::{Account, NewAccount};
use futures::Stream;
use std::error::Error as StdError;

/// Persistence for accounts.
#[trait_variant::make(Send)]
pub trait AccountRepository
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// Persist the given new account and return it with its store assigned ID.
    async fn create_account(&self, account: NewAccount) -> Result<Account, Self::Error>;

    /// All accounts in no particular order.
    async fn accounts(
        &self,
    ) -> Result<impl Stream<Item = Result<Account, Self::Error>> + Send, Self::Error>;

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, Self::Error>;

    /// Delete the account with the given ID; `false` means there was no such account.
    async fn delete_account(&self, id: i64) -> Result<bool, Self::Error>;

    /// Update the names of the account with the given ID; `false` means there was no such account.
    /// The balance is left untouched.
    async fn update_account(&self, account: &Account) -> Result<bool, Self::Error>;
}
