use crate::domain::{Account, AccountRepository, NewAccount};
use futures::{stream, Stream};
use std::{
    collections::BTreeMap,
    convert::Infallible,
    sync::{Arc, Mutex},
};

/// In-memory [AccountRepository] for tests.
#[derive(Debug, Clone, Default)]
pub struct MemAccountRepository {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    accounts: BTreeMap<i64, Account>,
}

impl MemAccountRepository {
    pub fn balances(&self) -> Vec<(i64, i64)> {
        let state = self.state.lock().expect("lock state");
        state
            .accounts
            .values()
            .map(|account| (account.id, account.balance))
            .collect()
    }
}

impl AccountRepository for MemAccountRepository {
    type Error = Infallible;

    async fn create_account(&self, account: NewAccount) -> Result<Account, Self::Error> {
        let mut state = self.state.lock().expect("lock state");
        state.last_id += 1;
        let account = account.with_id(state.last_id);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn accounts(
        &self,
    ) -> Result<impl Stream<Item = Result<Account, Self::Error>> + Send, Self::Error> {
        let accounts = self
            .state
            .lock()
            .expect("lock state")
            .accounts
            .values()
            .cloned()
            .collect::<Vec<_>>();
        Ok(stream::iter(accounts.into_iter().map(Ok)))
    }

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, Self::Error> {
        let state = self.state.lock().expect("lock state");
        Ok(state.accounts.get(&id).cloned())
    }

    async fn delete_account(&self, id: i64) -> Result<bool, Self::Error> {
        let mut state = self.state.lock().expect("lock state");
        Ok(state.accounts.remove(&id).is_some())
    }

    async fn update_account(&self, account: &Account) -> Result<bool, Self::Error> {
        let mut state = self.state.lock().expect("lock state");
        match state.accounts.get_mut(&account.id) {
            Some(existing) => {
                existing.first_name = account.first_name.clone();
                existing.last_name = account.last_name.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
