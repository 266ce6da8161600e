use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Upper bound (exclusive) for randomly drawn account numbers.
pub const MAX_NUMBER: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: i64,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

/// An account which has not yet been persisted and hence has no ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: i64,
    pub created_at: OffsetDateTime,
}

impl NewAccount {
    /// Create a new account with a random number in `[0, MAX_NUMBER)`, a zero balance and the
    /// current time as creation timestamp.
    ///
    /// Numbers are not checked for uniqueness, yet they are what tokens are bound to.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            number: rand::thread_rng().gen_range(0..MAX_NUMBER),
            balance: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Turn into an [Account] with the given store assigned ID.
    pub fn with_id(self, id: i64) -> Account {
        let NewAccount {
            first_name,
            last_name,
            number,
            balance,
            created_at,
        } = self;

        Account {
            id,
            first_name,
            last_name,
            number,
            balance,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{NewAccount, MAX_NUMBER};
    use serde_json::json;
    use time::OffsetDateTime;

    #[test]
    fn test_new_account() {
        let start = OffsetDateTime::now_utc();

        for _ in 0..1_000 {
            let account = NewAccount::new("a", "b");
            assert_eq!(account.first_name, "a");
            assert_eq!(account.last_name, "b");
            assert!((0..MAX_NUMBER).contains(&account.number));
            assert_eq!(account.balance, 0);
            assert!(account.created_at >= start);
            assert_eq!(account.created_at.offset(), time::UtcOffset::UTC);
        }
    }

    #[test]
    fn test_account_json() {
        let account = NewAccount::new("Jane", "Doe").with_id(42);
        let number = account.number;

        let value = serde_json::to_value(&account).expect("account can be serialized");
        assert_eq!(value["id"], json!(42));
        assert_eq!(value["firstName"], json!("Jane"));
        assert_eq!(value["lastName"], json!("Doe"));
        assert_eq!(value["number"], json!(number));
        assert_eq!(value["balance"], json!(0));
        assert!(value["createdAt"].is_string());
    }
}
