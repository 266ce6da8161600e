use crate::domain::Account;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub secret: SecretString,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub ttl: Duration,
}

/// Payload of the tokens issued by [TokenService].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Unix timestamp in seconds.
    pub expires_at: i64,
    pub account_number: i64,
}

/// Issues and validates HMAC signed JWTs bound to an account number.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: config.ttl,
        }
    }

    pub fn issue(&self, account: &Account) -> Result<String, Error> {
        let expires_at = OffsetDateTime::now_utc() + self.ttl;
        let claims = Claims {
            expires_at: expires_at.unix_timestamp(),
            account_number: account.number,
        };
        self.encode(&claims)
    }

    /// Verify signature and expiry of the given token. Only algorithms from the HMAC family are
    /// accepted.
    pub fn validate(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is carried in `expiresAt`, not in the registered `exp` claim.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(Error::Invalid)?
            .claims;

        if claims.expires_at < OffsetDateTime::now_utc().unix_timestamp() {
            return Err(Error::Expired);
        }

        Ok(claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(Error::Encode)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,
}
