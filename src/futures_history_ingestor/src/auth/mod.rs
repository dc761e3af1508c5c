//! Credential exchange: long-lived refresh token in, short-lived bearer token out.

mod refresh;

pub use refresh::{IDENTITY_URL, RefreshTokenProvider, TokenResponse};

use std::fmt;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::{MissingEnvVarError, get_non_empty_env_var};
use snafu::{Backtrace, Snafu};

pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";
pub const REFRESH_TOKEN_VAR: &str = "REFRESH_TOKEN";

/// The three secrets needed to mint access tokens.
#[derive(Debug)]
pub struct Credentials {
    pub client_id: SecretString,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

impl Credentials {
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id: SecretString::new(client_id.into()),
            client_secret: SecretString::new(client_secret.into()),
            refresh_token: SecretString::new(refresh_token.into()),
        }
    }

    /// Reads `CLIENT_ID`, `CLIENT_SECRET` and `REFRESH_TOKEN`.
    ///
    /// Unset and blank variables are both reported as missing.
    pub fn from_env() -> Result<Self, MissingEnvVarError> {
        Ok(Self::new(
            get_non_empty_env_var(CLIENT_ID_VAR)?,
            get_non_empty_env_var(CLIENT_SECRET_VAR)?,
            get_non_empty_env_var(REFRESH_TOKEN_VAR)?,
        ))
    }
}

/// Short-lived API credential. Expiry is not tracked; callers fetch a new
/// one for every symbol.
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: String) -> Self {
        Self(SecretString::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for BearerToken {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AuthError {
    /// Transport failure talking to the identity endpoint.
    #[snafu(display("token request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The identity endpoint refused the exchange.
    #[snafu(display("token request rejected ({status}): {message}"))]
    Rejected {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// Body was not the expected JSON document.
    #[snafu(display("token response could not be decoded: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// Body decoded but carried no usable `access_token`.
    #[snafu(display("token response has no access_token"))]
    MissingToken { backtrace: Backtrace },
}

/// Produces a fresh bearer token on every call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<BearerToken, AuthError>;
}

/// Hands out the same token every time. Useful when a token was minted
/// out of band.
pub struct StaticToken(pub BearerToken);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<BearerToken, AuthError> {
        Ok(self.0.clone())
    }
}
