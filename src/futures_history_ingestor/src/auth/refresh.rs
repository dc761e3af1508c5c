use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};

use super::{
    AuthError, BearerToken, Credentials, DecodeSnafu, MissingTokenSnafu, RejectedSnafu,
    RequestSnafu, TokenProvider,
};

pub const IDENTITY_URL: &str = "https://signin.tradestation.com/oauth/token";

/// Body of a successful refresh-token exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    pub fn into_token(self) -> Result<BearerToken, AuthError> {
        let token = self
            .access_token
            .filter(|token| !token.trim().is_empty())
            .context(MissingTokenSnafu)?;
        Ok(BearerToken::new(token))
    }
}

/// OAuth `refresh_token` grant against the identity endpoint.
pub struct RefreshTokenProvider {
    client: Client,
    token_url: String,
    credentials: Credentials,
}

impl RefreshTokenProvider {
    pub fn new(client: Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            credentials,
        }
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn access_token(&self) -> Result<BearerToken, AuthError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.expose_secret()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("refresh_token", self.credentials.refresh_token.expose_secret()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        let body = response.bytes().await.context(RequestSnafu)?;
        if !status.is_success() {
            return RejectedSnafu {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            }
            .fail();
        }

        let parsed: TokenResponse = serde_json::from_slice(&body).context(DecodeSnafu)?;
        if let Some(expires_in) = parsed.expires_in {
            tracing::debug!(expires_in, "access token issued");
        }
        parsed.into_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn provider(base_url: &str) -> RefreshTokenProvider {
        RefreshTokenProvider::new(
            Client::new(),
            format!("{base_url}/oauth/token"),
            Credentials::new("id".into(), "secret".into(), "refresh".into()),
        )
    }

    #[tokio::test]
    async fn posts_refresh_grant_as_form() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"access_token":"fresh","token_type":"Bearer","expires_in":1200}"#,
        )
        .await;

        let token = provider(&base_url).access_token().await.unwrap();
        assert_eq!(token.expose(), "fresh");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /oauth/token HTTP/1.1\r\n"));
        assert!(
            raw.to_ascii_lowercase()
                .contains("content-type: application/x-www-form-urlencoded")
        );
        assert!(raw.ends_with(
            "grant_type=refresh_token&client_id=id&client_secret=secret&refresh_token=refresh"
        ));
    }

    #[tokio::test]
    async fn refused_exchange_is_rejected() {
        let (base_url, server) =
            serve_once("HTTP/1.1 401 Unauthorized", r#"{"error":"invalid_grant"}"#).await;

        let err = provider(&base_url).access_token().await.unwrap_err();
        server.await.unwrap();

        match err {
            AuthError::Rejected {
                status, message, ..
            } => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid_grant"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_without_access_token_is_missing_token() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", r#"{"token_type":"Bearer"}"#).await;

        let err = provider(&base_url).access_token().await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, AuthError::MissingToken { .. }));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", "not json").await;

        let err = provider(&base_url).access_token().await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, AuthError::Decode { .. }));
    }

    #[test]
    fn token_is_taken_from_access_token_field() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","token_type":"Bearer","expires_in":1200}"#)
                .unwrap();
        assert_eq!(parsed.expires_in, Some(1200));
        assert_eq!(parsed.into_token().unwrap().expose(), "abc");
    }

    #[test]
    fn missing_or_empty_token_is_an_error() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert!(matches!(parsed.into_token(), Err(AuthError::MissingToken { .. })));

        let parsed: TokenResponse = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(matches!(parsed.into_token(), Err(AuthError::MissingToken { .. })));
    }

    #[tokio::test]
    async fn unreachable_identity_endpoint_is_a_request_error() {
        let provider = RefreshTokenProvider::new(
            Client::new(),
            "http://127.0.0.1:9/oauth/token",
            Credentials::new("id".into(), "secret".into(), "refresh".into()),
        );
        assert!(matches!(
            provider.access_token().await,
            Err(AuthError::Request { .. })
        ));
    }
}
