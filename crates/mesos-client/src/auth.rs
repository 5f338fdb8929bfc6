//! Strict-mode token lifecycle.
//!
//! A short-lived RS256 assertion `{uid, exp}` is signed with the service
//! account key and exchanged at the login endpoint for an opaque token.
//! The token is cached as the `Authorization` value `token=<opaque>` until
//! one hour after it was minted, whatever lifetime the server declares.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StrictAuth;
use crate::error::{AuthError, ClientError};

/// Fixed lifetime of a minted token.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Claims of the login assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: String,
    pub exp: i64,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    uid: &'a str,
    token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Cached bearer value and its expiry (unix seconds).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: String,
    pub expires_at: i64,
}

/// Owns the token cache for one client. Not synchronized: callers must
/// not run two scrapes through the same manager at once, which `&mut self`
/// enforces.
///
/// The expiry is only recorded after a successful login. A failed login
/// leaves no cached expiry, so every later request tries the login
/// endpoint again rather than waiting out the hour.
#[derive(Debug)]
pub struct AuthManager {
    uid: String,
    login_url: String,
    signing_key: Vec<u8>,
    state: AuthState,
}

impl AuthManager {
    pub fn new(strict: &StrictAuth) -> Self {
        Self {
            uid: strict.uid.clone(),
            login_url: strict.login_url.clone(),
            signing_key: strict.private_key.as_bytes().to_vec(),
            state: AuthState::default(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Sign a login assertion for the configured uid expiring at `exp`.
    pub fn signing_token(&self, exp: i64) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(&self.signing_key).map_err(AuthError::InvalidKey)?;
        let claims = Claims {
            uid: self.uid.clone(),
            exp,
        };
        debug!(uid = %self.uid, expires = exp, "creating token");
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(AuthError::Sign)
    }

    /// Current `Authorization` header value, refreshing it first if the
    /// cached one has expired.
    ///
    /// On failure the cache is cleared so the next call tries again.
    pub async fn authorization(
        &mut self,
        http: &reqwest::Client,
        user_agent: &str,
    ) -> Result<&str, AuthError> {
        self.authorization_at(http, user_agent, epoch_secs()).await
    }

    pub(crate) async fn authorization_at(
        &mut self,
        http: &reqwest::Client,
        user_agent: &str,
        now: i64,
    ) -> Result<&str, AuthError> {
        if now > self.state.expires_at {
            match self.login(http, user_agent, now).await {
                Ok(state) => self.state = state,
                Err(e) => {
                    self.state = AuthState::default();
                    return Err(e);
                }
            }
        }
        Ok(&self.state.token)
    }

    async fn login(
        &self,
        http: &reqwest::Client,
        user_agent: &str,
        now: i64,
    ) -> Result<AuthState, AuthError> {
        let expires_at = now + TOKEN_LIFETIME.as_secs() as i64;
        let assertion = self.signing_token(expires_at)?;
        let url = self.login_url.as_str();
        let login_err = |e: ClientError| AuthError::Login(Box::new(e));

        let res = http
            .post(url)
            .header(USER_AGENT, user_agent)
            .json(&TokenRequest {
                uid: &self.uid,
                token: &assertion,
            })
            .send()
            .await
            .map_err(|source| {
                login_err(ClientError::Transport {
                    url: url.to_string(),
                    source,
                })
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(login_err(ClientError::Status {
                url: url.to_string(),
                status,
            }));
        }

        let body = res.bytes().await.map_err(|source| {
            login_err(ClientError::Transport {
                url: url.to_string(),
                source,
            })
        })?;
        let token: TokenResponse = serde_json::from_slice(&body).map_err(|source| {
            login_err(ClientError::Decode {
                url: url.to_string(),
                source,
            })
        })?;

        Ok(AuthState {
            token: format!("token={}", token.token),
            expires_at,
        })
    }
}

pub(crate) fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
