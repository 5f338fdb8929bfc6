//! HTTP polling of master endpoints.

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use mesos_metrics::ErrorCounter;

use crate::auth::AuthManager;
use crate::config::{BasicAuth, ClientConfig};
use crate::error::{ClientError, ClientResult};

/// Client bound to one master base URL.
#[derive(Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    url: String,
    user_agent: String,
    basic_auth: Option<BasicAuth>,
    auth: Option<AuthManager>,
    errors: ErrorCounter,
}

impl HttpClient {
    /// Build a client from config. `errors` is the shared failure counter.
    pub fn new(config: &ClientConfig, errors: ErrorCounter) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.skip_ssl_verify)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            basic_auth: config.basic_auth.clone().filter(BasicAuth::is_complete),
            auth: config.strict.as_ref().map(AuthManager::new),
            errors,
        })
    }

    pub fn errors(&self) -> &ErrorCounter {
        &self.errors
    }

    pub fn auth(&self) -> Option<&AuthManager> {
        self.auth.as_ref()
    }

    /// GET the master URL joined with `endpoint` and decode the JSON body.
    ///
    /// In strict mode a token is attached when one can be obtained; a
    /// failed refresh is logged and counted, and the request goes out
    /// without it.
    pub async fn fetch<T: DeserializeOwned>(&mut self, endpoint: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.url, endpoint);

        let mut req = self.http.get(&url).header(USER_AGENT, &self.user_agent);
        if let Some(basic) = &self.basic_auth {
            req = req.basic_auth(&basic.username, Some(&basic.password));
        }
        if let Some(auth) = self.auth.as_mut() {
            match auth.authorization(&self.http, &self.user_agent).await {
                Ok(token) => req = req.header(AUTHORIZATION, token),
                Err(e) => {
                    error!(error = %e, "error obtaining auth token");
                    self.errors.inc();
                }
            }
        }

        debug!(%url, "fetching URL");
        let res = req.send().await.map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }

        let body = res.bytes().await.map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })
    }

    /// [`fetch`](Self::fetch), with any failure logged and counted.
    ///
    /// Returns `None` when nothing usable was decoded; there is no retry
    /// and no partial result.
    pub async fn fetch_and_decode<T: DeserializeOwned>(&mut self, endpoint: &str) -> Option<T> {
        match self.fetch(endpoint).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!(url = %format!("{}{}", self.url, endpoint), error = %e, "error fetching endpoint");
                self.errors.inc();
                None
            }
        }
    }
}
