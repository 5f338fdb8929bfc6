//! mesos-client — authenticated polling of Mesos master endpoints.
//!
//! # Architecture
//!
//! ```text
//! HttpClient
//!   ├── fetch() → GET url + endpoint, JSON-decoded, typed error
//!   ├── fetch_and_decode() → fetch(), failures logged + counted → Option
//!   └── AuthManager (strict mode only)
//!         ├── signing_token() → RS256 assertion {uid, exp}
//!         └── authorization() → POST login_url, cache "token=..." for 1h
//! ```
//!
//! There is no retry, backoff or timeout beyond the transport defaults. A
//! failed token refresh degrades to an unauthenticated request.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::{AuthManager, AuthState, TOKEN_LIFETIME};
pub use client::HttpClient;
pub use config::{BasicAuth, ClientConfig, ServiceAccountSecret, StrictAuth};
pub use error::{AuthError, ClientError};
