use std::{env, time::Duration};

use anyhow::{bail, Context, Result};

pub const DEFAULT_ENDPOINT: &str = "https://us-street.api.smartystreets.com/street-address";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CANDIDATES: u8 = 1;

pub const AUTH_ID_VAR: &str = "SMARTY_STREETS_AUTH_ID";
pub const AUTH_TOKEN_VAR: &str = "SMARTY_STREETS_AUTH_TOKEN";
pub const ENDPOINT_VAR: &str = "SMARTY_STREETS_ENDPOINT";
pub const TIMEOUT_VAR: &str = "SMARTY_STREETS_TIMEOUT_SECS";

/// The two static values the provider authenticates with.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub auth_id: String,
    pub auth_token: String,
}

// keep the token out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_id", &self.auth_id)
            .field("auth_token", &"***")
            .finish()
    }
}

/// Immutable client settings, built once at startup.
///
/// Credentials may be unset. Every verification call then fails with a
/// configuration error instead of the constructor failing.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub auth_id: Option<String>,
    pub auth_token: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
    pub candidates: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_id: None,
            auth_token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            candidates: DEFAULT_CANDIDATES,
        }
    }
}

impl ClientConfig {
    pub fn new(auth_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            auth_id: Some(auth_id.into()),
            auth_token: Some(auth_token.into()),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|x| !x.trim().is_empty());

        let mut config = Self {
            auth_id: get(AUTH_ID_VAR),
            auth_token: get(AUTH_TOKEN_VAR),
            ..Self::default()
        };

        if let Some(x) = get(ENDPOINT_VAR) {
            config.endpoint = x;
        }

        if let Some(x) = get(TIMEOUT_VAR) {
            let secs: u64 = x
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_VAR} is not a number: {x}"))?;
            if secs == 0 {
                bail!("{TIMEOUT_VAR} must be positive");
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Both credentials, or `None` if either is missing or blank.
    pub fn credentials(&self) -> Option<Credentials> {
        let present = |x: &Option<String>| x.as_ref().filter(|x| !x.trim().is_empty()).cloned();
        Some(Credentials {
            auth_id: present(&self.auth_id)?,
            auth_token: present(&self.auth_token)?,
        })
    }
}
