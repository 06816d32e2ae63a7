//! Provider block handling: defaults, required settings and client creation

use thiserror::Error;
use tfplug::{Config, Diagnostic};

use crate::api::{ApiError, Client};

pub const DEFAULT_ENDPOINT: &str = "https://api.kickflow.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Access token is not set")]
    MissingAccessToken,

    #[error("Caller ID is not set")]
    MissingCallerId,

    #[error("Unable to create Kickflow API client")]
    Client(#[source] ApiError),
}

impl ConfigError {
    pub fn detail(&self) -> String {
        match self {
            ConfigError::MissingAccessToken => {
                "Please set an access token to access the Kickflow API.".to_string()
            }
            ConfigError::MissingCallerId => {
                "Please set a Caller ID to identify the API request caller.".to_string()
            }
            ConfigError::Client(err) => err.to_string(),
        }
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            ConfigError::MissingAccessToken => "access_token",
            ConfigError::MissingCallerId => "caller_id",
            ConfigError::Client(_) => "endpoint",
        }
    }
}

impl From<ConfigError> for Diagnostic {
    fn from(err: ConfigError) -> Self {
        Diagnostic::error(err.to_string(), err.detail()).with_attribute(err.attribute())
    }
}

/// Settings read from the `provider "kickflow"` block
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub access_token: String,
    pub caller_id: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .field("caller_id", &self.caller_id)
            .finish()
    }
}

impl ProviderConfig {
    /// The access token is checked before the caller ID, so only the first
    /// missing setting is reported.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let endpoint = config
            .get_string("endpoint")
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();

        let access_token = config
            .get_string("access_token")
            .ok_or(ConfigError::MissingAccessToken)?
            .to_string();

        let caller_id = config
            .get_string("caller_id")
            .ok_or(ConfigError::MissingCallerId)?
            .to_string();

        Ok(Self {
            endpoint,
            access_token,
            caller_id,
        })
    }

    pub fn into_client(self) -> Result<Client, ConfigError> {
        Client::new(&self.endpoint, &self.access_token, &self.caller_id).map_err(ConfigError::Client)
    }
}
