use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const GRAPHQL_URL_VAR: &str = "GRAPHQL_URL";
pub const GRAPHQL_TIMEOUT_VAR: &str = "GRAPHQL_TIMEOUT_SECS";

/// Client settings derived from env.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub graphql_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        fn dur_env(name: &str) -> Option<Duration> {
            std::env::var(name).ok().and_then(|v| v.trim().parse().ok()).map(Duration::from_secs)
        }
        Self { graphql_url: std::env::var(GRAPHQL_URL_VAR).ok(), timeout: dur_env(GRAPHQL_TIMEOUT_VAR) }
    }

    /// Endpoint or a configuration error when unset or blank.
    pub fn endpoint(&self) -> ClientResult<String> {
        match self.graphql_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => Err(ClientError::Configuration(format!("{GRAPHQL_URL_VAR} is not set"))),
        }
    }
}

/// Where the gateway finds its endpoint.
#[derive(Clone, Debug)]
pub enum EndpointSource {
    /// Re-read from the process environment on every request.
    Env,
    Fixed(String),
}

impl EndpointSource {
    pub fn resolve(&self) -> ClientResult<String> {
        match self {
            EndpointSource::Env => ClientConfig::from_env().endpoint(),
            EndpointSource::Fixed(url) => {
                ClientConfig { graphql_url: Some(url.clone()), timeout: None }.endpoint()
            }
        }
    }
}
