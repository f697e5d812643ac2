//! Single chokepoint for every call to the GraphQL backend.
//!
//! Documents are opaque strings. A request is a JSON `POST` of `{ query, variables }`; the
//! reply is `{ data?, errors? }`. No retries and no caching happen here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, EndpointSource};
use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Sends `document` with `variables` and returns the `data` payload.
    async fn request(&self, document: &str, variables: Option<Value>) -> ClientResult<Value>;
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// Turns a decoded response into its data or an [`ClientError::Api`].
fn into_data(body: ResponseBody) -> ClientResult<Value> {
    match body.errors {
        Some(errors) if !errors.is_empty() => {
            let joined = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join(" | ");
            Err(ClientError::Api(joined))
        }
        _ => Ok(body.data.unwrap_or(Value::Null)),
    }
}

/// HTTP implementation backed by `reqwest`.
#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: EndpointSource,
}

impl GraphqlClient {
    /// Endpoint looked up from `GRAPHQL_URL` on each call.
    pub fn from_env() -> Self {
        Self::build(EndpointSource::Env, &ClientConfig::from_env())
    }

    pub fn with_endpoint(url: impl Into<String>) -> Self {
        Self::build(EndpointSource::Fixed(url.into()), &ClientConfig::default())
    }

    pub fn with_config(cfg: &ClientConfig) -> Self {
        let endpoint = match &cfg.graphql_url {
            Some(url) => EndpointSource::Fixed(url.clone()),
            None => EndpointSource::Env,
        };
        Self::build(endpoint, cfg)
    }

    fn build(endpoint: EndpointSource, cfg: &ClientConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = cfg.timeout {
            builder = builder.timeout(t);
        }
        // builder only fails on TLS backend init; fall back to the default client
        let http = builder.build().unwrap_or_else(|e| {
            warn!("custom http client unavailable, using defaults: {e}");
            reqwest::Client::new()
        });
        Self { http, endpoint }
    }
}

#[async_trait]
impl Gateway for GraphqlClient {
    async fn request(&self, document: &str, variables: Option<Value>) -> ClientResult<Value> {
        let url = self.endpoint.resolve()?;
        debug!(%url, "graphql request");

        let resp = self
            .http
            .post(&url)
            .json(&RequestBody { query: document, variables: variables.as_ref() })
            .send()
            .await
            .map_err(|e| {
                warn!("graphql transport failure: {e}");
                ClientError::Transport { status: None, body: e.to_string() }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "graphql request rejected");
            return Err(ClientError::Transport { status: Some(status.as_u16()), body });
        }

        let body: ResponseBody = resp.json().await.map_err(|e| ClientError::Transport {
            status: Some(status.as_u16()),
            body: format!("invalid response body: {e}"),
        })?;
        into_data(body).map_err(|e| {
            warn!("graphql errors: {e}");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> ClientResult<Value> {
        into_data(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn errors_are_joined() {
        let err = decode(json!({"errors": [{"message": "bad"}, {"message": "worse"}]})).unwrap_err();
        assert!(matches!(&err, ClientError::Api(m) if m == "bad | worse"));
        assert_eq!(err.to_string(), "bad | worse");
    }

    #[test]
    fn empty_error_list_is_success() {
        let data = decode(json!({"data": {"hello": "Hello World"}, "errors": []})).unwrap();
        assert_eq!(data["hello"], "Hello World");
    }

    #[test]
    fn missing_data_is_null() {
        assert_eq!(decode(json!({})).unwrap(), Value::Null);
    }

    #[test]
    fn request_body_omits_absent_variables() {
        let body = serde_json::to_value(RequestBody { query: "{ hello }", variables: None }).unwrap();
        assert_eq!(body, json!({"query": "{ hello }"}));
    }
}
