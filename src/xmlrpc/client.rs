//! XML-RPC client over HTTP POST

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::common::{redact_url, Error, Result};

use super::codec;
use super::Value;

/// Client bound to one XML-RPC endpoint
pub struct XmlRpcClient {
    http: reqwest::Client,
    /// Endpoint URL; userinfo, when present, is sent as basic auth
    url: Url,
}

impl XmlRpcClient {
    /// Create a client for `url`
    ///
    /// Nothing is sent until the first call.
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netrounds-testgroup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url })
    }

    /// Endpoint URL with the password masked, for logging
    pub fn display_url(&self) -> String {
        redact_url(self.url.as_str())
    }

    /// Invoke `method` with positional parameters and return its result
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let body = codec::encode_call(method, params);
        tracing::debug!("XML-RPC call {} at {}", method, self.display_url());
        tracing::trace!("XML-RPC request: {}", body);

        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        tracing::trace!("XML-RPC response: {}", text);

        codec::parse_response(&text)
    }
}
