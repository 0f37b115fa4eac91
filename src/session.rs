//! Session login
//!
//! Builds the per-domain XML-RPC endpoint with the account credentials in
//! its userinfo. Nothing is sent here; a wrong password or an unreachable
//! host shows up on the first remote call.

use std::time::Duration;

use reqwest::Url;

use crate::common::config::ServiceConfig;
use crate::common::{Error, Result};
use crate::properties::Credentials;
use crate::service::NetroundsClient;
use crate::xmlrpc::XmlRpcClient;

/// Endpoint URL `<scheme>://<email>:<password>@<host>/<domain>/api/xmlrpc/`
pub fn endpoint_url(auth: &Credentials, service: &ServiceConfig) -> Result<Url> {
    let base = format!("{}://{}/", service.scheme, service.host);
    let mut url = Url::parse(&base)
        .and_then(|base| base.join(&format!("{}/api/xmlrpc/", auth.domain)))
        .map_err(|e| Error::Config(format!("Invalid service endpoint '{}': {}", base, e)))?;

    url.set_username(&auth.email)
        .and_then(|()| url.set_password(Some(&auth.password)))
        .map_err(|()| {
            Error::Config(format!("Endpoint '{}' cannot carry credentials", base))
        })?;

    Ok(url)
}

/// Log in to the service for the account and domain in `auth`
pub fn login(auth: &Credentials, service: &ServiceConfig) -> Result<NetroundsClient> {
    tracing::info!(
        "login by {} to {}://{}/{}/",
        auth.email,
        service.scheme,
        service.host,
        auth.domain
    );

    let url = endpoint_url(auth, service)?;
    let rpc = XmlRpcClient::new(url, Duration::from_secs(service.request_timeout_secs))?;
    Ok(NetroundsClient::new(rpc))
}
