//! Netrounds XML-RPC implementation of `TestService`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::properties::TestGroupConfig;
use crate::xmlrpc::{self, XmlRpcClient};

use super::{GroupStatus, Probe, TestResults, TestScript, TestService};

/// Netrounds API client for one account and domain
pub struct NetroundsClient {
    rpc: XmlRpcClient,
}

impl NetroundsClient {
    pub fn new(rpc: XmlRpcClient) -> Self {
        Self { rpc }
    }

    /// Call `method` and deserialize its result
    async fn call_as<T: DeserializeOwned>(&self, method: &str, params: &[xmlrpc::Value]) -> Result<T> {
        let value: Value = self.rpc.call(method, params).await?.into();
        serde_json::from_value(value).map_err(|e| Error::unexpected_response(method, e.to_string()))
    }
}

#[async_trait]
impl TestService for NetroundsClient {
    async fn genalyzer_list(&self) -> Result<Vec<Probe>> {
        self.call_as("genalyzer_list", &[]).await
    }

    async fn testing_script_list(&self) -> Result<Vec<TestScript>> {
        self.call_as("testing_script_list", &[]).await
    }

    async fn testgroup_create(&self, config: &TestGroupConfig) -> Result<Value> {
        let config = serde_json::to_value(config)?;
        self.call_as("testgroup_create", &[xmlrpc::Value::from(&config)])
            .await
    }

    async fn testgroup_get_status(&self, testgroup_id: &Value) -> Result<GroupStatus> {
        self.call_as("testgroup_get_status", &[xmlrpc::Value::from(testgroup_id)])
            .await
    }

    async fn testgroup_delete(&self, testgroup_ids: &[Value]) -> Result<()> {
        let ids = xmlrpc::Value::Array(testgroup_ids.iter().map(xmlrpc::Value::from).collect());
        self.rpc.call("testgroup_delete", &[ids]).await?;
        Ok(())
    }

    async fn testing_get_results(
        &self,
        test_id: &Value,
        filter: Option<&Value>,
    ) -> Result<TestResults> {
        let filter = filter.map(xmlrpc::Value::from).unwrap_or(xmlrpc::Value::Nil);
        self.call_as(
            "testing_get_results",
            &[xmlrpc::Value::from(test_id), filter],
        )
        .await
    }
}
