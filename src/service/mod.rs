//! Remote test service API
//!
//! `TestService` is the seam between the lifecycle operations and the
//! Netrounds XML-RPC API, so the operations can run against an in-memory
//! service in tests.

mod netrounds;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

use crate::common::Result;
use crate::properties::TestGroupConfig;

pub use netrounds::NetroundsClient;

/// Status value of a test group that has not finished yet
pub const STATUS_RUNNING: &str = "running";
/// The only status counted as success
pub const STATUS_PASSED: &str = "passed";

/// A probe (genalyzer) known to the service
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Probe {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    pub id: Value,
}

/// A test script known to the service
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TestScript {
    #[serde(default, deserialize_with = "lenient_name")]
    pub package: String,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    pub id: Value,
}

/// Reply of `testgroup_get_status`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GroupStatus {
    pub status: String,
    #[serde(default)]
    pub tests: Vec<TestRef>,
}

impl GroupStatus {
    pub fn is_running(&self) -> bool {
        self.status == STATUS_RUNNING
    }

    pub fn is_passed(&self) -> bool {
        self.status == STATUS_PASSED
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

/// A test listed in a group status
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TestRef {
    pub id: Value,
}

/// Reply of `testing_get_results`
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TestResults {
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub log: Vec<LogRow>,
}

/// One entry of a test's log
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LogRow {
    /// Seconds since the unix epoch
    pub time: f64,
    #[serde(default)]
    pub message: Value,
}

/// Names that are null or not strings read as empty, which never matches
fn lenient_name<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Operations of the remote test service used by the orchestrator
#[async_trait]
pub trait TestService: Send + Sync {
    /// List all probes of the domain
    async fn genalyzer_list(&self) -> Result<Vec<Probe>>;

    /// List all test scripts available to the domain
    async fn testing_script_list(&self) -> Result<Vec<TestScript>>;

    /// Create and start a test group, returning its id
    async fn testgroup_create(&self, config: &TestGroupConfig) -> Result<Value>;

    /// Current status of a test group
    async fn testgroup_get_status(&self, testgroup_id: &Value) -> Result<GroupStatus>;

    /// Delete test groups by id
    async fn testgroup_delete(&self, testgroup_ids: &[Value]) -> Result<()>;

    /// Detailed results of a single test
    async fn testing_get_results(
        &self,
        test_id: &Value,
        filter: Option<&Value>,
    ) -> Result<TestResults>;
}

/// Render an opaque id for log lines and messages
pub fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
