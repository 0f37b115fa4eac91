//! Node property types
//!
//! Defines the data structures for deserializing the YAML node properties
//! that describe a test group, and the test group document submitted to the
//! service once names have been resolved.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};

/// Properties of one managed test group node
#[derive(Deserialize, Debug, Clone)]
pub struct NodeProperties {
    /// Login for the Netrounds account
    pub auth: Credentials,
    /// Test group name (required before creation)
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description, empty when omitted
    #[serde(default)]
    pub description: Option<String>,
    /// Tests making up the group (required before creation)
    #[serde(default)]
    pub tests: Option<Vec<TestEntry>>,
}

impl NodeProperties {
    /// Load node properties from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse node properties from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse node properties: {}", e)))
    }
}

/// Account credentials and the domain (namespace) to work in
#[derive(Deserialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub domain: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Test group document sent to `testgroup_create`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TestGroupConfig {
    pub name: String,
    pub description: String,
    pub tests: Vec<TestEntry>,
}

/// One test of a test group
///
/// Keys other than the ones named here are passed to the service untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TestEntry {
    /// Test id; `None` (or the string "None") asks the service for a new one
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub script_package: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub script_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputvalues: Option<BTreeMap<String, InputValue>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Value of one test input
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum InputValue {
    /// A mapping, possibly naming a probe
    Probe(ProbeReference),
    /// Anything that is not a mapping
    Scalar(Value),
}

/// Mapping-valued input that may reference a probe by name
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProbeReference {
    /// Probe name as written in the properties; any value, including null
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub genalyzer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genalyzer_id: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A key that is present deserializes to `Some`, even when its value is null
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Like `present_value`, with null read as the empty string
fn present_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|s| Some(s.unwrap_or_default()))
}
