//! XML-RPC value model
//!
//! The orchestrator works on `serde_json::Value` everywhere; conversion to
//! and from the wire model happens only at the client boundary.

use std::collections::BTreeMap;

/// A single XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Boolean(bool),
    String(String),
    Double(f64),
    /// `dateTime.iso8601`, kept as the literal text
    DateTime(String),
    /// `base64`, kept encoded
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    /// The `<nil/>` extension
    Nil,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Look up a struct member
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(key),
            _ => None,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(members) => Value::Struct(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(i) => serde_json::Value::from(i),
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::String(s) | Value::DateTime(s) | Value::Base64(s) => serde_json::Value::String(s),
            // NaN and infinities have no JSON form
            Value::Double(d) => serde_json::Number::from_f64(d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Struct(members) => serde_json::Value::Object(
                members.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
            Value::Nil => serde_json::Value::Null,
        }
    }
}
