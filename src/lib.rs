//! Netrounds test group orchestration
//!
//! Resolves the probe and script names of a declarative test group into
//! Netrounds ids, runs the group over the XML-RPC API and reports the
//! outcome; also validates and tears down groups.

pub mod cli;
pub mod commands;
pub mod common;
pub mod lifecycle;
pub mod properties;
pub mod resolver;
pub mod service;
pub mod session;
pub mod state;
pub mod xmlrpc;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use lifecycle::{InvocationContext, LifecycleDriver, TESTGROUP_ID};
pub use service::TestService;
