//! XML-RPC protocol implementation
//!
//! Just enough of the protocol to talk to the Netrounds API: the value
//! model, the `methodCall`/`methodResponse` codec and an HTTP client.

mod client;
pub mod codec;
mod value;

pub use client::XmlRpcClient;
pub use value::Value;
