//! JSON-RPC access to Camino nodes.
//!
//! `PlatformRpc` wraps a `JsonRpcTransport` and exposes the handful of node calls a
//! transaction builder needs: fetching UTXOs, the remote `spend` selection, fee and chain
//! lookups, and issuing signed transactions. It implements `caminos::select::SpendRpc`, so a
//! `caminos::select::Spender` can use it directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[doc(hidden)]
pub mod prelude;

/// Provider errors
pub mod provider;

/// JSON-RPC client and transports
pub mod rpc;

pub use provider::*;
