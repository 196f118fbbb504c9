//! This crate provides transaction construction for Camino (and other Avalanche-family)
//! UTXO chains.
//!
//! It is organized bottom-up:
//!
//! - `types` holds the wire entities: IDs, owner sets, inputs, outputs, payloads, UTXOs and
//!   transaction bodies. Every entity implements `ByteFormat`.
//! - `select` holds per-asset accounting and the two `MinimumSpendable` strategies: a local
//!   scan over a `UtxoSet`, and `Spender`, which delegates to a node's `spend` RPC.
//! - `builder` assembles unsigned transactions on top of either strategy.
//!
//! ```
//! use caminos::{enc::KopernikusPChain, types::ShortId};
//! use camino_core::enc::AddressEncoder;
//!
//! let addr = KopernikusPChain::encode_address(&ShortId::new([0x3c; 20])).unwrap();
//! assert_eq!(addr.as_str(), "P-kopernikus18s7rc0pu8s7rc0pu8s7rc0pu8s7rc0puv5hs3a");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[doc(hidden)]
pub mod prelude;

pub mod builder;
pub mod chain;
pub mod enc;
pub mod errors;
pub mod nets;
pub mod select;
pub mod types;

pub use errors::{CaminoError, CaminoResult};
