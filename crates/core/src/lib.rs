//! # Camino Core
//!
//! `camino-core` contains the binary primitives used by the `caminos` crate.
//!
//! ## Crate Layout
//!
//! ### Ser
//!
//! The `ByteFormat` trait is a simple serialization API using
//! `std::io::{Read, Write}`. Implementers define the binary serialization
//! format of the type. All integers on the wire are big-endian, and all
//! sequences are prefixed by a 4-byte element count.
//!
//! `ByteFormat` has an associated `Error` type. Most basic types can simply
//! use the provided `SerError`. Types with richer invariants may define their
//! own error, as long as it can be instantiated from a `SerError` or an
//! `std::io::Error`.
//!
//! ### Enc
//!
//! The `enc` module holds the checksummed encodings used for IDs ("cb58"),
//! addresses (bech32) and node-facing byte strings (checksummed `0x` hex),
//! as well as the `AddressEncoder` trait.
//!
//! ### Macros
//!
//! `fixed_byte_id!` and `wrap_prefixed_byte_vector!` generate the fixed-size
//! ID newtypes and the length-prefixed byte vectors used throughout the
//! transaction types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[macro_use]
pub mod macros;

pub mod enc;
pub mod ser;

/// Common re-exports
pub mod prelude {
    pub use crate::{
        enc::{AddressEncoder, EncodingError, EncodingResult},
        ser::{ByteFormat, SerError, SerResult},
    };
}
