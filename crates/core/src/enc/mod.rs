//! Contains the `AddressEncoder` trait, the checksummed encodings for IDs and addresses, and
//! the encoder error type.

pub mod bases;
pub mod encoder;

pub use bases::*;
pub use encoder::*;
