//! Chain address encoding. Addresses render as `<chain alias>-<bech32>`, where the bech32 HRP
//! comes from the network and the payload is a 20-byte address hash.

pub mod encoder;

pub use encoder::*;
