//! Wire entities. Every type here implements `ByteFormat` with the exact big-endian layout the
//! node expects, and decoding consumes exactly the bytes encoding produced.

pub mod ids;
pub mod input;
pub mod output;
pub mod owners;
pub mod payload;
pub mod transferable;
pub mod tx;
pub mod unsigned;
pub mod utxo;

pub use ids::*;
pub use input::*;
pub use output::*;
pub use owners::*;
pub use payload::*;
pub use transferable::*;
pub use tx::*;
pub use unsigned::*;
pub use utxo::*;

/// Type ID of a secp256k1 transfer input
pub const SECP_TRANSFER_INPUT_ID: u32 = 5;
/// Type ID of a secp256k1 transfer output
pub const SECP_TRANSFER_OUTPUT_ID: u32 = 7;
/// Type ID of a secp256k1 owner output
pub const SECP_OWNER_OUTPUT_ID: u32 = 11;
/// Type ID of a secp256k1 credential
pub const SECP_CREDENTIAL_ID: u32 = 9;
/// Type ID of a locked input
pub const LOCKED_INPUT_ID: u32 = 0x2000;
/// Type ID of a locked output
pub const LOCKED_OUTPUT_ID: u32 = 0x2001;

/// Type ID of an import transaction
pub const IMPORT_TX_ID: u32 = 17;
/// Type ID of an export transaction
pub const EXPORT_TX_ID: u32 = 18;
/// Type ID of a base transaction
pub const BASE_TX_ID: u32 = 34;
/// Type ID of a touristic lock-messenger-funds transaction
pub const LOCK_MESSENGER_FUNDS_TX_ID: u32 = 0x2010;
/// Type ID of a touristic cashout-cheque transaction
pub const CASHOUT_CHEQUE_TX_ID: u32 = 0x2011;
