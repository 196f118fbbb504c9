//! Errors raised while selecting UTXOs and building transactions.

use camino_core::{enc::EncodingError, ser::SerError};
use thiserror::Error;

use crate::{select::LockMode, types::Id};

/// Errors raised by selection strategies and the transaction builder. Every error is terminal:
/// nothing is retried, and no partial transaction is returned.
#[derive(Debug, Error)]
pub enum CaminoError {
    /// Bubbled up from the wire codec
    #[error(transparent)]
    SerError(#[from] SerError),

    /// Bubbled up from the cb58/bech32/hex encoders
    #[error(transparent)]
    EncodingError(#[from] EncodingError),

    /// A destination threshold exceeds its address count.
    #[error("Threshold {threshold} is greater than the number of addresses ({addresses})")]
    Threshold {
        /// The requested threshold
        threshold: u32,
        /// The number of addresses supplied
        addresses: usize,
    },

    /// Selection finished its scan with at least one asset still unfinished.
    #[error("Insufficient funds for asset {asset_id}: need {needed}, found {available}")]
    InsufficientFunds {
        /// The first asset that could not be covered
        asset_id: Id,
        /// Amount plus burn requested for that asset
        needed: u64,
        /// Amount gathered before the scan ended
        available: u64,
    },

    /// A signer could not be resolved against an owner set, or an address failed to parse.
    #[error("Address error: {0}")]
    Address(String),

    /// A UTXO string or UTXO bytes could not be decoded.
    #[error("UTXO error: {0}")]
    Utxo(String),

    /// The fee asset is not usable for this request.
    #[error("Fee asset error: {0}")]
    FeeAsset(String),

    /// The transaction burns an implausibly large amount of the native asset.
    #[error("Transaction burns {burn}, which exceeds its output total of {outputs}")]
    GooseEgg {
        /// The burned native amount
        burn: u64,
        /// The native output total
        outputs: u64,
    },

    /// The local selection engine only evaluates unlocked spends.
    #[error("Lock mode {0:?} cannot be evaluated locally")]
    UnsupportedLockMode(LockMode),

    /// A remote strategy's transport failed.
    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Type alias for results with a `CaminoError`
pub type CaminoResult<T> = Result<T, CaminoError>;
