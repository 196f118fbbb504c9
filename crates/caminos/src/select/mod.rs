//! Coin selection.
//!
//! Selection takes an `AssetAmountDestination` describing what to spend and where to send it,
//! and fills in the inputs, outputs and owners that satisfy it. Two strategies implement
//! `MinimumSpendable`: `UtxoSet`, which scans a local candidate set, and `Spender`, which
//! delegates to a node's `spend` RPC for lock modes the client cannot evaluate.

pub mod asset_amount;
pub mod spender;
pub mod utxoset;

pub use asset_amount::*;
pub use spender::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{errors::CaminoResult, types::ShortId};

/// Which lock, if any, the selected funds are placed under.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    /// Plain transfer
    #[default]
    Unlocked,
    /// Lock under a deposit
    Deposit,
    /// Lock under a bond
    Bond,
}

impl LockMode {
    /// The numeric form used by the `spend` RPC
    pub fn as_u8(self) -> u8 {
        match self {
            LockMode::Unlocked => 0,
            LockMode::Deposit => 1,
            LockMode::Bond => 2,
        }
    }
}

/// A selection strategy. Takes ownership of the destination and hands it back with inputs,
/// outputs and owners filled in. On error the destination is dropped, so no partial selection
/// escapes.
#[async_trait]
pub trait MinimumSpendable: Send + Sync {
    /// Select inputs and build outputs for every asset amount registered in `aad`.
    async fn get_minimum_spendable(
        &self,
        aad: AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
        agent: Option<ShortId>,
    ) -> CaminoResult<AssetAmountDestination>;
}

#[async_trait]
impl<'a, T> MinimumSpendable for &'a T
where
    T: MinimumSpendable + ?Sized,
{
    async fn get_minimum_spendable(
        &self,
        aad: AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
        agent: Option<ShortId>,
    ) -> CaminoResult<AssetAmountDestination> {
        (**self)
            .get_minimum_spendable(aad, as_of, locktime, lock_mode, agent)
            .await
    }
}
