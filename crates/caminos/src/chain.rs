//! The chain context a builder works against: network and chain identity, the native asset,
//! and the default fee. Usually loaded from configuration or fetched once from a node.

use serde::{Deserialize, Serialize};

use crate::{
    enc::{format_address, parse_address_for},
    errors::CaminoResult,
    nets::{hrp_for_network, NetworkParams},
    types::{Id, ShortId},
};

/// Identity and fee parameters of a single chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainContext {
    /// The network ID written into every transaction body
    pub network_id: u32,
    /// The chain's blockchain ID
    pub blockchain_id: Id,
    /// The alias prefixing this chain's addresses, e.g. "P"
    pub chain_alias: String,
    /// The native asset, which pays fees
    pub avax_asset_id: Id,
    /// The default fee, in base units of the native asset
    pub tx_fee: u64,
}

impl ChainContext {
    /// Instantiate a context for a known network.
    pub fn for_network<N: NetworkParams>(
        chain_alias: &str,
        blockchain_id: Id,
        avax_asset_id: Id,
        tx_fee: u64,
    ) -> Self {
        Self {
            network_id: N::NETWORK_ID,
            blockchain_id,
            chain_alias: chain_alias.to_owned(),
            avax_asset_id,
            tx_fee,
        }
    }

    /// The bech32 HRP for this network
    pub fn hrp(&self) -> &'static str {
        hrp_for_network(self.network_id)
    }

    /// Parse one of this chain's address strings into its address hash.
    pub fn parse_address(&self, address: &str) -> CaminoResult<ShortId> {
        Ok(parse_address_for(&self.chain_alias, self.hrp(), address)?)
    }

    /// Render an address hash as one of this chain's address strings.
    pub fn format_address(&self, id: &ShortId) -> CaminoResult<String> {
        Ok(format_address(&self.chain_alias, self.hrp(), id)?)
    }
}
