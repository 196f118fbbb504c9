use caminos::types::Id;
use serde::{Deserialize, Deserializer, Serialize};

/// Nodes render 64-bit integers as decimal strings. Accept either form.
fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }
    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
        StrOrNum::Num(n) => Ok(n),
    }
}

/// A pagination cursor for `getUTXOs`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoIndex {
    /// The last address fetched
    pub address: String,
    /// The last UTXO ID fetched
    pub utxo: String,
}

/// The params for `getUTXOs`
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetUtxosParams {
    /// Addresses whose UTXOs are fetched
    pub addresses: Vec<String>,
    /// Fetch atomic UTXOs exported from this chain instead of local ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_chain: Option<String>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Resume after this cursor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<UtxoIndex>,
    /// "hex" or "cb58"
    pub encoding: String,
}

/// The response for `getUTXOs`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GetUtxosResponse {
    /// How many UTXOs this page holds
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub num_fetched: u64,
    /// The encoded UTXOs
    pub utxos: Vec<String>,
    /// Cursor for the next page
    #[serde(default)]
    pub end_index: UtxoIndex,
    /// The encoding of `utxos`
    #[serde(default)]
    pub encoding: String,
}

/// The params for `issueTx`
#[derive(Serialize, Debug, Clone)]
pub struct IssueTxParams {
    /// The encoded signed transaction
    pub tx: String,
    /// "hex" or "cb58"
    pub encoding: String,
}

/// The response for `issueTx`
#[derive(Deserialize, Debug, Clone)]
pub struct IssueTxResponse {
    /// The accepted transaction's ID
    #[serde(rename = "txID")]
    pub tx_id: Id,
}

/// The response for `info.getTxFee`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GetTxFeeResponse {
    /// The base transaction fee
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub tx_fee: u64,
}

/// The params for `info.getBlockchainID`
#[derive(Serialize, Debug, Clone)]
pub struct GetBlockchainIdParams {
    /// The chain alias, e.g. "P"
    pub alias: String,
}

/// The response for `info.getBlockchainID`
#[derive(Deserialize, Debug, Clone)]
pub struct GetBlockchainIdResponse {
    /// The chain's ID
    #[serde(rename = "blockchainID")]
    pub blockchain_id: Id,
}
