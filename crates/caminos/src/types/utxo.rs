//! UTXOs and insertion-ordered UTXO sets.

use std::{
    collections::HashSet,
    io::{Read, Write},
};

use camino_core::{
    enc::{
        decode_cb58, decode_hex_checksummed, encode_base58, encode_cb58, encode_hex_checksummed,
    },
    ser::{
        read_codec_version, read_u32_be, write_u16_be, write_u32_be, ByteFormat, SerError,
        SerResult, LATEST_CODEC,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{CaminoError, CaminoResult},
    types::{Id, Output, ShortId},
};

/// The UTXO ID string of output `output_index` of transaction `tx_id`: plain base58 of the
/// transaction ID followed by the big-endian index.
pub fn utxo_id(tx_id: &Id, output_index: u32) -> String {
    let mut buf = Vec::with_capacity(36);
    buf.extend_from_slice(tx_id.as_bytes());
    buf.extend_from_slice(&output_index.to_be_bytes());
    encode_base58(&buf)
}

/// An unspent output.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    /// The codec version the UTXO was encoded with
    pub codec_version: u16,
    /// The transaction that created this output
    pub tx_id: Id,
    /// The output's index in that transaction
    pub output_index: u32,
    /// The asset
    pub asset_id: Id,
    /// The output
    pub output: Output,
}

impl Utxo {
    /// Instantiate a UTXO at the latest codec version
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, output: Output) -> Self {
        Self {
            codec_version: LATEST_CODEC,
            tx_id,
            output_index,
            asset_id,
            output,
        }
    }

    /// This UTXO's ID string
    pub fn utxo_id(&self) -> String {
        utxo_id(&self.tx_id, self.output_index)
    }

    /// Parse a UTXO as returned by a node: `0x`-prefixed checksummed hex, or cb58. The string
    /// must hold exactly one UTXO.
    pub fn from_string(s: &str) -> CaminoResult<Self> {
        let bytes = if s.starts_with("0x") {
            decode_hex_checksummed(s)
        } else {
            decode_cb58(s)
        }
        .map_err(|e| CaminoError::Utxo(e.to_string()))?;
        Utxo::from_bytes(&bytes).map_err(|e| CaminoError::Utxo(e.to_string()))
    }

    /// Encode as cb58
    pub fn to_cb58(&self) -> SerResult<String> {
        Ok(encode_cb58(&self.to_bytes()?))
    }

    /// Encode as `0x`-prefixed checksummed hex
    pub fn to_hex_checksummed(&self) -> SerResult<String> {
        Ok(encode_hex_checksummed(&self.to_bytes()?))
    }
}

impl ByteFormat for Utxo {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        2 + 32 + 4 + 32 + self.output.serialized_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            codec_version: read_codec_version(reader)?,
            tx_id: Id::read_from(reader)?,
            output_index: read_u32_be(reader)?,
            asset_id: Id::read_from(reader)?,
            output: Output::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u16_be(writer, self.codec_version)?;
        len += self.tx_id.write_to(writer)?;
        len += write_u32_be(writer, self.output_index)?;
        len += self.asset_id.write_to(writer)?;
        len += self.output.write_to(writer)?;
        Ok(len)
    }
}

/// A set of UTXOs keyed by UTXO ID. Iteration follows insertion order, which is the order the
/// selection engine scans in.
#[derive(Clone, Debug, Default)]
pub struct UtxoSet {
    utxos: Vec<Utxo>,
    ids: HashSet<String>,
}

impl UtxoSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a UTXO. An existing UTXO with the same ID is kept unless `overwrite` is set, in
    /// which case it is replaced in place. Returns true if the set changed.
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> bool {
        let id = utxo.utxo_id();
        if self.ids.contains(&id) {
            if !overwrite {
                return false;
            }
            if let Some(existing) = self.utxos.iter_mut().find(|u| u.utxo_id() == id) {
                *existing = utxo;
            }
            return true;
        }
        self.ids.insert(id);
        self.utxos.push(utxo);
        true
    }

    /// Add many UTXOs. Returns the number that changed the set.
    pub fn add_array<I>(&mut self, utxos: I, overwrite: bool) -> usize
    where
        I: IntoIterator<Item = Utxo>,
    {
        utxos
            .into_iter()
            .map(|u| self.add(u, overwrite))
            .filter(|added| *added)
            .count()
    }

    /// Parse and add UTXO strings (hex or cb58). Fails on the first malformed string.
    pub fn add_strings<S>(&mut self, utxos: &[S], overwrite: bool) -> CaminoResult<usize>
    where
        S: AsRef<str>,
    {
        let parsed = utxos
            .iter()
            .map(|s| Utxo::from_string(s.as_ref()))
            .collect::<CaminoResult<Vec<_>>>()?;
        Ok(self.add_array(parsed, overwrite))
    }

    /// Remove a UTXO by ID
    pub fn remove(&mut self, utxo_id: &str) -> Option<Utxo> {
        if !self.ids.remove(utxo_id) {
            return None;
        }
        let pos = self.utxos.iter().position(|u| u.utxo_id() == utxo_id)?;
        Some(self.utxos.remove(pos))
    }

    /// Look up a UTXO by ID
    pub fn get(&self, utxo_id: &str) -> Option<&Utxo> {
        if !self.ids.contains(utxo_id) {
            return None;
        }
        self.utxos.iter().find(|u| u.utxo_id() == utxo_id)
    }

    /// True if a UTXO with this ID is in the set
    pub fn includes(&self, utxo_id: &str) -> bool {
        self.ids.contains(utxo_id)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.iter()
    }

    /// All UTXOs, in insertion order
    pub fn get_all(&self) -> &[Utxo] {
        &self.utxos
    }

    /// All UTXO IDs, in insertion order
    pub fn get_utxo_ids(&self) -> Vec<String> {
        self.utxos.iter().map(Utxo::utxo_id).collect()
    }

    /// The number of UTXOs
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// True if the set is empty
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// The distinct assets held, in first-seen order
    pub fn get_asset_ids(&self) -> Vec<Id> {
        let mut assets: Vec<Id> = vec![];
        for utxo in self.utxos.iter() {
            if !assets.contains(&utxo.asset_id) {
                assets.push(utxo.asset_id);
            }
        }
        assets
    }

    /// The distinct owner addresses across all UTXOs, sorted
    pub fn get_addresses(&self) -> Vec<ShortId> {
        let mut addresses: Vec<ShortId> = self
            .utxos
            .iter()
            .flat_map(|u| u.output.owners().addresses().iter().copied())
            .collect();
        addresses.sort();
        addresses.dedup();
        addresses
    }

    /// The total amount of `asset_id` that `addresses` can spend at `as_of`. Locked outputs
    /// are included.
    pub fn get_balance(&self, addresses: &[ShortId], asset_id: &Id, as_of: u64) -> u64 {
        self.utxos
            .iter()
            .filter(|u| &u.asset_id == asset_id)
            .filter(|u| u.output.owners().meets_threshold(addresses, as_of))
            .filter_map(|u| u.output.amount())
            .fold(0u64, |acc, amount| acc.saturating_add(amount))
    }
}

impl FromIterator<Utxo> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = Utxo>>(iter: I) -> Self {
        let mut set = UtxoSet::new();
        set.add_array(iter, false);
        set
    }
}
