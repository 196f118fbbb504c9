//! Unsigned and signed transactions.
//!
//! An `UnsignedTx` is the codec version, the body's type ID and the body. A `Tx` appends one
//! credential per input. Signing itself happens elsewhere: this module only lays out the
//! signature slots each input needs and can fill them with zeroed placeholders.

use std::io::{Read, Write};

use camino_core::{
    enc::{decode_cb58, decode_hex_checksummed, encode_cb58, encode_hex_checksummed},
    ser::{
        read_codec_version, read_u32_be, write_u16_be, write_u32_be, ByteFormat, SerError,
        SerResult, LATEST_CODEC,
    },
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    errors::{CaminoError, CaminoResult},
    types::{Id, SigIdx, Signature, Transaction, SECP_CREDENTIAL_ID},
};

/// Burns above this many base units must not exceed the native output total. Ten whole units
/// of a 9-decimal asset.
pub const GOOSE_EGG_BURN_LIMIT: u64 = 10 * 1_000_000_000;

/// A transaction body awaiting credentials.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTx {
    /// The codec version
    pub codec_version: u16,
    /// The body
    pub transaction: Transaction,
}

impl UnsignedTx {
    /// Wrap a body at the latest codec version
    pub fn new(transaction: Transaction) -> Self {
        Self {
            codec_version: LATEST_CODEC,
            transaction,
        }
    }

    /// The sum of input amounts of `asset_id`, import inputs included
    pub fn input_total(&self, asset_id: &Id) -> u64 {
        self.transaction
            .all_inputs()
            .iter()
            .filter(|i| &i.asset_id == asset_id)
            .fold(0u64, |acc, i| acc.saturating_add(i.input.amount()))
    }

    /// The sum of output amounts of `asset_id`, exported outputs included
    pub fn output_total(&self, asset_id: &Id) -> u64 {
        self.transaction
            .all_outputs()
            .iter()
            .filter(|o| &o.asset_id == asset_id)
            .filter_map(|o| o.output.amount())
            .fold(0u64, |acc, amount| acc.saturating_add(amount))
    }

    /// The amount of `asset_id` consumed but not re-emitted
    pub fn burn(&self, asset_id: &Id) -> u64 {
        self.input_total(asset_id)
            .saturating_sub(self.output_total(asset_id))
    }

    /// Reject transactions whose burn of the native asset is both above
    /// `GOOSE_EGG_BURN_LIMIT` and above the native output total.
    pub fn check_goose_egg(&self, native_asset_id: &Id) -> CaminoResult<()> {
        let burn = self.burn(native_asset_id);
        let outputs = self.output_total(native_asset_id);
        if burn > GOOSE_EGG_BURN_LIMIT && burn > outputs {
            return Err(CaminoError::GooseEgg { burn, outputs });
        }
        Ok(())
    }

    /// The signature slots of each input, in credential order
    pub fn signature_slots(&self) -> Vec<Vec<SigIdx>> {
        self.transaction
            .all_inputs()
            .iter()
            .map(|i| i.input.sig_indices().to_vec())
            .collect()
    }

    /// Attach one credential per input, each holding a zeroed signature per slot. The signer
    /// replaces the placeholders.
    pub fn with_placeholder_credentials(self) -> Tx {
        let credentials = self
            .signature_slots()
            .iter()
            .map(|slots| Credential::new(vec![Signature::zero(); slots.len()]))
            .collect();
        Tx::new(self, credentials)
    }
}

impl ByteFormat for UnsignedTx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        2 + 4 + self.transaction.body_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let codec_version = read_codec_version(reader)?;
        let type_id = read_u32_be(reader)?;
        Ok(Self {
            codec_version,
            transaction: Transaction::read_typed(type_id, reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u16_be(writer, self.codec_version)?;
        len += write_u32_be(writer, self.transaction.type_id())?;
        len += self.transaction.write_body(writer)?;
        Ok(len)
    }
}

/// The signatures for one input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    /// One signature per signature slot, in slot order
    pub signatures: Vec<Signature>,
}

impl Credential {
    /// Instantiate a credential
    pub fn new(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }
}

impl ByteFormat for Credential {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        4 + camino_core::ser::seq_length(&self.signatures)
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let type_id = read_u32_be(reader)?;
        if type_id != SECP_CREDENTIAL_ID {
            return Err(SerError::UnknownTypeId(type_id));
        }
        Ok(Self {
            signatures: Signature::read_seq_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u32_be(writer, SECP_CREDENTIAL_ID)?;
        len += Signature::write_seq_to(writer, &self.signatures)?;
        Ok(len)
    }
}

/// A signed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tx {
    /// The signed body
    pub unsigned: UnsignedTx,
    /// One credential per input
    pub credentials: Vec<Credential>,
}

impl Tx {
    /// Instantiate a signed transaction
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Self {
        Self {
            unsigned,
            credentials,
        }
    }

    /// The transaction ID: sha256 of the signed bytes
    pub fn id(&self) -> SerResult<Id> {
        let digest = Sha256::digest(self.to_bytes()?);
        Ok(Id::from_slice(&digest)?)
    }

    /// Encode for `issueTx` as cb58
    pub fn to_cb58(&self) -> SerResult<String> {
        Ok(encode_cb58(&self.to_bytes()?))
    }

    /// Encode for `issueTx` as `0x`-prefixed checksummed hex
    pub fn to_hex_checksummed(&self) -> SerResult<String> {
        Ok(encode_hex_checksummed(&self.to_bytes()?))
    }

    /// Parse a node-encoded transaction, hex or cb58
    pub fn from_string(s: &str) -> SerResult<Self> {
        let bytes = if s.starts_with("0x") {
            decode_hex_checksummed(s)?
        } else {
            decode_cb58(s)?
        };
        Tx::from_bytes(&bytes)
    }
}

impl ByteFormat for Tx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.unsigned.serialized_length() + camino_core::ser::seq_length(&self.credentials)
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            unsigned: UnsignedTx::read_from(reader)?,
            credentials: Credential::read_seq_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.unsigned.write_to(writer)?;
        len += Credential::write_seq_to(writer, &self.credentials)?;
        Ok(len)
    }
}
