//! Inputs and outputs paired with the asset (and, for inputs, the UTXO) they refer to.

use std::{
    cmp::Ordering,
    io::{Read, Write},
};

use camino_core::ser::{read_u32_be, write_u32_be, ByteFormat, SerError, SerResult};
use serde::{Deserialize, Serialize};

use crate::types::{utxo_id, Id, Input, Output};

/// An output of a specific asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableOutput {
    /// The asset
    pub asset_id: Id,
    /// The output
    pub output: Output,
}

impl TransferableOutput {
    /// Instantiate a transferable output
    pub fn new(asset_id: Id, output: Output) -> Self {
        Self { asset_id, output }
    }

    /// The canonical transaction ordering: by asset, then by serialized output.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.asset_id.cmp(&other.asset_id).then_with(|| {
            let a = self.output.to_bytes().unwrap_or_default();
            let b = other.output.to_bytes().unwrap_or_default();
            a.cmp(&b)
        })
    }
}

impl ByteFormat for TransferableOutput {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        32 + self.output.serialized_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            asset_id: Id::read_from(reader)?,
            output: Output::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.asset_id.write_to(writer)?;
        len += self.output.write_to(writer)?;
        Ok(len)
    }
}

/// An input of a specific asset, consuming the UTXO `(tx_id, output_index)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableInput {
    /// The transaction that created the consumed UTXO
    pub tx_id: Id,
    /// The consumed UTXO's index in that transaction
    pub output_index: u32,
    /// The asset
    pub asset_id: Id,
    /// The input
    pub input: Input,
}

impl TransferableInput {
    /// Instantiate a transferable input
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, input: Input) -> Self {
        Self {
            tx_id,
            output_index,
            asset_id,
            input,
        }
    }

    /// The ID of the consumed UTXO
    pub fn utxo_id(&self) -> String {
        utxo_id(&self.tx_id, self.output_index)
    }

    /// The canonical transaction ordering: by consumed transaction, then output index.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.tx_id
            .cmp(&other.tx_id)
            .then(self.output_index.cmp(&other.output_index))
    }
}

impl ByteFormat for TransferableInput {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        32 + 4 + 32 + self.input.serialized_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            tx_id: Id::read_from(reader)?,
            output_index: read_u32_be(reader)?,
            asset_id: Id::read_from(reader)?,
            input: Input::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.tx_id.write_to(writer)?;
        len += write_u32_be(writer, self.output_index)?;
        len += self.asset_id.write_to(writer)?;
        len += self.input.write_to(writer)?;
        Ok(len)
    }
}
