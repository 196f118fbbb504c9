//! Outputs. `Output` is a closed enum whose wire tag is its type ID: decoding reads the tag,
//! dispatches on it, and fails with `UnknownOutputId` for anything unregistered.

use std::io::{Read, Write};

use camino_core::ser::{
    read_u32_be, read_u64_be, write_u32_be, write_u64_be, ByteFormat, SerError, SerResult,
};
use serde::{Deserialize, Serialize};

use crate::types::{
    LockedIds, OutputOwners, ShortId, LOCKED_OUTPUT_ID, SECP_OWNER_OUTPUT_ID,
    SECP_TRANSFER_OUTPUT_ID,
};

/// An output, as carried by UTXOs and transactions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Output {
    /// An amount of an asset, spendable by an owner set
    SecpTransfer {
        /// The amount, in base units
        amount: u64,
        /// Who may spend it
        owners: OutputOwners,
    },
    /// An owner set with no amount, e.g. a reward or validator owner
    SecpOwner {
        /// The owner set
        owners: OutputOwners,
    },
    /// Another output, locked by a deposit and/or bond transaction
    Locked {
        /// The locking transactions
        ids: LockedIds,
        /// The wrapped output
        inner: Box<Output>,
    },
}

impl Output {
    /// Construct an output from its type ID. The locked variant wraps a transfer output with
    /// empty `LockedIds`.
    pub fn select(
        type_id: u32,
        amount: u64,
        addresses: Vec<ShortId>,
        locktime: u64,
        threshold: u32,
    ) -> SerResult<Self> {
        match type_id {
            SECP_TRANSFER_OUTPUT_ID => Ok(Output::SecpTransfer {
                amount,
                owners: OutputOwners::new(addresses, locktime, threshold)?,
            }),
            SECP_OWNER_OUTPUT_ID => Ok(Output::SecpOwner {
                owners: OutputOwners::new(addresses, locktime, threshold)?,
            }),
            LOCKED_OUTPUT_ID => Ok(Output::Locked {
                ids: LockedIds::default(),
                inner: Box::new(Output::select(
                    SECP_TRANSFER_OUTPUT_ID,
                    amount,
                    addresses,
                    locktime,
                    threshold,
                )?),
            }),
            _ => Err(SerError::UnknownOutputId(type_id)),
        }
    }

    /// Decode the body of an output whose type ID has already been read.
    pub fn read_typed<R>(type_id: u32, reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        match type_id {
            SECP_TRANSFER_OUTPUT_ID => {
                let amount = read_u64_be(reader)?;
                let owners = OutputOwners::read_from(reader)?;
                Ok(Output::SecpTransfer { amount, owners })
            }
            SECP_OWNER_OUTPUT_ID => Ok(Output::SecpOwner {
                owners: OutputOwners::read_from(reader)?,
            }),
            LOCKED_OUTPUT_ID => {
                let ids = LockedIds::read_from(reader)?;
                // locks do not nest
                let inner_id = read_u32_be(reader)?;
                if inner_id == LOCKED_OUTPUT_ID {
                    return Err(SerError::UnknownOutputId(inner_id));
                }
                let inner = Box::new(Output::read_typed(inner_id, reader)?);
                Ok(Output::Locked { ids, inner })
            }
            _ => Err(SerError::UnknownOutputId(type_id)),
        }
    }

    /// The wire type ID of this variant
    pub fn type_id(&self) -> u32 {
        match self {
            Output::SecpTransfer { .. } => SECP_TRANSFER_OUTPUT_ID,
            Output::SecpOwner { .. } => SECP_OWNER_OUTPUT_ID,
            Output::Locked { .. } => LOCKED_OUTPUT_ID,
        }
    }

    /// The amount carried, if this output carries one
    pub fn amount(&self) -> Option<u64> {
        match self {
            Output::SecpTransfer { amount, .. } => Some(*amount),
            Output::SecpOwner { .. } => None,
            Output::Locked { inner, .. } => inner.amount(),
        }
    }

    /// The owner set of this output, or of the output it wraps
    pub fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer { owners, .. } => owners,
            Output::SecpOwner { owners } => owners,
            Output::Locked { inner, .. } => inner.owners(),
        }
    }

    /// The locking transactions, if this output is wrapped in a lock
    pub fn locked_ids(&self) -> Option<&LockedIds> {
        match self {
            Output::Locked { ids, .. } => Some(ids),
            _ => None,
        }
    }

    /// True if a deposit or bond currently locks this output
    pub fn is_locked(&self) -> bool {
        self.locked_ids().map(LockedIds::is_locked).unwrap_or(false)
    }

    fn body_length(&self) -> usize {
        match self {
            Output::SecpTransfer { owners, .. } => 8 + owners.serialized_length(),
            Output::SecpOwner { owners } => owners.serialized_length(),
            Output::Locked { ids, inner } => ids.serialized_length() + inner.serialized_length(),
        }
    }

    /// Write the variant's body, without its type ID.
    pub fn write_body<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        match self {
            Output::SecpTransfer { amount, owners } => {
                let mut len = write_u64_be(writer, *amount)?;
                len += owners.write_to(writer)?;
                Ok(len)
            }
            Output::SecpOwner { owners } => owners.write_to(writer),
            Output::Locked { ids, inner } => {
                let mut len = ids.write_to(writer)?;
                len += inner.write_to(writer)?;
                Ok(len)
            }
        }
    }
}

impl ByteFormat for Output {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        4 + self.body_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let type_id = read_u32_be(reader)?;
        Output::read_typed(type_id, reader)
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u32_be(writer, self.type_id())?;
        len += self.write_body(writer)?;
        Ok(len)
    }
}
