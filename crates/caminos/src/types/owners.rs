//! Owner sets: who may spend an output, how many of them must sign, and from when.

use std::io::{Read, Write};

use camino_core::ser::{
    read_u32_be, read_u64_be, write_u32_be, write_u64_be, ByteFormat, SerError, SerResult,
};
use serde::{Deserialize, Serialize};

use crate::types::ShortId;

/// An owner set. `threshold` of the `addresses` must sign to spend, and only at or after
/// `locktime`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputOwners {
    locktime: u64,
    threshold: u32,
    addresses: Vec<ShortId>,
}

impl OutputOwners {
    /// Instantiate an owner set. Addresses are sorted and deduplicated. Errors if the threshold
    /// exceeds the number of distinct addresses.
    pub fn new(mut addresses: Vec<ShortId>, locktime: u64, threshold: u32) -> SerResult<Self> {
        addresses.sort();
        addresses.dedup();
        Self::checked(addresses, locktime, threshold)
    }

    fn checked(addresses: Vec<ShortId>, locktime: u64, threshold: u32) -> SerResult<Self> {
        if threshold as usize > addresses.len() {
            return Err(SerError::ThresholdTooHigh {
                threshold,
                addresses: addresses.len(),
            });
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }

    /// The earliest time this set may spend
    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    /// The number of signatures required
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The owner addresses, in wire order
    pub fn addresses(&self) -> &[ShortId] {
        &self.addresses
    }

    /// The position of `address` in this set, as referenced by input signature indices
    pub fn address_idx(&self, address: &ShortId) -> Option<u32> {
        self.addresses
            .iter()
            .position(|a| a == address)
            .map(|i| i as u32)
    }

    /// The addresses among `senders` that would sign a spend at `as_of`. Owner addresses are
    /// scanned in order until `threshold` matches are found. Empty if still time-locked.
    pub fn get_spenders(&self, senders: &[ShortId], as_of: u64) -> Vec<ShortId> {
        let mut qualified = vec![];
        if self.locktime > as_of {
            return qualified;
        }
        let threshold = self.threshold as usize;
        for owner in self.addresses.iter() {
            if qualified.len() >= threshold {
                break;
            }
            if senders.contains(owner) {
                qualified.push(*owner);
            }
        }
        qualified
    }

    /// True if `senders` can spend at `as_of`
    pub fn meets_threshold(&self, senders: &[ShortId], as_of: u64) -> bool {
        if self.locktime > as_of {
            return false;
        }
        self.get_spenders(senders, as_of).len() >= self.threshold as usize
    }
}

impl ByteFormat for OutputOwners {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        8 + 4 + 4 + 20 * self.addresses.len()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let locktime = read_u64_be(reader)?;
        let threshold = read_u32_be(reader)?;
        let addresses = ShortId::read_seq_from(reader)?;
        Self::checked(addresses, locktime, threshold)
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u64_be(writer, self.locktime)?;
        len += write_u32_be(writer, self.threshold)?;
        len += ShortId::write_seq_to(writer, &self.addresses)?;
        Ok(len)
    }
}
