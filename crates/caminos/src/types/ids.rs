//! Fixed-width identifiers.

use std::io::{Read, Write};

use camino_core::ser::{ByteFormat, SerError, SerResult};
use serde::{Deserialize, Serialize};

camino_core::fixed_byte_id!(
    /// A 32-byte ID: transactions, assets and chains.
    Id,
    32
);

camino_core::fixed_byte_id!(
    /// A 20-byte ID: address hashes and node IDs.
    ShortId,
    20
);

camino_core::fixed_byte_id!(
    /// A 65-byte recoverable secp256k1 signature, or its zeroed placeholder.
    Signature,
    65
);

/// The deposit and bond transactions that locked an output. An all-zero ID means "not locked
/// by that kind of transaction".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedIds {
    /// The deposit transaction, or zero
    pub deposit_tx_id: Id,
    /// The bond transaction, or zero
    pub bond_tx_id: Id,
}

impl LockedIds {
    /// Instantiate from deposit and bond transaction IDs
    pub fn new(deposit_tx_id: Id, bond_tx_id: Id) -> Self {
        Self {
            deposit_tx_id,
            bond_tx_id,
        }
    }

    /// True if either ID is set
    pub fn is_locked(&self) -> bool {
        !self.deposit_tx_id.is_zero() || !self.bond_tx_id.is_zero()
    }
}

impl ByteFormat for LockedIds {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        64
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            deposit_tx_id: Id::read_from(reader)?,
            bond_tx_id: Id::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.deposit_tx_id.write_to(writer)?;
        len += self.bond_tx_id.write_to(writer)?;
        Ok(len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_renders_ids_as_cb58() {
        let id = Id::new([1; 32]);
        assert_eq!(
            id.to_string(),
            "SeLqn3UAUoRymWmwW7axrzJK7JfNaBR2cHCryA6cFscgkny8"
        );
        assert_eq!(
            "SeLqn3UAUoRymWmwW7axrzJK7JfNaBR2cHCryA6cFscgkny8"
                .parse::<Id>()
                .unwrap(),
            id
        );
        assert!("SeLqn3UAUoRymWmwW7axrzJK7JfNaBR2cHCryA6cFscgkny9"
            .parse::<Id>()
            .is_err());
    }

    #[test]
    fn it_detects_locks() {
        assert!(!LockedIds::default().is_locked());
        assert!(LockedIds::new(Id::new([1; 32]), Id::zero()).is_locked());
        assert!(LockedIds::new(Id::zero(), Id::new([1; 32])).is_locked());

        let ids = LockedIds::new(Id::new([1; 32]), Id::new([2; 32]));
        let bytes = ids.to_bytes().unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(LockedIds::from_bytes(&bytes).unwrap(), ids);
    }
}
