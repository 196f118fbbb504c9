//! Inputs. Like outputs, `Input` is a closed enum keyed by its wire type ID.

use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use camino_core::ser::{
    length_prefix, read_u32_be, read_u64_be, write_u32_be, write_u64_be, ByteFormat, SerError,
    SerResult,
};
use serde::{Deserialize, Serialize};

use crate::types::{LockedIds, ShortId, LOCKED_INPUT_ID, SECP_TRANSFER_INPUT_ID};

/// A signature slot. `address_index` points into the consumed output's owner addresses.
/// `source` records which address is expected to sign. Only the index is serialized, so only
/// the index takes part in equality and hashing.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigIdx {
    /// Index into the consumed output's address list
    pub address_index: u32,
    /// The expected signer. Zero after decoding.
    pub source: ShortId,
}

impl SigIdx {
    /// Instantiate a signature slot
    pub fn new(address_index: u32, source: ShortId) -> Self {
        Self {
            address_index,
            source,
        }
    }
}

impl PartialEq for SigIdx {
    fn eq(&self, other: &Self) -> bool {
        self.address_index == other.address_index
    }
}

impl Eq for SigIdx {}

impl Hash for SigIdx {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address_index.hash(state);
    }
}

/// An input, consuming a previously created output.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Input {
    /// Spends a transfer output in full
    SecpTransfer {
        /// The amount consumed, which must equal the output's amount
        amount: u64,
        /// One slot per required signature, in signing order
        sig_indices: Vec<SigIdx>,
    },
    /// Spends a locked output
    Locked {
        /// The locking transactions of the consumed output
        ids: LockedIds,
        /// The wrapped input
        inner: Box<Input>,
    },
}

impl Input {
    /// Construct an input from its type ID, with no signature slots. The locked variant wraps
    /// a transfer input with empty `LockedIds`.
    pub fn select(type_id: u32, amount: u64) -> SerResult<Self> {
        match type_id {
            SECP_TRANSFER_INPUT_ID => Ok(Input::SecpTransfer {
                amount,
                sig_indices: vec![],
            }),
            LOCKED_INPUT_ID => Ok(Input::Locked {
                ids: LockedIds::default(),
                inner: Box::new(Input::select(SECP_TRANSFER_INPUT_ID, amount)?),
            }),
            _ => Err(SerError::UnknownInputId(type_id)),
        }
    }

    /// Decode the body of an input whose type ID has already been read.
    pub fn read_typed<R>(type_id: u32, reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        match type_id {
            SECP_TRANSFER_INPUT_ID => {
                let amount = read_u64_be(reader)?;
                let count = read_u32_be(reader)?;
                let sig_indices = (0..count)
                    .map(|_| read_u32_be(reader).map(|i| SigIdx::new(i, ShortId::zero())))
                    .collect::<SerResult<Vec<_>>>()?;
                Ok(Input::SecpTransfer {
                    amount,
                    sig_indices,
                })
            }
            LOCKED_INPUT_ID => {
                let ids = LockedIds::read_from(reader)?;
                // locks do not nest
                let inner_id = read_u32_be(reader)?;
                if inner_id == LOCKED_INPUT_ID {
                    return Err(SerError::UnknownInputId(inner_id));
                }
                let inner = Box::new(Input::read_typed(inner_id, reader)?);
                Ok(Input::Locked { ids, inner })
            }
            _ => Err(SerError::UnknownInputId(type_id)),
        }
    }

    /// The wire type ID of this variant
    pub fn type_id(&self) -> u32 {
        match self {
            Input::SecpTransfer { .. } => SECP_TRANSFER_INPUT_ID,
            Input::Locked { .. } => LOCKED_INPUT_ID,
        }
    }

    /// The amount consumed
    pub fn amount(&self) -> u64 {
        match self {
            Input::SecpTransfer { amount, .. } => *amount,
            Input::Locked { inner, .. } => inner.amount(),
        }
    }

    /// The signature slots of this input, or of the input it wraps
    pub fn sig_indices(&self) -> &[SigIdx] {
        match self {
            Input::SecpTransfer { sig_indices, .. } => sig_indices,
            Input::Locked { inner, .. } => inner.sig_indices(),
        }
    }

    /// Mutable access to the signature slots
    pub fn sig_indices_mut(&mut self) -> &mut Vec<SigIdx> {
        match self {
            Input::SecpTransfer { sig_indices, .. } => sig_indices,
            Input::Locked { inner, .. } => inner.sig_indices_mut(),
        }
    }

    /// Append a signature slot
    pub fn add_signature_idx(&mut self, address_index: u32, source: ShortId) {
        self.sig_indices_mut().push(SigIdx::new(address_index, source));
    }

    fn body_length(&self) -> usize {
        match self {
            Input::SecpTransfer { sig_indices, .. } => 8 + 4 + 4 * sig_indices.len(),
            Input::Locked { ids, inner } => ids.serialized_length() + inner.serialized_length(),
        }
    }

    /// Write the variant's body, without its type ID.
    pub fn write_body<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        match self {
            Input::SecpTransfer {
                amount,
                sig_indices,
            } => {
                let mut len = write_u64_be(writer, *amount)?;
                len += write_u32_be(writer, length_prefix(sig_indices.len())?)?;
                for sig in sig_indices.iter() {
                    len += write_u32_be(writer, sig.address_index)?;
                }
                Ok(len)
            }
            Input::Locked { ids, inner } => {
                let mut len = ids.write_to(writer)?;
                len += inner.write_to(writer)?;
                Ok(len)
            }
        }
    }
}

impl ByteFormat for Input {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        4 + self.body_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let type_id = read_u32_be(reader)?;
        Input::read_typed(type_id, reader)
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Id;

    #[test]
    fn it_serializes_transfer_inputs() {
        let mut input = Input::select(SECP_TRANSFER_INPUT_ID, 1000).unwrap();
        input.add_signature_idx(0, ShortId::new([1; 20]));
        input.add_signature_idx(2, ShortId::new([3; 20]));

        let expected = "00000005".to_owned() + "00000000000003e8" + "00000002" + "00000000" + "00000002";
        assert_eq!(input.serialize_hex().unwrap(), expected);
        assert_eq!(input.serialized_length(), expected.len() / 2);

        // the source address stays local
        let decoded = Input::deserialize_hex(&expected).unwrap();
        assert_eq!(decoded.amount(), 1000);
        assert_eq!(
            decoded.sig_indices(),
            &[SigIdx::new(0, ShortId::zero()), SigIdx::new(2, ShortId::zero())]
        );
        assert_eq!(decoded.serialize_hex().unwrap(), expected);
    }

    #[test]
    fn it_round_trips_locked_inputs() {
        let mut input = Input::select(LOCKED_INPUT_ID, 55).unwrap();
        input.add_signature_idx(1, ShortId::zero());
        if let Input::Locked { ids, .. } = &mut input {
            ids.bond_tx_id = Id::new([9; 32]);
        }
        let bytes = input.to_bytes().unwrap();
        assert_eq!(bytes.len(), input.serialized_length());
        assert_eq!(&bytes[..4], &[0, 0, 0x20, 0]);
        assert_eq!(Input::from_bytes(&bytes).unwrap(), input);
        assert_eq!(input.sig_indices().len(), 1);
        assert_eq!(input.amount(), 55);
    }

    #[test]
    fn it_rejects_unknown_input_ids() {
        for id in [0u32, 6, 7, 0x2001].iter() {
            match Input::select(*id, 1) {
                Err(SerError::UnknownInputId(got)) => assert_eq!(got, *id),
                other => panic!("expected UnknownInputId, got {:?}", other),
            }
        }
        match Input::deserialize_hex("00000007") {
            Err(SerError::UnknownInputId(7)) => {}
            other => panic!("expected UnknownInputId, got {:?}", other),
        }
    }

    #[test]
    fn it_compares_signature_slots_by_index() {
        assert_eq!(SigIdx::new(3, ShortId::new([1; 20])), SigIdx::new(3, ShortId::zero()));
        assert_ne!(SigIdx::new(3, ShortId::zero()), SigIdx::new(4, ShortId::zero()));

        let mut input = Input::select(LOCKED_INPUT_ID, 80).unwrap();
        input.add_signature_idx(0, ShortId::new([7; 20]));
        input.add_signature_idx(1, ShortId::new([8; 20]));
        let decoded = Input::from_bytes(&input.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(decoded.sig_indices()[1].source, ShortId::zero());
    }

    #[test]
    fn it_rejects_nested_locked_inputs() {
        let header = format!("{}{}", "00002000", "00".repeat(64));
        let nested = format!("{}{}{}", header, header, "00000005000000000000000100000000");
        match Input::deserialize_hex(&nested) {
            Err(SerError::UnknownInputId(LOCKED_INPUT_ID)) => {}
            other => panic!("expected UnknownInputId, got {:?}", other),
        }

        // a deep chain of lock headers fails on the second one
        let deep = header.repeat(5000);
        assert!(Input::deserialize_hex(&deep).is_err());

        let single = format!("{}{}", header, "00000005000000000000000100000000");
        assert_eq!(Input::deserialize_hex(&single).unwrap().amount(), 1);
    }
}
