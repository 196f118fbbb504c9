//! Transaction bodies. Every body starts with a `BaseTx`; subtypes append their own fields.

use std::io::{Read, Write};

use camino_core::ser::{
    read_u32_be, read_u64_be, write_u32_be, write_u64_be, ByteFormat, SerError, SerResult,
    MAX_MEMO_LENGTH,
};
use serde::{Deserialize, Serialize};

use crate::types::{
    Id, ShortId, Signature, TransferableInput, TransferableOutput, BASE_TX_ID,
    CASHOUT_CHEQUE_TX_ID, EXPORT_TX_ID, IMPORT_TX_ID, LOCK_MESSENGER_FUNDS_TX_ID,
};

camino_core::wrap_prefixed_byte_vector!(
    /// A transaction memo. At most 256 bytes.
    Memo
);

impl Memo {
    /// Wrap memo bytes, rejecting anything longer than 256 bytes.
    pub fn checked(bytes: Vec<u8>) -> SerResult<Self> {
        if bytes.len() > MAX_MEMO_LENGTH {
            return Err(SerError::MemoTooLong(bytes.len()));
        }
        Ok(Self::from(bytes))
    }
}

/// The fields shared by every transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTx {
    /// The network ID
    pub network_id: u32,
    /// The chain this transaction is issued on
    pub blockchain_id: Id,
    /// Outputs, in canonical order
    pub outputs: Vec<TransferableOutput>,
    /// Inputs, in canonical order
    pub inputs: Vec<TransferableInput>,
    /// Free-form memo
    pub memo: Memo,
}

impl BaseTx {
    /// Instantiate a base transaction. Inputs and outputs are sorted into canonical order.
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        mut outputs: Vec<TransferableOutput>,
        mut inputs: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> SerResult<Self> {
        outputs.sort_by(TransferableOutput::canonical_cmp);
        inputs.sort_by(TransferableInput::canonical_cmp);
        Ok(Self {
            network_id,
            blockchain_id,
            outputs,
            inputs,
            memo: Memo::checked(memo)?,
        })
    }
}

impl ByteFormat for BaseTx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        4 + 32
            + camino_core::ser::seq_length(&self.outputs)
            + camino_core::ser::seq_length(&self.inputs)
            + self.memo.serialized_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let network_id = read_u32_be(reader)?;
        let blockchain_id = Id::read_from(reader)?;
        let outputs = TransferableOutput::read_seq_from(reader)?;
        let inputs = TransferableInput::read_seq_from(reader)?;
        let memo = Memo::read_from(reader)?;
        if memo.len() > MAX_MEMO_LENGTH {
            return Err(SerError::MemoTooLong(memo.len()));
        }
        Ok(Self {
            network_id,
            blockchain_id,
            outputs,
            inputs,
            memo,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u32_be(writer, self.network_id)?;
        len += self.blockchain_id.write_to(writer)?;
        len += TransferableOutput::write_seq_to(writer, &self.outputs)?;
        len += TransferableInput::write_seq_to(writer, &self.inputs)?;
        len += self.memo.write_to(writer)?;
        Ok(len)
    }
}

/// Imports atomic UTXOs from another chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTx {
    /// Local inputs, outputs and memo
    pub base: BaseTx,
    /// The chain the atomic UTXOs live on
    pub source_chain: Id,
    /// Inputs consuming the atomic UTXOs, in canonical order
    pub import_inputs: Vec<TransferableInput>,
}

impl ImportTx {
    /// Instantiate an import transaction. Import inputs are sorted into canonical order.
    pub fn new(base: BaseTx, source_chain: Id, mut import_inputs: Vec<TransferableInput>) -> Self {
        import_inputs.sort_by(TransferableInput::canonical_cmp);
        Self {
            base,
            source_chain,
            import_inputs,
        }
    }
}

impl ByteFormat for ImportTx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.base.serialized_length() + 32 + camino_core::ser::seq_length(&self.import_inputs)
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            base: BaseTx::read_from(reader)?,
            source_chain: Id::read_from(reader)?,
            import_inputs: TransferableInput::read_seq_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.base.write_to(writer)?;
        len += self.source_chain.write_to(writer)?;
        len += TransferableInput::write_seq_to(writer, &self.import_inputs)?;
        Ok(len)
    }
}

/// Exports outputs to another chain's atomic memory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTx {
    /// Local inputs, change outputs and memo
    pub base: BaseTx,
    /// The chain receiving the exported outputs
    pub destination_chain: Id,
    /// Outputs placed in atomic memory, in canonical order
    pub exported_outputs: Vec<TransferableOutput>,
}

impl ExportTx {
    /// Instantiate an export transaction. Exported outputs are sorted into canonical order.
    pub fn new(
        base: BaseTx,
        destination_chain: Id,
        mut exported_outputs: Vec<TransferableOutput>,
    ) -> Self {
        exported_outputs.sort_by(TransferableOutput::canonical_cmp);
        Self {
            base,
            destination_chain,
            exported_outputs,
        }
    }
}

impl ByteFormat for ExportTx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.base.serialized_length() + 32 + camino_core::ser::seq_length(&self.exported_outputs)
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            base: BaseTx::read_from(reader)?,
            destination_chain: Id::read_from(reader)?,
            exported_outputs: TransferableOutput::read_seq_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.base.write_to(writer)?;
        len += self.destination_chain.write_to(writer)?;
        len += TransferableOutput::write_seq_to(writer, &self.exported_outputs)?;
        Ok(len)
    }
}

/// A touristic-chain payment promise from an issuer to a beneficiary, redeemable through an
/// agent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cheque {
    /// The address that signed the cheque
    pub issuer: ShortId,
    /// The address being paid
    pub beneficiary: ShortId,
    /// The cumulative amount promised
    pub amount: u64,
    /// Monotone per issuer/beneficiary pair
    pub serial_id: u64,
    /// The agent redeeming on the beneficiary's behalf
    pub agent: ShortId,
}

impl ByteFormat for Cheque {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        20 + 20 + 8 + 8 + 20
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            issuer: ShortId::read_from(reader)?,
            beneficiary: ShortId::read_from(reader)?,
            amount: read_u64_be(reader)?,
            serial_id: read_u64_be(reader)?,
            agent: ShortId::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.issuer.write_to(writer)?;
        len += self.beneficiary.write_to(writer)?;
        len += write_u64_be(writer, self.amount)?;
        len += write_u64_be(writer, self.serial_id)?;
        len += self.agent.write_to(writer)?;
        Ok(len)
    }
}

/// Locks messenger funds on the touristic chain. The locked outputs come back from the
/// node's `spend` call, so the body carries nothing beyond the base fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockMessengerFundsTx {
    /// Inputs, locked outputs and memo
    pub base: BaseTx,
}

impl ByteFormat for LockMessengerFundsTx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.base.serialized_length()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            base: BaseTx::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        self.base.write_to(writer)
    }
}

/// Cashes out a cheque on the touristic chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashoutChequeTx {
    /// Fee inputs, change and memo
    pub base: BaseTx,
    /// The cheque being redeemed
    pub cheque: Cheque,
    /// The issuer's signature over the cheque
    pub issuer_sig: Signature,
}

impl ByteFormat for CashoutChequeTx {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.base.serialized_length() + self.cheque.serialized_length() + 65
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            base: BaseTx::read_from(reader)?,
            cheque: Cheque::read_from(reader)?,
            issuer_sig: Signature::read_from(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.base.write_to(writer)?;
        len += self.cheque.write_to(writer)?;
        len += self.issuer_sig.write_to(writer)?;
        Ok(len)
    }
}

/// Every transaction body this library builds, keyed by wire type ID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum Transaction {
    /// A plain transfer
    Base(BaseTx),
    /// An import from another chain
    Import(ImportTx),
    /// An export to another chain
    Export(ExportTx),
    /// A touristic messenger-funds lock
    LockMessengerFunds(LockMessengerFundsTx),
    /// A touristic cheque cashout
    CashoutCheque(CashoutChequeTx),
}

impl Transaction {
    /// The wire type ID of this variant
    pub fn type_id(&self) -> u32 {
        match self {
            Transaction::Base(_) => BASE_TX_ID,
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
            Transaction::LockMessengerFunds(_) => LOCK_MESSENGER_FUNDS_TX_ID,
            Transaction::CashoutCheque(_) => CASHOUT_CHEQUE_TX_ID,
        }
    }

    /// Decode the body of a transaction whose type ID has already been read.
    pub fn read_typed<R>(type_id: u32, reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        match type_id {
            BASE_TX_ID => Ok(Transaction::Base(BaseTx::read_from(reader)?)),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::read_from(reader)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::read_from(reader)?)),
            LOCK_MESSENGER_FUNDS_TX_ID => Ok(Transaction::LockMessengerFunds(
                LockMessengerFundsTx::read_from(reader)?,
            )),
            CASHOUT_CHEQUE_TX_ID => Ok(Transaction::CashoutCheque(CashoutChequeTx::read_from(
                reader,
            )?)),
            _ => Err(SerError::UnknownTypeId(type_id)),
        }
    }

    /// The shared base fields
    pub fn base(&self) -> &BaseTx {
        match self {
            Transaction::Base(tx) => tx,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
            Transaction::LockMessengerFunds(tx) => &tx.base,
            Transaction::CashoutCheque(tx) => &tx.base,
        }
    }

    /// Every input, base inputs first, then import inputs. This is credential order.
    pub fn all_inputs(&self) -> Vec<&TransferableInput> {
        let mut inputs: Vec<&TransferableInput> = self.base().inputs.iter().collect();
        if let Transaction::Import(tx) = self {
            inputs.extend(tx.import_inputs.iter());
        }
        inputs
    }

    /// Every output, base outputs first, then exported outputs.
    pub fn all_outputs(&self) -> Vec<&TransferableOutput> {
        let mut outputs: Vec<&TransferableOutput> = self.base().outputs.iter().collect();
        if let Transaction::Export(tx) = self {
            outputs.extend(tx.exported_outputs.iter());
        }
        outputs
    }

    /// Byte length of the body, without the type ID
    pub fn body_length(&self) -> usize {
        match self {
            Transaction::Base(tx) => tx.serialized_length(),
            Transaction::Import(tx) => tx.serialized_length(),
            Transaction::Export(tx) => tx.serialized_length(),
            Transaction::LockMessengerFunds(tx) => tx.serialized_length(),
            Transaction::CashoutCheque(tx) => tx.serialized_length(),
        }
    }

    /// Write the body, without the type ID
    pub fn write_body<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        match self {
            Transaction::Base(tx) => tx.write_to(writer),
            Transaction::Import(tx) => tx.write_to(writer),
            Transaction::Export(tx) => tx.write_to(writer),
            Transaction::LockMessengerFunds(tx) => tx.write_to(writer),
            Transaction::CashoutCheque(tx) => tx.write_to(writer),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Input, Output, SECP_TRANSFER_INPUT_ID, SECP_TRANSFER_OUTPUT_ID};

    fn output(asset: u8, amount: u64) -> TransferableOutput {
        TransferableOutput::new(
            Id::new([asset; 32]),
            Output::select(SECP_TRANSFER_OUTPUT_ID, amount, vec![ShortId::new([1; 20])], 0, 1)
                .unwrap(),
        )
    }

    fn input(tx: u8) -> TransferableInput {
        let mut inp = Input::select(SECP_TRANSFER_INPUT_ID, 10).unwrap();
        inp.add_signature_idx(0, ShortId::zero());
        TransferableInput::new(Id::new([tx; 32]), 0, Id::new([2; 32]), inp)
    }

    #[test]
    fn it_serializes_empty_base_txs() {
        let tx = BaseTx::new(1002, Id::zero(), vec![], vec![], vec![]).unwrap();
        let expected = format!("000003ea{}000000000000000000000000", "00".repeat(32));
        assert_eq!(tx.serialize_hex().unwrap(), expected);
        assert_eq!(tx.serialized_length(), expected.len() / 2);
        assert_eq!(BaseTx::deserialize_hex(&expected).unwrap(), tx);
    }

    #[test]
    fn it_sorts_and_limits_base_txs() {
        let tx = BaseTx::new(
            1,
            Id::zero(),
            vec![output(2, 1), output(1, 1)],
            vec![input(9), input(3)],
            b"memo".to_vec(),
        )
        .unwrap();
        assert_eq!(tx.outputs[0].asset_id, Id::new([1; 32]));
        assert_eq!(tx.inputs[0].tx_id, Id::new([3; 32]));
        assert_eq!(tx.memo.items(), b"memo");
        assert_eq!(BaseTx::from_bytes(&tx.to_bytes().unwrap()).unwrap(), tx);

        match BaseTx::new(1, Id::zero(), vec![], vec![], vec![0; 257]) {
            Err(SerError::MemoTooLong(257)) => {}
            other => panic!("expected MemoTooLong, got {:?}", other),
        }
        assert!(BaseTx::new(1, Id::zero(), vec![], vec![], vec![0; 256]).is_ok());
    }

    #[test]
    fn it_round_trips_every_body() {
        let base = BaseTx::new(5, Id::new([8; 32]), vec![output(1, 3)], vec![input(4)], vec![])
            .unwrap();
        let bodies = vec![
            Transaction::Base(base.clone()),
            Transaction::Import(ImportTx::new(base.clone(), Id::new([6; 32]), vec![input(7)])),
            Transaction::Export(ExportTx::new(base.clone(), Id::new([6; 32]), vec![output(1, 2)])),
            Transaction::LockMessengerFunds(LockMessengerFundsTx { base: base.clone() }),
            Transaction::CashoutCheque(CashoutChequeTx {
                base,
                cheque: Cheque {
                    issuer: ShortId::new([1; 20]),
                    beneficiary: ShortId::new([2; 20]),
                    amount: 100,
                    serial_id: 1,
                    agent: ShortId::new([3; 20]),
                },
                issuer_sig: Signature::new([7; 65]),
            }),
        ];
        for body in bodies.iter() {
            let mut bytes = vec![];
            let written = body.write_body(&mut bytes).unwrap();
            assert_eq!(written, bytes.len());
            assert_eq!(written, body.body_length());
            let mut reader = bytes.as_slice();
            assert_eq!(&Transaction::read_typed(body.type_id(), &mut reader).unwrap(), body);
            assert!(reader.is_empty());
        }
        assert_eq!(bodies[1].all_inputs().len(), 2);
        assert_eq!(bodies[2].all_outputs().len(), 2);
        assert_eq!(bodies[0].all_outputs().len(), 1);
    }

    #[test]
    fn it_rejects_unknown_tx_ids() {
        let mut reader: &[u8] = &[0u8; 4];
        match Transaction::read_typed(0x99, &mut reader) {
            Err(SerError::UnknownTypeId(0x99)) => {}
            other => panic!("expected UnknownTypeId, got {:?}", other),
        }
    }
}
