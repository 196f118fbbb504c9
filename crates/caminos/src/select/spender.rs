//! Remote selection through a node's `spend` RPC.

use async_trait::async_trait;
use camino_core::{
    enc::{decode_cb58, decode_hex_checksummed},
    ser::{read_codec_seq, ByteFormat},
};
use serde::{Deserialize, Serialize};

use crate::{
    chain::ChainContext,
    errors::{CaminoError, CaminoResult},
    select::{AssetAmountDestination, LockMode, MinimumSpendable},
    types::{OutputOwners, ShortId, TransferableInput, TransferableOutput},
};

/// An owner set as the `spend` RPC expects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendOwners {
    /// Decimal locktime
    pub locktime: String,
    /// Signatures required
    pub threshold: u32,
    /// Chain address strings
    pub addresses: Vec<String>,
}

/// Parameters of the `spend` RPC.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRequest {
    /// Addresses funds may be taken from
    pub from: Vec<String>,
    /// Addresses expected to sign
    pub signer: Vec<String>,
    /// Where the spent amount goes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<SpendOwners>,
    /// Where change goes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<SpendOwners>,
    /// 0 unlocked, 1 deposit, 2 bond
    pub lock_mode: u8,
    /// Decimal amount to send or lock
    pub amount_to_lock: String,
    /// Decimal amount to burn
    pub amount_to_burn: String,
    /// Decimal timestamp spendability is evaluated at
    pub as_of: String,
    /// "hex" or "cb58"
    pub encoding: String,
    /// The cheque agent, for touristic cashouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Result of the `spend` RPC. `ins`, `outs` and `owners` are node-encoded arrays:
/// codec version, count, then the items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendResponse {
    /// Encoded `TransferableInput`s
    pub ins: String,
    /// Encoded `TransferableOutput`s
    pub outs: String,
    /// Encoded `OutputOwners`
    pub owners: String,
    /// `signers[i][j]` is the cb58 address hash expected to fill slot `j` of input `i`
    #[serde(default)]
    pub signers: Vec<Vec<String>>,
    /// The encoding of the arrays
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "hex".to_owned()
}

/// The node call `Spender` delegates to.
#[async_trait]
pub trait SpendRpc: Send + Sync {
    /// Issue `spend` and return the node's answer
    async fn spend(&self, request: SpendRequest) -> CaminoResult<SpendResponse>;
}

/// Decode a node-encoded array in the given encoding.
pub fn decode_rpc_array<T>(encoding: &str, s: &str) -> CaminoResult<Vec<T>>
where
    T: ByteFormat,
    CaminoError: From<T::Error>,
{
    let bytes = match encoding {
        "cb58" => decode_cb58(s)?,
        _ => decode_hex_checksummed(s)?,
    };
    Ok(read_codec_seq::<T>(&bytes)?)
}

/// A `MinimumSpendable` that asks the node to select. Supports exactly one asset amount.
#[derive(Debug, Clone)]
pub struct Spender<R: SpendRpc> {
    rpc: R,
    context: ChainContext,
}

impl<R: SpendRpc> Spender<R> {
    /// Instantiate a spender against `rpc`, rendering addresses for `context`'s chain
    pub fn new(rpc: R, context: ChainContext) -> Self {
        Self { rpc, context }
    }

    /// The underlying RPC
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    fn addresses(&self, ids: &[ShortId]) -> CaminoResult<Vec<String>> {
        ids.iter().map(|id| self.context.format_address(id)).collect()
    }

    fn owners(
        &self,
        ids: &[ShortId],
        locktime: u64,
        threshold: u32,
    ) -> CaminoResult<Option<SpendOwners>> {
        if ids.is_empty() {
            return Ok(None);
        }
        Ok(Some(SpendOwners {
            locktime: locktime.to_string(),
            threshold,
            addresses: self.addresses(ids)?,
        }))
    }

    /// Translate a destination into a `spend` request.
    pub fn request(
        &self,
        aad: &AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
        agent: Option<ShortId>,
    ) -> CaminoResult<SpendRequest> {
        let amounts = aad.get_amounts();
        if amounts.len() > 1 {
            return Err(CaminoError::FeeAsset(format!(
                "remote selection supports one asset amount, got {}",
                amounts.len()
            )));
        }
        let (amount, burn) = amounts
            .first()
            .map(|a| (a.amount(), a.burn()))
            .unwrap_or((0, 0));
        Ok(SpendRequest {
            from: self.addresses(aad.senders())?,
            signer: self.addresses(aad.signers())?,
            to: self.owners(aad.destinations(), locktime, aad.destinations_threshold())?,
            change: self.owners(aad.change_addresses(), 0, aad.change_threshold())?,
            lock_mode: lock_mode.as_u8(),
            amount_to_lock: amount.to_string(),
            amount_to_burn: burn.to_string(),
            as_of: as_of.to_string(),
            encoding: "hex".to_owned(),
            agent: agent.map(|a| self.context.format_address(&a)).transpose()?,
        })
    }
}

/// Fill in each input's signature-slot sources from the response's signer table.
fn cross_wire_signers(
    inputs: &mut [TransferableInput],
    signers: &[Vec<String>],
) -> CaminoResult<()> {
    if signers.len() != inputs.len() {
        return Err(CaminoError::Address(format!(
            "spend returned {} inputs but {} signer lists",
            inputs.len(),
            signers.len()
        )));
    }
    for (i, (input, sources)) in inputs.iter_mut().zip(signers.iter()).enumerate() {
        let slots = input.input.sig_indices_mut();
        if slots.len() != sources.len() {
            return Err(CaminoError::Address(format!(
                "input {} has {} signature slots but {} signers",
                i,
                slots.len(),
                sources.len()
            )));
        }
        for (slot, source) in slots.iter_mut().zip(sources.iter()) {
            slot.source = source
                .parse::<ShortId>()
                .map_err(|e| CaminoError::Address(format!("signer {}: {}", source, e)))?;
        }
    }
    Ok(())
}

/// Sort the node's outputs into destination outputs and change. The first output paying exactly
/// the requested amount to the destination owners goes to the destination. Of the rest, unlocked
/// outputs owned by the change owners are change.
fn route_outputs(
    aad: &mut AssetAmountDestination,
    outputs: Vec<TransferableOutput>,
    locktime: u64,
) {
    let target = aad.get_amounts().first().map(|a| (a.asset_id(), a.amount()));
    let destination = OutputOwners::new(
        aad.destinations().to_vec(),
        locktime,
        aad.destinations_threshold(),
    )
    .ok();
    let change = OutputOwners::new(aad.change_addresses().to_vec(), 0, aad.change_threshold()).ok();

    let mut destination_paid = false;
    for out in outputs {
        let pays_destination = !destination_paid
            && target.map_or(false, |(asset_id, amount)| {
                amount > 0 && out.asset_id == asset_id && out.output.amount() == Some(amount)
            })
            && destination.as_ref() == Some(out.output.owners());
        if pays_destination {
            destination_paid = true;
            aad.add_output(out);
        } else if !out.output.is_locked() && change.as_ref() == Some(out.output.owners()) {
            aad.add_change(out);
        } else {
            aad.add_output(out);
        }
    }
}

#[async_trait]
impl<R: SpendRpc> MinimumSpendable for Spender<R> {
    #[tracing::instrument(skip_all, err, fields(lock_mode = ?lock_mode))]
    async fn get_minimum_spendable(
        &self,
        mut aad: AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
        agent: Option<ShortId>,
    ) -> CaminoResult<AssetAmountDestination> {
        let request = self.request(&aad, as_of, locktime, lock_mode, agent)?;
        let response = self.rpc.spend(request).await?;

        let encoding = response.encoding.as_str();
        let mut inputs: Vec<TransferableInput> = decode_rpc_array(encoding, &response.ins)?;
        let outputs: Vec<TransferableOutput> = decode_rpc_array(encoding, &response.outs)?;
        let owners: Vec<OutputOwners> = decode_rpc_array(encoding, &response.owners)?;
        cross_wire_signers(&mut inputs, &response.signers)?;
        tracing::debug!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            owners = owners.len(),
            "remote selection complete"
        );

        inputs.into_iter().for_each(|i| aad.add_input(i));
        route_outputs(&mut aad, outputs, locktime);
        aad.add_output_owners(owners);
        Ok(aad)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        nets::Kopernikus,
        types::{Id, Input, Output, SECP_TRANSFER_INPUT_ID, SECP_TRANSFER_OUTPUT_ID},
    };
    use camino_core::{enc::encode_hex_checksummed, ser::write_codec_seq};
    use std::sync::Mutex;

    const AVAX: Id = Id::new([0xaa; 32]);

    fn addr(b: u8) -> ShortId {
        ShortId::new([b; 20])
    }

    struct MockRpc {
        response: SpendResponse,
        seen: Mutex<Vec<SpendRequest>>,
    }

    #[async_trait]
    impl SpendRpc for MockRpc {
        async fn spend(&self, request: SpendRequest) -> CaminoResult<SpendResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn context() -> ChainContext {
        ChainContext::for_network::<Kopernikus>("P", Id::zero(), AVAX, 1000)
    }

    fn transfer(amount: u64, owner: ShortId) -> TransferableOutput {
        TransferableOutput::new(
            AVAX,
            Output::select(SECP_TRANSFER_OUTPUT_ID, amount, vec![owner], 0, 1).unwrap(),
        )
    }

    fn response(signers: Vec<Vec<String>>) -> SpendResponse {
        response_with(signers, vec![transfer(2000, addr(2)), transfer(2000, addr(1))])
    }

    fn response_with(signers: Vec<Vec<String>>, outs: Vec<TransferableOutput>) -> SpendResponse {
        let mut input = Input::select(SECP_TRANSFER_INPUT_ID, 5000).unwrap();
        input.add_signature_idx(0, ShortId::zero());
        let ins = vec![TransferableInput::new(Id::new([1; 32]), 2, AVAX, input)];
        let owners = vec![OutputOwners::new(vec![addr(1)], 0, 1).unwrap()];
        SpendResponse {
            ins: encode_hex_checksummed(&write_codec_seq(&ins).unwrap()),
            outs: encode_hex_checksummed(&write_codec_seq(&outs).unwrap()),
            owners: encode_hex_checksummed(&write_codec_seq(&owners).unwrap()),
            signers,
            encoding: "hex".to_owned(),
        }
    }

    fn aad() -> AssetAmountDestination {
        let mut aad =
            AssetAmountDestination::new(vec![addr(2)], 1, vec![addr(1)], vec![addr(1)], 1);
        aad.add_asset_amount(AVAX, 2000, 1000);
        aad
    }

    #[test]
    fn it_builds_spend_requests() {
        let spender = Spender::new(
            MockRpc {
                response: response(vec![]),
                seen: Mutex::new(vec![]),
            },
            context(),
        );
        let req = spender
            .request(&aad(), 77, 5, LockMode::Deposit, Some(addr(3)))
            .unwrap();
        let a1 = context().format_address(&addr(1)).unwrap();
        let a2 = context().format_address(&addr(2)).unwrap();
        assert_eq!(req.from, vec![a1.clone()]);
        assert_eq!(req.signer, vec![a1.clone()]);
        assert_eq!(
            req.to,
            Some(SpendOwners {
                locktime: "5".to_owned(),
                threshold: 1,
                addresses: vec![a2],
            })
        );
        assert_eq!(req.change.as_ref().unwrap().addresses, vec![a1]);
        assert_eq!(req.change.as_ref().unwrap().locktime, "0");
        assert_eq!(req.lock_mode, 1);
        assert_eq!(req.amount_to_lock, "2000");
        assert_eq!(req.amount_to_burn, "1000");
        assert_eq!(req.as_of, "77");
        assert!(req.agent.is_some());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["amountToLock"], "2000");
        assert_eq!(json["lockMode"], 1);

        let mut two = aad();
        two.add_asset_amount(Id::zero(), 1, 0);
        assert!(matches!(
            spender.request(&two, 0, 0, LockMode::Unlocked, None),
            Err(CaminoError::FeeAsset(_))
        ));
    }

    #[tokio::test]
    async fn it_decodes_and_cross_wires_responses() {
        let signer = addr(1);
        let rpc = MockRpc {
            response: response(vec![vec![signer.to_cb58()]]),
            seen: Mutex::new(vec![]),
        };
        let spender = Spender::new(rpc, context());
        let result = spender
            .get_minimum_spendable(aad(), 0, 0, LockMode::Bond, None)
            .await
            .unwrap();

        assert_eq!(result.inputs().len(), 1);
        assert_eq!(result.inputs()[0].input.sig_indices()[0].source, signer);
        assert_eq!(result.outputs().len(), 1);
        assert_eq!(result.outputs()[0].output.owners().addresses(), &[addr(2)]);
        assert_eq!(result.change_outputs().len(), 1);
        assert_eq!(result.change_outputs()[0].output.owners().addresses(), &[addr(1)]);
        assert_eq!(result.output_owners().len(), 1);
        assert_eq!(spender.rpc().seen.lock().unwrap()[0].lock_mode, 2);
    }

    #[tokio::test]
    async fn it_rejects_mismatched_signer_tables() {
        for signers in [vec![], vec![vec![]], vec![vec!["not cb58".to_owned()]]].iter() {
            let spender = Spender::new(
                MockRpc {
                    response: response(signers.clone()),
                    seen: Mutex::new(vec![]),
                },
                context(),
            );
            match spender
                .get_minimum_spendable(aad(), 0, 0, LockMode::Unlocked, None)
                .await
            {
                Err(CaminoError::Address(_)) => {}
                other => panic!("expected Address error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn it_routes_remote_change_apart_from_destination_outputs() {
        let signers = vec![vec![addr(1).to_cb58()]];
        let outs = vec![
            transfer(3000, addr(1)),
            transfer(2000, addr(2)),
            transfer(10, addr(9)),
        ];
        let spender = Spender::new(
            MockRpc {
                response: response_with(signers.clone(), outs),
                seen: Mutex::new(vec![]),
            },
            context(),
        );
        let result = spender
            .get_minimum_spendable(aad(), 0, 0, LockMode::Unlocked, None)
            .await
            .unwrap();
        let amounts = |outs: &[TransferableOutput]| -> Vec<Option<u64>> {
            outs.iter().map(|o| o.output.amount()).collect()
        };
        assert_eq!(amounts(result.outputs()), vec![Some(2000), Some(10)]);
        assert_eq!(amounts(result.change_outputs()), vec![Some(3000)]);

        // paying oneself: the exact amount goes out, the remainder is change
        let outs = vec![transfer(3000, addr(1)), transfer(2000, addr(1))];
        let spender = Spender::new(
            MockRpc {
                response: response_with(signers, outs),
                seen: Mutex::new(vec![]),
            },
            context(),
        );
        let mut to_self =
            AssetAmountDestination::new(vec![addr(1)], 1, vec![addr(1)], vec![addr(1)], 1);
        to_self.add_asset_amount(AVAX, 2000, 1000);
        let result = spender
            .get_minimum_spendable(to_self, 0, 0, LockMode::Unlocked, None)
            .await
            .unwrap();
        assert_eq!(amounts(result.outputs()), vec![Some(2000)]);
        assert_eq!(amounts(result.change_outputs()), vec![Some(3000)]);
    }
}
