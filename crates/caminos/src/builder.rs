//! Transaction assembly.
//!
//! `TxBuilder` turns a request into an `UnsignedTx`: it checks the destination threshold,
//! registers the amounts to spend and burn, hands them to its `MinimumSpendable` strategy, and
//! wraps whatever comes back into the right transaction body. The strategy is either a local
//! `UtxoSet` or a `Spender` talking to a node.

use crate::{
    chain::ChainContext,
    errors::{CaminoError, CaminoResult},
    select::{AssetAmountDestination, LockMode, MinimumSpendable},
    types::{
        BaseTx, CashoutChequeTx, Cheque, ExportTx, Id, ImportTx, Input, LockMessengerFundsTx,
        Output, ShortId, Signature, Transaction, TransferableInput, TransferableOutput,
        UnsignedTx, Utxo, SECP_TRANSFER_INPUT_ID, SECP_TRANSFER_OUTPUT_ID,
    },
};

/// A transfer of one asset on this chain.
#[derive(Clone, Debug, Default)]
pub struct BaseTxRequest {
    /// Amount to send
    pub amount: u64,
    /// Asset to send
    pub asset_id: Id,
    /// Recipients
    pub to_addresses: Vec<ShortId>,
    /// Recipients required to spend the sent output
    pub to_threshold: u32,
    /// Addresses funds may be taken from
    pub from_addresses: Vec<ShortId>,
    /// Change recipients. Defaults to `from_addresses`
    pub change_addresses: Vec<ShortId>,
    /// Fee. Defaults to the chain's fee
    pub fee: Option<u64>,
    /// Fee asset. Defaults to the native asset
    pub fee_asset_id: Option<Id>,
    /// Memo, at most 256 bytes
    pub memo: Vec<u8>,
    /// Timestamp spendability is evaluated at
    pub as_of: u64,
    /// Locktime of the sent output
    pub locktime: u64,
}

/// An import of atomic UTXOs from another chain.
#[derive(Clone, Debug, Default)]
pub struct ImportTxRequest {
    /// The atomic UTXOs to import, as returned by the source chain
    pub atomics: Vec<Utxo>,
    /// The chain the atomics live on
    pub source_chain: Id,
    /// Recipients of the imported funds
    pub to_addresses: Vec<ShortId>,
    /// Recipients required to spend the imported outputs
    pub to_threshold: u32,
    /// Owners of the atomics, and of any local UTXOs used to cover the fee
    pub from_addresses: Vec<ShortId>,
    /// Change recipients. Defaults to `from_addresses`
    pub change_addresses: Vec<ShortId>,
    /// Fee. Defaults to the chain's fee
    pub fee: Option<u64>,
    /// Fee asset. Defaults to the native asset
    pub fee_asset_id: Option<Id>,
    /// Memo, at most 256 bytes
    pub memo: Vec<u8>,
    /// Timestamp spendability is evaluated at
    pub as_of: u64,
    /// Locktime of the imported outputs
    pub locktime: u64,
}

/// An export of one asset to another chain.
#[derive(Clone, Debug, Default)]
pub struct ExportTxRequest {
    /// Amount to export
    pub amount: u64,
    /// Asset to export
    pub asset_id: Id,
    /// The receiving chain
    pub destination_chain: Id,
    /// Recipients on the receiving chain
    pub to_addresses: Vec<ShortId>,
    /// Recipients required to spend the exported output
    pub to_threshold: u32,
    /// Addresses funds may be taken from
    pub from_addresses: Vec<ShortId>,
    /// Change recipients. Defaults to `from_addresses`
    pub change_addresses: Vec<ShortId>,
    /// Fee. Defaults to the chain's fee
    pub fee: Option<u64>,
    /// Fee asset. Must be the native asset
    pub fee_asset_id: Option<Id>,
    /// Memo, at most 256 bytes
    pub memo: Vec<u8>,
    /// Timestamp spendability is evaluated at
    pub as_of: u64,
    /// Locktime of the exported output
    pub locktime: u64,
}

/// A touristic messenger-funds lock of the native asset.
#[derive(Clone, Debug, Default)]
pub struct LockMessengerFundsRequest {
    /// Amount to lock
    pub amount: u64,
    /// Owners of the locked funds
    pub to_addresses: Vec<ShortId>,
    /// Owners required to spend the locked funds
    pub to_threshold: u32,
    /// Addresses funds may be taken from
    pub from_addresses: Vec<ShortId>,
    /// Change recipients. Defaults to `from_addresses`
    pub change_addresses: Vec<ShortId>,
    /// Fee. Defaults to the chain's fee
    pub fee: Option<u64>,
    /// Memo, at most 256 bytes
    pub memo: Vec<u8>,
    /// Timestamp spendability is evaluated at
    pub as_of: u64,
}

/// A touristic cheque cashout. Only the fee is selected.
#[derive(Clone, Debug, Default)]
pub struct CashoutChequeRequest {
    /// The cheque being redeemed
    pub cheque: Cheque,
    /// The issuer's signature over the cheque
    pub issuer_sig: Signature,
    /// Addresses the fee may be taken from
    pub from_addresses: Vec<ShortId>,
    /// Change recipients. Defaults to `from_addresses`
    pub change_addresses: Vec<ShortId>,
    /// Fee. Defaults to the chain's fee
    pub fee: Option<u64>,
    /// Memo, at most 256 bytes
    pub memo: Vec<u8>,
    /// Timestamp spendability is evaluated at
    pub as_of: u64,
}

fn check_threshold(threshold: u32, addresses: &[ShortId]) -> CaminoResult<()> {
    if threshold as usize > addresses.len() {
        return Err(CaminoError::Threshold {
            threshold,
            addresses: addresses.len(),
        });
    }
    Ok(())
}

fn or_senders(change: &[ShortId], senders: &[ShortId]) -> Vec<ShortId> {
    if change.is_empty() {
        senders.to_vec()
    } else {
        change.to_vec()
    }
}

/// Builds unsigned transactions for one chain, selecting inputs with `S`.
#[derive(Debug, Clone)]
pub struct TxBuilder<S: MinimumSpendable> {
    context: ChainContext,
    spender: S,
}

impl<S: MinimumSpendable> TxBuilder<S> {
    /// Instantiate a builder for `context`'s chain
    pub fn new(context: ChainContext, spender: S) -> Self {
        Self { context, spender }
    }

    /// The chain this builder targets
    pub fn context(&self) -> &ChainContext {
        &self.context
    }

    /// The selection strategy
    pub fn spender(&self) -> &S {
        &self.spender
    }

    fn base(
        &self,
        outputs: Vec<TransferableOutput>,
        inputs: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> CaminoResult<BaseTx> {
        Ok(BaseTx::new(
            self.context.network_id,
            self.context.blockchain_id,
            outputs,
            inputs,
            memo,
        )?)
    }

    fn finish(&self, transaction: Transaction) -> CaminoResult<UnsignedTx> {
        let unsigned = UnsignedTx::new(transaction);
        unsigned.check_goose_egg(&self.context.avax_asset_id)?;
        tracing::debug!(
            type_id = unsigned.transaction.type_id(),
            inputs = unsigned.transaction.all_inputs().len(),
            outputs = unsigned.transaction.all_outputs().len(),
            "built unsigned transaction"
        );
        Ok(unsigned)
    }

    /// Register `amount` of `asset_id` and `fee` of `fee_asset_id`, merged when they match.
    fn register(
        aad: &mut AssetAmountDestination,
        asset_id: Id,
        amount: u64,
        fee_asset_id: Id,
        fee: u64,
    ) {
        if asset_id == fee_asset_id {
            aad.add_asset_amount(asset_id, amount, fee);
        } else {
            aad.add_asset_amount(asset_id, amount, 0);
            if fee > 0 {
                aad.add_asset_amount(fee_asset_id, 0, fee);
            }
        }
    }

    /// Build a transfer. Returns `None` when `amount` is zero.
    #[tracing::instrument(skip_all, err, fields(amount = request.amount, asset = %request.asset_id))]
    pub async fn build_base_tx(&self, request: BaseTxRequest) -> CaminoResult<Option<UnsignedTx>> {
        check_threshold(request.to_threshold, &request.to_addresses)?;
        if request.amount == 0 {
            return Ok(None);
        }
        let change = or_senders(&request.change_addresses, &request.from_addresses);
        let fee = request.fee.unwrap_or(self.context.tx_fee);
        let fee_asset_id = request.fee_asset_id.unwrap_or(self.context.avax_asset_id);

        let mut aad = AssetAmountDestination::new(
            request.to_addresses,
            request.to_threshold,
            request.from_addresses,
            change,
            1,
        );
        Self::register(&mut aad, request.asset_id, request.amount, fee_asset_id, fee);

        let aad = self
            .spender
            .get_minimum_spendable(aad, request.as_of, request.locktime, LockMode::Unlocked, None)
            .await?;
        let outputs = aad.get_all_outputs();
        let (inputs, _, _, _) = aad.into_parts();

        let base = self.base(outputs, inputs, request.memo)?;
        self.finish(Transaction::Base(base)).map(Some)
    }

    /// Build an import of `request.atomics`.
    ///
    /// Every atomic UTXO carrying an amount becomes an import input, signed by the
    /// `from_addresses` that own it. Native proceeds pay the fee first. What remains is summed per
    /// asset into one output each, paid to the recipients. If the atomics do not cover the
    /// fee, only the shortfall is selected from local UTXOs, and those outputs are appended
    /// after the imported ones.
    #[tracing::instrument(skip_all, err, fields(atomics = request.atomics.len()))]
    pub async fn build_import_tx(&self, request: ImportTxRequest) -> CaminoResult<UnsignedTx> {
        check_threshold(request.to_threshold, &request.to_addresses)?;
        let fee = request.fee.unwrap_or(self.context.tx_fee);
        let fee_asset_id = request.fee_asset_id.unwrap_or(self.context.avax_asset_id);

        let mut fee_paid = 0u64;
        let mut import_inputs = vec![];
        // what each asset leaves after the fee, in first-seen order
        let mut proceeds: Vec<(Id, u64)> = vec![];
        for utxo in request.atomics.iter() {
            let amount = match utxo.output.amount() {
                Some(amount) if !utxo.output.is_locked() => amount,
                _ => continue,
            };
            let owners = utxo.output.owners();
            let mut input = Input::select(SECP_TRANSFER_INPUT_ID, amount)?;
            for spender in owners.get_spenders(&request.from_addresses, request.as_of) {
                let idx = owners.address_idx(&spender).ok_or_else(|| {
                    CaminoError::Address(format!(
                        "{} does not own atomic UTXO {}",
                        spender,
                        utxo.utxo_id()
                    ))
                })?;
                input.add_signature_idx(idx, spender);
            }
            import_inputs.push(TransferableInput::new(
                utxo.tx_id,
                utxo.output_index,
                utxo.asset_id,
                input,
            ));

            let mut remaining = amount;
            if utxo.asset_id == fee_asset_id && fee_paid < fee {
                let applied = remaining.min(fee - fee_paid);
                fee_paid += applied;
                remaining -= applied;
            }
            if remaining > 0 {
                match proceeds.iter_mut().find(|(asset_id, _)| *asset_id == utxo.asset_id) {
                    Some((_, total)) => {
                        *total = total.checked_add(remaining).ok_or_else(|| {
                            CaminoError::Utxo(format!("imported {} overflows", utxo.asset_id))
                        })?
                    }
                    None => proceeds.push((utxo.asset_id, remaining)),
                }
            }
        }
        if import_inputs.is_empty() {
            return Err(CaminoError::Utxo(
                "no importable atomic UTXOs were supplied".to_owned(),
            ));
        }

        let mut outputs = vec![];
        for (asset_id, amount) in proceeds {
            let output = Output::select(
                SECP_TRANSFER_OUTPUT_ID,
                amount,
                request.to_addresses.clone(),
                request.locktime,
                request.to_threshold,
            )?;
            outputs.push(TransferableOutput::new(asset_id, output));
        }

        let mut inputs = vec![];
        if fee_paid < fee {
            let shortfall = fee - fee_paid;
            tracing::debug!(shortfall, "atomics do not cover the fee");
            let change = or_senders(&request.change_addresses, &request.from_addresses);
            let mut aad = AssetAmountDestination::new(
                request.to_addresses.clone(),
                request.to_threshold,
                request.from_addresses.clone(),
                change,
                1,
            );
            aad.add_asset_amount(fee_asset_id, 0, shortfall);
            let aad = self
                .spender
                .get_minimum_spendable(aad, request.as_of, request.locktime, LockMode::Unlocked, None)
                .await?;
            outputs.extend(aad.get_all_outputs());
            inputs = aad.into_parts().0;
        }

        let base = self.base(outputs, inputs, request.memo)?;
        let import = ImportTx::new(base, request.source_chain, import_inputs);
        self.finish(Transaction::Import(import))
    }

    /// Build an export. The requested amount leaves in `exported_outputs`; change stays on
    /// this chain. Returns `None` when `amount` is zero.
    #[tracing::instrument(skip_all, err, fields(amount = request.amount, asset = %request.asset_id))]
    pub async fn build_export_tx(
        &self,
        request: ExportTxRequest,
    ) -> CaminoResult<Option<UnsignedTx>> {
        check_threshold(request.to_threshold, &request.to_addresses)?;
        let fee_asset_id = request.fee_asset_id.unwrap_or(self.context.avax_asset_id);
        if fee_asset_id != self.context.avax_asset_id {
            return Err(CaminoError::FeeAsset(format!(
                "exports pay fees in {}, not {}",
                self.context.avax_asset_id, fee_asset_id
            )));
        }
        if request.amount == 0 {
            return Ok(None);
        }
        let change = or_senders(&request.change_addresses, &request.from_addresses);
        let fee = request.fee.unwrap_or(self.context.tx_fee);

        let mut aad = AssetAmountDestination::new(
            request.to_addresses,
            request.to_threshold,
            request.from_addresses,
            change,
            1,
        );
        Self::register(&mut aad, request.asset_id, request.amount, fee_asset_id, fee);

        let aad = self
            .spender
            .get_minimum_spendable(aad, request.as_of, request.locktime, LockMode::Unlocked, None)
            .await?;
        let (inputs, exported, change_outputs, _) = aad.into_parts();

        let base = self.base(change_outputs, inputs, request.memo)?;
        let export = ExportTx::new(base, request.destination_chain, exported);
        self.finish(Transaction::Export(export)).map(Some)
    }

    /// Build a messenger-funds lock. The funds are deposit-locked, so this needs a strategy
    /// that can evaluate lock modes. Returns `None` when `amount` is zero.
    #[tracing::instrument(skip_all, err, fields(amount = request.amount))]
    pub async fn build_lock_messenger_funds_tx(
        &self,
        request: LockMessengerFundsRequest,
    ) -> CaminoResult<Option<UnsignedTx>> {
        check_threshold(request.to_threshold, &request.to_addresses)?;
        if request.amount == 0 {
            return Ok(None);
        }
        let change = or_senders(&request.change_addresses, &request.from_addresses);
        let fee = request.fee.unwrap_or(self.context.tx_fee);

        let mut aad = AssetAmountDestination::new(
            request.to_addresses,
            request.to_threshold,
            request.from_addresses,
            change,
            1,
        );
        aad.add_asset_amount(self.context.avax_asset_id, request.amount, fee);

        let aad = self
            .spender
            .get_minimum_spendable(aad, request.as_of, 0, LockMode::Deposit, None)
            .await?;
        let outputs = aad.get_all_outputs();
        let (inputs, _, _, _) = aad.into_parts();

        let base = self.base(outputs, inputs, request.memo)?;
        self.finish(Transaction::LockMessengerFunds(LockMessengerFundsTx { base }))
            .map(Some)
    }

    /// Build a cheque cashout. Only the fee is selected; the cheque's agent is passed to the
    /// strategy.
    #[tracing::instrument(skip_all, err, fields(serial = request.cheque.serial_id))]
    pub async fn build_cashout_cheque_tx(
        &self,
        request: CashoutChequeRequest,
    ) -> CaminoResult<UnsignedTx> {
        let destinations = vec![request.cheque.beneficiary];
        check_threshold(1, &destinations)?;
        let change = or_senders(&request.change_addresses, &request.from_addresses);
        let fee = request.fee.unwrap_or(self.context.tx_fee);

        let mut aad =
            AssetAmountDestination::new(destinations, 1, request.from_addresses, change, 1);
        aad.add_asset_amount(self.context.avax_asset_id, 0, fee);

        let agent = Some(request.cheque.agent).filter(|a| !a.is_zero());
        let aad = self
            .spender
            .get_minimum_spendable(aad, request.as_of, 0, LockMode::Unlocked, agent)
            .await?;
        let outputs = aad.get_all_outputs();
        let (inputs, _, _, _) = aad.into_parts();

        let base = self.base(outputs, inputs, request.memo)?;
        self.finish(Transaction::CashoutCheque(CashoutChequeTx {
            base,
            cheque: request.cheque,
            issuer_sig: request.issuer_sig,
        }))
    }
}
