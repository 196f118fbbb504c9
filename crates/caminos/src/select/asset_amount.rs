//! Per-asset spend accounting.

use crate::types::{Id, OutputOwners, ShortId, TransferableInput, TransferableOutput};

/// How much of one asset to spend and burn, and how much has been gathered so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetAmount {
    asset_id: Id,
    amount: u64,
    burn: u64,
    spent: u64,
    change: u64,
    finished: bool,
}

impl AssetAmount {
    /// Instantiate a target. A target of zero is finished from the start.
    pub fn new(asset_id: Id, amount: u64, burn: u64) -> Self {
        Self {
            asset_id,
            amount,
            burn,
            spent: 0,
            change: 0,
            finished: amount == 0 && burn == 0,
        }
    }

    /// The asset
    pub fn asset_id(&self) -> Id {
        self.asset_id
    }

    /// The amount to send to the destinations
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// The amount to burn as fee
    pub fn burn(&self) -> u64 {
        self.burn
    }

    /// `amount + burn`
    pub fn total(&self) -> u64 {
        self.amount.saturating_add(self.burn)
    }

    /// The amount gathered so far
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// What is left over once finished
    pub fn change(&self) -> u64 {
        self.change
    }

    /// True once `spent >= amount + burn`
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Record `value` gathered. Returns whether the target is now met.
    pub fn spend_amount(&mut self, value: u64) -> bool {
        if !self.finished {
            self.spent = self.spent.saturating_add(value);
            if self.spent >= self.total() {
                self.change = self.spent - self.total();
                self.finished = true;
            }
        }
        self.finished
    }

    fn merge(&mut self, amount: u64, burn: u64) {
        self.amount = self.amount.saturating_add(amount);
        self.burn = self.burn.saturating_add(burn);
        self.finished = self.spent >= self.total();
        self.change = if self.finished {
            self.spent - self.total()
        } else {
            0
        };
    }
}

/// Everything a selection needs to know, and everything it produces.
///
/// The caller registers asset amounts and addresses; a `MinimumSpendable` strategy then
/// appends inputs, outputs, change outputs and output owners.
#[derive(Clone, Debug, Default)]
pub struct AssetAmountDestination {
    amounts: Vec<AssetAmount>,
    destinations: Vec<ShortId>,
    destinations_threshold: u32,
    senders: Vec<ShortId>,
    signers: Vec<ShortId>,
    change_addresses: Vec<ShortId>,
    change_threshold: u32,
    inputs: Vec<TransferableInput>,
    outputs: Vec<TransferableOutput>,
    change_outputs: Vec<TransferableOutput>,
    output_owners: Vec<OutputOwners>,
}

impl AssetAmountDestination {
    /// Instantiate a destination. Signers default to the senders.
    pub fn new(
        destinations: Vec<ShortId>,
        destinations_threshold: u32,
        senders: Vec<ShortId>,
        change_addresses: Vec<ShortId>,
        change_threshold: u32,
    ) -> Self {
        Self {
            destinations,
            destinations_threshold,
            signers: senders.clone(),
            senders,
            change_addresses,
            change_threshold,
            ..Default::default()
        }
    }

    /// Set the addresses expected to sign, when they differ from the senders
    pub fn with_signers(mut self, signers: Vec<ShortId>) -> Self {
        self.signers = signers;
        self
    }

    /// Register a target for `asset_id`, merging into an existing one for the same asset.
    pub fn add_asset_amount(&mut self, asset_id: Id, amount: u64, burn: u64) {
        match self.amounts.iter_mut().find(|a| a.asset_id == asset_id) {
            Some(existing) => existing.merge(amount, burn),
            None => self.amounts.push(AssetAmount::new(asset_id, amount, burn)),
        }
    }

    /// True if a target exists for `asset_id`
    pub fn asset_exists(&self, asset_id: &Id) -> bool {
        self.amounts.iter().any(|a| &a.asset_id == asset_id)
    }

    /// The target for `asset_id`
    pub fn get_asset_amount(&self, asset_id: &Id) -> Option<&AssetAmount> {
        self.amounts.iter().find(|a| &a.asset_id == asset_id)
    }

    /// Record `value` of `asset_id` gathered. Returns whether that asset is now finished.
    pub fn spend_amount(&mut self, asset_id: &Id, value: u64) -> bool {
        self.amounts
            .iter_mut()
            .find(|a| &a.asset_id == asset_id)
            .map(|a| a.spend_amount(value))
            .unwrap_or(false)
    }

    /// All targets, in registration order
    pub fn get_amounts(&self) -> &[AssetAmount] {
        &self.amounts
    }

    /// True once every target is finished
    pub fn can_complete(&self) -> bool {
        self.amounts.iter().all(AssetAmount::is_finished)
    }

    /// The recipients
    pub fn destinations(&self) -> &[ShortId] {
        &self.destinations
    }

    /// How many recipients must sign to spend the sent outputs
    pub fn destinations_threshold(&self) -> u32 {
        self.destinations_threshold
    }

    /// The addresses funds may be taken from
    pub fn senders(&self) -> &[ShortId] {
        &self.senders
    }

    /// The addresses expected to sign
    pub fn signers(&self) -> &[ShortId] {
        &self.signers
    }

    /// The change recipients
    pub fn change_addresses(&self) -> &[ShortId] {
        &self.change_addresses
    }

    /// How many change recipients must sign to spend change
    pub fn change_threshold(&self) -> u32 {
        self.change_threshold
    }

    /// Append a selected input
    pub fn add_input(&mut self, input: TransferableInput) {
        self.inputs.push(input);
    }

    /// Append an output to the destinations
    pub fn add_output(&mut self, output: TransferableOutput) {
        self.outputs.push(output);
    }

    /// Append a change output
    pub fn add_change(&mut self, output: TransferableOutput) {
        self.change_outputs.push(output);
    }

    /// Append the owner sets returned alongside the selection
    pub fn add_output_owners<I>(&mut self, owners: I)
    where
        I: IntoIterator<Item = OutputOwners>,
    {
        self.output_owners.extend(owners);
    }

    /// The selected inputs
    pub fn inputs(&self) -> &[TransferableInput] {
        &self.inputs
    }

    /// The outputs to the destinations
    pub fn outputs(&self) -> &[TransferableOutput] {
        &self.outputs
    }

    /// The change outputs
    pub fn change_outputs(&self) -> &[TransferableOutput] {
        &self.change_outputs
    }

    /// The owner sets returned alongside the selection
    pub fn output_owners(&self) -> &[OutputOwners] {
        &self.output_owners
    }

    /// Outputs followed by change outputs
    pub fn get_all_outputs(&self) -> Vec<TransferableOutput> {
        self.outputs
            .iter()
            .chain(self.change_outputs.iter())
            .cloned()
            .collect()
    }

    /// Drop everything a selection produced, keeping the request.
    pub fn clear_selection(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
        self.change_outputs.clear();
        self.output_owners.clear();
    }

    /// Consume the destination, returning `(inputs, outputs, change_outputs, output_owners)`.
    pub fn into_parts(
        self,
    ) -> (
        Vec<TransferableInput>,
        Vec<TransferableOutput>,
        Vec<TransferableOutput>,
        Vec<OutputOwners>,
    ) {
        (
            self.inputs,
            self.outputs,
            self.change_outputs,
            self.output_owners,
        )
    }
}
