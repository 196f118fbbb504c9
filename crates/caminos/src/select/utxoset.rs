//! Local selection over a `UtxoSet`.

use async_trait::async_trait;

use crate::{
    errors::{CaminoError, CaminoResult},
    select::{AssetAmountDestination, LockMode, MinimumSpendable},
    types::{
        Input, Output, ShortId, TransferableInput, TransferableOutput, UtxoSet,
        SECP_TRANSFER_INPUT_ID, SECP_TRANSFER_OUTPUT_ID,
    },
};

impl UtxoSet {
    /// First-fit selection in insertion order.
    ///
    /// Each UTXO that carries an amount of an unfinished registered asset, is not locked, and
    /// can be spent by the senders at `as_of` is consumed in full. The scan stops as soon as
    /// every asset is finished. Then each asset gets an output of its amount to the
    /// destinations (with `locktime`), and an output of its change to the change addresses.
    ///
    /// If the scan ends with an unfinished asset, fails with `InsufficientFunds` and leaves
    /// `aad` with no inputs or outputs.
    pub fn select_spendable(
        &self,
        aad: &mut AssetAmountDestination,
        as_of: u64,
        locktime: u64,
    ) -> CaminoResult<()> {
        for utxo in self.iter() {
            if aad.can_complete() {
                break;
            }
            let amount = match utxo.output.amount() {
                Some(amount) => amount,
                None => continue,
            };
            if utxo.output.is_locked() {
                continue;
            }
            match aad.get_asset_amount(&utxo.asset_id) {
                Some(target) if !target.is_finished() => {}
                _ => continue,
            }
            let owners = utxo.output.owners();
            if !owners.meets_threshold(aad.senders(), as_of) {
                continue;
            }

            let mut input = Input::select(SECP_TRANSFER_INPUT_ID, amount)?;
            for spender in owners.get_spenders(aad.senders(), as_of) {
                let idx = owners.address_idx(&spender).ok_or_else(|| {
                    CaminoError::Address(format!(
                        "{} does not own UTXO {}",
                        spender,
                        utxo.utxo_id()
                    ))
                })?;
                input.add_signature_idx(idx, spender);
            }

            tracing::trace!(
                utxo = %utxo.utxo_id(),
                asset = %utxo.asset_id,
                amount,
                "selected utxo"
            );
            aad.spend_amount(&utxo.asset_id, amount);
            aad.add_input(TransferableInput::new(
                utxo.tx_id,
                utxo.output_index,
                utxo.asset_id,
                input,
            ));
        }

        if !aad.can_complete() {
            let (asset_id, needed, available) = aad
                .get_amounts()
                .iter()
                .find(|a| !a.is_finished())
                .map(|a| (a.asset_id(), a.total(), a.spent()))
                .unwrap_or_default();
            aad.clear_selection();
            tracing::debug!(asset = %asset_id, needed, available, "insufficient funds");
            return Err(CaminoError::InsufficientFunds {
                asset_id,
                needed,
                available,
            });
        }

        let destinations: Vec<ShortId> = aad.destinations().to_vec();
        let change_addresses: Vec<ShortId> = aad.change_addresses().to_vec();
        let targets = aad.get_amounts().to_vec();
        for target in targets.iter() {
            if target.amount() > 0 {
                let output = Output::select(
                    SECP_TRANSFER_OUTPUT_ID,
                    target.amount(),
                    destinations.clone(),
                    locktime,
                    aad.destinations_threshold(),
                )?;
                aad.add_output(TransferableOutput::new(target.asset_id(), output));
            }
            if target.change() > 0 {
                let output = Output::select(
                    SECP_TRANSFER_OUTPUT_ID,
                    target.change(),
                    change_addresses.clone(),
                    0,
                    aad.change_threshold(),
                )?;
                aad.add_change(TransferableOutput::new(target.asset_id(), output));
            }
        }
        tracing::debug!(
            inputs = aad.inputs().len(),
            outputs = aad.outputs().len(),
            change = aad.change_outputs().len(),
            "selection complete"
        );
        Ok(())
    }
}

#[async_trait]
impl MinimumSpendable for UtxoSet {
    async fn get_minimum_spendable(
        &self,
        mut aad: AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
        _agent: Option<ShortId>,
    ) -> CaminoResult<AssetAmountDestination> {
        if lock_mode != LockMode::Unlocked {
            return Err(CaminoError::UnsupportedLockMode(lock_mode));
        }
        self.select_spendable(&mut aad, as_of, locktime)?;
        Ok(aad)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Id, LockedIds, Utxo};

    const X: Id = Id::new([1; 32]);
    const Y: Id = Id::new([2; 32]);

    fn addr(b: u8) -> ShortId {
        ShortId::new([b; 20])
    }

    fn utxo(tx: u8, asset: Id, amount: u64, owners: Vec<ShortId>, threshold: u32) -> Utxo {
        Utxo::new(
            Id::new([tx; 32]),
            0,
            asset,
            Output::select(SECP_TRANSFER_OUTPUT_ID, amount, owners, 0, threshold).unwrap(),
        )
    }

    fn aad(amount: u64, fee: u64) -> AssetAmountDestination {
        let mut aad =
            AssetAmountDestination::new(vec![addr(0xa)], 1, vec![addr(0xa)], vec![addr(0xa)], 1);
        aad.add_asset_amount(X, amount, fee);
        aad
    }

    #[test]
    fn it_selects_first_fit_with_change() {
        let set: UtxoSet = vec![utxo(1, X, 1000, vec![addr(0xa)], 1)].into_iter().collect();
        let mut a = aad(600, 100);
        set.select_spendable(&mut a, 0, 0).unwrap();

        assert_eq!(a.inputs().len(), 1);
        assert_eq!(a.inputs()[0].tx_id, Id::new([1; 32]));
        assert_eq!(a.inputs()[0].input.amount(), 1000);
        assert_eq!(a.outputs().len(), 1);
        assert_eq!(a.outputs()[0].output.amount(), Some(600));
        assert_eq!(a.change_outputs().len(), 1);
        assert_eq!(a.change_outputs()[0].output.amount(), Some(300));
        assert_eq!(a.change_outputs()[0].output.owners().addresses(), &[addr(0xa)]);
    }

    #[test]
    fn it_fails_without_partial_results() {
        let set: UtxoSet = vec![utxo(1, X, 1000, vec![addr(0xa)], 1)].into_iter().collect();
        let mut a = aad(950, 100);
        match set.select_spendable(&mut a, 0, 0) {
            Err(CaminoError::InsufficientFunds {
                asset_id,
                needed: 1050,
                available: 1000,
            }) => assert_eq!(asset_id, X),
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        assert!(a.inputs().is_empty());
        assert!(a.get_all_outputs().is_empty());
    }

    #[test]
    fn it_stops_once_complete_and_preserves_order() {
        let set: UtxoSet = vec![
            utxo(3, X, 200, vec![addr(0xa)], 1),
            utxo(1, X, 900, vec![addr(0xa)], 1),
            utxo(2, X, 5000, vec![addr(0xa)], 1),
        ]
        .into_iter()
        .collect();
        let mut a = aad(1000, 0);
        set.select_spendable(&mut a, 0, 0).unwrap();
        assert_eq!(
            a.inputs().iter().map(|i| i.tx_id).collect::<Vec<_>>(),
            vec![Id::new([3; 32]), Id::new([1; 32])]
        );
        assert_eq!(a.change_outputs()[0].output.amount(), Some(100));
    }

    #[test]
    fn it_skips_unusable_utxos() {
        let locked = Utxo::new(
            Id::new([4; 32]),
            0,
            X,
            Output::Locked {
                ids: LockedIds::new(Id::new([9; 32]), Id::zero()),
                inner: Box::new(
                    Output::select(SECP_TRANSFER_OUTPUT_ID, 5000, vec![addr(0xa)], 0, 1).unwrap(),
                ),
            },
        );
        let timelocked = Utxo::new(
            Id::new([5; 32]),
            0,
            X,
            Output::select(SECP_TRANSFER_OUTPUT_ID, 5000, vec![addr(0xa)], 100, 1).unwrap(),
        );
        let owner_only = Utxo::new(
            Id::new([6; 32]),
            0,
            X,
            Output::select(crate::types::SECP_OWNER_OUTPUT_ID, 0, vec![addr(0xa)], 0, 1).unwrap(),
        );
        let set: UtxoSet = vec![
            locked,
            timelocked,
            owner_only,
            utxo(7, Y, 5000, vec![addr(0xa)], 1),
            utxo(8, X, 5000, vec![addr(0xb)], 1),
            utxo(9, X, 5000, vec![addr(0xa), addr(0xb)], 2),
            utxo(10, X, 700, vec![addr(0xa)], 1),
        ]
        .into_iter()
        .collect();
        let mut a = aad(600, 100);
        set.select_spendable(&mut a, 50, 0).unwrap();
        assert_eq!(a.inputs().len(), 1);
        assert_eq!(a.inputs()[0].tx_id, Id::new([10; 32]));
        assert!(a.change_outputs().is_empty());
    }

    #[test]
    fn it_records_signature_slots_against_output_addresses() {
        let owners = vec![addr(3), addr(1), addr(2)];
        let set: UtxoSet = vec![utxo(1, X, 100, owners, 2)].into_iter().collect();
        let mut a = AssetAmountDestination::new(
            vec![addr(9)],
            1,
            vec![addr(2), addr(3)],
            vec![addr(9)],
            1,
        );
        a.add_asset_amount(X, 100, 0);
        set.select_spendable(&mut a, 0, 0).unwrap();

        // owners sort to [1, 2, 3]; the senders own positions 1 and 2
        let slots = a.inputs()[0].input.sig_indices();
        assert_eq!(slots.len(), 2);
        assert_eq!((slots[0].address_index, slots[0].source), (1, addr(2)));
        assert_eq!((slots[1].address_index, slots[1].source), (2, addr(3)));
        assert!(a.change_outputs().is_empty());
    }

    #[tokio::test]
    async fn it_only_evaluates_unlocked_spends() {
        let set: UtxoSet = vec![utxo(1, X, 1000, vec![addr(0xa)], 1)].into_iter().collect();
        let a = set
            .get_minimum_spendable(aad(600, 100), 0, 0, LockMode::Unlocked, None)
            .await
            .unwrap();
        assert_eq!(a.inputs().len(), 1);

        match set
            .get_minimum_spendable(aad(600, 100), 0, 0, LockMode::Bond, None)
            .await
        {
            Err(CaminoError::UnsupportedLockMode(LockMode::Bond)) => {}
            other => panic!("expected UnsupportedLockMode, got {:?}", other),
        }
    }
}
