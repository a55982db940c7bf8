// 9.0 settle.rs: finalizes a candidate by returning the unconsumed remainder
// to the account lock as exact change, paying a quantized network fee.
//
// the fee depends on the size, the size depends on the change outputs, and
// the change depends on the fee. the knot is cut with one placeholder pass:
// append the change cells, measure once, compute the fee, then set the final
// change amount without re-measuring (the output count does not change
// between the placeholder and final pass, so neither does the size).

use crate::cell::{CellContent, CellData};
use crate::config::AccountConfig;
use crate::fee::estimate_fee;
use crate::tx::{BuildError, TxDraft, TxInfo, MAX_TX_OUTPUTS};
use crate::types::FeeRate;

// change outputs are the only account-locked plain or bare-token outputs a
// candidate ever carries, which makes them recognizable on re-entry.
fn is_change(out: &CellContent, config: &AccountConfig) -> bool {
    if out.lock != config.account_lock {
        return false;
    }
    match (&out.kind, &out.data) {
        (None, CellData::None) => true,
        (Some(kind), CellData::Token { .. }) => *kind == config.scripts.token,
        _ => false,
    }
}

// reabsorb a previous settlement so applying this twice is a no-op.
fn reclaim_change(tx: &mut TxDraft, config: &AccountConfig) {
    tx.outputs.retain(|out| !is_change(out, config));
}

// 9.1: the settler. failures discard the partial transaction and surface
// only the reason; an incoming error passes through untouched.
pub fn add_change(info: TxInfo, fee_rate: FeeRate, config: &AccountConfig) -> TxInfo {
    if info.error.is_some() {
        return info;
    }
    let TxInfo {
        mut tx,
        estimated_maturity,
        ..
    } = info;
    reclaim_change(&mut tx, config);

    let pegged_free = tx.pegged_delta();
    if pegged_free < 0 {
        return TxInfo::failed(BuildError::InsufficientPegged);
    }
    if pegged_free > 0 {
        tx.push_output(CellContent::with_occupied_capacity(
            config.account_lock.clone(),
            Some(config.scripts.token.clone()),
            CellData::Token {
                amount: pegged_free as u128,
            },
        ));
    }

    // placeholder change cell: occupied capacity only, final amount below.
    let change = CellContent::with_occupied_capacity(config.account_lock.clone(), None, CellData::None);
    let occupied = change.capacity;
    tx.push_output(change);

    let fee = estimate_fee(&tx, fee_rate, config);
    let headroom = tx.native_delta() - fee as i128;
    if headroom < 0 {
        return TxInfo::failed(BuildError::InsufficientNative);
    }
    if tx.outputs.len() > MAX_TX_OUTPUTS {
        return TxInfo::failed(BuildError::TooManyOutputs);
    }
    if let Some(change) = tx.outputs.last_mut() {
        change.capacity = occupied + headroom as u64;
    }

    TxInfo {
        tx,
        error: None,
        fee,
        estimated_maturity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, OutPoint, Script};
    use crate::fee::FEE_GRANULARITY;
    use crate::types::UNIT;

    fn config() -> AccountConfig {
        AccountConfig::testnet(Script::tagged(0x01))
    }

    fn input(capacity: u64, data: CellData) -> Cell {
        Cell::new(
            OutPoint::new([9; 32], 0),
            CellContent::new(Script::tagged(0x01), None, capacity, data),
        )
    }

    fn funded(native_units: u64, pegged: u128) -> TxInfo {
        let mut tx = TxDraft::new();
        tx.push_input(input(native_units * UNIT, CellData::None));
        if pegged > 0 {
            tx.push_input(input(60 * UNIT, CellData::Token { amount: pegged }));
        }
        TxInfo::from_tx(tx)
    }

    #[test]
    fn settles_to_an_exact_fee() {
        let settled = add_change(funded(500, 0), FeeRate::new(1200), &config());
        assert!(settled.is_viable());
        assert_eq!(settled.tx.native_delta(), settled.fee as i128);
        assert_eq!(settled.fee % FEE_GRANULARITY, 0);
        assert_eq!(settled.tx.outputs.len(), 1);
    }

    #[test]
    fn returns_pegged_change_separately() {
        let settled = add_change(funded(500, 4_321), FeeRate::new(1200), &config());
        assert!(settled.is_viable());
        assert_eq!(settled.tx.pegged_delta(), 0);
        assert_eq!(settled.tx.outputs.len(), 2);
        assert!(matches!(
            settled.tx.outputs[0].data,
            CellData::Token { amount: 4_321 }
        ));
    }

    #[test]
    fn settling_twice_changes_nothing() {
        let config = config();
        let once = add_change(funded(500, 4_321), FeeRate::new(1200), &config);
        let twice = add_change(once.clone(), FeeRate::new(1200), &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn fails_when_native_cannot_cover_fee_and_rent() {
        // 41 native units covers the change cell rent but not the fee
        let starved = add_change(funded(41, 0), FeeRate::new(1200), &config());
        assert_eq!(starved.error, Some(BuildError::InsufficientNative));
        assert!(starved.tx.is_empty());
    }

    #[test]
    fn fails_when_pegged_is_overspent() {
        let mut tx = TxDraft::new();
        tx.push_input(input(500 * UNIT, CellData::None));
        tx.push_output(CellContent::with_occupied_capacity(
            Script::tagged(0x07),
            None,
            CellData::Token { amount: 10 },
        ));
        let starved = add_change(TxInfo::from_tx(tx), FeeRate::new(1200), &config());
        assert_eq!(starved.error, Some(BuildError::InsufficientPegged));
    }

    #[test]
    fn incoming_errors_pass_through() {
        let failed = TxInfo::failed(BuildError::PoolExhausted);
        let out = add_change(failed.clone(), FeeRate::new(1200), &config());
        assert_eq!(out, failed);
    }
}
