// 5.0 tx.rs: the transaction candidate under construction, its net asset
// accounting, and the TxInfo value threaded through every build step.
//
// balances are never computed by summing raw capacities: consuming a receipt,
// order, or withdrawal group also emits or removes other values, so the only
// trustworthy figure is the net delta of a whole candidate.

use crate::cell::{Cell, CellContent, CellData};
use crate::types::Epoch;
use serde::{Deserialize, Serialize};

// structural limit on candidate outputs.
pub const MAX_TX_OUTPUTS: usize = 64;

// serialized envelope: version, input/output counts, witnesses offsets.
const TX_ENVELOPE_SIZE: usize = 72;
// per input: origin reference plus since field.
const TX_INPUT_SIZE: usize = 44;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxDraft {
    pub inputs: Vec<Cell>,
    pub outputs: Vec<CellContent>,
}

impl TxDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    pub fn push_input(&mut self, cell: Cell) {
        self.inputs.push(cell);
    }

    pub fn push_output(&mut self, content: CellContent) {
        self.outputs.push(content);
    }

    pub fn extend_inputs<I: IntoIterator<Item = Cell>>(&mut self, cells: I) {
        self.inputs.extend(cells);
    }

    // size of the candidate as serialized for fee purposes, before witness
    // placeholders (the signer's probed overhead covers those).
    pub fn serialized_size(&self) -> usize {
        TX_ENVELOPE_SIZE
            + self.inputs.len() * TX_INPUT_SIZE
            + self
                .outputs
                .iter()
                .map(CellContent::serialized_size)
                .sum::<usize>()
    }

    // 5.1: net native movement toward the account. inputs contribute their
    // capacity, except withdrawals which pay out their settled value
    // (capacity plus accrued interest); outputs consume their capacity.
    pub fn native_delta(&self) -> i128 {
        let inflow: i128 = self
            .inputs
            .iter()
            .map(|cell| match cell.content.data {
                CellData::Withdrawal { settled } => settled as i128,
                _ => cell.content.capacity as i128,
            })
            .sum();
        let outflow: i128 = self
            .outputs
            .iter()
            .map(|out| out.capacity as i128)
            .sum();
        inflow - outflow
    }

    // 5.2: net pegged movement. tokens and order holdings move face value,
    // consuming a receipt redeems its claim, consuming a deposit burns its
    // pegged value. cells *created* here contribute nothing until a later
    // transaction consumes them.
    pub fn pegged_delta(&self) -> i128 {
        let inflow: i128 = self
            .inputs
            .iter()
            .map(|cell| match &cell.content.data {
                CellData::Token { amount } => *amount as i128,
                CellData::Receipt { pegged } => *pegged as i128,
                CellData::StakeDeposit { pegged } => -(*pegged as i128),
                CellData::Order(data) => data.pegged as i128,
                _ => 0,
            })
            .sum();
        let outflow: i128 = self
            .outputs
            .iter()
            .map(|out| match &out.data {
                CellData::Token { amount } => *amount as i128,
                CellData::Order(data) => data.pegged as i128,
                _ => 0,
            })
            .sum();
        inflow - outflow
    }
}

// 5.3: why a candidate cannot be built. all non-fatal: the caller discards
// the TxInfo and may try again with different inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BuildError {
    #[error("too many deposits for the requested amount")]
    TooManyDeposits,

    #[error("too many withdrawal requests for the requested amount")]
    TooManyWithdrawals,

    #[error("not enough deposits to withdraw from")]
    PoolExhausted,

    #[error("not enough native funds")]
    InsufficientNative,

    #[error("not enough pegged funds")]
    InsufficientPegged,

    #[error("more than {MAX_TX_OUTPUTS} output cells")]
    TooManyOutputs,

    #[error("nothing to convert")]
    NothingToDo,
}

// 5.4: immutable candidate snapshot. an error means the transaction is
// unusable and must be discarded; fee and estimated maturity only ever grow
// as categories are folded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    pub tx: TxDraft,
    pub error: Option<BuildError>,
    pub fee: u64,
    pub estimated_maturity: Epoch,
}

impl TxInfo {
    pub fn from_tx(tx: TxDraft) -> Self {
        Self {
            tx,
            ..Self::default()
        }
    }

    // infeasibility discards the partial transaction, keeping only the reason.
    pub fn failed(error: BuildError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_viable(&self) -> bool {
        self.error.is_none()
    }
}

impl Default for TxInfo {
    fn default() -> Self {
        Self {
            tx: TxDraft::new(),
            error: None,
            fee: 0,
            estimated_maturity: Epoch::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{OutPoint, Script};
    use crate::types::UNIT;

    fn cell(content: CellContent) -> Cell {
        Cell::new(OutPoint::new([0; 32], 0), content)
    }

    fn plain(capacity: u64) -> Cell {
        cell(CellContent::new(Script::tagged(1), None, capacity, CellData::None))
    }

    #[test]
    fn native_delta_uses_settled_withdrawal_value() {
        let mut tx = TxDraft::new();
        tx.push_input(cell(CellContent::new(
            Script::tagged(2),
            None,
            100 * UNIT,
            CellData::Withdrawal { settled: 105 * UNIT },
        )));
        tx.push_output(CellContent::new(Script::tagged(1), None, 60 * UNIT, CellData::None));
        assert_eq!(tx.native_delta(), 45 * UNIT as i128);
    }

    #[test]
    fn pegged_delta_nets_burns_and_claims() {
        let mut tx = TxDraft::new();
        tx.push_input(cell(CellContent::new(
            Script::tagged(1),
            None,
            10 * UNIT,
            CellData::Token { amount: 500 },
        )));
        tx.push_input(cell(CellContent::new(
            Script::tagged(1),
            None,
            10 * UNIT,
            CellData::Receipt { pegged: 300 },
        )));
        tx.push_input(cell(CellContent::new(
            Script::tagged(2),
            None,
            10 * UNIT,
            CellData::StakeDeposit { pegged: 200 },
        )));
        tx.push_output(CellContent::new(
            Script::tagged(1),
            None,
            10 * UNIT,
            CellData::Token { amount: 450 },
        ));
        // 500 + 300 - 200 - 450
        assert_eq!(tx.pegged_delta(), 150);
    }

    #[test]
    fn freshly_minted_claims_do_not_count() {
        let mut tx = TxDraft::new();
        tx.push_input(plain(200 * UNIT));
        tx.push_output(CellContent::new(
            Script::tagged(1),
            None,
            100 * UNIT,
            CellData::Receipt { pegged: 999 },
        ));
        tx.push_output(CellContent::new(
            Script::tagged(2),
            None,
            100 * UNIT,
            CellData::StakeDeposit { pegged: 999 },
        ));
        assert_eq!(tx.pegged_delta(), 0);
        assert_eq!(tx.native_delta(), 0);
    }

    #[test]
    fn size_grows_with_cells() {
        let mut tx = TxDraft::new();
        let empty = tx.serialized_size();
        tx.push_input(plain(100 * UNIT));
        let one_in = tx.serialized_size();
        tx.push_output(CellContent::new(Script::tagged(1), None, 50 * UNIT, CellData::None));
        assert!(empty < one_in && one_in < tx.serialized_size());
    }
}
