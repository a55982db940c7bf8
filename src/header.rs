// 4.0 header.rs: chain tip metadata and the two per-epoch parameters derived
// from it: the exchange ratio and the standard deposit size. both track the
// protocol accumulator, which starts at RATE_BASE and grows as the staking
// reserve accrues interest.

use crate::cell::{CellContent, CellData};
use crate::config::SystemScripts;
use crate::types::{Epoch, ExchangeRatio, UNIT};
use serde::{Deserialize, Serialize};

// accumulator value at genesis: 10^16.
pub const RATE_BASE: u64 = 10_000_000_000_000_000;

// soft cap on the pegged value of one standard deposit.
pub const PEGGED_SOFT_CAP: u128 = 100_000 * UNIT as u128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub number: u64,
    pub epoch: Epoch,
    pub accumulated_rate: u64,
}

impl Header {
    pub fn new(number: u64, epoch: Epoch, accumulated_rate: u64) -> Self {
        Self {
            number,
            epoch,
            accumulated_rate,
        }
    }

    // one pegged unit is worth accumulated_rate / RATE_BASE native units,
    // so the pegged side appreciates monotonically.
    pub fn exchange_ratio(&self) -> ExchangeRatio {
        ExchangeRatio {
            native_mul: RATE_BASE,
            pegged_mul: self.accumulated_rate.max(RATE_BASE),
        }
    }
}

// 4.1: template for a freshly minted standard deposit. capacity is the
// native value of the soft cap plus the cell's own state rent; the burn
// value is recomputed from the final capacity so truncation stays exact.
pub fn deposit_cell(header: &Header, scripts: &SystemScripts) -> CellContent {
    let ratio = header.exchange_ratio();
    let mut cell = CellContent::with_occupied_capacity(
        scripts.logic.clone(),
        Some(scripts.stake.clone()),
        CellData::StakeDeposit { pegged: 0 },
    );
    let occupied = cell.capacity;
    cell.capacity = occupied + ratio.native_value(PEGGED_SOFT_CAP) as u64;
    cell.data = CellData::StakeDeposit {
        pegged: ratio.pegged_value((cell.capacity - occupied) as u128),
    };
    cell
}

// native capacity consumed by one standard deposit at this tip.
pub fn deposit_size(header: &Header, scripts: &SystemScripts) -> u64 {
    deposit_cell(header, scripts).capacity
}
