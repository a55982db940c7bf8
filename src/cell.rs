// 2.0 cell.rs: the on-chain value model. cells arrive pre-classified from the
// query layer with payloads already decoded, so CellData is an enum of resolved
// values rather than raw bytes.
//
// ownership is by lock: a cell belongs to whichever lock controls it and
// transfers only by being consumed as a transaction input.

use crate::types::{Epoch, ExchangeRatio, UNIT};
use serde::{Deserialize, Serialize};

// 2.1: a lock or kind script. identity is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    pub code_hash: [u8; 32],
    pub args: Vec<u8>,
}

impl Script {
    pub fn new(code_hash: [u8; 32], args: Vec<u8>) -> Self {
        Self { code_hash, args }
    }

    // convenience for fixtures: a script whose hash is a repeated tag byte.
    pub fn tagged(tag: u8) -> Self {
        Self {
            code_hash: [tag; 32],
            args: Vec::new(),
        }
    }

    // hash + kind byte + args, as the chain meters it.
    pub fn occupied_size(&self) -> usize {
        33 + self.args.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: [u8; 32], index: u32) -> Self {
        Self { tx_hash, index }
    }
}

// 2.2: decoded cell payload. the variants carry exactly what balance
// accounting needs:
//   Token        - pegged tokens held outright
//   Receipt      - a resolved claim on pegged tokens, redeemed when consumed
//   StakeDeposit - pegged value that must be burned to unlock the deposit
//   Withdrawal   - capacity plus accrued interest payable at maturity
//   Order        - a limit order's held amount and embedded ratio(s)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellData {
    None,
    Token { amount: u128 },
    Receipt { pegged: u128 },
    StakeDeposit { pegged: u128 },
    Withdrawal { settled: u64 },
    Order(OrderData),
}

impl CellData {
    pub fn size(&self) -> usize {
        match self {
            CellData::None => 0,
            CellData::Token { .. } => 16,
            CellData::Receipt { .. } => 16,
            CellData::StakeDeposit { .. } => 8,
            CellData::Withdrawal { .. } => 8,
            CellData::Order(data) => data.size(),
        }
    }
}

// 2.3: order payload. an order may embed one ratio per direction; dual-ratio
// orders embed both and stay fillable either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderData {
    pub pegged: u128,
    pub native_to_pegged: Option<ExchangeRatio>,
    pub pegged_to_native: Option<ExchangeRatio>,
}

impl OrderData {
    pub fn size(&self) -> usize {
        let ratios = self.native_to_pegged.iter().count() + self.pegged_to_native.iter().count();
        1 + 16 + 16 * ratios
    }
}

// 2.4: what a cell holds. outputs under construction are plain CellContent;
// once on chain a cell gains its origin reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellContent {
    pub lock: Script,
    pub kind: Option<Script>,
    pub capacity: u64,
    pub data: CellData,
}

impl CellContent {
    pub fn new(lock: Script, kind: Option<Script>, capacity: u64, data: CellData) -> Self {
        Self {
            lock,
            kind,
            capacity,
            data,
        }
    }

    // minimal viable cell: capacity covers exactly the occupied bytes.
    pub fn with_occupied_capacity(lock: Script, kind: Option<Script>, data: CellData) -> Self {
        let mut content = Self::new(lock, kind, 0, data);
        content.capacity = content.occupied();
        content
    }

    // state rent: one whole native unit per occupied byte.
    pub fn occupied(&self) -> u64 {
        let bytes = 8
            + self.lock.occupied_size()
            + self.kind.as_ref().map_or(0, Script::occupied_size)
            + self.data.size();
        bytes as u64 * UNIT
    }

    pub fn serialized_size(&self) -> usize {
        8 + self.lock.occupied_size()
            + self.kind.as_ref().map_or(0, Script::occupied_size)
            + 4
            + self.data.size()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub out_point: OutPoint,
    pub content: CellContent,
}

impl Cell {
    pub fn new(out_point: OutPoint, content: CellContent) -> Self {
        Self { out_point, content }
    }
}

// 2.5: classified categories, as handed over by the external query layer.

// a stake deposit eligible for withdrawal, annotated with its burn value and
// the epoch at which unstaking becomes free. pools arrive pre-sorted by
// ascending estimated maturity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedDeposit {
    pub cell: Cell,
    pub pegged_value: u128,
    pub estimated_maturity: Epoch,
}

// an unstaking in progress: the request cell paired with the owner cell that
// proves control, plus the absolute maturity threshold decoded from the
// request's lock condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalGroup {
    pub request: Cell,
    pub owner: Cell,
    pub maturity: Epoch,
}

impl WithdrawalGroup {
    pub fn is_mature(&self, tip: &Epoch) -> bool {
        self.maturity.is_reached_by(tip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Matchable,
    DualRatio,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub cell: Cell,
    pub status: OrderStatus,
}

impl Order {
    // open orders still wait on the matching agent; completed ones are just
    // value to recover.
    pub fn is_open(&self) -> bool {
        !matches!(self.status, OrderStatus::Completed)
    }

    pub fn data(&self) -> Option<&OrderData> {
        match &self.cell.content.data {
            CellData::Order(data) => Some(data),
            _ => None,
        }
    }
}

// everything the classifier produces for one account, one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCells {
    pub capacities: Vec<Cell>,
    pub tokens: Vec<Cell>,
    pub receipts: Vec<Cell>,
    pub withdrawal_groups: Vec<WithdrawalGroup>,
    pub orders: Vec<Order>,
}
