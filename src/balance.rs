// 11.0 balance.rs: the orchestrator. one Snapshot bundles everything the
// query layer resolved for an account; from it come the three balance tiers
// per asset and the tx_builder entry point the signing layer consumes.
//
// tiers are measured by incrementally folding more categories into a running
// candidate and re-reading its net deltas. the same cell never feeds two
// measurements of the same tier, and identical snapshots always measure
// identically.

use crate::assembler::{add_cells, base, melt_orders, settle_groups};
use crate::cell::{ClassifiedCells, ExtendedDeposit, Order, WithdrawalGroup};
use crate::config::AccountConfig;
use crate::convert::convert;
use crate::header::Header;
use crate::maturity::max_epoch;
use crate::settle::add_change;
use crate::tx::{BuildError, TxDraft, TxInfo};
use crate::types::{Direction, Epoch, FeeRate};
use serde::{Deserialize, Serialize};

// ascending tiers of one asset:
//   liquid    - free to spend right now (plain, unencumbered cells)
//   available - liquid plus value recoverable with no epoch wait
//   full      - available plus value still locked behind orders or maturity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub liquid: u128,
    pub available: u128,
    pub full: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub native: Balance,
    pub pegged: Balance,
    // worst-case unlock epoch of the value counted only in the full tier.
    pub locked_until: Option<Epoch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cells: ClassifiedCells,
    pub pool: Vec<ExtendedDeposit>,
    pub tip: Header,
    pub fee_rate: FeeRate,
    pub config: AccountConfig,
}

fn gains(tx: &TxDraft) -> (u128, u128) {
    (
        tx.native_delta().max(0) as u128,
        tx.pegged_delta().max(0) as u128,
    )
}

impl Snapshot {
    pub fn new(
        cells: ClassifiedCells,
        pool: Vec<ExtendedDeposit>,
        tip: Header,
        fee_rate: FeeRate,
        config: AccountConfig,
    ) -> Self {
        Self {
            cells,
            pool,
            tip,
            fee_rate,
            config,
        }
    }

    fn split_groups(&self) -> (Vec<WithdrawalGroup>, Vec<WithdrawalGroup>) {
        self.cells
            .withdrawal_groups
            .iter()
            .cloned()
            .partition(|g| g.is_mature(&self.tip.epoch))
    }

    fn split_orders(&self) -> (Vec<Order>, Vec<Order>) {
        self.cells
            .orders
            .iter()
            .cloned()
            .partition(|o| !o.is_open())
    }

    // 11.1: the three tiers, each a strictly wider candidate than the last.
    // the not-yet-mature groups cannot legally join a candidate, so their
    // contribution is measured on a candidate of their own and added to the
    // full tier only.
    pub fn balances(&self) -> Balances {
        let (mature, pending) = self.split_groups();
        let (completed, open) = self.split_orders();

        let mut tx = TxDraft::new();
        tx = add_cells(tx, &self.cells.capacities);
        tx = add_cells(tx, &self.cells.tokens);
        let (native_liquid, pegged_liquid) = gains(&tx);

        tx = melt_orders(tx, &completed);
        tx = add_cells(tx, &self.cells.receipts);
        tx = settle_groups(tx, &mature);
        let (native_available, pegged_available) = gains(&tx);

        tx = melt_orders(tx, &open);
        let (mut native_full, mut pegged_full) = gains(&tx);
        let locked = settle_groups(TxDraft::new(), &pending);
        let (locked_native, locked_pegged) = gains(&locked);
        native_full += locked_native;
        pegged_full += locked_pegged;

        let locked_until = if pending.is_empty() {
            None
        } else {
            Some(max_epoch(Epoch::ZERO, pending.iter().map(|g| g.maturity)))
        };

        Balances {
            native: Balance {
                liquid: native_liquid,
                available: native_available,
                full: native_full,
            },
            pegged: Balance {
                liquid: pegged_liquid,
                available: pegged_available,
                full: pegged_full,
            },
            locked_until,
        }
    }

    // the spendable baseline: everything settleable now, open orders
    // cancelled so their value can back the conversion.
    pub fn base(&self) -> TxInfo {
        let (mature, _) = self.split_groups();
        base(
            &self.cells.capacities,
            &self.cells.tokens,
            &self.cells.receipts,
            &mature,
            &self.cells.orders,
        )
    }

    // true when settling with no conversion still does useful work.
    fn consumes_intermediate(&self) -> bool {
        !self.cells.orders.is_empty()
            || !self.cells.receipts.is_empty()
            || self
                .cells
                .withdrawal_groups
                .iter()
                .any(|g| g.is_mature(&self.tip.epoch))
    }

    // 11.2: the entry point the signing layer calls. a zero amount settles
    // whatever intermediates exist; with none, there is nothing to do.
    pub fn tx_builder(&self, direction: Direction, amount: u128) -> TxInfo {
        let info = self.base();
        if amount > 0 {
            return convert(
                info,
                direction,
                amount,
                &self.pool,
                &self.tip,
                self.fee_rate,
                &self.config,
            );
        }
        if self.consumes_intermediate() {
            return add_change(info, self.fee_rate, &self.config);
        }
        TxInfo::failed(BuildError::NothingToDo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellContent, CellData, OrderData, OrderStatus, OutPoint, Script};
    use crate::header::RATE_BASE;
    use crate::types::{ExchangeRatio, UNIT};

    fn snapshot() -> Snapshot {
        let config = AccountConfig::testnet(Script::tagged(0x01));
        let tip = Header::new(9_000, Epoch::whole(800), RATE_BASE);
        let plain = |tag: u8, capacity: u64, data: CellData| {
            Cell::new(
                OutPoint::new([tag; 32], 0),
                CellContent::new(config.account_lock.clone(), None, capacity, data),
            )
        };
        let cells = ClassifiedCells {
            capacities: vec![plain(1, 1_000 * UNIT, CellData::None)],
            tokens: vec![plain(2, 60 * UNIT, CellData::Token { amount: 500 })],
            receipts: vec![plain(3, 90 * UNIT, CellData::Receipt { pegged: 250 })],
            withdrawal_groups: vec![
                WithdrawalGroup {
                    request: plain(4, 100 * UNIT, CellData::Withdrawal { settled: 103 * UNIT }),
                    owner: plain(5, 41 * UNIT, CellData::None),
                    maturity: Epoch::whole(700),
                },
                WithdrawalGroup {
                    request: plain(6, 200 * UNIT, CellData::Withdrawal { settled: 200 * UNIT }),
                    owner: plain(7, 41 * UNIT, CellData::None),
                    maturity: Epoch::whole(900),
                },
            ],
            orders: vec![
                Order {
                    cell: plain(
                        8,
                        70 * UNIT,
                        CellData::Order(OrderData {
                            pegged: 80,
                            native_to_pegged: None,
                            pegged_to_native: Some(ExchangeRatio {
                                native_mul: RATE_BASE,
                                pegged_mul: RATE_BASE,
                            }),
                        }),
                    ),
                    status: OrderStatus::Completed,
                },
                Order {
                    cell: plain(
                        9,
                        30 * UNIT,
                        CellData::Order(OrderData {
                            pegged: 20,
                            native_to_pegged: Some(ExchangeRatio {
                                native_mul: RATE_BASE,
                                pegged_mul: RATE_BASE,
                            }),
                            pegged_to_native: None,
                        }),
                    ),
                    status: OrderStatus::Matchable,
                },
            ],
        };
        Snapshot::new(cells, Vec::new(), tip, FeeRate::new(1000), config)
    }

    #[test]
    fn tiers_ascend_and_count_each_cell_once() {
        let balances = snapshot().balances();

        let native = balances.native;
        assert_eq!(native.liquid, (1_000 + 60) as u128 * UNIT as u128);
        // + completed order 70 + receipt 90 + mature settled 103 + owner 41
        assert_eq!(native.available, native.liquid + 304 * UNIT as u128);
        // + open order 30 + pending settled 200 + its owner 41
        assert_eq!(native.full, native.available + 271 * UNIT as u128);

        let pegged = balances.pegged;
        assert_eq!(pegged.liquid, 500);
        assert_eq!(pegged.available, 500 + 250 + 80);
        assert_eq!(pegged.full, pegged.available + 20);

        assert_eq!(balances.locked_until, Some(Epoch::whole(900)));
    }

    #[test]
    fn identical_snapshots_measure_identically() {
        let snapshot = snapshot();
        assert_eq!(snapshot.balances(), snapshot.balances());
    }

    #[test]
    fn zero_amount_settles_intermediates() {
        let snapshot = snapshot();
        let settled = snapshot.tx_builder(Direction::NativeToPegged, 0);
        assert!(settled.is_viable());
        assert!(settled.fee > 0);
    }

    #[test]
    fn zero_amount_with_nothing_to_settle_is_an_error() {
        let mut snapshot = snapshot();
        snapshot.cells.orders.clear();
        snapshot.cells.receipts.clear();
        // the mature group is the last settleable intermediate
        snapshot.cells.withdrawal_groups.truncate(1);
        snapshot.cells.withdrawal_groups[0].maturity = Epoch::whole(999);
        let idle = snapshot.tx_builder(Direction::NativeToPegged, 0);
        assert_eq!(idle.error, Some(BuildError::NothingToDo));
    }
}
