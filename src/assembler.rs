// 8.0 assembler.rs: folds the already-settleable cell categories into a
// baseline candidate. fixed order: melt orders first (frees their locked
// value), append plain spendable cells, settle mature withdrawal groups
// last. the order only matters for maturity aggregation, which is a
// running max over whatever each folded category contributes.

use crate::cell::{Cell, Order, WithdrawalGroup};
use crate::maturity::max_epoch;
use crate::tx::{TxDraft, TxInfo};
use crate::types::Epoch;

// consume order cells, recovering their capacity and held pegged amount.
// open orders are cancelled by the same move, so no distinction here.
pub fn melt_orders(mut tx: TxDraft, orders: &[Order]) -> TxDraft {
    tx.extend_inputs(orders.iter().map(|o| o.cell.clone()));
    tx
}

pub fn add_cells(mut tx: TxDraft, cells: &[Cell]) -> TxDraft {
    tx.extend_inputs(cells.iter().cloned());
    tx
}

// consume request and owner cells of each group, paying out the settled
// withdrawal value.
pub fn settle_groups(mut tx: TxDraft, groups: &[WithdrawalGroup]) -> TxDraft {
    for group in groups {
        tx.push_input(group.request.clone());
        tx.push_input(group.owner.clone());
    }
    tx
}

// 8.1: the baseline every conversion starts from. callers pass only groups
// that are already mature at the tip; their thresholds still fold into the
// maturity estimate, where they are dominated by anything actually pending.
pub fn base(
    capacities: &[Cell],
    tokens: &[Cell],
    receipts: &[Cell],
    mature_groups: &[WithdrawalGroup],
    orders: &[Order],
) -> TxInfo {
    let mut tx = TxDraft::new();
    tx = melt_orders(tx, orders);
    tx = add_cells(tx, capacities);
    tx = add_cells(tx, tokens);
    tx = add_cells(tx, receipts);
    tx = settle_groups(tx, mature_groups);

    let estimated_maturity = max_epoch(Epoch::ZERO, mature_groups.iter().map(|g| g.maturity));
    TxInfo {
        estimated_maturity,
        ..TxInfo::from_tx(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellContent, CellData, OrderData, OrderStatus, OutPoint, Script};
    use crate::types::{ExchangeRatio, UNIT};

    fn cell(tag: u8, capacity: u64, data: CellData) -> Cell {
        Cell::new(
            OutPoint::new([tag; 32], 0),
            CellContent::new(Script::tagged(tag), None, capacity, data),
        )
    }

    #[test]
    fn baseline_nets_every_category_once() {
        let capacities = vec![cell(1, 500 * UNIT, CellData::None)];
        let tokens = vec![cell(2, 50 * UNIT, CellData::Token { amount: 700 })];
        let receipts = vec![cell(3, 50 * UNIT, CellData::Receipt { pegged: 300 })];
        let orders = vec![Order {
            cell: cell(
                4,
                80 * UNIT,
                CellData::Order(OrderData {
                    pegged: 40,
                    native_to_pegged: Some(ExchangeRatio {
                        native_mul: 1,
                        pegged_mul: 1,
                    }),
                    pegged_to_native: None,
                }),
            ),
            status: OrderStatus::Completed,
        }];
        let groups = vec![WithdrawalGroup {
            request: cell(5, 100 * UNIT, CellData::Withdrawal { settled: 104 * UNIT }),
            owner: cell(6, 41 * UNIT, CellData::None),
            maturity: Epoch::whole(10),
        }];

        let info = base(&capacities, &tokens, &receipts, &groups, &orders);
        assert!(info.is_viable());
        assert_eq!(info.tx.inputs.len(), 6);
        assert_eq!(info.tx.outputs.len(), 0);
        assert_eq!(
            info.tx.native_delta(),
            (500 + 50 + 50 + 80 + 104 + 41) as i128 * UNIT as i128
        );
        assert_eq!(info.tx.pegged_delta(), 700 + 300 + 40);
        assert_eq!(info.estimated_maturity, Epoch::whole(10));
    }

    #[test]
    fn empty_categories_yield_an_empty_candidate() {
        let info = base(&[], &[], &[], &[], &[]);
        assert!(info.is_viable());
        assert!(info.tx.is_empty());
        assert_eq!(info.fee, 0);
    }
}
