//! Conversion engine walkthrough.
//!
//! Runs the full candidate-construction lifecycle against synthetic
//! snapshots: balance tiers, pure settlement, both conversion directions
//! and the failure paths a caller is expected to handle.

use peg_core::*;

fn main() {
    println!("Pegged-Asset Conversion Engine Walkthrough");
    println!("One Account, Synthetic Snapshots, Full Lifecycle\n");

    scenario_1_balance_tiers();
    scenario_2_pure_settlement();
    scenario_3_native_to_pegged();
    scenario_4_pegged_to_native();
    scenario_5_failure_paths();

    println!("\nAll walkthroughs completed.");
}

fn demo_tip() -> Header {
    // 5% accrued on the pegged side since genesis
    Header::new(
        9_000,
        Epoch::new(800, 120, 240),
        RATE_BASE + RATE_BASE / 20,
    )
}

fn demo_config() -> AccountConfig {
    let config = AccountConfig::testnet(Script::tagged(0x11));
    config.validate().expect("testnet preset is consistent");
    config
}

fn plain_cell(config: &AccountConfig, tag: u8, capacity: u64, data: CellData) -> Cell {
    Cell::new(
        OutPoint::new([tag; 32], 0),
        CellContent::new(config.account_lock.clone(), None, capacity, data),
    )
}

fn demo_snapshot() -> Snapshot {
    let config = demo_config();
    let tip = demo_tip();

    let ratio = tip.exchange_ratio();
    let cells = ClassifiedCells {
        capacities: vec![
            plain_cell(&config, 1, 400_000 * UNIT, CellData::None),
            plain_cell(&config, 2, 120_000 * UNIT, CellData::None),
        ],
        tokens: vec![plain_cell(
            &config,
            3,
            60 * UNIT,
            CellData::Token {
                amount: 250_000 * UNIT as u128,
            },
        )],
        receipts: vec![plain_cell(
            &config,
            4,
            90 * UNIT,
            CellData::Receipt {
                pegged: 100_000 * UNIT as u128,
            },
        )],
        withdrawal_groups: vec![WithdrawalGroup {
            request: plain_cell(
                &config,
                5,
                100_082 * UNIT,
                CellData::Withdrawal {
                    settled: 100_913 * UNIT,
                },
            ),
            owner: plain_cell(&config, 6, 41 * UNIT, CellData::None),
            maturity: Epoch::whole(812),
        }],
        orders: vec![Order {
            cell: Cell::new(
                OutPoint::new([7; 32], 0),
                CellContent::new(
                    config.scripts.order.clone(),
                    Some(config.scripts.token.clone()),
                    95 * UNIT,
                    CellData::Order(OrderData {
                        pegged: 1_500 * UNIT as u128,
                        native_to_pegged: None,
                        pegged_to_native: Some(ratio),
                    }),
                ),
            ),
            status: OrderStatus::Completed,
        }],
    };

    // a pool of standard deposits maturing one epoch apart, small enough
    // that the account's pegged holdings can drain it entirely
    let template = deposit_cell(&tip, &config.scripts);
    let pool = (0..3u8)
        .map(|i| {
            let pegged = match template.data {
                CellData::StakeDeposit { pegged } => pegged,
                _ => unreachable!(),
            };
            ExtendedDeposit {
                cell: Cell::new(OutPoint::new([0x20 + i; 32], 0), template.clone()),
                pegged_value: pegged,
                estimated_maturity: Epoch::whole(801 + i as u64),
            }
        })
        .collect();

    Snapshot::new(cells, pool, tip, FeeRate::new(1_200), config)
}

fn describe(outcome: &TxInfo, tip: &Epoch) {
    match &outcome.error {
        Some(error) => println!("  rejected: {error}"),
        None => {
            println!(
                "  candidate: {} inputs, {} outputs, fee {}",
                outcome.tx.inputs.len(),
                outcome.tx.outputs.len(),
                format_native(outcome.fee as u128),
            );
            println!(
                "  maturity: {}",
                wait_hint(tip, &outcome.estimated_maturity)
            );
        }
    }
}

/// Three tiers per asset, measured on incrementally wider candidates.
fn scenario_1_balance_tiers() {
    println!("Scenario 1: Balance Tiers\n");

    let snapshot = demo_snapshot();
    let balances = snapshot.balances();

    println!(
        "  native:  liquid {}, available {}, full {}",
        format_native(balances.native.liquid),
        format_native(balances.native.available),
        format_native(balances.native.full),
    );
    println!(
        "  pegged:  liquid {}, available {}, full {}",
        format_native(balances.pegged.liquid),
        format_native(balances.pegged.available),
        format_native(balances.pegged.full),
    );
    if let Some(unlock) = balances.locked_until {
        println!(
            "  locked value frees up {}\n",
            wait_hint(&snapshot.tip.epoch, &unlock)
        );
    } else {
        println!("  nothing locked\n");
    }
}

/// Zero amount: settle whatever intermediates exist, nothing else.
fn scenario_2_pure_settlement() {
    println!("Scenario 2: Pure Settlement (amount = 0)\n");

    let snapshot = demo_snapshot();
    let outcome = snapshot.tx_builder(Direction::NativeToPegged, 0);
    describe(&outcome, &snapshot.tip.epoch);
    println!();
}

/// Whole deposits first, residual order for the rest.
fn scenario_3_native_to_pegged() {
    println!("Scenario 3: Convert Native to Pegged\n");

    let snapshot = demo_snapshot();
    let size = deposit_size(&snapshot.tip, &snapshot.config.scripts);

    let exact = snapshot.tx_builder(Direction::NativeToPegged, 3 * size as u128);
    println!("  exactly three standard deposits:");
    describe(&exact, &snapshot.tip.epoch);

    let ragged = snapshot.tx_builder(
        Direction::NativeToPegged,
        2 * size as u128 + 40_000 * UNIT as u128,
    );
    println!("  two deposits plus a residual limit order:");
    describe(&ragged, &snapshot.tip.epoch);
    println!();
}

/// Withdrawals saturate the pool; an order covers the shortfall.
fn scenario_4_pegged_to_native() {
    println!("Scenario 4: Convert Pegged to Native\n");

    let snapshot = demo_snapshot();
    let pool_total: u128 = snapshot.pool.iter().map(|d| d.pegged_value).sum();

    let outcome = snapshot.tx_builder(Direction::PeggedToNative, pool_total / 2);
    println!("  half the pool:");
    describe(&outcome, &snapshot.tip.epoch);

    let saturated = snapshot.tx_builder(Direction::PeggedToNative, pool_total + 500 * UNIT as u128);
    println!("  more than the whole pool:");
    describe(&saturated, &snapshot.tip.epoch);
    println!();
}

/// The errors a caller must treat as "discard and rethink".
fn scenario_5_failure_paths() {
    println!("Scenario 5: Failure Paths\n");

    let mut snapshot = demo_snapshot();
    let beyond_means = snapshot.tx_builder(Direction::NativeToPegged, 10_000_000 * UNIT as u128);
    println!("  converting more native than the account holds:");
    describe(&beyond_means, &snapshot.tip.epoch);

    snapshot.cells = ClassifiedCells::default();
    let idle = snapshot.tx_builder(Direction::NativeToPegged, 0);
    println!("  zero amount on an empty account:");
    describe(&idle, &snapshot.tip.epoch);
}
