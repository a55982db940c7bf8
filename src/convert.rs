// 10.0 convert.rs: turns "convert this amount" into a concrete candidate.
//
// the search axis is the count of whole units combined with a residual limit
// order: new stake deposits for native->pegged, pool withdrawals for
// pegged->native. building one candidate is expensive (full construction,
// sizing and settlement), and feasibility is assumed monotonic in the
// quantity, so the search is a binary search over quantity with every built
// candidate memoized in an array keyed by probe position. the monotonicity
// assumption is verified over the memo table rather than trusted.

use crate::cell::{CellContent, CellData, ExtendedDeposit, OrderData};
use crate::config::AccountConfig;
use crate::header::{deposit_cell, Header};
use crate::maturity::{max_epoch, order_maturity};
use crate::settle::add_change;
use crate::tx::{BuildError, TxInfo};
use crate::types::{Direction, ExchangeRatio, FeeRate};

// at most this many pool entries are consumed per search.
pub const MAX_POOL_DRAW: usize = 30;

struct PoolEntry<'a> {
    deposit: &'a ExtendedDeposit,
    cumulative: u128,
}

// cumulative walk over the pre-sorted pool. entries whose running total
// would overshoot the amount are skipped, not cut off: a smaller deposit
// further down may still fit under the target.
fn prefilter<'a>(deposits: &'a [ExtendedDeposit], amount: u128) -> Vec<PoolEntry<'a>> {
    let mut pool = Vec::new();
    let mut cumulative = 0u128;
    for deposit in deposits {
        let next = cumulative + deposit.pegged_value;
        if next > amount {
            continue;
        }
        cumulative = next;
        pool.push(PoolEntry {
            deposit,
            cumulative,
        });
        if pool.len() >= MAX_POOL_DRAW {
            break;
        }
    }
    pool
}

struct Search<'a> {
    base: &'a TxInfo,
    direction: Direction,
    amount: u128,
    ratio: ExchangeRatio,
    deposit_template: CellContent,
    pool: Vec<PoolEntry<'a>>,
    tip: &'a Header,
    fee_rate: FeeRate,
    config: &'a AccountConfig,
    max_quantity: usize,
}

impl<'a> Search<'a> {
    fn new(
        base: &'a TxInfo,
        direction: Direction,
        amount: u128,
        deposits: &'a [ExtendedDeposit],
        tip: &'a Header,
        fee_rate: FeeRate,
        config: &'a AccountConfig,
    ) -> Self {
        let pool = if direction.is_native_to_pegged() {
            Vec::new()
        } else {
            prefilter(deposits, amount)
        };
        let deposit_template = deposit_cell(tip, &config.scripts);
        let max_quantity = if direction.is_native_to_pegged() {
            (amount / deposit_template.capacity as u128) as usize
        } else {
            pool.len()
        };
        Self {
            base,
            direction,
            amount,
            ratio: tip.exchange_ratio().with_operator_fee(direction),
            deposit_template,
            pool,
            tip,
            fee_rate,
            config,
            max_quantity,
        }
    }

    // 10.1: build and settle the candidate that uses exactly `quantity`
    // whole units, converting any strictly positive remainder into a limit
    // order at the fee-adjusted ratio.
    fn attempt(&self, quantity: usize) -> TxInfo {
        let mut tx = self.base.tx.clone();
        let mut maturity = self.base.estimated_maturity;
        let mut amount = self.amount;
        let scripts = &self.config.scripts;

        if quantity > 0 {
            if self.direction.is_native_to_pegged() {
                let spent = self.deposit_template.capacity as u128 * quantity as u128;
                if spent > amount {
                    return TxInfo::failed(BuildError::TooManyDeposits);
                }
                amount -= spent;
                for _ in 0..quantity {
                    tx.push_output(self.deposit_template.clone());
                }
                let minted = match self.deposit_template.data {
                    CellData::StakeDeposit { pegged } => pegged * quantity as u128,
                    _ => 0,
                };
                // one receipt claims the whole batch
                tx.push_output(CellContent::with_occupied_capacity(
                    self.config.account_lock.clone(),
                    Some(scripts.logic.clone()),
                    CellData::Receipt { pegged: minted },
                ));
            } else {
                if self.pool.len() < quantity {
                    return TxInfo::failed(BuildError::PoolExhausted);
                }
                let consumed = self.pool[quantity - 1].cumulative;
                if consumed > amount {
                    return TxInfo::failed(BuildError::TooManyWithdrawals);
                }
                amount -= consumed;
                for entry in &self.pool[..quantity] {
                    let deposit = &entry.deposit.cell.content;
                    tx.push_input(entry.deposit.cell.clone());
                    // the locked value travels into the request; interest
                    // accrues to it until maturity
                    tx.push_output(CellContent::new(
                        scripts.owner.clone(),
                        Some(scripts.stake.clone()),
                        deposit.capacity,
                        CellData::Withdrawal {
                            settled: deposit.capacity,
                        },
                    ));
                    tx.push_output(CellContent::with_occupied_capacity(
                        self.config.account_lock.clone(),
                        Some(scripts.owner.clone()),
                        CellData::None,
                    ));
                    maturity = max_epoch(maturity, [entry.deposit.estimated_maturity]);
                }
            }
        }

        if amount > 0 {
            let Ok(residual_native) = u64::try_from(amount) else {
                return TxInfo::failed(BuildError::InsufficientNative);
            };
            let n2p = self.direction.is_native_to_pegged();
            let mut order = CellContent::with_occupied_capacity(
                scripts.order.clone(),
                Some(scripts.token.clone()),
                CellData::Order(OrderData {
                    pegged: if n2p { 0 } else { amount },
                    native_to_pegged: n2p.then_some(self.ratio),
                    pegged_to_native: (!n2p).then_some(self.ratio),
                }),
            );
            if n2p {
                order.capacity += residual_native;
            }
            tx.push_output(order);
            maturity = max_epoch(maturity, [order_maturity(self.direction, amount, self.tip)]);
        }

        add_change(
            TxInfo {
                tx,
                error: None,
                fee: 0,
                estimated_maturity: maturity,
            },
            self.fee_rate,
            self.config,
        )
    }
}

fn ensure(search: &Search<'_>, cache: &mut [Option<TxInfo>], probe: usize) {
    if cache[probe].is_none() {
        cache[probe] = Some(search.attempt(search.max_quantity - probe));
    }
}

fn viable(cache: &[Option<TxInfo>], probe: usize) -> bool {
    cache[probe].as_ref().is_some_and(TxInfo::is_viable)
}

// probe position i stands for quantity N - i, so viability must be false on
// a prefix and true on a suffix of whatever the search materialized.
fn monotone(cache: &[Option<TxInfo>]) -> bool {
    let mut seen_viable = false;
    for entry in cache.iter().flatten() {
        if entry.is_viable() {
            seen_viable = true;
        } else if seen_viable {
            return false;
        }
    }
    true
}

// 10.2: the search. finds the largest feasible quantity (first viable probe
// position) and returns its settled candidate; if nothing is feasible the
// quantity-zero candidate's error explains why.
pub fn convert(
    info: TxInfo,
    direction: Direction,
    amount: u128,
    deposits: &[ExtendedDeposit],
    tip: &Header,
    fee_rate: FeeRate,
    config: &AccountConfig,
) -> TxInfo {
    if info.error.is_some() {
        return info;
    }
    if direction.is_native_to_pegged() && u64::try_from(amount).is_err() {
        return TxInfo::failed(BuildError::InsufficientNative);
    }

    let search = Search::new(&info, direction, amount, deposits, tip, fee_rate, config);
    let mut cache: Vec<Option<TxInfo>> = vec![None; search.max_quantity + 1];

    let mut lo = 0;
    let mut hi = search.max_quantity;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        ensure(&search, &mut cache, mid);
        if viable(&cache, mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    ensure(&search, &mut cache, lo);
    debug_assert!(monotone(&cache), "feasibility is not monotonic in quantity");

    cache[lo].take().expect("final probe position was built")
}

// build the candidate for one explicit quantity, bypassing the search.
// callers probing feasibility themselves (tests, diagnostics) use this.
pub fn convert_at(
    info: &TxInfo,
    direction: Direction,
    amount: u128,
    quantity: usize,
    deposits: &[ExtendedDeposit],
    tip: &Header,
    fee_rate: FeeRate,
    config: &AccountConfig,
) -> TxInfo {
    if info.error.is_some() {
        return info.clone();
    }
    if direction.is_native_to_pegged() && u64::try_from(amount).is_err() {
        return TxInfo::failed(BuildError::InsufficientNative);
    }
    Search::new(info, direction, amount, deposits, tip, fee_rate, config).attempt(quantity)
}
