// peg-core: balance aggregation and conversion-transaction construction for
// a two-asset peg system (native chain asset + pegged derivative token).
// snapshot-in, candidate-out: all computation is deterministic, synchronous
// and free of external I/O; retrieval, classification, signing and
// transmission belong to the collaborators around this crate.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: amounts, Epoch, Direction, FeeRate, ExchangeRatio
//   2.x  cell.rs: cell model and classified categories (deposits, groups, orders)
//   3.x  config.rs: protocol scripts + explicit account context
//   4.x  header.rs: tip header, accumulator-derived ratio and deposit sizing
//   5.x  tx.rs: TxDraft, net delta accounting, TxInfo, error taxonomy
//   6.x  fee.rs: size-based fee with coarse quantization
//   7.x  maturity.rs: worst-case epoch folding, order fulfillment heuristic
//   8.x  assembler.rs: baseline candidate from settleable categories
//   9.x  settle.rs: exact change settlement, fee/size fixpoint
//   10.x convert.rs: memoized binary search over conversion quantity
//   11.x balance.rs: Snapshot orchestration, balance tiers, tx_builder

// value model
pub mod cell;
pub mod header;
pub mod tx;
pub mod types;

// candidate construction
pub mod assembler;
pub mod convert;
pub mod settle;

// supporting estimators
pub mod fee;
pub mod maturity;

// orchestration
pub mod balance;
pub mod config;

// re exports for convenience
pub use assembler::*;
pub use balance::*;
pub use cell::*;
pub use convert::*;
pub use fee::*;
pub use header::*;
pub use maturity::*;
pub use settle::*;
pub use tx::*;
pub use types::*;
pub use config::{AccountConfig, ConfigError, SystemScripts};
