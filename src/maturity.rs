// 7.0 maturity.rs: aggregates epoch-valued readiness signals into one
// worst-case figure. withdrawal requests carry an absolute maturity epoch;
// minted limit orders get a heuristic one from the matching agent's assumed
// throughput. comparisons stay exact rational, floating point appears only
// in the human-facing wait display.

use crate::header::Header;
use crate::types::{Direction, Epoch, UNIT};
use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;

// assumed external fulfillment throughput, per minute. buying pegged is a
// deep market, selling it back is thin.
pub const NATIVE_TO_PEGGED_FILL_RATE: u128 = 100_000 * UNIT as u128;
pub const PEGGED_TO_NATIVE_FILL_RATE: u128 = 200 * UNIT as u128;

// one epoch spans 240 minutes.
pub const EPOCH_MINUTES: u64 = 240;

// worst case across the running estimate and any newly folded signals.
pub fn max_epoch<I: IntoIterator<Item = Epoch>>(estimate: Epoch, candidates: I) -> Epoch {
    candidates
        .into_iter()
        .fold(estimate, |a, b| if b > a { b } else { a })
}

// heuristic maturity of a freshly minted order: how long until the matching
// agent has chewed through `amount` at its assumed rate, as an epoch offset
// from the tip.
pub fn order_maturity(direction: Direction, amount: u128, tip: &Header) -> Epoch {
    let rate = if direction.is_native_to_pegged() {
        NATIVE_TO_PEGGED_FILL_RATE
    } else {
        PEGGED_TO_NATIVE_FILL_RATE
    };
    let minutes = 1 + (amount / rate) as u64;
    tip.epoch.add(&Epoch::new(0, minutes, EPOCH_MINUTES))
}

// 7.1: display-side wait estimate. returns None when the target is already
// reached at the tip.
pub fn wait_duration(tip: &Epoch, target: &Epoch) -> Option<Duration> {
    if target.is_reached_by(tip) {
        return None;
    }
    let epochs = (target.as_fractional() - tip.as_fractional())
        .to_f64()
        .unwrap_or(0.0);
    Some(Duration::minutes((epochs * EPOCH_MINUTES as f64).ceil() as i64))
}

pub fn wait_hint(tip: &Epoch, target: &Epoch) -> String {
    let Some(wait) = wait_duration(tip, target) else {
        return "ready".to_string();
    };
    let days = wait.num_days();
    let hours = wait.num_hours() % 24;
    let minutes = wait.num_minutes() % 60;
    if days > 0 {
        format!("about {days}d {hours}h")
    } else if hours > 0 {
        format!("about {hours}h {minutes}m")
    } else {
        format!("about {}m", minutes.max(1))
    }
}
