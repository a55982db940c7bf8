// 1.0: all the primitives live here. nothing in the engine works without these.
// amounts, epochs, conversion direction, fee rate, exchange ratio.
// on-chain values are exact integers: u64 capacities, u128 token amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// one whole native unit, expressed in base (indivisible) units. 8 decimals.
pub const UNIT: u64 = 100_000_000;

// 1.1: which way a conversion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    NativeToPegged,
    PeggedToNative,
}

impl Direction {
    pub fn is_native_to_pegged(&self) -> bool {
        matches!(self, Direction::NativeToPegged)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::NativeToPegged => Direction::PeggedToNative,
            Direction::PeggedToNative => Direction::NativeToPegged,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::NativeToPegged => write!(f, "native->pegged"),
            Direction::PeggedToNative => write!(f, "pegged->native"),
        }
    }
}

// 1.2: fee rate in base units per thousand serialized bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeeRate(u64);

impl FeeRate {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

// 1.3: fractional epoch. number whole epochs plus index/length of the next one.
// ordering is exact rational comparison, never floating point: maturity
// thresholds are consensus-relevant and a float tie is a wrong answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Epoch {
    pub number: u64,
    pub index: u64,
    pub length: u64,
}

impl Epoch {
    pub const ZERO: Epoch = Epoch {
        number: 0,
        index: 0,
        length: 1,
    };

    pub fn new(number: u64, index: u64, length: u64) -> Self {
        Self {
            number,
            index,
            length: length.max(1),
        }
    }

    pub fn whole(number: u64) -> Self {
        Self::new(number, 0, 1)
    }

    // fraction sum over a common denominator, whole epochs carried into number,
    // reduced so repeated additions keep the denominator small.
    pub fn add(&self, other: &Epoch) -> Epoch {
        let (al, bl) = (self.length.max(1) as u128, other.length.max(1) as u128);
        let mut index = self.index as u128 * bl + other.index as u128 * al;
        let mut length = al * bl;
        let g = gcd(index.max(1), length);
        index /= g;
        length /= g;
        debug_assert!(length <= u64::MAX as u128);
        let number = self.number + other.number + (index / length) as u64;
        Epoch {
            number,
            index: (index % length) as u64,
            length: length as u64,
        }
    }

    // true once the tip has caught up with this epoch.
    pub fn is_reached_by(&self, tip: &Epoch) -> bool {
        *tip >= *self
    }

    // display only. exact comparisons never go through this.
    pub fn as_fractional(&self) -> Decimal {
        Decimal::from(self.number)
            + Decimal::from(self.index) / Decimal::from(self.length.max(1))
    }
}

impl PartialEq for Epoch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Epoch {}

impl PartialOrd for Epoch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Epoch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number).then_with(|| {
            let a = self.index as u128 * other.length.max(1) as u128;
            let b = other.index as u128 * self.length.max(1) as u128;
            a.cmp(&b)
        })
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}/{}", self.number, self.index, self.length.max(1))
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

// 1.4: exchange ratio between the two assets. value equivalence is
// pegged * pegged_mul == native * native_mul, so the pegged multiplier
// grows as the staked reserve accrues interest.
pub const OPERATOR_FEE_DIVISOR: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRatio {
    pub native_mul: u64,
    pub pegged_mul: u64,
}

impl ExchangeRatio {
    pub fn native_value(&self, pegged: u128) -> u128 {
        pegged * self.pegged_mul as u128 / self.native_mul as u128
    }

    pub fn pegged_value(&self, native: u128) -> u128 {
        native * self.native_mul as u128 / self.pegged_mul as u128
    }

    // 0.1% operator fee to the matching agent, taken on the pegged multiplier.
    // native->pegged inflates it (fewer pegged out), pegged->native deflates
    // it (less native out).
    pub fn with_operator_fee(&self, direction: Direction) -> ExchangeRatio {
        let cut = self.pegged_mul / OPERATOR_FEE_DIVISOR;
        let pegged_mul = match direction {
            Direction::NativeToPegged => self.pegged_mul + cut,
            Direction::PeggedToNative => self.pegged_mul - cut,
        };
        ExchangeRatio {
            native_mul: self.native_mul,
            pegged_mul,
        }
    }
}

// 1.5: display and input parsing. Decimal is fine here, these never feed
// back into balance math.

pub fn format_native(amount: u128) -> String {
    Decimal::from_i128_with_scale(amount as i128, 8)
        .normalize()
        .to_string()
}

// tolerant parse of user-entered amounts: leading junk dropped, at most
// 8 fractional digits honored, the rest ignored. empty input parses to zero.
pub fn parse_native(text: &str) -> u128 {
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() && c != '0' || c == '.' {
            break;
        }
        chars.next();
    }

    let mut whole: u128 = 0;
    let mut frac = String::new();
    let mut in_frac = false;
    for c in chars {
        match c {
            '0'..='9' if !in_frac => whole = whole * 10 + (c as u128 - '0' as u128),
            '0'..='9' => {
                if frac.len() < 8 {
                    frac.push(c);
                }
            }
            '.' if !in_frac => in_frac = true,
            _ => {}
        }
    }
    while frac.len() < 8 {
        frac.push('0');
    }
    whole * UNIT as u128 + frac.parse::<u128>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_ordering_is_rational() {
        let half = Epoch::new(5, 1, 2);
        let same_half = Epoch::new(5, 500, 1000);
        let later = Epoch::new(5, 2, 3);

        assert_eq!(half, same_half);
        assert!(half < later);
        assert!(Epoch::whole(6) > later);
    }

    #[test]
    fn epoch_add_carries_whole_epochs() {
        let a = Epoch::new(1, 3, 4);
        let b = Epoch::new(0, 1, 2);
        let sum = a.add(&b);
        assert_eq!(sum, Epoch::new(2, 1, 4));

        let offset = Epoch::new(0, 241, 240);
        assert_eq!(Epoch::whole(7).add(&offset), Epoch::new(8, 1, 240));
    }

    #[test]
    fn ratio_round_trips_within_truncation() {
        let ratio = ExchangeRatio {
            native_mul: 10_000_000_000_000_000,
            pegged_mul: 11_000_000_000_000_000,
        };
        let native = 1_234 * UNIT as u128;
        let pegged = ratio.pegged_value(native);
        assert!(ratio.native_value(pegged) <= native);
        assert!(native - ratio.native_value(pegged) < 2);
    }

    #[test]
    fn operator_fee_shifts_the_right_way() {
        let ratio = ExchangeRatio {
            native_mul: 1_000,
            pegged_mul: 1_000,
        };
        assert_eq!(
            ratio.with_operator_fee(Direction::NativeToPegged).pegged_mul,
            1_001
        );
        assert_eq!(
            ratio.with_operator_fee(Direction::PeggedToNative).pegged_mul,
            999
        );
    }

    #[test]
    fn formatting_and_parsing() {
        assert_eq!(format_native(12 * UNIT as u128 + UNIT as u128 / 2), "12.5");
        assert_eq!(format_native(3 * UNIT as u128), "3");
        assert_eq!(parse_native("12.5"), 12 * UNIT as u128 + UNIT as u128 / 2);
        assert_eq!(parse_native("amount: 007.25 left"), 7 * UNIT as u128 + 25_000_000);
        assert_eq!(parse_native("0.123456789"), 12_345_678);
        assert_eq!(parse_native(""), 0);
    }
}
