// 6.0 fee.rs: serialized size in, quantized fee out. fees land on a coarse
// grid so candidates with slightly different sizes still price identically,
// which keeps the conversion search stable across placeholder passes.

use crate::config::AccountConfig;
use crate::tx::TxDraft;
use crate::types::FeeRate;

// fee bucket granularity. every fee is an exact multiple of this.
pub const FEE_GRANULARITY: u64 = 1249;

// raw size-based fee: rate is quoted per thousand serialized bytes,
// rounded up so the candidate always clears the relay floor.
pub fn base_fee(size: usize, fee_rate: FeeRate) -> u64 {
    let weighted = size as u128 * fee_rate.value() as u128;
    weighted.div_ceil(1000) as u64
}

pub fn quantize(fee: u64) -> u64 {
    fee.div_ceil(FEE_GRANULARITY) * FEE_GRANULARITY
}

// fee for a candidate, witness placeholders included via the overhead the
// signer probed for this snapshot.
pub fn estimate_fee(tx: &TxDraft, fee_rate: FeeRate, config: &AccountConfig) -> u64 {
    quantize(base_fee(tx.serialized_size() + config.size_overhead, fee_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_fee_rounds_up() {
        assert_eq!(base_fee(1000, FeeRate::new(1000)), 1000);
        assert_eq!(base_fee(1001, FeeRate::new(1000)), 1001);
        assert_eq!(base_fee(999, FeeRate::new(1)), 1);
    }

    #[test]
    fn quantized_fee_is_on_the_grid_and_covers_the_estimate() {
        for raw in [0u64, 1, 1248, 1249, 1250, 40_000] {
            let fee = quantize(raw);
            assert_eq!(fee % FEE_GRANULARITY, 0);
            assert!(fee >= raw);
            assert!(fee - raw < FEE_GRANULARITY);
        }
    }
}
