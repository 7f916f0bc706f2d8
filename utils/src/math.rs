//! Basis-point arithmetic shared by the voting and slashing engines.

/// Basis-point denominator (10_000 = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// `amount * bps / 10_000`, saturating on the multiply.
///
/// Saturation only matters for amounts within a factor of 10^4 of
/// `u128::MAX`; protocol stake totals never get near that.
pub fn bps_of(amount: u128, bps: u32) -> u128 {
    amount.saturating_mul(bps as u128) / BPS_DENOMINATOR
}
