//! Fixed-point helpers for share and fee accounting.
//!
//! Every amount is an `i128` in the token's smallest unit. All operations are
//! checked; an overflow or a zero divisor surfaces as
//! [`VaultError::ArithmeticError`] instead of trapping the host.

use crate::VaultError;

/// Fixed-point unit for `price_per_share` (1e18).
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// Denominator for every basis-point rate.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// 365 days. Management fees and strategy yield accrue linearly over this period.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// `a * b / denominator`, rounding toward zero.
pub fn mul_div(a: i128, b: i128, denominator: i128) -> Result<i128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::ArithmeticError);
    }
    a.checked_mul(b)
        .and_then(|product| product.checked_div(denominator))
        .ok_or(VaultError::ArithmeticError)
}

/// `amount * bps / 10_000`.
pub fn apply_bps(amount: i128, bps: u32) -> Result<i128, VaultError> {
    mul_div(amount, bps as i128, BPS_DENOMINATOR as i128)
}

/// Linear accrual of an annual basis-point rate over `elapsed` seconds:
/// `amount * bps * elapsed / (10_000 * SECONDS_PER_YEAR)`.
pub fn accrue_annual(amount: i128, annual_bps: u32, elapsed: u64) -> Result<i128, VaultError> {
    let rate = (annual_bps as i128)
        .checked_mul(elapsed as i128)
        .ok_or(VaultError::ArithmeticError)?;
    let period = (BPS_DENOMINATOR as i128)
        .checked_mul(SECONDS_PER_YEAR as i128)
        .ok_or(VaultError::ArithmeticError)?;
    mul_div(amount, rate, period)
}

pub fn checked_add(a: i128, b: i128) -> Result<i128, VaultError> {
    a.checked_add(b).ok_or(VaultError::ArithmeticError)
}

pub fn checked_sub(a: i128, b: i128) -> Result<i128, VaultError> {
    a.checked_sub(b).ok_or(VaultError::ArithmeticError)
}
