// =============================================================================
// Fixed-point helpers
// =============================================================================
// WAD (1e18) ratios over u128 intermediates. Every result rounds down.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::error::WarpError;

/// (a * b) / WAD
pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    a.checked_mul(b)
        .ok_or(WarpError::MathOverflow)?
        .checked_div(WAD)
        .ok_or(error!(WarpError::DivisionByZero))
}

/// (a * WAD) / b
pub fn wad_div(a: u128, b: u128) -> Result<u128> {
    require!(b != 0, WarpError::DivisionByZero);
    a.checked_mul(WAD)
        .ok_or(WarpError::MathOverflow)?
        .checked_div(b)
        .ok_or(error!(WarpError::DivisionByZero))
}

/// (value * numerator) / denominator, floor
pub fn mul_div(value: u128, numerator: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, WarpError::DivisionByZero);
    value
        .checked_mul(numerator)
        .ok_or(WarpError::MathOverflow)?
        .checked_div(denominator)
        .ok_or(error!(WarpError::DivisionByZero))
}

/// (value * numerator) / denominator, rounded up
pub fn mul_div_ceil(value: u128, numerator: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, WarpError::DivisionByZero);
    let product = value
        .checked_mul(numerator)
        .ok_or(WarpError::MathOverflow)?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Ok(quotient)
    } else {
        quotient
            .checked_add(1)
            .ok_or(error!(WarpError::MathOverflow))
    }
}

pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(WarpError::MathOverflow))
}

pub fn pow10(decimals: u8) -> Result<u128> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or(error!(WarpError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wad_ops_round_down() {
        assert_eq!(wad_mul(WAD / 2, 3).unwrap(), 1);
        assert_eq!(wad_div(1, 3).unwrap(), 333_333_333_333_333_333);
        assert!(wad_div(1, 0).is_err());
    }

    #[test]
    fn ceil_only_rounds_remainders() {
        assert_eq!(mul_div_ceil(10, 3, 5).unwrap(), 6);
        assert_eq!(mul_div_ceil(10, 3, 4).unwrap(), 8);
        assert_eq!(mul_div(10, 3, 4).unwrap(), 7);
    }

    #[test]
    fn to_u64_rejects_overflow() {
        assert!(to_u64(u64::MAX as u128 + 1).is_err());
        assert_eq!(pow10(8).unwrap(), 100_000_000);
    }
}
