use anchor_lang::prelude::*;

use crate::error::WarpError;
use crate::math::{mul_div, mul_div_ceil, pow10, to_u64};
use crate::state::AssetTotals;

/// Anything that can quote an asset in USD with 8 decimals
pub trait PriceSource {
    fn price_in_usd(&self) -> Result<u128>;
}

/// Admin-registered price of one mint
/// PDA: ["oracle", mint]
#[account]
#[derive(InitSpace, Default)]
pub struct PriceOracle {
    pub mint: Pubkey,

    /// USD price with 8 decimals, zero means unusable
    pub price: u64,

    pub last_update_slot: u64,
    pub bump: u8,
}

impl PriceSource for PriceOracle {
    fn price_in_usd(&self) -> Result<u128> {
        require!(self.price > 0, WarpError::InvalidPrice);
        Ok(self.price as u128)
    }
}

/// Prices ledger shares of one asset
///
/// value = price * to_underlying(shares) / 10^decimals, in 8-decimal USD.
/// An unusable price only fails when a value is actually needed.
#[derive(Clone)]
pub struct AssetQuote {
    pub price: Option<u128>,
    pub decimals: u8,
    pub totals: AssetTotals,
}

impl AssetQuote {
    pub fn new(source: &impl PriceSource, totals: &AssetTotals, decimals: u8) -> Self {
        Self {
            price: source.price_in_usd().ok(),
            decimals,
            totals: totals.clone(),
        }
    }

    fn price(&self) -> Result<u128> {
        self.price.ok_or(error!(WarpError::InvalidPrice))
    }

    pub fn value_of(&self, shares: u64) -> Result<u128> {
        let underlying = self.totals.to_underlying(shares)?;
        mul_div(underlying as u128, self.price()?, pow10(self.decimals)?)
    }

    /// value_of rounded up, for debts
    pub fn value_of_ceil(&self, shares: u64) -> Result<u128> {
        let underlying = self.totals.to_underlying(shares)?;
        mul_div_ceil(underlying as u128, self.price()?, pow10(self.decimals)?)
    }

    /// Fewest shares whose value_of is at least `value`
    pub fn shares_covering(&self, value: u128) -> Result<u64> {
        let underlying = mul_div_ceil(value, pow10(self.decimals)?, self.price()?)?;
        let totals = &self.totals;
        if totals.total_shares_minted == 0 || totals.total_underlying_deposit == 0 {
            return to_u64(underlying);
        }
        to_u64(mul_div_ceil(
            underlying,
            totals.total_shares_minted as u128,
            totals.total_underlying_deposit as u128,
        )?)
    }
}
