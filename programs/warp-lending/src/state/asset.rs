// =============================================================================
// Ledger asset accounting
// =============================================================================
// Every asset is tracked as shares over underlying. Yield (flash loan fees)
// only ever raises total_underlying_deposit, so the share price never falls.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::MINIMUM_SHARE_BALANCE;
use crate::error::WarpError;
use crate::math::{mul_div, to_u64};

/// Totals of one asset held by the vault
/// PDA: ["asset", mint]
#[account]
#[derive(InitSpace, Default)]
pub struct AssetTotals {
    pub mint: Pubkey,

    /// Sum of every ShareBalance of this asset
    pub total_shares_minted: u64,

    /// Underlying owed to share holders (excludes stray reserve tokens)
    pub total_underlying_deposit: u64,

    /// Set while a flash loan callback runs
    pub flash_loan_active: bool,

    pub bump: u8,
    pub reserve_bump: u8,
}

impl AssetTotals {
    /// Shares worth `amount` underlying, rounded down
    ///
    /// 1:1 while the asset is empty.
    pub fn to_shares(&self, amount: u64) -> Result<u64> {
        if self.total_shares_minted == 0 || self.total_underlying_deposit == 0 {
            return Ok(amount);
        }
        to_u64(mul_div(
            amount as u128,
            self.total_shares_minted as u128,
            self.total_underlying_deposit as u128,
        )?)
    }

    /// Underlying backing `shares`, rounded down
    pub fn to_underlying(&self, shares: u64) -> Result<u64> {
        if self.total_shares_minted == 0 {
            return Ok(shares);
        }
        to_u64(mul_div(
            shares as u128,
            self.total_underlying_deposit as u128,
            self.total_shares_minted as u128,
        )?)
    }

    /// Flash loans can draw on every deposited unit
    pub fn max_flash_loan(&self) -> u64 {
        self.total_underlying_deposit
    }

    /// Books a deposit and returns the shares to credit
    pub fn record_deposit(&mut self, amount: u64) -> Result<u64> {
        require!(amount > 0, WarpError::InvalidAmount);
        let shares = self.to_shares(amount)?;
        require!(shares > 0, WarpError::InvalidAmount);

        self.total_shares_minted = self
            .total_shares_minted
            .checked_add(shares)
            .ok_or(WarpError::MathOverflow)?;
        self.total_underlying_deposit = self
            .total_underlying_deposit
            .checked_add(amount)
            .ok_or(WarpError::MathOverflow)?;
        Ok(shares)
    }

    /// Books a withdrawal and returns the underlying to pay out
    pub fn record_withdrawal(&mut self, shares: u64) -> Result<u64> {
        let amount = self.to_underlying(shares)?;

        self.total_shares_minted = self
            .total_shares_minted
            .checked_sub(shares)
            .ok_or(WarpError::InsufficientShares)?;
        self.total_underlying_deposit = self
            .total_underlying_deposit
            .checked_sub(amount)
            .ok_or(WarpError::MathUnderflow)?;
        Ok(amount)
    }

    /// Flash loan fee accrues to every share holder
    pub fn record_fee(&mut self, fee: u64) -> Result<()> {
        self.total_underlying_deposit = self
            .total_underlying_deposit
            .checked_add(fee)
            .ok_or(WarpError::MathOverflow)?;
        Ok(())
    }
}

/// Shares of one asset held by one account (user, pair or fee receiver)
/// PDA: ["share", mint, owner]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct ShareBalance {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub shares: u64,
    pub bump: u8,
}

impl ShareBalance {
    /// Fills the identity fields of a balance created with init_if_needed
    pub fn bind(&mut self, mint: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.mint = mint;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn credit(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or(WarpError::MathOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_sub(shares)
            .ok_or(WarpError::InsufficientShares)?;
        Ok(())
    }

    /// Withdrawals may empty a balance but never leave dust behind
    pub fn require_no_dust(&self) -> Result<()> {
        require!(
            self.shares == 0 || self.shares >= MINIMUM_SHARE_BALANCE,
            WarpError::InvalidRatio
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_deposits_mint_one_to_one() {
        let mut totals = AssetTotals::default();
        assert_eq!(totals.record_deposit(1_000).unwrap(), 1_000);
        assert_eq!(totals.record_deposit(1_000).unwrap(), 1_000);
        assert_eq!(totals.total_shares_minted, 2_000);
        assert_eq!(totals.total_underlying_deposit, 2_000);
    }

    #[test]
    fn stray_reserve_tokens_do_not_move_share_price() {
        // A direct token transfer into the reserve never touches the totals
        let mut totals = AssetTotals::default();
        totals.record_deposit(1_000).unwrap();
        totals.record_deposit(1_000).unwrap();
        assert_eq!(totals.to_underlying(1_000).unwrap(), 1_000);
    }

    #[test]
    fn fees_raise_share_price_without_minting() {
        let mut totals = AssetTotals::default();
        totals.record_deposit(1_000).unwrap();
        totals.record_fee(500).unwrap();

        assert_eq!(totals.total_shares_minted, 1_000);
        assert_eq!(totals.to_underlying(1_000).unwrap(), 1_500);
        assert_eq!(totals.record_deposit(300).unwrap(), 200);
    }

    #[test]
    fn conversions_never_round_in_the_holders_favor() {
        let mut totals = AssetTotals::default();
        totals.record_deposit(1_000).unwrap();
        totals.record_fee(333).unwrap();

        for x in [1u64, 7, 99, 1_000, 12_345] {
            assert!(totals.to_underlying(totals.to_shares(x).unwrap()).unwrap() <= x);
            assert!(totals.to_shares(totals.to_underlying(x).unwrap()).unwrap() <= x);
        }
    }

    #[test]
    fn withdrawal_keeps_totals_covered() {
        let mut totals = AssetTotals::default();
        totals.record_deposit(10_000).unwrap();
        totals.record_fee(10).unwrap();

        let paid = totals.record_withdrawal(3_000).unwrap();
        assert_eq!(paid, 3_003);
        assert_eq!(totals.total_shares_minted, 7_000);
        assert!(totals.total_underlying_deposit >= totals.total_shares_minted);
        assert!(totals.record_withdrawal(7_001).is_err());
    }

    #[test]
    fn dust_balances_are_rejected() {
        let mut balance = ShareBalance { shares: 1_500, ..Default::default() };
        balance.debit(600).unwrap();
        assert!(balance.require_no_dust().is_err());
        balance.debit(900).unwrap();
        assert!(balance.require_no_dust().is_ok());
        assert!(balance.debit(1).is_err());
    }
}
