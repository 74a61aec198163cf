use anchor_lang::prelude::*;

use crate::error::WarpError;
use crate::math::{mul_div, to_u64};

/// Which wrapped balance of a position an operation touches
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum WrappedKind {
    Collateral,
    BorrowShares,
}

impl WrappedKind {
    /// Seed byte of per-kind PDAs
    pub fn seed(&self) -> u8 {
        match self {
            WrappedKind::Collateral => 0,
            WrappedKind::BorrowShares => 1,
        }
    }
}

/// One account's wrapped balances and debt in a pair
/// PDA: ["position", pair, owner]
#[account]
#[derive(InitSpace, Default)]
pub struct Position {
    pub pair: Pubkey,
    pub owner: Pubkey,

    /// Wrapped collateral, 1:1 with collateral ledger shares held by the pair
    pub collateral: u64,

    /// Wrapped borrow shares, redeemable at the pair exchange rate
    pub borrow_shares: u64,

    /// Debt at the last change, grows with borrow_index / debt_index
    pub debt_principal: u64,

    /// Pair borrow_index when debt_principal was set
    pub debt_index: u128,

    pub bump: u8,
}

impl Position {
    /// Fills the identity fields of a position created with init_if_needed
    pub fn bind(&mut self, pair: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.pair = pair;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn current_debt(&self, borrow_index: u128) -> Result<u64> {
        if self.debt_principal == 0 || self.debt_index == 0 {
            return Ok(0);
        }
        to_u64(mul_div(
            self.debt_principal as u128,
            borrow_index,
            self.debt_index,
        )?)
    }

    /// Rebase the debt to `borrow_index`
    pub fn set_debt(&mut self, debt: u64, borrow_index: u128) {
        self.debt_principal = debt;
        self.debt_index = if debt == 0 { 0 } else { borrow_index };
    }

    pub fn wrapped(&self, kind: WrappedKind) -> u64 {
        match kind {
            WrappedKind::Collateral => self.collateral,
            WrappedKind::BorrowShares => self.borrow_shares,
        }
    }

    pub fn credit(&mut self, kind: WrappedKind, amount: u64) -> Result<()> {
        let balance = match kind {
            WrappedKind::Collateral => &mut self.collateral,
            WrappedKind::BorrowShares => &mut self.borrow_shares,
        };
        *balance = balance
            .checked_add(amount)
            .ok_or(WarpError::MathOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, kind: WrappedKind, amount: u64) -> Result<()> {
        let balance = match kind {
            WrappedKind::Collateral => &mut self.collateral,
            WrappedKind::BorrowShares => &mut self.borrow_shares,
        };
        *balance = balance
            .checked_sub(amount)
            .ok_or(WarpError::NotEnoughBalance)?;
        Ok(())
    }
}

/// Signed grant letting `delegate` borrow against `owner`'s collateral
/// PDA: ["borrow_allowance", pair, owner, delegate]
#[account]
#[derive(InitSpace, Default)]
pub struct BorrowAllowance {
    pub pair: Pubkey,
    pub owner: Pubkey,
    pub delegate: Pubkey,
    pub amount: u64,
    pub bump: u8,
}

impl BorrowAllowance {
    pub fn consume(&mut self, amount: u64) -> Result<()> {
        self.amount = self
            .amount
            .checked_sub(amount)
            .ok_or(WarpError::BorrowAllowanceExceeded)?;
        Ok(())
    }
}

/// ERC20-style allowance over one kind of an owner's wrapped balance
/// PDA: ["wrapped_allowance", pair, owner, spender, kind]
#[account]
#[derive(InitSpace)]
pub struct WrappedAllowance {
    pub pair: Pubkey,
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub kind: WrappedKind,
    pub amount: u64,
    pub bump: u8,
}

impl WrappedAllowance {
    pub fn increase(&mut self, amount: u64) -> Result<()> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or(WarpError::MathOverflow)?;
        Ok(())
    }

    pub fn decrease(&mut self, amount: u64) -> Result<()> {
        self.amount = self
            .amount
            .checked_sub(amount)
            .ok_or(WarpError::WrappedAllowanceExceeded)?;
        Ok(())
    }
}
