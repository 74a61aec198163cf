// =============================================================================
// Interest Accrual
// =============================================================================
// Every pair instruction that touches balances accrues first, so exchange
// rates and debts are always priced at the current slot. accrue_interest is
// also callable by anyone.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::InterestAccrued;
use crate::state::{LendingPair, RateCurve, ShareBalance};

/// Accrues `pair` up to the current slot and logs any interest added
pub fn accrue_pair(pair: &mut LendingPair, pair_key: Pubkey, cash: u64) -> Result<u64> {
    let slot = Clock::get()?.slot;
    let interest = pair.accrue_interest(cash, slot)?;

    if interest > 0 {
        emit!(InterestAccrued {
            pair: pair_key,
            interest,
            total_borrows: pair.total_borrows,
            total_reserves: pair.total_reserves,
            borrow_index: pair.borrow_index,
            slot,
        });
        msg!(
            "Accrued {} interest, total borrows {}, reserves {}",
            interest,
            pair.total_borrows,
            pair.total_reserves
        );
    }

    Ok(interest)
}

#[derive(Accounts)]
pub struct AccrueInterest<'info> {
    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    #[account(
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,
}

pub fn handler_accrue_interest(ctx: Context<AccrueInterest>) -> Result<()> {
    let pair_key = ctx.accounts.pair.key();
    let cash = ctx.accounts.pair_borrow.shares;
    accrue_pair(&mut ctx.accounts.pair, pair_key, cash)?;
    Ok(())
}

/// Current per-slot rates and exchange rate of a pair, all WAD
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairRates {
    pub borrow_rate_per_slot: u128,
    pub supply_rate_per_slot: u128,
    pub exchange_rate: u128,
}

#[derive(Accounts)]
pub struct PairView<'info> {
    #[account(
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    #[account(
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,
}

/// Rates as of the last accrual
pub fn handler_pair_rates(ctx: Context<PairView>) -> Result<PairRates> {
    let pair = &ctx.accounts.pair;
    let cash = ctx.accounts.pair_borrow.shares;
    let model = &pair.interest_rate_model;

    Ok(PairRates {
        borrow_rate_per_slot: model.borrow_rate_per_period(
            cash,
            pair.total_borrows,
            pair.total_reserves,
        )?,
        supply_rate_per_slot: model.supply_rate_per_period(
            cash,
            pair.total_borrows,
            pair.total_reserves,
            pair.reserve_factor,
        )?,
        exchange_rate: pair.exchange_rate(cash)?,
    })
}
