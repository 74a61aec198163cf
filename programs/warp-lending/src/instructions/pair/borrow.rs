// =============================================================================
// Borrow Instruction
// =============================================================================
// Lends borrow-asset ledger shares from the pair's cash against
// `debt_owner`'s collateral and pays them to `to`.
//
// Checks, in order:
// - Borrow action not paused
// - debt + amount <= collateral_value / collateral_factor (valued in USD)
// - pair cash covers the amount
// - total_borrows + amount within the pair debt limit
// - a signer other than the debt owner spends a BorrowAllowance
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Borrowed;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending::{self, PairQuotes};
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{AssetTotals, BorrowAllowance, LendingPair, Position, PriceOracle, ShareBalance};

#[derive(Accounts)]
#[instruction(amount: u64, debt_owner: Pubkey, to: Pubkey)]
pub struct BorrowFromPair<'info> {
    /// Account taking the loan, the debt owner or a delegate
    /// Must sign; pays for the recipient balance on first use
    #[account(mut)]
    pub borrower: Signer<'info>,

    /// Pair being borrowed from
    /// Accrues interest before the loan
    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Position that carries the debt and its collateral
    #[account(
        mut,
        seeds = [POSITION_SEED, pair.key().as_ref(), debt_owner.as_ref()],
        bump = debt_position.bump
    )]
    pub debt_position: Box<Account<'info, Position>>,

    /// Required when the borrower is not the debt owner
    #[account(
        mut,
        constraint = borrow_allowance.pair == pair.key()
            && borrow_allowance.owner == debt_owner
            && borrow_allowance.delegate == borrower.key() @ WarpError::BorrowAllowanceExceeded
    )]
    pub borrow_allowance: Option<Account<'info, BorrowAllowance>>,

    /// Borrow-asset shares held by the pair, its cash
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    /// Ledger balance receiving the borrowed shares
    ///
    /// Constraints:
    /// - `to` is not the pair
    ///
    /// init_if_needed: Created the first time `to` holds the borrow asset
    #[account(
        init_if_needed,
        payer = borrower,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), to.as_ref()],
        bump,
        constraint = to != pair.key() @ WarpError::InvalidToAddress
    )]
    pub to_balance: Account<'info, ShareBalance>,

    // =========================================================================
    // Pricing
    // =========================================================================

    #[account(
        seeds = [ASSET_SEED, pair.collateral_mint.as_ref()],
        bump = collateral_totals.bump
    )]
    pub collateral_totals: Box<Account<'info, AssetTotals>>,

    #[account(
        seeds = [ASSET_SEED, pair.borrow_mint.as_ref()],
        bump = borrow_totals.bump
    )]
    pub borrow_totals: Box<Account<'info, AssetTotals>>,

    #[account(
        seeds = [ORACLE_SEED, pair.collateral_mint.as_ref()],
        bump = collateral_oracle.bump
    )]
    pub collateral_oracle: Account<'info, PriceOracle>,

    #[account(
        seeds = [ORACLE_SEED, pair.borrow_mint.as_ref()],
        bump = borrow_oracle.bump
    )]
    pub borrow_oracle: Account<'info, PriceOracle>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `amount` - Borrow-asset ledger shares to borrow
/// * `debt_owner` - Position the debt is booked on
/// * `to` - Receiver of the borrowed ledger shares
pub fn handler_borrow<'info>(
    ctx: Context<'_, '_, '_, 'info, BorrowFromPair<'info>>,
    amount: u64,
    debt_owner: Pubkey,
    to: Pubkey,
) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);

    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let borrower = accounts.borrower.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;

    let quotes = PairQuotes::new(
        &accounts.pair,
        &*accounts.collateral_oracle,
        &accounts.collateral_totals,
        &*accounts.borrow_oracle,
        &accounts.borrow_totals,
    );

    accounts
        .to_balance
        .bind(accounts.pair.borrow_mint, to, ctx.bumps.to_balance);

    lending::borrow(
        &mut accounts.pair,
        &mut accounts.debt_position,
        &borrower,
        accounts.borrow_allowance.as_deref_mut(),
        &mut accounts.pair_borrow,
        &mut accounts.to_balance,
        amount,
        &quotes,
    )?;

    emit!(Borrowed {
        pair: pair_key,
        debt_owner,
        borrower,
        to,
        amount,
    });

    msg!("Borrowed {} against position of {}", amount, debt_owner);
    msg!(
        "Debt now {}, pair total borrows {}",
        accounts.pair.debt_of(&accounts.debt_position)?,
        accounts.pair.total_borrows
    );

    sync_rewards(
        &accounts.pair,
        &accounts.borrower.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[RewardUpdate::debt(&accounts.pair, &accounts.debt_position)?],
    )
}
