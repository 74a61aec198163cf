// =============================================================================
// Withdraw Collateral Instruction
// =============================================================================
// Unwraps the signer's collateral back into collateral ledger shares.
// amount = 0 withdraws everything not needed to carry the current debt.
// Whatever stays behind must still satisfy the collateral guard.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::CollateralWithdrawn;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending::{self, PairQuotes};
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{AssetTotals, LendingPair, Position, PriceOracle, ShareBalance};

#[derive(Accounts)]
pub struct WithdrawCollateralFromPair<'info> {
    /// Position owner
    /// Must sign; pays for the collateral balance on first use
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// The owner's position, must stay healthy after the withdrawal
    #[account(
        mut,
        seeds = [POSITION_SEED, pair.key().as_ref(), owner.key().as_ref()],
        bump = owner_position.bump
    )]
    pub owner_position: Box<Account<'info, Position>>,

    /// Collateral shares held by the pair, debited
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.collateral_mint.as_ref(), pair.key().as_ref()],
        bump = pair_collateral.bump
    )]
    pub pair_collateral: Account<'info, ShareBalance>,

    #[account(
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    /// Ledger balance receiving the collateral shares
    ///
    /// init_if_needed: Created the first time the owner holds this asset
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, pair.collateral_mint.as_ref(), owner.key().as_ref()],
        bump
    )]
    pub owner_collateral: Account<'info, ShareBalance>,

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
/// * `amount` - Wrapped collateral to unwrap, 0 for everything free
pub fn handler_withdraw_collateral<'info>(
    ctx: Context<'_, '_, '_, 'info, WithdrawCollateralFromPair<'info>>,
    amount: u64,
) -> Result<()> {
    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let owner = accounts.owner.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;

    let quotes = PairQuotes::new(
        &accounts.pair,
        &*accounts.collateral_oracle,
        &accounts.collateral_totals,
        &*accounts.borrow_oracle,
        &accounts.borrow_totals,
    );

    accounts
        .owner_collateral
        .bind(accounts.pair.collateral_mint, owner, ctx.bumps.owner_collateral);

    let withdrawn = lending::withdraw_collateral(
        &mut accounts.pair,
        &mut accounts.owner_position,
        &mut accounts.pair_collateral,
        &mut accounts.owner_collateral,
        amount,
        &quotes,
    )?;

    emit!(CollateralWithdrawn {
        pair: pair_key,
        owner,
        to: owner,
        amount: withdrawn,
    });

    msg!("Withdrew {} collateral", withdrawn);
    msg!("Collateral left in position: {}", accounts.owner_position.collateral);

    sync_rewards(
        &accounts.pair,
        &accounts.owner.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[RewardUpdate::collateral(&accounts.owner_position)],
    )
}
