// =============================================================================
// Redeem Instruction
// =============================================================================
// Burns the signer's wrapped borrow shares (0 = all of them) and pays
// borrow_shares * exchange_rate ledger shares out of the pair's cash to `to`.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Redeemed;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending;
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{LendingPair, Position, ShareBalance};

#[derive(Accounts)]
#[instruction(borrow_shares: u64, to: Pubkey)]
pub struct RedeemFromPair<'info> {
    /// Holder of the wrapped borrow shares
    /// Must sign; pays for the recipient balance on first use
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// The owner's position, its wrapped borrow shares are burned
    #[account(
        mut,
        seeds = [POSITION_SEED, pair.key().as_ref(), owner.key().as_ref()],
        bump = owner_position.bump
    )]
    pub owner_position: Box<Account<'info, Position>>,

    /// Borrow-asset shares held by the pair
    ///
    /// Constraints:
    /// - Only cash above reserves can leave
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    /// Ledger balance receiving the redeemed shares
    ///
    /// init_if_needed: Created the first time `to` holds the borrow asset
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), to.as_ref()],
        bump,
        constraint = to != pair.key() @ WarpError::InvalidToAddress
    )]
    pub to_balance: Account<'info, ShareBalance>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `borrow_shares` - Wrapped borrow shares to burn, 0 for all
/// * `to` - Receiver of the ledger shares
pub fn handler_redeem<'info>(
    ctx: Context<'_, '_, '_, 'info, RedeemFromPair<'info>>,
    borrow_shares: u64,
    to: Pubkey,
) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);

    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;

    accounts
        .to_balance
        .bind(accounts.pair.borrow_mint, to, ctx.bumps.to_balance);

    let (burned, amount) = lending::redeem(
        &mut accounts.pair,
        &mut accounts.owner_position,
        &mut accounts.pair_borrow,
        &mut accounts.to_balance,
        borrow_shares,
    )?;

    emit!(Redeemed {
        pair: pair_key,
        owner: accounts.owner.key(),
        to,
        borrow_shares: burned,
        amount,
    });

    msg!("Redeemed {} wrapped borrow shares for {}", burned, amount);

    sync_rewards(
        &accounts.pair,
        &accounts.owner.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[RewardUpdate::borrow_asset(&accounts.owner_position)],
    )
}
