use anchor_lang::prelude::*;

use crate::constants::MANAGER_SEED;
use crate::error::RewardsError;
use crate::state::RewardManager;

/// Create the distributor registry
///
/// # Arguments
/// * `owner` - Account that approves distributors (must not be default)
///
#[derive(Accounts)]
pub struct InitializeManager<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + RewardManager::INIT_SPACE,
        seeds = [MANAGER_SEED],
        bump
    )]
    pub manager: Account<'info, RewardManager>,

    pub system_program: Program<'info, System>,
}

pub fn handler_initialize_manager(ctx: Context<InitializeManager>, owner: Pubkey) -> Result<()> {
    require!(owner != Pubkey::default(), RewardsError::InvalidOwner);

    let manager = &mut ctx.accounts.manager;
    manager.owner = owner;
    manager.pending_owner = Pubkey::default();
    manager.bump = ctx.bumps.manager;

    msg!("Reward manager initialized, owner {}", owner);

    Ok(())
}
