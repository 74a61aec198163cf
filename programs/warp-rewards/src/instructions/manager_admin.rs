use anchor_lang::prelude::*;

use crate::constants::{DISTRIBUTOR_STATUS_SEED, MANAGER_SEED, TOKEN_REWARDS_SEED};
use crate::error::RewardsError;
use crate::events::{DistributorStatusUpdated, OwnershipAccepted, RemoveReward, TransferControl};
use crate::state::{DistributorStatus, RewardManager, TokenRewards};

// =============================================================================
// Set Distributor Status
// =============================================================================

#[derive(Accounts)]
#[instruction(distributor: Pubkey)]
pub struct SetDistributorStatus<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [MANAGER_SEED],
        bump = manager.bump,
        has_one = owner @ RewardsError::OnlyOwner
    )]
    pub manager: Account<'info, RewardManager>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + DistributorStatus::INIT_SPACE,
        seeds = [DISTRIBUTOR_STATUS_SEED, distributor.as_ref()],
        bump
    )]
    pub distributor_status: Account<'info, DistributorStatus>,

    pub system_program: Program<'info, System>,
}

pub fn handler_set_distributor_status(
    ctx: Context<SetDistributorStatus>,
    distributor: Pubkey,
    approved: bool,
) -> Result<()> {
    let status = &mut ctx.accounts.distributor_status;
    status.distributor = distributor;
    status.approved = approved;
    status.bump = ctx.bumps.distributor_status;

    emit!(DistributorStatusUpdated { distributor, approved });

    msg!(
        "Distributor {} {}",
        distributor,
        if approved { "APPROVED" } else { "REVOKED" }
    );

    Ok(())
}

// =============================================================================
// Remove Reward
// =============================================================================

#[derive(Accounts)]
#[instruction(token: Pubkey)]
pub struct RemoveRewardDistributor<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [MANAGER_SEED],
        bump = manager.bump,
        has_one = owner @ RewardsError::OnlyOwner
    )]
    pub manager: Account<'info, RewardManager>,

    #[account(
        mut,
        seeds = [TOKEN_REWARDS_SEED, token.as_ref()],
        bump = token_rewards.bump
    )]
    pub token_rewards: Account<'info, TokenRewards>,
}

pub fn handler_remove_reward(
    ctx: Context<RemoveRewardDistributor>,
    token: Pubkey,
    distributor: Pubkey,
) -> Result<()> {
    ctx.accounts.token_rewards.remove_distributor(&distributor)?;

    emit!(RemoveReward { token, distributor });

    msg!("Distributor {} removed from token {}", distributor, token);

    Ok(())
}

// =============================================================================
// Ownership (two-step)
// =============================================================================

#[derive(Accounts)]
pub struct TransferManagerOwnership<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [MANAGER_SEED],
        bump = manager.bump,
        has_one = owner @ RewardsError::OnlyOwner
    )]
    pub manager: Account<'info, RewardManager>,
}

pub fn handler_transfer_manager_ownership(
    ctx: Context<TransferManagerOwnership>,
    new_owner: Pubkey,
) -> Result<()> {
    let manager = &mut ctx.accounts.manager;
    manager.stage_owner(new_owner)?;

    emit!(TransferControl {
        owner: manager.owner,
        pending_owner: new_owner,
    });

    msg!("Manager ownership transfer started to {}", new_owner);

    Ok(())
}

#[derive(Accounts)]
pub struct AcceptManagerOwnership<'info> {
    pub pending_owner: Signer<'info>,

    #[account(
        mut,
        seeds = [MANAGER_SEED],
        bump = manager.bump
    )]
    pub manager: Account<'info, RewardManager>,
}

pub fn handler_accept_manager_ownership(ctx: Context<AcceptManagerOwnership>) -> Result<()> {
    let caller = ctx.accounts.pending_owner.key();
    let previous_owner = ctx.accounts.manager.accept_owner(caller)?;

    emit!(OwnershipAccepted {
        previous_owner,
        new_owner: caller,
    });

    msg!("Manager ownership accepted by {}", caller);

    Ok(())
}
