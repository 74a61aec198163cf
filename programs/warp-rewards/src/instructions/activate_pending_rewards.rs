use anchor_lang::prelude::*;

use crate::constants::{DISTRIBUTOR_STATUS_SEED, TOKEN_REWARDS_SEED};
use crate::error::RewardsError;
use crate::events::{AddReward, RewardsActivated};
use crate::instructions::set_distribution::update_listed_pools;
use crate::state::{DistributorStatus, RewardDistributor, TokenRewards};

/// Register the distributor with the manager for one pair and start accrual
///
/// Requires the manager owner to have approved the distributor. Pools passed
/// as remaining accounts are settled first so accrual starts from activation.
#[derive(Accounts)]
#[instruction(pair: Pubkey)]
pub struct ActivatePendingRewards<'info> {
    #[account(mut)]
    pub guardian: Signer<'info>,

    #[account(
        mut,
        has_one = guardian @ RewardsError::OnlyGuardian
    )]
    pub distributor: Account<'info, RewardDistributor>,

    #[account(
        init_if_needed,
        payer = guardian,
        space = 8 + DistributorStatus::INIT_SPACE,
        seeds = [DISTRIBUTOR_STATUS_SEED, distributor.key().as_ref()],
        bump
    )]
    pub distributor_status: Account<'info, DistributorStatus>,

    #[account(
        init_if_needed,
        payer = guardian,
        space = 8 + TokenRewards::INIT_SPACE,
        seeds = [TOKEN_REWARDS_SEED, pair.as_ref()],
        bump
    )]
    pub token_rewards: Account<'info, TokenRewards>,

    pub system_program: Program<'info, System>,
}

pub fn handler_activate_pending_rewards<'info>(
    ctx: Context<'_, '_, 'info, 'info, ActivatePendingRewards<'info>>,
    pair: Pubkey,
) -> Result<()> {
    let distributor_key = ctx.accounts.distributor.key();

    require!(
        ctx.accounts.distributor_status.approved,
        RewardsError::OnlyApprovedDistributor
    );
    require!(
        ctx.accounts.distributor.has_pair(&pair),
        RewardsError::UnknownToken
    );

    let now = Clock::get()?.unix_timestamp;
    update_listed_pools(
        distributor_key,
        &ctx.accounts.distributor,
        ctx.remaining_accounts,
        &[],
        now,
    )?;

    let token_rewards = &mut ctx.accounts.token_rewards;
    if token_rewards.token == Pubkey::default() {
        token_rewards.token = pair;
        token_rewards.bump = ctx.bumps.token_rewards;
    }
    token_rewards.add_distributor(distributor_key)?;

    ctx.accounts.distributor.activated = true;

    emit!(AddReward {
        token: pair,
        distributor: distributor_key,
    });
    emit!(RewardsActivated {
        distributor: distributor_key,
        pair,
    });

    msg!("Rewards activated for pair {} by {}", pair, distributor_key);

    Ok(())
}
