use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{DISTRIBUTOR_SEED, REWARD_VAULT_SEED, USER_REWARD_SEED};
use crate::error::RewardsError;
use crate::events::Withdraw;
use crate::state::{RewardDistributor, RewardPool, UserReward};

// =============================================================================
// Withdraw
// =============================================================================

/// Pay out a user's rewards from one pool
///
/// Silent no-op when nothing is claimable, including after the grace period.
#[derive(Accounts)]
pub struct WithdrawReward<'info> {
    pub user: Signer<'info>,

    #[account(
        seeds = [DISTRIBUTOR_SEED, distributor.reward_mint.as_ref(), &distributor.id.to_le_bytes()],
        bump = distributor.bump
    )]
    pub distributor: Account<'info, RewardDistributor>,

    #[account(
        mut,
        has_one = distributor @ RewardsError::InvalidRewardPool
    )]
    pub pool: Account<'info, RewardPool>,

    #[account(
        mut,
        seeds = [USER_REWARD_SEED, pool.key().as_ref(), user.key().as_ref()],
        bump = user_reward.bump
    )]
    pub user_reward: Account<'info, UserReward>,

    #[account(
        mut,
        seeds = [REWARD_VAULT_SEED, distributor.key().as_ref()],
        bump = distributor.vault_bump
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Receives the rewards
    #[account(
        mut,
        constraint = destination.mint == distributor.reward_mint @ RewardsError::InvalidRewardPool
    )]
    pub destination: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler_withdraw(ctx: Context<WithdrawReward>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let distributor = &ctx.accounts.distributor;

    ctx.accounts.pool.update(distributor, now)?;

    // Fold pending rewards in at the unchanged balance
    let user_reward = &mut ctx.accounts.user_reward;
    let staked = user_reward.staked_amount;
    user_reward.checkpoint(&mut ctx.accounts.pool, staked)?;

    if distributor.grace_period_over(now)? {
        msg!("Claim period is over, rewards are left for the guardian sweep");
        return Ok(());
    }

    let amount = user_reward.accumulated;
    if amount == 0 {
        msg!("No rewards to withdraw");
        return Ok(());
    }

    require!(
        ctx.accounts.reward_vault.amount >= amount,
        RewardsError::InsufficientRewardBalance
    );

    let id_bytes = distributor.id.to_le_bytes();
    let seeds = &[
        DISTRIBUTOR_SEED,
        distributor.reward_mint.as_ref(),
        id_bytes.as_ref(),
        &[distributor.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reward_vault.to_account_info(),
                to: ctx.accounts.destination.to_account_info(),
                authority: ctx.accounts.distributor.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    user_reward.accumulated = 0;

    emit!(Withdraw {
        pool: ctx.accounts.pool.key(),
        user: user_reward.user,
        to: ctx.accounts.destination.owner,
        amount,
    });

    msg!("Withdrew {} rewards to {}", amount, ctx.accounts.destination.key());

    Ok(())
}

// =============================================================================
// Pending Reward (view)
// =============================================================================

#[derive(Accounts)]
pub struct PendingReward<'info> {
    pub distributor: Account<'info, RewardDistributor>,

    #[account(has_one = distributor @ RewardsError::InvalidRewardPool)]
    pub pool: Account<'info, RewardPool>,

    #[account(constraint = user_reward.pool == pool.key() @ RewardsError::InvalidRewardPool)]
    pub user_reward: Account<'info, UserReward>,
}

pub fn handler_pending_reward(ctx: Context<PendingReward>) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let claimable = ctx
        .accounts
        .user_reward
        .claimable(&ctx.accounts.pool, &ctx.accounts.distributor, now)?;

    msg!("Pending reward for {}: {}", ctx.accounts.user_reward.user, claimable);

    Ok(claimable)
}
