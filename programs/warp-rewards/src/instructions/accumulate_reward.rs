use anchor_lang::prelude::*;

use crate::constants::USER_REWARD_SEED;
use crate::error::RewardsError;
use crate::events::RewardAccumulated;
use crate::state::{RewardDistributor, RewardKind, RewardPool, UserReward};

/// Balance-change hook called by a lending pair
///
/// The pair PDA signs, so only the pair a pool was created for can move its
/// stake. Works on inactive distributors too: the stake is recorded and
/// accrual starts once rewards are activated.
///
/// # Arguments
/// * `kind` - Which pair balance changed
/// * `user` - Owner of the balance
/// * `new_balance` - Balance after the pair operation
#[derive(Accounts)]
#[instruction(kind: RewardKind, user: Pubkey)]
pub struct AccumulateReward<'info> {
    /// Lending pair PDA reporting the balance
    pub pair: Signer<'info>,

    /// Pays for the user's reward account on first report
    #[account(mut)]
    pub payer: Signer<'info>,

    pub distributor: Account<'info, RewardDistributor>,

    #[account(
        mut,
        has_one = distributor @ RewardsError::InvalidRewardPool,
        constraint = pool.pair == pair.key() @ RewardsError::OnlyLendingPair,
        constraint = pool.kind == kind @ RewardsError::InvalidRewardKind
    )]
    pub pool: Account<'info, RewardPool>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + UserReward::INIT_SPACE,
        seeds = [USER_REWARD_SEED, pool.key().as_ref(), user.as_ref()],
        bump
    )]
    pub user_reward: Account<'info, UserReward>,

    pub system_program: Program<'info, System>,
}

pub fn handler_accumulate_reward(
    ctx: Context<AccumulateReward>,
    kind: RewardKind,
    user: Pubkey,
    new_balance: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();

    ctx.accounts.pool.update(&ctx.accounts.distributor, now)?;

    let user_reward = &mut ctx.accounts.user_reward;
    if user_reward.user == Pubkey::default() {
        user_reward.pool = pool_key;
        user_reward.user = user;
        user_reward.bump = ctx.bumps.user_reward;
    }

    let folded = user_reward.checkpoint(&mut ctx.accounts.pool, new_balance)?;

    emit!(RewardAccumulated {
        pool: pool_key,
        kind,
        user,
        staked_amount: new_balance,
        accumulated: user_reward.accumulated,
    });

    msg!(
        "{:?} balance of {} is {}, folded {} rewards",
        kind,
        user,
        new_balance,
        folded
    );

    Ok(())
}
