use anchor_lang::prelude::*;

use crate::error::RewardsError;
use crate::events::UpdateDistribution;
use crate::state::{RewardDistributor, RewardPool};

/// Change one pool's weight
///
/// # Arguments
/// * `alloc_point` - New weight for the pool
/// * `with_update` - Also bring every pool passed as remaining accounts up to date
///   before the total weight changes
#[derive(Accounts)]
pub struct SetAllocPoint<'info> {
    pub guardian: Signer<'info>,

    #[account(
        mut,
        has_one = guardian @ RewardsError::OnlyGuardian
    )]
    pub distributor: Account<'info, RewardDistributor>,

    #[account(
        mut,
        has_one = distributor @ RewardsError::InvalidRewardPool
    )]
    pub pool: Account<'info, RewardPool>,
}

pub fn handler_set_alloc_point<'info>(
    ctx: Context<'_, '_, 'info, 'info, SetAllocPoint<'info>>,
    alloc_point: u64,
    with_update: bool,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let distributor_key = ctx.accounts.distributor.key();
    let pool_key = ctx.accounts.pool.key();

    if with_update {
        update_listed_pools(
            distributor_key,
            &ctx.accounts.distributor,
            ctx.remaining_accounts,
            &[pool_key],
            now,
        )?;
    }

    ctx.accounts.pool.update(&ctx.accounts.distributor, now)?;

    let old_alloc_point = ctx.accounts.pool.alloc_point;
    ctx.accounts.distributor.reweight(old_alloc_point, alloc_point)?;
    ctx.accounts.pool.alloc_point = alloc_point;

    emit!(UpdateDistribution {
        distributor: distributor_key,
        pid: ctx.accounts.pool.pid,
        alloc_point,
        total_alloc_point: ctx.accounts.distributor.total_alloc_point,
    });

    msg!(
        "Pool {} weight {} -> {}, total {}",
        ctx.accounts.pool.pid,
        old_alloc_point,
        alloc_point,
        ctx.accounts.distributor.total_alloc_point
    );

    Ok(())
}

/// Update every reward pool passed in `pools` to `now` and write it back
///
/// Pools listed in `skip` are handled by the caller through its own accounts.
pub fn update_listed_pools<'info>(
    distributor_key: Pubkey,
    distributor: &RewardDistributor,
    pools: &'info [AccountInfo<'info>],
    skip: &[Pubkey],
    now: i64,
) -> Result<()> {
    for info in pools.iter() {
        if skip.contains(info.key) {
            continue;
        }
        let mut pool: Account<'info, RewardPool> = Account::try_from(info)?;
        require_keys_eq!(pool.distributor, distributor_key, RewardsError::InvalidRewardPool);
        pool.update(distributor, now)?;
        pool.exit(&crate::ID)?;
    }
    Ok(())
}
