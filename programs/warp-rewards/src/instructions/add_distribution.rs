use anchor_lang::prelude::*;

use crate::constants::REWARD_POOL_SEED;
use crate::error::RewardsError;
use crate::events::AddDistribution;
use crate::instructions::set_distribution::update_listed_pools;
use crate::state::{RewardDistributor, RewardKind, RewardPool};

/// Weights for the three pools created per lending pair
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default)]
pub struct AllocPoints {
    pub collateral: u64,
    pub debt: u64,
    pub borrow_asset: u64,
}

impl AllocPoints {
    pub fn total(&self) -> Result<u64> {
        self.collateral
            .checked_add(self.debt)
            .and_then(|sum| sum.checked_add(self.borrow_asset))
            .ok_or(error!(RewardsError::MathOverflow))
    }

    pub fn for_kind(&self, kind: RewardKind) -> u64 {
        match kind {
            RewardKind::Collateral => self.collateral,
            RewardKind::Debt => self.debt,
            RewardKind::BorrowAsset => self.borrow_asset,
        }
    }
}

/// Start distributing to a lending pair: collateral, debt and borrow asset pools
///
/// Existing pools passed as remaining accounts are brought up to date before
/// the total weight grows.
#[derive(Accounts)]
#[instruction(alloc_points: AllocPoints, pair: Pubkey)]
pub struct AddDistributionPools<'info> {
    #[account(mut)]
    pub guardian: Signer<'info>,

    #[account(
        mut,
        has_one = guardian @ RewardsError::OnlyGuardian
    )]
    pub distributor: Account<'info, RewardDistributor>,

    #[account(
        init,
        payer = guardian,
        space = 8 + RewardPool::INIT_SPACE,
        seeds = [
            REWARD_POOL_SEED,
            distributor.key().as_ref(),
            pair.as_ref(),
            &[RewardKind::Collateral.seed()]
        ],
        bump
    )]
    pub collateral_pool: Account<'info, RewardPool>,

    #[account(
        init,
        payer = guardian,
        space = 8 + RewardPool::INIT_SPACE,
        seeds = [
            REWARD_POOL_SEED,
            distributor.key().as_ref(),
            pair.as_ref(),
            &[RewardKind::Debt.seed()]
        ],
        bump
    )]
    pub debt_pool: Account<'info, RewardPool>,

    #[account(
        init,
        payer = guardian,
        space = 8 + RewardPool::INIT_SPACE,
        seeds = [
            REWARD_POOL_SEED,
            distributor.key().as_ref(),
            pair.as_ref(),
            &[RewardKind::BorrowAsset.seed()]
        ],
        bump
    )]
    pub borrow_asset_pool: Account<'info, RewardPool>,

    pub system_program: Program<'info, System>,
}

pub fn handler_add_distribution<'info>(
    ctx: Context<'_, '_, 'info, 'info, AddDistributionPools<'info>>,
    alloc_points: AllocPoints,
    pair: Pubkey,
) -> Result<()> {
    require!(pair != Pubkey::default(), RewardsError::UnknownToken);

    let now = Clock::get()?.unix_timestamp;
    let distributor_key = ctx.accounts.distributor.key();

    update_listed_pools(
        distributor_key,
        &ctx.accounts.distributor,
        ctx.remaining_accounts,
        &[],
        now,
    )?;

    let first_pid = ctx.accounts.distributor.register_pair(pair)?;
    let start = ctx.accounts.distributor.start_timestamp;
    let added = alloc_points.total()?;
    ctx.accounts.distributor.reweight(0, added)?;

    let bumps = [
        ctx.bumps.collateral_pool,
        ctx.bumps.debt_pool,
        ctx.bumps.borrow_asset_pool,
    ];
    let pools = [
        &mut ctx.accounts.collateral_pool,
        &mut ctx.accounts.debt_pool,
        &mut ctx.accounts.borrow_asset_pool,
    ];

    for (offset, (pool, kind)) in pools.into_iter().zip(RewardKind::ALL).enumerate() {
        pool.distributor = distributor_key;
        pool.pair = pair;
        pool.kind = kind;
        pool.pid = first_pid + offset as u8;
        pool.alloc_point = alloc_points.for_kind(kind);
        pool.acc_reward_per_share = 0;
        pool.last_reward_timestamp = now.max(start);
        pool.total_staked = 0;
        pool.bump = bumps[offset];
    }

    emit!(AddDistribution {
        distributor: distributor_key,
        pair,
        first_pid,
        collateral_alloc_point: alloc_points.collateral,
        debt_alloc_point: alloc_points.debt,
        borrow_asset_alloc_point: alloc_points.borrow_asset,
        total_alloc_point: ctx.accounts.distributor.total_alloc_point,
    });

    msg!(
        "Pair {} added with pools {}..{}, total alloc point {}",
        pair,
        first_pid,
        first_pid + 2,
        ctx.accounts.distributor.total_alloc_point
    );

    Ok(())
}
