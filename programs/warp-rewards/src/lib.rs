// =============================================================================
// WARP REWARDS - Reward distribution for lending pair positions
// =============================================================================
//
// Distributors stream a reward token over a fixed window to the collateral,
// debt and borrow-asset balances of lending pairs. Pairs report every
// balance change through accumulate_reward, signed by the pair PDA.
//
// The manager keeps the registry of approved distributors per pair.
// =============================================================================

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use error::*;
pub use events::*;
pub use instructions::*;
pub use state::*;

declare_id!("HvZAyGdUX9TAgnfHw4NjRmvDoLABmMt1E5F3SV9twtHE");

#[program]
pub mod warp_rewards {
    use super::*;

    // =========================================================================
    // Manager
    // =========================================================================

    /// Create the singleton reward manager
    pub fn initialize_manager(ctx: Context<InitializeManager>, owner: Pubkey) -> Result<()> {
        instructions::initialize_manager::handler_initialize_manager(ctx, owner)
    }

    /// Approve or revoke a distributor (owner only)
    pub fn set_distributor_status(
        ctx: Context<SetDistributorStatus>,
        distributor: Pubkey,
        approved: bool,
    ) -> Result<()> {
        instructions::manager_admin::handler_set_distributor_status(ctx, distributor, approved)
    }

    /// Drop a distributor from a pair's registry (owner only)
    pub fn remove_reward(
        ctx: Context<RemoveRewardDistributor>,
        token: Pubkey,
        distributor: Pubkey,
    ) -> Result<()> {
        instructions::manager_admin::handler_remove_reward(ctx, token, distributor)
    }

    /// Stage a new manager owner
    pub fn transfer_manager_ownership(
        ctx: Context<TransferManagerOwnership>,
        new_owner: Pubkey,
    ) -> Result<()> {
        instructions::manager_admin::handler_transfer_manager_ownership(ctx, new_owner)
    }

    /// Staged owner takes over the manager
    pub fn accept_manager_ownership(ctx: Context<AcceptManagerOwnership>) -> Result<()> {
        instructions::manager_admin::handler_accept_manager_ownership(ctx)
    }

    // =========================================================================
    // Distributor Setup
    // =========================================================================

    /// Create a distributor and its reward vault
    pub fn initialize_distributor(
        ctx: Context<InitializeDistributor>,
        id: u64,
        name: String,
        reward_per_second: u64,
        start_timestamp: i64,
        end_timestamp: i64,
        guardian: Pubkey,
    ) -> Result<()> {
        instructions::initialize_distributor::handler_initialize_distributor(
            ctx,
            id,
            name,
            reward_per_second,
            start_timestamp,
            end_timestamp,
            guardian,
        )
    }

    /// Add the three pools of a lending pair (guardian only)
    ///
    /// Existing pools passed as remaining accounts are settled first.
    pub fn add_distribution<'info>(
        ctx: Context<'_, '_, 'info, 'info, AddDistributionPools<'info>>,
        alloc_points: AllocPoints,
        pair: Pubkey,
    ) -> Result<()> {
        instructions::add_distribution::handler_add_distribution(ctx, alloc_points, pair)
    }

    /// Change one pool's weight (guardian only)
    pub fn set_alloc_point<'info>(
        ctx: Context<'_, '_, 'info, 'info, SetAllocPoint<'info>>,
        alloc_point: u64,
        with_update: bool,
    ) -> Result<()> {
        instructions::set_distribution::handler_set_alloc_point(ctx, alloc_point, with_update)
    }

    /// Register with the manager for a pair and start accrual
    pub fn activate_pending_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, ActivatePendingRewards<'info>>,
        pair: Pubkey,
    ) -> Result<()> {
        instructions::activate_pending_rewards::handler_activate_pending_rewards(ctx, pair)
    }

    // =========================================================================
    // Lending Pair Hook
    // =========================================================================

    /// Record a user's new balance for one pool (pair PDA signs)
    pub fn accumulate_reward(
        ctx: Context<AccumulateReward>,
        kind: RewardKind,
        user: Pubkey,
        new_balance: u64,
    ) -> Result<()> {
        instructions::accumulate_reward::handler_accumulate_reward(ctx, kind, user, new_balance)
    }

    // =========================================================================
    // Claims
    // =========================================================================

    /// Withdraw accumulated rewards from one pool
    pub fn withdraw(ctx: Context<WithdrawReward>) -> Result<()> {
        instructions::withdraw::handler_withdraw(ctx)
    }

    /// Rewards a user could withdraw right now
    pub fn pending_reward(ctx: Context<PendingReward>) -> Result<u64> {
        instructions::withdraw::handler_pending_reward(ctx)
    }

    /// Sweep the vault after the claim grace period (guardian only)
    pub fn withdraw_unclaimed(ctx: Context<WithdrawUnclaimed>) -> Result<()> {
        instructions::withdraw_unclaimed::handler_withdraw_unclaimed(ctx)
    }
}
