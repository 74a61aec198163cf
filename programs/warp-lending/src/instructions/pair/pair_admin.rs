// =============================================================================
// Pair Guardian Instructions
// =============================================================================
// Guardian-only controls of a lending pair: risk limits, per-action pause,
// fee receiver, reserve withdrawal and the reward distributor.
//
// withdraw_fees_many sweeps the reserves of several pairs guarded by the
// signer in one call. Each pair brings three writable remaining accounts:
// the pair, its borrow-asset cash and its fee receiver's existing balance.
// =============================================================================

use anchor_lang::prelude::*;
use warp_rewards::constants::TOKEN_REWARDS_SEED;
use warp_rewards::state::TokenRewards;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::{
    ActionPauseUpdated, FeeReceiverUpdated, FeesWithdrawnMany, ReserveWithdrawn,
    RewardDistributorUpdated, UpdateRiskConfiguration,
};
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending;
use crate::state::{LendingPair, PairAction, RiskConfig, ShareBalance};

/// Guardian plus the pair it guards
#[derive(Accounts)]
pub struct PairGuardian<'info> {
    /// Must sign and match pair.guardian
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump,
        has_one = guardian @ WarpError::OnlyGuardian
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Cash, for accruing and valuing the borrow side
    #[account(
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,
}

// =============================================================================
// Risk Configuration
// =============================================================================

pub fn handler_update_risk_config(ctx: Context<PairGuardian>, config: RiskConfig) -> Result<()> {
    let pair_key = ctx.accounts.pair.key();
    let cash = ctx.accounts.pair_borrow.shares;
    let pair = &mut ctx.accounts.pair;

    accrue_pair(pair, pair_key, cash)?;

    let previous = pair.risk_config;
    previous.validate_update(
        &config,
        pair.total_collateral,
        pair.supplied_assets(cash)?,
        pair.total_borrows,
    )?;
    pair.risk_config = config;

    let slot = Clock::get()?.slot;
    emit!(UpdateRiskConfiguration {
        pair: pair_key,
        previous,
        current: config,
        slot,
    });

    msg!(
        "Risk limits: collateral {}, borrow {}, debt {}",
        config.deposit_collateral_limit,
        config.deposit_borrow_limit,
        config.total_pair_debt_limit
    );

    Ok(())
}

// =============================================================================
// Pause
// =============================================================================

pub fn handler_set_pair_action_paused(
    ctx: Context<PairGuardian>,
    action: PairAction,
    paused: bool,
) -> Result<()> {
    let pair_key = ctx.accounts.pair.key();
    ctx.accounts.pair.set_paused(action, paused);

    emit!(ActionPauseUpdated {
        pair: pair_key,
        action,
        paused,
    });

    msg!("{:?} {}", action, if paused { "PAUSED" } else { "UNPAUSED" });

    Ok(())
}

// =============================================================================
// Fee Receiver
// =============================================================================

pub fn handler_update_fee_receiver(ctx: Context<PairGuardian>, fee_receiver: Pubkey) -> Result<()> {
    let pair_key = ctx.accounts.pair.key();
    require!(
        fee_receiver != Pubkey::default() && fee_receiver != pair_key,
        WarpError::InvalidConfig
    );

    ctx.accounts.pair.fee_receiver = fee_receiver;

    emit!(FeeReceiverUpdated {
        pair: pair_key,
        fee_receiver,
    });

    msg!("Fee receiver set to {}", fee_receiver);

    Ok(())
}

// =============================================================================
// Withdraw Fees
// =============================================================================

#[derive(Accounts)]
pub struct WithdrawPairFees<'info> {
    /// Must sign and match pair.guardian; pays for the receiver balance
    #[account(mut)]
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump,
        has_one = guardian @ WarpError::OnlyGuardian
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    /// Fee receiver's borrow-asset shares
    /// init_if_needed: Created by the first withdrawal to this receiver
    #[account(
        init_if_needed,
        payer = guardian,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.fee_receiver.as_ref()],
        bump
    )]
    pub fee_receiver_balance: Account<'info, ShareBalance>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `amount` - Reserves to pay out, 0 for all
pub fn handler_withdraw_fees(ctx: Context<WithdrawPairFees>, amount: u64) -> Result<()> {
    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let fee_receiver = accounts.pair.fee_receiver;

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;

    accounts.fee_receiver_balance.bind(
        accounts.pair.borrow_mint,
        fee_receiver,
        ctx.bumps.fee_receiver_balance,
    );

    let withdrawn = lending::withdraw_fees(
        &mut accounts.pair,
        &mut accounts.pair_borrow,
        &mut accounts.fee_receiver_balance,
        amount,
    )?;

    emit!(ReserveWithdrawn {
        pair: pair_key,
        fee_receiver,
        amount: withdrawn,
    });

    msg!("Withdrew {} reserves to {}", withdrawn, fee_receiver);
    msg!("Reserves left: {}", accounts.pair.total_reserves);

    Ok(())
}

// =============================================================================
// Withdraw Fees Many
// =============================================================================

#[derive(Accounts)]
pub struct WithdrawFeesMany<'info> {
    /// Must sign and guard every pair in the remaining accounts
    pub guardian: Signer<'info>,
}

/// Number of pairs in `accounts` remaining accounts
pub fn fee_account_groups(accounts: usize) -> Result<usize> {
    require!(
        accounts > 0 && accounts % FEE_ACCOUNTS_PER_PAIR == 0,
        WarpError::IncompleteAccountGroup
    );
    Ok(accounts / FEE_ACCOUNTS_PER_PAIR)
}

/// Sweeps each listed pair's reserves to its fee receiver
///
/// A pair whose cash is lent out pays what cash allows and keeps the rest
/// of its reserves for a later sweep.
pub fn handler_withdraw_fees_many<'info>(
    ctx: Context<'_, '_, 'info, 'info, WithdrawFeesMany<'info>>,
) -> Result<()> {
    let guardian = ctx.accounts.guardian.key();
    let pairs = fee_account_groups(ctx.remaining_accounts.len())?;

    for group in ctx.remaining_accounts.chunks_exact(FEE_ACCOUNTS_PER_PAIR) {
        require!(
            group.iter().all(|info| info.is_writable),
            WarpError::IncompleteAccountGroup
        );

        let mut pair: Account<'info, LendingPair> = Account::try_from(&group[0])?;
        require!(pair.guardian == guardian, WarpError::OnlyGuardian);
        let pair_key = pair.key();
        let fee_receiver = pair.fee_receiver;

        let (cash_key, _) = Pubkey::find_program_address(
            &[SHARE_SEED, pair.borrow_mint.as_ref(), pair_key.as_ref()],
            &crate::ID,
        );
        let (receiver_key, _) = Pubkey::find_program_address(
            &[SHARE_SEED, pair.borrow_mint.as_ref(), fee_receiver.as_ref()],
            &crate::ID,
        );
        require!(
            group[1].key == &cash_key && group[2].key == &receiver_key,
            WarpError::IncompleteAccountGroup
        );
        let mut pair_borrow: Account<'info, ShareBalance> = Account::try_from(&group[1])?;
        let mut receiver: Account<'info, ShareBalance> = Account::try_from(&group[2])?;

        accrue_pair(&mut pair, pair_key, pair_borrow.shares)?;

        let amount = lending::withdrawable_fees(&pair, pair_borrow.shares);
        if amount > 0 {
            lending::withdraw_fees(&mut pair, &mut pair_borrow, &mut receiver, amount)?;
            pair_borrow.exit(&crate::ID)?;
            receiver.exit(&crate::ID)?;

            emit!(ReserveWithdrawn {
                pair: pair_key,
                fee_receiver,
                amount,
            });
        }
        pair.exit(&crate::ID)?;

        msg!("Pair {}: withdrew {}, reserves left {}", pair_key, amount, pair.total_reserves);
    }

    emit!(FeesWithdrawnMany {
        guardian,
        pairs: pairs as u8,
    });

    Ok(())
}

// =============================================================================
// Reward Distributor
// =============================================================================

#[derive(Accounts)]
pub struct SetPairRewardDistributor<'info> {
    /// Must sign and match pair.guardian
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump,
        has_one = guardian @ WarpError::OnlyGuardian
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// The manager's distributor registry for this pair
    #[account(
        seeds = [TOKEN_REWARDS_SEED, pair.key().as_ref()],
        bump = token_rewards.bump,
        seeds::program = warp_rewards::ID
    )]
    pub token_rewards: Option<Account<'info, TokenRewards>>,
}

/// # Arguments
/// * `distributor` - Distributor receiving balance updates, default to detach
pub fn handler_set_reward_distributor(
    ctx: Context<SetPairRewardDistributor>,
    distributor: Pubkey,
) -> Result<()> {
    if distributor != Pubkey::default() {
        let registered = ctx
            .accounts
            .token_rewards
            .as_ref()
            .map(|rewards| rewards.contains(&distributor))
            .unwrap_or(false);
        require!(registered, WarpError::UnknownDistributor);
    }

    let pair_key = ctx.accounts.pair.key();
    ctx.accounts.pair.reward_distributor = distributor;

    emit!(RewardDistributorUpdated {
        pair: pair_key,
        distributor,
    });

    if distributor == Pubkey::default() {
        msg!("Reward distributor detached");
    } else {
        msg!("Reward distributor set to {}", distributor);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_accounts_come_in_threes() {
        assert_eq!(fee_account_groups(3).unwrap(), 1);
        assert_eq!(fee_account_groups(9).unwrap(), 3);
        for broken in [0, 2, 4] {
            assert_eq!(
                fee_account_groups(broken).unwrap_err(),
                WarpError::IncompleteAccountGroup.into()
            );
        }
    }
}
