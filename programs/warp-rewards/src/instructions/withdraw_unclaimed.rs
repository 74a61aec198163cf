use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{DISTRIBUTOR_SEED, REWARD_VAULT_SEED};
use crate::error::RewardsError;
use crate::events::WithdrawUnclaimedReward;
use crate::state::RewardDistributor;

/// Sweep whatever is left in the reward vault once the claim period is over
#[derive(Accounts)]
pub struct WithdrawUnclaimed<'info> {
    pub guardian: Signer<'info>,

    #[account(
        seeds = [DISTRIBUTOR_SEED, distributor.reward_mint.as_ref(), &distributor.id.to_le_bytes()],
        bump = distributor.bump,
        has_one = guardian @ RewardsError::OnlyGuardian
    )]
    pub distributor: Account<'info, RewardDistributor>,

    #[account(
        mut,
        seeds = [REWARD_VAULT_SEED, distributor.key().as_ref()],
        bump = distributor.vault_bump
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = destination.mint == distributor.reward_mint @ RewardsError::InvalidRewardPool
    )]
    pub destination: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler_withdraw_unclaimed(ctx: Context<WithdrawUnclaimed>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let distributor = &ctx.accounts.distributor;

    require!(
        distributor.grace_period_over(now)?,
        RewardsError::RewardPeriodActive
    );

    let amount = ctx.accounts.reward_vault.amount;

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

    emit!(WithdrawUnclaimedReward {
        distributor: distributor.key(),
        to: ctx.accounts.destination.owner,
        amount,
    });

    msg!("Swept {} unclaimed rewards", amount);

    Ok(())
}
