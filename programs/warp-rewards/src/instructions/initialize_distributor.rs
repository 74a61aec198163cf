use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{DISTRIBUTOR_SEED, MAX_DISTRIBUTOR_NAME_LEN, REWARD_VAULT_SEED};
use crate::error::RewardsError;
use crate::state::RewardDistributor;

/// Create a reward distributor and its reward vault
///
/// # Arguments
/// * `id` - Distinguishes distributors paying the same reward mint
/// * `name` - Display name (max 32 bytes)
/// * `reward_per_second` - Emission rate across all pools
/// * `start_timestamp` / `end_timestamp` - Emission window
/// * `guardian` - Account managing pools and unclaimed rewards
///
/// The vault is funded by plain token transfers; nothing is pulled at activation.
#[derive(Accounts)]
#[instruction(id: u64)]
pub struct InitializeDistributor<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + RewardDistributor::INIT_SPACE,
        seeds = [DISTRIBUTOR_SEED, reward_mint.key().as_ref(), &id.to_le_bytes()],
        bump
    )]
    pub distributor: Account<'info, RewardDistributor>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = payer,
        seeds = [REWARD_VAULT_SEED, distributor.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = distributor
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler_initialize_distributor(
    ctx: Context<InitializeDistributor>,
    id: u64,
    name: String,
    reward_per_second: u64,
    start_timestamp: i64,
    end_timestamp: i64,
    guardian: Pubkey,
) -> Result<()> {
    require!(name.len() <= MAX_DISTRIBUTOR_NAME_LEN, RewardsError::NameTooLong);
    require!(guardian != Pubkey::default(), RewardsError::InvalidOwner);
    RewardDistributor::validate_period(start_timestamp, end_timestamp)?;

    let distributor = &mut ctx.accounts.distributor;
    distributor.id = id;
    distributor.name = name;
    distributor.guardian = guardian;
    distributor.reward_mint = ctx.accounts.reward_mint.key();
    distributor.reward_vault = ctx.accounts.reward_vault.key();
    distributor.reward_per_second = reward_per_second;
    distributor.start_timestamp = start_timestamp;
    distributor.end_timestamp = end_timestamp;
    distributor.total_alloc_point = 0;
    distributor.pool_count = 0;
    distributor.pairs = Vec::new();
    distributor.activated = false;
    distributor.bump = ctx.bumps.distributor;
    distributor.vault_bump = ctx.bumps.reward_vault;

    msg!(
        "Distributor '{}' created: {} per second from {} to {}",
        distributor.name,
        reward_per_second,
        start_timestamp,
        end_timestamp
    );
    msg!("Total rewards to fund: {}", distributor.total_rewards()?);

    Ok(())
}
