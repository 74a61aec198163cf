// =============================================================================
// Initialize Pair Instruction
// =============================================================================
// Vault-owner factory for lending pairs. Creates the pair PDA for a
// (collateral, borrow) mint combination together with the pair's two ledger
// share balances. The pair starts with no distributor and nothing paused.
//
// The pair must still be allow-listed with allow_contract before it can pull
// users' ledger shares.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::PairInitialized;
use crate::state::{LendingPair, PairConfig, ShareBalance, VaultConfig};

#[derive(Accounts)]
pub struct InitializePair<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub collateral_mint: Account<'info, Mint>,

    #[account(
        constraint = borrow_mint.key() != collateral_mint.key() @ WarpError::IdenticalAssets
    )]
    pub borrow_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = owner,
        space = 8 + LendingPair::INIT_SPACE,
        seeds = [PAIR_SEED, collateral_mint.key().as_ref(), borrow_mint.key().as_ref()],
        bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Collateral ledger shares held by the pair
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, collateral_mint.key().as_ref(), pair.key().as_ref()],
        bump
    )]
    pub pair_collateral: Account<'info, ShareBalance>,

    /// Borrow-asset ledger shares held by the pair (its cash)
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, borrow_mint.key().as_ref(), pair.key().as_ref()],
        bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    pub system_program: Program<'info, System>,
}

pub fn handler_initialize_pair(ctx: Context<InitializePair>, config: PairConfig) -> Result<()> {
    config.validate()?;

    let slot = Clock::get()?.slot;
    let pair_key = ctx.accounts.pair.key();
    require!(config.fee_receiver != pair_key, WarpError::InvalidConfig);

    let collateral_mint = &ctx.accounts.collateral_mint;
    let borrow_mint = &ctx.accounts.borrow_mint;

    let pair = &mut ctx.accounts.pair;
    pair.guardian = config.guardian;
    pair.fee_receiver = config.fee_receiver;
    pair.collateral_mint = collateral_mint.key();
    pair.borrow_mint = borrow_mint.key();
    pair.collateral_decimals = collateral_mint.decimals;
    pair.borrow_decimals = borrow_mint.decimals;
    pair.collateral_factor = config.collateral_factor;
    pair.liquidation_fee = config.liquidation_fee;
    pair.liquidation_fee_share = config.liquidation_fee_share;
    pair.reserve_factor = config.reserve_factor;
    pair.initial_exchange_rate = config.initial_exchange_rate;
    pair.interest_rate_model = config.interest_rate_model;
    pair.risk_config = config.risk_config;
    pair.total_borrows = 0;
    pair.total_reserves = 0;
    pair.borrow_index = WAD;
    pair.accrual_slot = slot;
    pair.total_borrow_shares = 0;
    pair.total_collateral = 0;
    pair.paused_actions = 0;
    pair.reward_distributor = Pubkey::default();
    pair.bump = ctx.bumps.pair;

    ctx.accounts.pair_collateral.bind(
        collateral_mint.key(),
        pair_key,
        ctx.bumps.pair_collateral,
    );
    ctx.accounts
        .pair_borrow
        .bind(borrow_mint.key(), pair_key, ctx.bumps.pair_borrow);

    emit!(PairInitialized {
        pair: pair_key,
        collateral_mint: collateral_mint.key(),
        borrow_mint: borrow_mint.key(),
        guardian: config.guardian,
    });

    msg!("Lending pair {} initialized", pair_key);
    msg!("Collateral: {}, borrow asset: {}", collateral_mint.key(), borrow_mint.key());
    msg!(
        "Collateral factor: {}, reserve factor: {}",
        config.collateral_factor,
        config.reserve_factor
    );

    Ok(())
}
