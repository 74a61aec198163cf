// =============================================================================
// Vault Deposit Instruction
// =============================================================================
// Pulls SPL tokens from the depositor into the asset reserve and credits
// ledger shares to `to`.
//
// Share calculation:
// - Empty asset: shares = amount (1:1)
// - Otherwise:   shares = amount * total_shares_minted / total_underlying_deposit
//
// Tokens sent straight to the reserve are not counted, so they never move the
// share price.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Deposit;
use crate::ledger;
use crate::state::{AssetTotals, ShareBalance, VaultConfig};

#[derive(Accounts)]
#[instruction(amount: u64, to: Pubkey)]
pub struct DepositToVault<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Owner of the source tokens, pays for any account created here
    /// Must sign to authorize the token transfer
    #[account(mut)]
    pub depositor: Signer<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    /// Vault configuration, also the reserve authority
    ///
    /// Constraints:
    /// - Vault must not be paused
    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        constraint = !vault_config.paused @ WarpError::Paused
    )]
    pub vault_config: Account<'info, VaultConfig>,

    /// Mint of the asset being deposited
    pub mint: Account<'info, Mint>,

    /// Share totals of the asset
    ///
    /// init_if_needed: Created with the first deposit of this mint
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + AssetTotals::INIT_SPACE,
        seeds = [ASSET_SEED, mint.key().as_ref()],
        bump
    )]
    pub asset_totals: Account<'info, AssetTotals>,

    /// Vault-owned token account holding this mint
    ///
    /// init_if_needed: Created with the asset totals on the first deposit
    #[account(
        init_if_needed,
        payer = depositor,
        seeds = [RESERVE_SEED, mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = vault_config
    )]
    pub reserve: Account<'info, TokenAccount>,

    /// Ledger balance credited with the new shares
    ///
    /// init_if_needed: Created the first time `to` receives this asset
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, mint.key().as_ref(), to.as_ref()],
        bump
    )]
    pub to_balance: Account<'info, ShareBalance>,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    #[account(
        mut,
        constraint = source.mint == mint.key() @ WarpError::InvalidMint,
        constraint = source.owner == depositor.key() @ WarpError::InvalidTokenAccountOwner
    )]
    pub source: Account<'info, TokenAccount>,

    // =========================================================================
    // Programs
    // =========================================================================

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// # Arguments
/// * `amount` - Underlying to deposit (base units)
/// * `to` - Account credited with the shares
pub fn handler_deposit(ctx: Context<DepositToVault>, amount: u64, to: Pubkey) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);
    require!(amount > 0, WarpError::InvalidAmount);

    let mint = ctx.accounts.mint.key();

    let totals = &mut ctx.accounts.asset_totals;
    if totals.mint == Pubkey::default() {
        totals.mint = mint;
        totals.bump = ctx.bumps.asset_totals;
        totals.reserve_bump = ctx.bumps.reserve;
        msg!("First deposit of mint {}", mint);
    }
    ctx.accounts
        .to_balance
        .bind(mint, to, ctx.bumps.to_balance);

    let shares = ledger::deposit(
        &mut ctx.accounts.asset_totals,
        &mut ctx.accounts.to_balance,
        amount,
    )?;

    ledger::pull_underlying(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.source.to_account_info(),
        &ctx.accounts.reserve.to_account_info(),
        &ctx.accounts.depositor.to_account_info(),
        amount,
    )?;

    emit!(Deposit {
        mint,
        from: ctx.accounts.depositor.key(),
        to,
        amount,
        shares,
    });

    msg!("Deposited {} for {} shares", amount, shares);
    msg!(
        "Asset totals: {} shares / {} underlying",
        ctx.accounts.asset_totals.total_shares_minted,
        ctx.accounts.asset_totals.total_underlying_deposit
    );

    Ok(())
}
