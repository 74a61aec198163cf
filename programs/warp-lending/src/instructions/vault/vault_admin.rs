// =============================================================================
// Vault Admin Instructions
// =============================================================================
// Owner-only controls of the ledger: pause, two-step ownership, the contract
// allow-list, the flash loan rate and sweeping stray reserve tokens.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::WarpError;
use crate::events::{
    AllowContract, FlashLoanRateUpdated, OwnershipTransferStarted, OwnershipTransferred,
    RescueFunds, VaultPauseUpdated,
};
use crate::ledger;
use crate::state::{AllowedContract, AssetTotals, VaultConfig};

// =============================================================================
// Pause Vault
// =============================================================================

#[derive(Accounts)]
pub struct SetVaultPaused<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,
}

/// Suspends or resumes deposit, withdraw and transfer
pub fn handler_set_vault_paused(ctx: Context<SetVaultPaused>, paused: bool) -> Result<()> {
    let vault_config = &mut ctx.accounts.vault_config;

    if vault_config.paused == paused {
        msg!("Vault is already {}", if paused { "paused" } else { "unpaused" });
        return Ok(());
    }
    vault_config.paused = paused;

    emit!(VaultPauseUpdated { paused });

    msg!("Vault {}", if paused { "PAUSED" } else { "UNPAUSED" });

    Ok(())
}

// =============================================================================
// Ownership Transfer
// =============================================================================

#[derive(Accounts)]
pub struct TransferVaultOwnership<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,
}

pub fn handler_transfer_ownership(
    ctx: Context<TransferVaultOwnership>,
    new_owner: Pubkey,
) -> Result<()> {
    let vault_config = &mut ctx.accounts.vault_config;
    vault_config.stage_owner(new_owner)?;

    emit!(OwnershipTransferStarted {
        owner: vault_config.owner,
        pending_owner: new_owner,
    });

    msg!("Ownership transfer started to {}", new_owner);

    Ok(())
}

#[derive(Accounts)]
pub struct AcceptVaultOwnership<'info> {
    pub pending_owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault_config.bump
    )]
    pub vault_config: Account<'info, VaultConfig>,
}

pub fn handler_accept_ownership(ctx: Context<AcceptVaultOwnership>) -> Result<()> {
    let new_owner = ctx.accounts.pending_owner.key();
    let previous_owner = ctx.accounts.vault_config.accept_owner(new_owner)?;

    emit!(OwnershipTransferred {
        previous_owner,
        new_owner,
    });

    msg!("Vault ownership moved from {} to {}", previous_owner, new_owner);

    Ok(())
}

// =============================================================================
// Contract Allow-List
// =============================================================================

#[derive(Accounts)]
#[instruction(contract: Pubkey)]
pub struct SetAllowedContract<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + AllowedContract::INIT_SPACE,
        seeds = [ALLOWED_SEED, contract.as_ref()],
        bump
    )]
    pub allowed_contract: Account<'info, AllowedContract>,

    pub system_program: Program<'info, System>,
}

pub fn handler_allow_contract(
    ctx: Context<SetAllowedContract>,
    contract: Pubkey,
    allowed: bool,
) -> Result<()> {
    require!(contract != Pubkey::default(), WarpError::InvalidContract);

    let entry = &mut ctx.accounts.allowed_contract;
    entry.contract = contract;
    entry.allowed = allowed;
    entry.bump = ctx.bumps.allowed_contract;

    emit!(AllowContract { contract, allowed });

    msg!(
        "Contract {} {} the allow-list",
        contract,
        if allowed { "added to" } else { "removed from" }
    );

    Ok(())
}

// =============================================================================
// Flash Loan Rate
// =============================================================================

#[derive(Accounts)]
pub struct UpdateFlashLoanRate<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,
}

pub fn handler_update_flash_loan_rate(
    ctx: Context<UpdateFlashLoanRate>,
    new_rate: u128,
) -> Result<()> {
    require!(new_rate <= WAD, WarpError::InvalidConfig);

    let vault_config = &mut ctx.accounts.vault_config;
    let previous_rate = vault_config.flash_loan_rate;
    vault_config.flash_loan_rate = new_rate;

    emit!(FlashLoanRateUpdated {
        previous_rate,
        new_rate,
    });

    msg!("Flash loan rate: {} -> {}", previous_rate, new_rate);

    Ok(())
}

// =============================================================================
// Rescue Funds
// =============================================================================

#[derive(Accounts)]
pub struct RescueReserve<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub mint: Account<'info, Mint>,

    #[account(
        seeds = [ASSET_SEED, mint.key().as_ref()],
        bump = asset_totals.bump
    )]
    pub asset_totals: Account<'info, AssetTotals>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, mint.key().as_ref()],
        bump = asset_totals.reserve_bump
    )]
    pub reserve: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = destination.mint == mint.key() @ WarpError::InvalidMint,
        constraint = destination.owner == owner.key() @ WarpError::InvalidTokenAccountOwner
    )]
    pub destination: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Sweeps reserve tokens not backing any share to the owner
pub fn handler_rescue_funds(ctx: Context<RescueReserve>) -> Result<()> {
    let totals = &ctx.accounts.asset_totals;
    require!(!totals.flash_loan_active, WarpError::FlashLoanActive);

    let excess = ctx
        .accounts
        .reserve
        .amount
        .saturating_sub(totals.total_underlying_deposit);
    require!(excess > 0, WarpError::NotEnoughBalance);

    ledger::push_underlying(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.reserve.to_account_info(),
        &ctx.accounts.destination.to_account_info(),
        &ctx.accounts.vault_config.to_account_info(),
        ctx.accounts.vault_config.bump,
        excess,
    )?;

    emit!(RescueFunds {
        mint: ctx.accounts.mint.key(),
        to: ctx.accounts.destination.key(),
        amount: excess,
    });

    msg!("Rescued {} stray tokens of {}", excess, ctx.accounts.mint.key());

    Ok(())
}
