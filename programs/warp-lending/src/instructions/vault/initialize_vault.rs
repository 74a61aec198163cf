// =============================================================================
// Initialize Vault Instruction
// =============================================================================
// Creates the singleton VaultConfig. The config PDA is also the token
// authority of every asset reserve, so it must exist before the first deposit.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::{DEFAULT_FLASH_LOAN_RATE, VAULT_SEED};
use crate::error::WarpError;
use crate::state::VaultConfig;

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + VaultConfig::INIT_SPACE,
        seeds = [VAULT_SEED],
        bump
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `owner` - Vault owner (admin of pause, allow-list, prices and pairs)
/// * `flash_loan_rate` - WAD fee rate, None for the 5% default
pub fn handler_initialize_vault(
    ctx: Context<InitializeVault>,
    owner: Pubkey,
    flash_loan_rate: Option<u128>,
) -> Result<()> {
    require!(owner != Pubkey::default(), WarpError::InvalidOwner);

    let vault_config = &mut ctx.accounts.vault_config;
    vault_config.owner = owner;
    vault_config.pending_owner = Pubkey::default();
    vault_config.flash_loan_rate = flash_loan_rate.unwrap_or(DEFAULT_FLASH_LOAN_RATE);
    vault_config.paused = false;
    vault_config.bump = ctx.bumps.vault_config;

    msg!("Vault initialized");
    msg!("Owner: {}", owner);
    msg!("Flash loan rate (WAD): {}", vault_config.flash_loan_rate);

    Ok(())
}
