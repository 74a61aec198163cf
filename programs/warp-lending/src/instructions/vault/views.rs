// =============================================================================
// Ledger Views
// =============================================================================
// Read-only conversions returned through Anchor return data.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::{ASSET_SEED, VAULT_SEED};
use crate::state::{AssetTotals, VaultConfig};

#[derive(Accounts)]
pub struct AssetView<'info> {
    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump
    )]
    pub vault_config: Account<'info, VaultConfig>,

    #[account(
        seeds = [ASSET_SEED, asset_totals.mint.as_ref()],
        bump = asset_totals.bump
    )]
    pub asset_totals: Account<'info, AssetTotals>,
}

pub fn handler_to_shares(ctx: Context<AssetView>, amount: u64) -> Result<u64> {
    ctx.accounts.asset_totals.to_shares(amount)
}

pub fn handler_to_underlying(ctx: Context<AssetView>, shares: u64) -> Result<u64> {
    ctx.accounts.asset_totals.to_underlying(shares)
}

pub fn handler_max_flash_loan(ctx: Context<AssetView>) -> Result<u64> {
    Ok(ctx.accounts.asset_totals.max_flash_loan())
}

pub fn handler_flash_fee(ctx: Context<AssetView>, amount: u64) -> Result<u64> {
    ctx.accounts.vault_config.flash_fee(amount)
}
