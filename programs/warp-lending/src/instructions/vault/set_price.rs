use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::{ORACLE_SEED, VAULT_SEED};
use crate::error::WarpError;
use crate::events::PriceUpdated;
use crate::state::{PriceOracle, VaultConfig};

/// Register or update the USD price of a mint (vault owner)
///
/// Prices carry 8 decimals. Zero is stored as given and makes every valuation
/// of the mint fail with INVALID_PRICE until a usable price is set.
#[derive(Accounts)]
pub struct SetPrice<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        has_one = owner @ WarpError::OnlyOwner
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + PriceOracle::INIT_SPACE,
        seeds = [ORACLE_SEED, mint.key().as_ref()],
        bump
    )]
    pub oracle: Account<'info, PriceOracle>,

    pub system_program: Program<'info, System>,
}

pub fn handler_set_price(ctx: Context<SetPrice>, price: u64) -> Result<()> {
    let slot = Clock::get()?.slot;
    let mint = ctx.accounts.mint.key();

    let oracle = &mut ctx.accounts.oracle;
    oracle.mint = mint;
    oracle.price = price;
    oracle.last_update_slot = slot;
    oracle.bump = ctx.bumps.oracle;

    emit!(PriceUpdated { mint, price, slot });

    msg!("Price of {} set to {} at slot {}", mint, price, slot);

    Ok(())
}
