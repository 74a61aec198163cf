// =============================================================================
// Vault Transfer Instruction
// =============================================================================
// Moves ledger shares between two accounts of the same asset. No underlying
// moves and the asset totals are untouched.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Transfer;
use crate::ledger;
use crate::state::{ShareBalance, VaultConfig};

#[derive(Accounts)]
#[instruction(shares: u64, to: Pubkey)]
pub struct TransferShares<'info> {
    /// Share owner, pays for the recipient balance on first use
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Constraints:
    /// - Vault must not be paused
    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        constraint = !vault_config.paused @ WarpError::Paused
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub mint: Account<'info, Mint>,

    /// The owner's ledger balance, debited
    #[account(
        mut,
        seeds = [SHARE_SEED, mint.key().as_ref(), owner.key().as_ref()],
        bump = from_balance.bump
    )]
    pub from_balance: Account<'info, ShareBalance>,

    /// Recipient's ledger balance
    ///
    /// Constraints:
    /// - `to` differs from the owner
    ///
    /// init_if_needed: Created the first time `to` receives this asset
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, mint.key().as_ref(), to.as_ref()],
        bump,
        constraint = to != owner.key() @ WarpError::InvalidToAddress
    )]
    pub to_balance: Account<'info, ShareBalance>,

    pub system_program: Program<'info, System>,
}

pub fn handler_transfer(ctx: Context<TransferShares>, shares: u64, to: Pubkey) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);
    require!(shares > 0, WarpError::InvalidAmount);

    let mint = ctx.accounts.mint.key();
    ctx.accounts
        .to_balance
        .bind(mint, to, ctx.bumps.to_balance);

    ledger::transfer(
        &mut ctx.accounts.from_balance,
        &mut ctx.accounts.to_balance,
        shares,
    )?;

    emit!(Transfer {
        mint,
        from: ctx.accounts.owner.key(),
        to,
        shares,
    });

    msg!("Transferred {} shares to {}", shares, to);

    Ok(())
}
