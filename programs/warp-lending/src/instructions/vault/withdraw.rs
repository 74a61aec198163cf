// =============================================================================
// Vault Withdraw Instruction
// =============================================================================
// Burns the signer's ledger shares and pays the underlying from the reserve
// to a token account owned by `to`.
//
// - shares = 0 withdraws the whole balance
// - underlying = shares * total_underlying_deposit / total_shares_minted
// - the balance left behind is either zero or at least MINIMUM_SHARE_BALANCE
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Withdraw;
use crate::ledger;
use crate::state::{AssetTotals, ShareBalance, VaultConfig};

#[derive(Accounts)]
#[instruction(shares: u64, to: Pubkey)]
pub struct WithdrawFromVault<'info> {
    /// Share owner
    /// Must sign to burn their shares
    pub owner: Signer<'info>,

    /// Vault configuration, signs for the reserve
    ///
    /// Constraints:
    /// - Vault must not be paused
    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump,
        constraint = !vault_config.paused @ WarpError::Paused
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub mint: Account<'info, Mint>,

    /// Share totals of the asset, rejects withdrawals during a flash loan
    #[account(
        mut,
        seeds = [ASSET_SEED, mint.key().as_ref()],
        bump = asset_totals.bump
    )]
    pub asset_totals: Account<'info, AssetTotals>,

    /// Vault-owned token account the underlying leaves from
    #[account(
        mut,
        seeds = [RESERVE_SEED, mint.key().as_ref()],
        bump = asset_totals.reserve_bump
    )]
    pub reserve: Account<'info, TokenAccount>,

    /// The owner's ledger balance, debited
    #[account(
        mut,
        seeds = [SHARE_SEED, mint.key().as_ref(), owner.key().as_ref()],
        bump = from_balance.bump
    )]
    pub from_balance: Account<'info, ShareBalance>,

    /// Receives the underlying
    #[account(
        mut,
        constraint = destination.mint == mint.key() @ WarpError::InvalidMint,
        constraint = destination.owner == to @ WarpError::InvalidToAddress
    )]
    pub destination: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// # Arguments
/// * `shares` - Shares to burn, 0 for the whole balance
/// * `to` - Owner of the destination token account
pub fn handler_withdraw(ctx: Context<WithdrawFromVault>, shares: u64, to: Pubkey) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);

    if shares == 0 {
        msg!("Withdrawing full balance of {} shares", ctx.accounts.from_balance.shares);
    }

    let (burned, amount) = ledger::withdraw(
        &mut ctx.accounts.asset_totals,
        &mut ctx.accounts.from_balance,
        shares,
    )?;

    ledger::push_underlying(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.reserve.to_account_info(),
        &ctx.accounts.destination.to_account_info(),
        &ctx.accounts.vault_config.to_account_info(),
        ctx.accounts.vault_config.bump,
        amount,
    )?;

    emit!(Withdraw {
        mint: ctx.accounts.mint.key(),
        from: ctx.accounts.owner.key(),
        to,
        shares: burned,
        amount,
    });

    msg!("Withdrew {} shares for {} underlying", burned, amount);
    msg!("Remaining shares: {}", ctx.accounts.from_balance.shares);

    Ok(())
}
