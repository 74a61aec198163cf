// =============================================================================
// Flash Loan Instruction
// =============================================================================
// Lends reserve tokens for the duration of one callback.
//
// Flow:
// 1. Persist flash_loan_active so the ledger refuses deposits, withdrawals
//    and nested flash loans of this asset while the callback runs
// 2. Transfer `amount` from the reserve to the receiver token account
// 3. Invoke the borrower program with `data` and the remaining accounts
// 4. Reload the reserve: it must hold at least balance_before + fee
// 5. Clear the flag and credit the fee to total_underlying_deposit
//
// The fee raises every share's underlying; total_shares_minted is unchanged.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::WarpError;
use crate::events::FlashLoan;
use crate::ledger;
use crate::state::{AssetTotals, VaultConfig};

#[derive(Accounts)]
pub struct ExecuteFlashLoan<'info> {
    /// Starts the loan
    /// Must sign; any signature the callback needs travels in remaining accounts
    pub initiator: Signer<'info>,

    /// Vault configuration, holds the fee rate and signs for the reserve
    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump
    )]
    pub vault_config: Account<'info, VaultConfig>,

    pub mint: Account<'info, Mint>,

    /// Share totals of the lent asset
    /// Locked for the length of the callback
    #[account(
        mut,
        seeds = [ASSET_SEED, mint.key().as_ref()],
        bump = asset_totals.bump
    )]
    pub asset_totals: Account<'info, AssetTotals>,

    /// Vault-owned token account the loan leaves from and returns to
    #[account(
        mut,
        seeds = [RESERVE_SEED, mint.key().as_ref()],
        bump = asset_totals.reserve_bump
    )]
    pub reserve: Account<'info, TokenAccount>,

    /// Token account the loan is paid into
    #[account(
        mut,
        constraint = receiver.mint == mint.key() @ WarpError::InvalidMint
    )]
    pub receiver: Account<'info, TokenAccount>,

    /// CHECK: any executable program; it only receives a callback
    #[account(
        executable,
        constraint = borrower_program.key() != crate::ID @ WarpError::InvalidFlashLoanReceiver
    )]
    pub borrower_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

/// # Arguments
/// * `amount` - Underlying to lend
/// * `data` - Instruction data passed to the borrower program unchanged
pub fn handler_flash_loan<'info>(
    ctx: Context<'_, '_, '_, 'info, ExecuteFlashLoan<'info>>,
    amount: u64,
    data: Vec<u8>,
) -> Result<()> {
    require!(amount > 0, WarpError::InvalidAmount);
    require!(
        !ctx.accounts.asset_totals.flash_loan_active,
        WarpError::FlashLoanActive
    );
    require!(
        amount <= ctx.accounts.asset_totals.max_flash_loan(),
        WarpError::FlashLoanTooLarge
    );

    let fee = ctx.accounts.vault_config.flash_fee(amount)?;
    let balance_before = ctx.accounts.reserve.amount;
    let required = balance_before
        .checked_add(fee)
        .ok_or(WarpError::MathOverflow)?;

    msg!("Flash loan of {} (fee {})", amount, fee);

    // =========================================================================
    // Lock The Asset
    // =========================================================================

    ctx.accounts.asset_totals.flash_loan_active = true;
    ctx.accounts.asset_totals.exit(&crate::ID)?;

    // =========================================================================
    // Lend And Call Back
    // =========================================================================

    ledger::push_underlying(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.reserve.to_account_info(),
        &ctx.accounts.receiver.to_account_info(),
        &ctx.accounts.vault_config.to_account_info(),
        ctx.accounts.vault_config.bump,
        amount,
    )?;

    let callback = Instruction {
        program_id: ctx.accounts.borrower_program.key(),
        accounts: ctx
            .remaining_accounts
            .iter()
            .map(|account| AccountMeta {
                pubkey: *account.key,
                is_signer: account.is_signer,
                is_writable: account.is_writable,
            })
            .collect(),
        data,
    };
    let mut callback_accounts = ctx.remaining_accounts.to_vec();
    callback_accounts.push(ctx.accounts.borrower_program.to_account_info());
    invoke(&callback, &callback_accounts)?;

    // =========================================================================
    // Check Repayment
    // =========================================================================

    ctx.accounts.reserve.reload()?;
    let balance_after = ctx.accounts.reserve.amount;
    require!(balance_after >= required, WarpError::FlashLoanNotRepaid);

    let totals = &mut ctx.accounts.asset_totals;
    totals.flash_loan_active = false;
    totals.record_fee(fee)?;

    emit!(FlashLoan {
        mint: ctx.accounts.mint.key(),
        borrower_program: ctx.accounts.borrower_program.key(),
        receiver: ctx.accounts.receiver.key(),
        amount,
        fee,
    });

    msg!("Flash loan repaid, reserve balance {}", balance_after);
    msg!("Total underlying deposit: {}", totals.total_underlying_deposit);

    Ok(())
}
