// =============================================================================
// Deposit Borrow Asset Instruction
// =============================================================================
// Supplies borrow-asset ledger shares to the pair's cash and mints wrapped
// borrow shares to `to` at the current exchange rate:
//
//   borrow_shares = amount / exchange_rate
//   exchange_rate = (cash + total_borrows - total_reserves) / total_borrow_shares
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::BorrowAssetDeposited;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending;
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{
    require_contract_access, AllowedContract, Authorization, LendingPair, Position, ShareBalance,
};

#[derive(Accounts)]
#[instruction(amount: u64, to: Pubkey)]
pub struct DepositBorrowAssetToPair<'info> {
    /// Supplier of borrow-asset ledger shares
    /// Must sign; pays for the position on first use
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Position credited with the minted wrapped borrow shares
    ///
    /// init_if_needed: Created the first time `to` supplies this pair
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), to.as_ref()],
        bump
    )]
    pub to_position: Box<Account<'info, Position>>,

    /// The depositor's borrow-asset ledger balance, debited
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), depositor.key().as_ref()],
        bump = depositor_borrow.bump
    )]
    pub depositor_borrow: Account<'info, ShareBalance>,

    /// Borrow-asset shares held by the pair, its cash
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    #[account(
        seeds = [ALLOWED_SEED, pair.key().as_ref()],
        bump = allowed_contract.bump
    )]
    pub allowed_contract: Account<'info, AllowedContract>,

    /// Depositor's approval of the pair as a contract
    #[account(
        seeds = [AUTHORIZATION_SEED, depositor.key().as_ref(), pair.key().as_ref()],
        bump = authorization.bump
    )]
    pub authorization: Account<'info, Authorization>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `amount` - Borrow-asset ledger shares to supply
/// * `to` - Position credited with the wrapped borrow shares
pub fn handler_deposit_borrow_asset<'info>(
    ctx: Context<'_, '_, '_, 'info, DepositBorrowAssetToPair<'info>>,
    amount: u64,
    to: Pubkey,
) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidDepositBeneficiary);

    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let depositor = accounts.depositor.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;
    require_contract_access(
        &accounts.allowed_contract,
        &accounts.authorization,
        &pair_key,
        &depositor,
    )?;

    accounts
        .to_position
        .bind(pair_key, to, ctx.bumps.to_position);

    let minted = lending::deposit_borrow_asset(
        &mut accounts.pair,
        &mut accounts.depositor_borrow,
        &mut accounts.pair_borrow,
        &mut accounts.to_position,
        amount,
    )?;

    emit!(BorrowAssetDeposited {
        pair: pair_key,
        from: depositor,
        to,
        amount,
        borrow_shares: minted,
    });

    msg!("Supplied {} borrow asset for {} wrapped shares", amount, minted);
    msg!("Pair cash: {}", accounts.pair_borrow.shares);

    sync_rewards(
        &accounts.pair,
        &accounts.depositor.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[RewardUpdate::borrow_asset(&accounts.to_position)],
    )
}
