// =============================================================================
// Deposit Collateral Instruction
// =============================================================================
// Moves collateral ledger shares from the depositor to the pair and credits
// the same amount of wrapped collateral to `to`'s position.
//
// The pair must be allow-listed and approved by the depositor, since it pulls
// the depositor's ledger shares.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::CollateralDeposited;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending;
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{
    require_contract_access, AllowedContract, Authorization, LendingPair, Position, ShareBalance,
};

#[derive(Accounts)]
#[instruction(amount: u64, to: Pubkey)]
pub struct DepositCollateralToPair<'info> {
    /// Account whose collateral ledger shares move into the pair
    /// Must sign; pays for the position on first use
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Position credited with the wrapped collateral
    ///
    /// init_if_needed: Created the first time `to` deposits into this pair
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), to.as_ref()],
        bump
    )]
    pub to_position: Box<Account<'info, Position>>,

    // =========================================================================
    // Ledger Balances
    // =========================================================================

    /// The depositor's collateral ledger balance, debited
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.collateral_mint.as_ref(), depositor.key().as_ref()],
        bump = depositor_collateral.bump
    )]
    pub depositor_collateral: Account<'info, ShareBalance>,

    /// Collateral shares held by the pair, credited
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.collateral_mint.as_ref(), pair.key().as_ref()],
        bump = pair_collateral.bump
    )]
    pub pair_collateral: Account<'info, ShareBalance>,

    #[account(
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    // =========================================================================
    // Authorization
    // =========================================================================

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
/// * `amount` - Collateral ledger shares to deposit
/// * `to` - Position credited with the wrapped collateral
pub fn handler_deposit_collateral<'info>(
    ctx: Context<'_, '_, '_, 'info, DepositCollateralToPair<'info>>,
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

    lending::deposit_collateral(
        &mut accounts.pair,
        &mut accounts.depositor_collateral,
        &mut accounts.pair_collateral,
        &mut accounts.to_position,
        amount,
    )?;

    emit!(CollateralDeposited {
        pair: pair_key,
        from: depositor,
        to,
        amount,
    });

    msg!("Deposited {} collateral for {}", amount, to);
    msg!("Pair collateral: {}", accounts.pair.total_collateral);

    sync_rewards(
        &accounts.pair,
        &accounts.depositor.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[RewardUpdate::collateral(&accounts.to_position)],
    )
}
