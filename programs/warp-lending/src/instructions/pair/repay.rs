// =============================================================================
// Repay Instruction
// =============================================================================
// Pays down the debt of `debt_owner` with the payer's borrow-asset ledger
// shares. amount = 0 repays the full current debt. Anyone may repay anyone.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::Repaid;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending;
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{
    require_contract_access, AllowedContract, Authorization, LendingPair, Position, ShareBalance,
};

#[derive(Accounts)]
#[instruction(amount: u64, debt_owner: Pubkey)]
pub struct RepayToPair<'info> {
    /// Account whose ledger shares pay the debt
    /// Must sign
    #[account(mut)]
    pub payer: Signer<'info>,

    /// Pair the debt belongs to
    /// Accrues interest before the repayment
    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Position whose debt is paid, the payer's own or anyone else's
    #[account(
        mut,
        seeds = [POSITION_SEED, pair.key().as_ref(), debt_owner.as_ref()],
        bump = debt_position.bump
    )]
    pub debt_position: Box<Account<'info, Position>>,

    /// The payer's borrow-asset ledger balance, debited
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), payer.key().as_ref()],
        bump = payer_balance.bump
    )]
    pub payer_balance: Account<'info, ShareBalance>,

    /// Borrow-asset shares held by the pair, credited
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

    /// Payer's approval of the pair as a contract
    #[account(
        seeds = [AUTHORIZATION_SEED, payer.key().as_ref(), pair.key().as_ref()],
        bump = authorization.bump
    )]
    pub authorization: Account<'info, Authorization>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `amount` - Borrow-asset ledger shares to repay, 0 for the full debt
/// * `debt_owner` - Position whose debt is repaid
pub fn handler_repay<'info>(
    ctx: Context<'_, '_, '_, 'info, RepayToPair<'info>>,
    amount: u64,
    debt_owner: Pubkey,
) -> Result<()> {
    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let payer = accounts.payer.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;
    require_contract_access(
        &accounts.allowed_contract,
        &accounts.authorization,
        &pair_key,
        &payer,
    )?;

    let repaid = lending::repay(
        &mut accounts.pair,
        &mut accounts.payer_balance,
        &mut accounts.pair_borrow,
        &mut accounts.debt_position,
        amount,
    )?;

    emit!(Repaid {
        pair: pair_key,
        payer,
        debt_owner,
        amount: repaid,
    });

    if amount == 0 {
        msg!("Repaid full debt of {}: {}", debt_owner, repaid);
    } else {
        msg!("Repaid {} of {}'s debt", repaid, debt_owner);
    }

    sync_rewards(
        &accounts.pair,
        &accounts.payer.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[RewardUpdate::debt(&accounts.pair, &accounts.debt_position)?],
    )
}
