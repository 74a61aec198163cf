// =============================================================================
// Delegate Borrow Instruction
// =============================================================================
// Lets `delegate` borrow up to `amount` against `owner`'s collateral, the
// debt landing on the owner. Like approve_contract, the owner signs the
// delegation message off chain and the preceding ed25519 instruction carries
// the signature:
//
//   "WarpVault v1:delegate" | program id | pair | owner | delegate | amount | nonce
//
// The grant replaces any previous allowance for the same delegate.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as instructions_sysvar;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::BorrowDelegated;
use crate::signature::{delegation_message, verify_signed_message};
use crate::state::{BorrowAllowance, LendingPair, UserNonce};

#[derive(Accounts)]
#[instruction(owner: Pubkey, delegate: Pubkey)]
pub struct DelegateBorrow<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + BorrowAllowance::INIT_SPACE,
        seeds = [
            BORROW_ALLOWANCE_SEED,
            pair.key().as_ref(),
            owner.as_ref(),
            delegate.as_ref()
        ],
        bump
    )]
    pub borrow_allowance: Account<'info, BorrowAllowance>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + UserNonce::INIT_SPACE,
        seeds = [NONCE_SEED, owner.as_ref()],
        bump
    )]
    pub user_nonce: Account<'info, UserNonce>,

    /// CHECK: address is the instructions sysvar
    #[account(address = instructions_sysvar::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `owner` - Debt owner who signed the delegation
/// * `delegate` - Account allowed to borrow
/// * `amount` - Borrow-asset ledger shares the delegate may borrow
pub fn handler_delegate_borrow(
    ctx: Context<DelegateBorrow>,
    owner: Pubkey,
    delegate: Pubkey,
    amount: u64,
) -> Result<()> {
    require!(delegate != Pubkey::default(), WarpError::InvalidToAddress);
    require!(delegate != owner, WarpError::InvalidToAddress);

    let pair_key = ctx.accounts.pair.key();

    let user_nonce = &mut ctx.accounts.user_nonce;
    if user_nonce.owner == Pubkey::default() {
        user_nonce.owner = owner;
        user_nonce.bump = ctx.bumps.user_nonce;
    }
    let message = delegation_message(&pair_key, &owner, &delegate, amount, user_nonce.nonce);
    verify_signed_message(&ctx.accounts.instructions.to_account_info(), &owner, &message)?;
    let nonce = user_nonce.consume()?;

    let allowance = &mut ctx.accounts.borrow_allowance;
    allowance.pair = pair_key;
    allowance.owner = owner;
    allowance.delegate = delegate;
    allowance.amount = amount;
    allowance.bump = ctx.bumps.borrow_allowance;

    emit!(BorrowDelegated {
        pair: pair_key,
        owner,
        delegate,
        amount,
        nonce,
    });

    msg!("{} may borrow {} on behalf of {} (nonce {})", delegate, amount, owner, nonce);

    Ok(())
}
