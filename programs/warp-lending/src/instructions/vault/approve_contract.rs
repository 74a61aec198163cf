// =============================================================================
// Approve Contract Instruction
// =============================================================================
// Records an owner's approval (or revocation) of a contract that may then move
// the owner's ledger shares. The owner does not sign this transaction; they
// sign the approval message off chain and the transaction carries an ed25519
// verification of it as the preceding instruction. Anyone may relay it.
//
// Message: "WarpVault v1:approve" | program id | owner | contract | approved | nonce
//
// The nonce must be the owner's current one and is consumed here, so a
// message can never be replayed.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as instructions_sysvar;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Approval;
use crate::signature::{approval_message, verify_signed_message};
use crate::state::{AllowedContract, Authorization, UserNonce};

#[derive(Accounts)]
#[instruction(owner: Pubkey, contract: Pubkey)]
pub struct ApproveContract<'info> {
    /// Relayer, pays for the authorization and nonce accounts
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [ALLOWED_SEED, contract.as_ref()],
        bump = allowed_contract.bump
    )]
    pub allowed_contract: Account<'info, AllowedContract>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + Authorization::INIT_SPACE,
        seeds = [AUTHORIZATION_SEED, owner.as_ref(), contract.as_ref()],
        bump
    )]
    pub authorization: Account<'info, Authorization>,

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

/// Verifies the owner's signed approval and applies it
///
/// Shared with warp. Returns the nonce the message was signed under.
#[allow(clippy::too_many_arguments)]
pub fn apply_signed_approval(
    allowed_contract: &AllowedContract,
    authorization: &mut Authorization,
    authorization_bump: u8,
    user_nonce: &mut UserNonce,
    user_nonce_bump: u8,
    instructions: &AccountInfo,
    owner: Pubkey,
    contract: Pubkey,
    approved: bool,
) -> Result<u64> {
    require!(contract != Pubkey::default(), WarpError::InvalidContract);
    require!(
        allowed_contract.allowed && allowed_contract.contract == contract,
        WarpError::NotWhitelisted
    );

    if user_nonce.owner == Pubkey::default() {
        user_nonce.owner = owner;
        user_nonce.bump = user_nonce_bump;
    }
    let message = approval_message(&owner, &contract, approved, user_nonce.nonce);
    verify_signed_message(instructions, &owner, &message)?;
    let nonce = user_nonce.consume()?;

    authorization.owner = owner;
    authorization.contract = contract;
    authorization.approved = approved;
    authorization.bump = authorization_bump;

    emit!(Approval {
        owner,
        contract,
        approved,
        nonce,
    });

    Ok(nonce)
}

/// # Arguments
/// * `owner` - Share owner who signed the approval message
/// * `contract` - Contract (lending pair) being approved
/// * `approved` - true to approve, false to revoke
pub fn handler_approve_contract(
    ctx: Context<ApproveContract>,
    owner: Pubkey,
    contract: Pubkey,
    approved: bool,
) -> Result<()> {
    let nonce = apply_signed_approval(
        &ctx.accounts.allowed_contract,
        &mut ctx.accounts.authorization,
        ctx.bumps.authorization,
        &mut ctx.accounts.user_nonce,
        ctx.bumps.user_nonce,
        &ctx.accounts.instructions.to_account_info(),
        owner,
        contract,
        approved,
    )?;

    msg!(
        "Contract {} {} by {} (nonce {})",
        contract,
        if approved { "APPROVED" } else { "REVOKED" },
        owner,
        nonce
    );

    Ok(())
}
