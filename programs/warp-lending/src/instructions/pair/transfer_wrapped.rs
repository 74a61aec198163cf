// =============================================================================
// Transfer Wrapped Instruction
// =============================================================================
// Moves wrapped collateral or wrapped borrow shares between positions of the
// same pair. Collateral leaving a position is guarded: what stays must still
// carry the sender's debt. Debt itself never moves.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::WrappedTransfer;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending::{self, PairQuotes};
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{AssetTotals, LendingPair, Position, PriceOracle, ShareBalance, WrappedKind};

#[derive(Accounts)]
#[instruction(kind: WrappedKind, amount: u64, to: Pubkey)]
pub struct TransferWrapped<'info> {
    /// Sender of the wrapped balance
    /// Must sign; pays for the receiving position if it is new
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// The sender's position, checked for health after the move
    #[account(
        mut,
        seeds = [POSITION_SEED, pair.key().as_ref(), owner.key().as_ref()],
        bump = from_position.bump
    )]
    pub from_position: Box<Account<'info, Position>>,

    /// Receiving position
    ///
    /// Constraints:
    /// - `to` differs from the owner
    ///
    /// init_if_needed: Created if `to` has no position in this pair
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), to.as_ref()],
        bump,
        constraint = to != owner.key() @ WarpError::InvalidToAddress
    )]
    pub to_position: Box<Account<'info, Position>>,

    #[account(
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Account<'info, ShareBalance>,

    // =========================================================================
    // Pricing
    // =========================================================================

    #[account(
        seeds = [ASSET_SEED, pair.collateral_mint.as_ref()],
        bump = collateral_totals.bump
    )]
    pub collateral_totals: Box<Account<'info, AssetTotals>>,

    #[account(
        seeds = [ASSET_SEED, pair.borrow_mint.as_ref()],
        bump = borrow_totals.bump
    )]
    pub borrow_totals: Box<Account<'info, AssetTotals>>,

    #[account(
        seeds = [ORACLE_SEED, pair.collateral_mint.as_ref()],
        bump = collateral_oracle.bump
    )]
    pub collateral_oracle: Account<'info, PriceOracle>,

    #[account(
        seeds = [ORACLE_SEED, pair.borrow_mint.as_ref()],
        bump = borrow_oracle.bump
    )]
    pub borrow_oracle: Account<'info, PriceOracle>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `kind` - Wrapped collateral or wrapped borrow shares
/// * `amount` - Wrapped units to move
/// * `to` - Receiving position owner
pub fn handler_transfer_wrapped<'info>(
    ctx: Context<'_, '_, '_, 'info, TransferWrapped<'info>>,
    kind: WrappedKind,
    amount: u64,
    to: Pubkey,
) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);

    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let owner = accounts.owner.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;

    let quotes = PairQuotes::new(
        &accounts.pair,
        &*accounts.collateral_oracle,
        &accounts.collateral_totals,
        &*accounts.borrow_oracle,
        &accounts.borrow_totals,
    );

    accounts
        .to_position
        .bind(pair_key, to, ctx.bumps.to_position);

    lending::transfer_wrapped(
        &accounts.pair,
        &mut accounts.from_position,
        &mut accounts.to_position,
        kind,
        amount,
        &quotes,
    )?;

    emit!(WrappedTransfer {
        pair: pair_key,
        kind,
        from: owner,
        to,
        amount,
    });

    msg!("Moved {} wrapped {:?} to {}", amount, kind, to);

    sync_rewards(
        &accounts.pair,
        &accounts.owner.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[
            RewardUpdate::wrapped(kind, &accounts.from_position),
            RewardUpdate::wrapped(kind, &accounts.to_position),
        ],
    )
}
