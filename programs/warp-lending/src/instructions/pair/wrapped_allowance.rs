// =============================================================================
// Wrapped Allowance Instructions
// =============================================================================
// Owners let a spender move part of their wrapped collateral or wrapped
// borrow shares. One allowance per (pair, owner, spender, kind).
//
// - approve sets the allowance outright
// - increase / decrease adjust it; decreasing below zero fails
// - transfer_wrapped_from spends it, with the same collateral guard as a
//   transfer by the owner
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::{WrappedApproval, WrappedTransfer};
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::lending::{self, PairQuotes};
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{
    AssetTotals, LendingPair, Position, PriceOracle, ShareBalance, WrappedAllowance, WrappedKind,
};

/// How an allowance changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowanceChange {
    Set(u64),
    Increase(u64),
    Decrease(u64),
}

impl AllowanceChange {
    pub fn apply(self, allowance: &mut WrappedAllowance) -> Result<()> {
        match self {
            AllowanceChange::Set(amount) => {
                allowance.amount = amount;
                Ok(())
            }
            AllowanceChange::Increase(amount) => allowance.increase(amount),
            AllowanceChange::Decrease(amount) => allowance.decrease(amount),
        }
    }
}

// =============================================================================
// Approve / Increase / Decrease
// =============================================================================

#[derive(Accounts)]
#[instruction(kind: WrappedKind, spender: Pubkey)]
pub struct SetWrappedAllowance<'info> {
    /// Owner of the wrapped balance
    /// Must sign; pays for the allowance account on first use
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// The allowance being changed
    /// init_if_needed: Created by the owner's first approval of this spender
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + WrappedAllowance::INIT_SPACE,
        seeds = [
            WRAPPED_ALLOWANCE_SEED,
            pair.key().as_ref(),
            owner.key().as_ref(),
            spender.as_ref(),
            &[kind.seed()]
        ],
        bump
    )]
    pub allowance: Account<'info, WrappedAllowance>,

    pub system_program: Program<'info, System>,
}

/// # Arguments
/// * `kind` - Which wrapped balance the allowance covers
/// * `spender` - Account allowed to move it
/// * `change` - New amount, or an adjustment of the current one
pub fn handler_change_wrapped_allowance(
    ctx: Context<SetWrappedAllowance>,
    kind: WrappedKind,
    spender: Pubkey,
    change: AllowanceChange,
) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    require!(
        spender != Pubkey::default() && spender != owner,
        WarpError::InvalidToAddress
    );

    let pair_key = ctx.accounts.pair.key();
    let allowance = &mut ctx.accounts.allowance;
    if allowance.owner == Pubkey::default() {
        allowance.pair = pair_key;
        allowance.owner = owner;
        allowance.spender = spender;
        allowance.kind = kind;
        allowance.bump = ctx.bumps.allowance;
    }

    change.apply(allowance)?;

    emit!(WrappedApproval {
        pair: pair_key,
        kind,
        owner,
        spender,
        amount: allowance.amount,
    });

    msg!("{} may move {} wrapped {:?} of {}", spender, allowance.amount, kind, owner);

    Ok(())
}

// =============================================================================
// Transfer From
// =============================================================================

#[derive(Accounts)]
#[instruction(kind: WrappedKind, from: Pubkey, amount: u64, to: Pubkey)]
pub struct TransferWrappedFrom<'info> {
    /// Holder of the allowance
    /// Must sign; pays for the receiving position if it is new
    #[account(mut)]
    pub spender: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Allowance granted by `from` to the signer for `kind`
    #[account(
        mut,
        seeds = [
            WRAPPED_ALLOWANCE_SEED,
            pair.key().as_ref(),
            from.as_ref(),
            spender.key().as_ref(),
            &[kind.seed()]
        ],
        bump = allowance.bump
    )]
    pub allowance: Account<'info, WrappedAllowance>,

    #[account(
        mut,
        seeds = [POSITION_SEED, pair.key().as_ref(), from.as_ref()],
        bump = from_position.bump
    )]
    pub from_position: Box<Account<'info, Position>>,

    /// Receiving position
    /// Constraints:
    /// - `to` differs from `from`
    /// init_if_needed: Created if `to` has no position in this pair
    #[account(
        init_if_needed,
        payer = spender,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), to.as_ref()],
        bump,
        constraint = to != from @ WarpError::InvalidToAddress
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
/// * `from` - Owner whose balance moves
/// * `amount` - Wrapped units to move
/// * `to` - Receiving position owner
pub fn handler_transfer_wrapped_from<'info>(
    ctx: Context<'_, '_, '_, 'info, TransferWrappedFrom<'info>>,
    kind: WrappedKind,
    from: Pubkey,
    amount: u64,
    to: Pubkey,
) -> Result<()> {
    require!(to != Pubkey::default(), WarpError::InvalidToAddress);

    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();

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

    lending::transfer_wrapped_from(
        &accounts.pair,
        &mut accounts.allowance,
        &mut accounts.from_position,
        &mut accounts.to_position,
        amount,
        &quotes,
    )?;

    emit!(WrappedTransfer {
        pair: pair_key,
        kind,
        from,
        to,
        amount,
    });

    msg!(
        "{} moved {} wrapped {:?} from {} to {}, {} allowance left",
        accounts.spender.key(),
        amount,
        kind,
        from,
        to,
        accounts.allowance.amount
    );

    sync_rewards(
        &accounts.pair,
        &accounts.spender.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[
            RewardUpdate::wrapped(kind, &accounts.from_position),
            RewardUpdate::wrapped(kind, &accounts.to_position),
        ],
    )
}
