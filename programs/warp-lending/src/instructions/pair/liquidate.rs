// =============================================================================
// Liquidate Instruction
// =============================================================================
// Takes over an undercollateralized position.
//
// When debt_value > collateral_value / collateral_factor:
// - the liquidator pays debt + debt * liquidation_fee * liquidation_fee_share
//   in borrow-asset ledger shares
// - the protocol cut is added to total_reserves
// - the borrower's debt is cleared
// - all of the borrower's wrapped collateral moves to the liquidator
//
// A healthy position is left untouched and no event is emitted.
//
// liquidate_many runs the same takeover for a list of borrowers whose
// positions travel, writable, in the remaining accounts. Healthy ones are
// skipped. The liquidator pays from their borrow-asset ledger balance, so a
// liquidator without funds deposits in an earlier instruction of the same
// transaction and withdraws the seized collateral in a later one.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::WarpError;
use crate::events::Liquidated;
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::instructions::warp::Counterparties;
use crate::lending::{self, LiquidationOutcome, PairQuotes};
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{
    require_contract_access, AllowedContract, AssetTotals, Authorization, LendingPair, Position,
    PriceOracle, ShareBalance,
};

#[derive(Accounts)]
#[instruction(borrower: Pubkey)]
pub struct LiquidatePosition<'info> {
    /// The account taking over the position
    /// Must sign; pays for their position if it is new
    #[account(mut)]
    pub liquidator: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Position being taken over
    /// Constraints:
    /// - Borrower must not be the liquidator
    #[account(
        mut,
        constraint = borrower != liquidator.key() @ WarpError::NotLiquidateSelf,
        seeds = [POSITION_SEED, pair.key().as_ref(), borrower.as_ref()],
        bump = borrower_position.bump
    )]
    pub borrower_position: Box<Account<'info, Position>>,

    /// Receives the seized wrapped collateral
    /// init_if_needed: Created on the liquidator's first takeover in this pair
    #[account(
        init_if_needed,
        payer = liquidator,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), liquidator.key().as_ref()],
        bump
    )]
    pub liquidator_position: Box<Account<'info, Position>>,

    /// Borrow-asset shares that pay the debt and the protocol cut
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), liquidator.key().as_ref()],
        bump = liquidator_balance.bump
    )]
    pub liquidator_balance: Account<'info, ShareBalance>,

    #[account(
        mut,
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

    #[account(
        seeds = [AUTHORIZATION_SEED, liquidator.key().as_ref(), pair.key().as_ref()],
        bump = authorization.bump
    )]
    pub authorization: Account<'info, Authorization>,

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
/// * `borrower` - Owner of the position to liquidate
pub fn handler_liquidate<'info>(
    ctx: Context<'_, '_, '_, 'info, LiquidatePosition<'info>>,
    borrower: Pubkey,
) -> Result<()> {
    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let liquidator = accounts.liquidator.key();

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;
    require_contract_access(
        &accounts.allowed_contract,
        &accounts.authorization,
        &pair_key,
        &liquidator,
    )?;

    let quotes = PairQuotes::new(
        &accounts.pair,
        &*accounts.collateral_oracle,
        &accounts.collateral_totals,
        &*accounts.borrow_oracle,
        &accounts.borrow_totals,
    );

    accounts
        .liquidator_position
        .bind(pair_key, liquidator, ctx.bumps.liquidator_position);

    let outcome = lending::liquidate(
        &mut accounts.pair,
        &mut accounts.borrower_position,
        &mut accounts.liquidator_position,
        &mut accounts.liquidator_balance,
        &mut accounts.pair_borrow,
        &quotes,
    )?;

    let outcome = match outcome {
        Some(outcome) => outcome,
        None => {
            msg!("Position of {} is healthy, nothing to liquidate", borrower);
            return Ok(());
        }
    };

    emit!(Liquidated {
        pair: pair_key,
        borrower,
        liquidator,
        debt_repaid: outcome.debt_repaid,
        protocol_cut: outcome.protocol_cut,
        collateral_seized: outcome.collateral_seized,
    });

    msg!(
        "Liquidated {}: repaid {} (+{} to reserves), seized {} collateral",
        borrower,
        outcome.debt_repaid,
        outcome.protocol_cut,
        outcome.collateral_seized
    );

    let [borrower_collateral, borrower_debt, _] =
        RewardUpdate::all(&accounts.pair, &accounts.borrower_position)?;
    sync_rewards(
        &accounts.pair,
        &accounts.liquidator.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &[
            borrower_collateral,
            borrower_debt,
            RewardUpdate::collateral(&accounts.liquidator_position),
        ],
    )
}

// =============================================================================
// Liquidate Many
// =============================================================================

#[derive(Accounts)]
pub struct LiquidateMany<'info> {
    /// The account taking over the positions
    /// Must sign; pays for their position if it is new
    #[account(mut)]
    pub liquidator: Signer<'info>,

    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// Receives the seized wrapped collateral
    /// init_if_needed: Created on the liquidator's first takeover in this pair
    #[account(
        init_if_needed,
        payer = liquidator,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), liquidator.key().as_ref()],
        bump
    )]
    pub liquidator_position: Box<Account<'info, Position>>,

    /// Borrow-asset shares that pay every debt and protocol cut
    #[account(
        mut,
        seeds = [SHARE_SEED, pair.borrow_mint.as_ref(), liquidator.key().as_ref()],
        bump = liquidator_balance.bump
    )]
    pub liquidator_balance: Account<'info, ShareBalance>,

    #[account(
        mut,
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

    #[account(
        seeds = [AUTHORIZATION_SEED, liquidator.key().as_ref(), pair.key().as_ref()],
        bump = authorization.bump
    )]
    pub authorization: Account<'info, Authorization>,

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

/// Sums of a liquidation batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub liquidated: u32,
    pub debt_repaid: u64,
    pub collateral_seized: u64,
}

impl BatchTotals {
    pub fn add(&mut self, outcome: &LiquidationOutcome) -> Result<()> {
        self.liquidated += 1;
        self.debt_repaid = self
            .debt_repaid
            .checked_add(outcome.debt_repaid)
            .ok_or(WarpError::MathOverflow)?;
        self.collateral_seized = self
            .collateral_seized
            .checked_add(outcome.collateral_seized)
            .ok_or(WarpError::MathOverflow)?;
        Ok(())
    }
}

/// # Arguments
/// * `borrowers` - Owners of the positions to liquidate, at most MAX_LIQUIDATIONS
pub fn handler_liquidate_many<'info>(
    ctx: Context<'_, '_, 'info, 'info, LiquidateMany<'info>>,
    borrowers: Vec<Pubkey>,
) -> Result<()> {
    require!(!borrowers.is_empty(), WarpError::InvalidAmount);
    require!(borrowers.len() <= MAX_LIQUIDATIONS, WarpError::TooManyLiquidations);

    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let liquidator = accounts.liquidator.key();
    let mut parties = Counterparties::new(ctx.remaining_accounts);

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;
    require_contract_access(
        &accounts.allowed_contract,
        &accounts.authorization,
        &pair_key,
        &liquidator,
    )?;

    let quotes = PairQuotes::new(
        &accounts.pair,
        &*accounts.collateral_oracle,
        &accounts.collateral_totals,
        &*accounts.borrow_oracle,
        &accounts.borrow_totals,
    );

    accounts
        .liquidator_position
        .bind(pair_key, liquidator, ctx.bumps.liquidator_position);

    let mut totals = BatchTotals::default();
    for borrower in borrowers.iter() {
        require!(*borrower != liquidator, WarpError::NotLiquidateSelf);
        let mut position = parties.position(&pair_key, borrower)?;

        let outcome = lending::liquidate(
            &mut accounts.pair,
            &mut position,
            &mut accounts.liquidator_position,
            &mut accounts.liquidator_balance,
            &mut accounts.pair_borrow,
            &quotes,
        )?;
        let Some(outcome) = outcome else {
            msg!("Position of {} is healthy, skipped", borrower);
            continue;
        };

        parties.settle_position(&accounts.pair, &position)?;
        totals.add(&outcome)?;

        emit!(Liquidated {
            pair: pair_key,
            borrower: *borrower,
            liquidator,
            debt_repaid: outcome.debt_repaid,
            protocol_cut: outcome.protocol_cut,
            collateral_seized: outcome.collateral_seized,
        });
    }

    msg!(
        "Liquidated {} of {} positions: repaid {}, seized {} collateral",
        totals.liquidated,
        borrowers.len(),
        totals.debt_repaid,
        totals.collateral_seized
    );

    if totals.liquidated == 0 {
        return Ok(());
    }

    let mut updates = parties.into_reward_updates();
    updates.push(RewardUpdate::collateral(&accounts.liquidator_position));
    sync_rewards(
        &accounts.pair,
        &accounts.liquidator.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &updates,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_totals_sum_only_liquidated_positions() {
        let mut totals = BatchTotals::default();
        totals
            .add(&LiquidationOutcome { debt_repaid: 500, protocol_cut: 1, collateral_seized: 1_000 })
            .unwrap();
        totals
            .add(&LiquidationOutcome { debt_repaid: 20, protocol_cut: 0, collateral_seized: 30 })
            .unwrap();

        assert_eq!(
            totals,
            BatchTotals { liquidated: 2, debt_repaid: 520, collateral_seized: 1_030 }
        );
    }

    #[test]
    fn batch_totals_refuse_to_wrap() {
        let mut totals = BatchTotals { debt_repaid: u64::MAX, ..Default::default() };
        assert_eq!(
            totals
                .add(&LiquidationOutcome { debt_repaid: 1, protocol_cut: 0, collateral_seized: 0 })
                .unwrap_err(),
            WarpError::MathOverflow.into()
        );
    }
}
