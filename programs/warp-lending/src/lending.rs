// =============================================================================
// Lending pair primitives
// =============================================================================
// The accounting behind every pair action, used by the single-action
// instructions and by warp. Callers accrue interest first, check contract
// access before pulling a user's ledger shares, and report the touched
// balances to the reward hook afterwards.
//
// All amounts are ledger shares of the asset involved.
// =============================================================================

use anchor_lang::prelude::*;

use crate::error::WarpError;
use crate::ledger;
use crate::state::{
    AssetQuote, AssetTotals, BorrowAllowance, LendingPair, PairAction, Position, PriceSource,
    ShareBalance, WrappedAllowance, WrappedKind,
};

/// Quotes for both sides of a pair
pub struct PairQuotes {
    pub collateral: AssetQuote,
    pub borrow: AssetQuote,
}

impl PairQuotes {
    pub fn new(
        pair: &LendingPair,
        collateral_price: &impl PriceSource,
        collateral_totals: &AssetTotals,
        borrow_price: &impl PriceSource,
        borrow_totals: &AssetTotals,
    ) -> Self {
        Self {
            collateral: AssetQuote::new(collateral_price, collateral_totals, pair.collateral_decimals),
            borrow: AssetQuote::new(borrow_price, borrow_totals, pair.borrow_decimals),
        }
    }

    pub fn collateral_value(&self, collateral: u64) -> Result<u128> {
        self.collateral.value_of(collateral)
    }

    /// Rounded up, so dust debt is never free
    pub fn debt_value(&self, debt: u64) -> Result<u128> {
        self.borrow.value_of_ceil(debt)
    }
}

/// What a liquidation moved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub debt_repaid: u64,
    pub protocol_cut: u64,
    pub collateral_seized: u64,
}

// =============================================================================
// Deposits
// =============================================================================

/// Wraps `amount` collateral shares 1:1 into `to`
pub fn deposit_collateral(
    pair: &mut LendingPair,
    from: &mut ShareBalance,
    pair_collateral: &mut ShareBalance,
    to: &mut Position,
    amount: u64,
) -> Result<()> {
    pair.require_active(PairAction::Deposit)?;
    require!(amount > 0, WarpError::InvalidAmount);
    pair.require_collateral_limit(amount)?;

    ledger::transfer(from, pair_collateral, amount)?;
    to.credit(WrappedKind::Collateral, amount)?;
    pair.total_collateral = pair
        .total_collateral
        .checked_add(amount)
        .ok_or(WarpError::MathOverflow)?;
    Ok(())
}

/// Supplies `amount` borrow-asset shares, returns wrapped borrow shares minted
pub fn deposit_borrow_asset(
    pair: &mut LendingPair,
    from: &mut ShareBalance,
    pair_borrow: &mut ShareBalance,
    to: &mut Position,
    amount: u64,
) -> Result<u64> {
    pair.require_active(PairAction::Deposit)?;
    require!(amount > 0, WarpError::InvalidAmount);

    let cash = pair_borrow.shares;
    pair.require_borrow_deposit_limit(amount, cash)?;

    // Priced before the deposit lands in cash
    let minted = pair.borrow_shares_for(amount, cash)?;
    require!(minted > 0, WarpError::InvalidAmount);

    ledger::transfer(from, pair_borrow, amount)?;
    to.credit(WrappedKind::BorrowShares, minted)?;
    pair.total_borrow_shares = pair
        .total_borrow_shares
        .checked_add(minted)
        .ok_or(WarpError::MathOverflow)?;
    Ok(minted)
}

// =============================================================================
// Debt
// =============================================================================

/// Lends `amount` against `debt_owner`'s collateral and pays it to `to`
///
/// A `borrower` other than the debt owner spends a borrow allowance.
#[allow(clippy::too_many_arguments)]
pub fn borrow(
    pair: &mut LendingPair,
    debt_owner: &mut Position,
    borrower: &Pubkey,
    allowance: Option<&mut BorrowAllowance>,
    pair_borrow: &mut ShareBalance,
    to: &mut ShareBalance,
    amount: u64,
    quotes: &PairQuotes,
) -> Result<()> {
    pair.require_active(PairAction::Borrow)?;
    require!(amount > 0, WarpError::InvalidAmount);

    let debt = pair.debt_of(debt_owner)?;
    pair.require_can_borrow(
        quotes.debt_value(debt)?,
        quotes.debt_value(amount)?,
        quotes.collateral_value(debt_owner.collateral)?,
    )?;
    require!(pair_borrow.shares >= amount, WarpError::NotEnoughBalance);
    pair.require_debt_limit(amount)?;

    if *borrower != debt_owner.owner {
        allowance
            .ok_or(WarpError::BorrowAllowanceExceeded)?
            .consume(amount)?;
    }

    let new_debt = debt.checked_add(amount).ok_or(WarpError::MathOverflow)?;
    debt_owner.set_debt(new_debt, pair.borrow_index);
    pair.total_borrows = pair
        .total_borrows
        .checked_add(amount)
        .ok_or(WarpError::MathOverflow)?;

    ledger::transfer(pair_borrow, to, amount)
}

/// Pays down `debt_owner`'s debt from `payer`, `0` = all of it
///
/// Returns the amount repaid.
pub fn repay(
    pair: &mut LendingPair,
    payer: &mut ShareBalance,
    pair_borrow: &mut ShareBalance,
    debt_owner: &mut Position,
    amount: u64,
) -> Result<u64> {
    let debt = pair.debt_of(debt_owner)?;
    let amount = if amount == 0 { debt } else { amount };
    require!(amount > 0 && amount <= debt, WarpError::MoreThanOwed);

    ledger::transfer(payer, pair_borrow, amount)?;

    debt_owner.set_debt(debt - amount, pair.borrow_index);
    // Per-position rounding can leave total_borrows a unit below the sum of debts
    pair.total_borrows = pair.total_borrows.saturating_sub(amount);
    Ok(amount)
}

// =============================================================================
// Withdrawals
// =============================================================================

/// Burns wrapped borrow shares (`0` = all) for ledger shares at the exchange rate
///
/// Returns (wrapped shares burned, ledger shares paid).
pub fn redeem(
    pair: &mut LendingPair,
    owner: &mut Position,
    pair_borrow: &mut ShareBalance,
    to: &mut ShareBalance,
    borrow_shares: u64,
) -> Result<(u64, u64)> {
    let borrow_shares = if borrow_shares == 0 {
        owner.borrow_shares
    } else {
        borrow_shares
    };
    require!(borrow_shares > 0, WarpError::InvalidAmount);

    let cash = pair_borrow.shares;
    let amount = pair.underlying_for(borrow_shares, cash)?;
    // Reserves sit in cash but belong to the protocol
    require!(
        amount <= cash.saturating_sub(pair.total_reserves),
        WarpError::NotEnoughBalance
    );

    owner.debit(WrappedKind::BorrowShares, borrow_shares)?;
    pair.total_borrow_shares = pair
        .total_borrow_shares
        .checked_sub(borrow_shares)
        .ok_or(WarpError::MathUnderflow)?;

    ledger::transfer(pair_borrow, to, amount)?;
    Ok((borrow_shares, amount))
}

/// Collateral not needed to carry the position's debt
pub fn free_collateral(pair: &LendingPair, position: &Position, quotes: &PairQuotes) -> Result<u64> {
    let debt = pair.debt_of(position)?;
    if debt == 0 {
        return Ok(position.collateral);
    }
    let required_value = pair.required_collateral_value(quotes.debt_value(debt)?)?;
    let required = quotes.collateral.shares_covering(required_value)?;
    Ok(position.collateral.saturating_sub(required))
}

/// Collateral left in a position must still cover its debt
pub fn require_collateral_guard(
    pair: &LendingPair,
    position: &Position,
    remaining_collateral: u64,
    quotes: &PairQuotes,
) -> Result<()> {
    let debt = pair.debt_of(position)?;
    if debt == 0 {
        return Ok(());
    }
    pair.require_collateral_covers(
        quotes.collateral_value(remaining_collateral)?,
        quotes.debt_value(debt)?,
    )
}

/// Unwraps collateral (`0` = everything free) back to ledger shares
pub fn withdraw_collateral(
    pair: &mut LendingPair,
    owner: &mut Position,
    pair_collateral: &mut ShareBalance,
    to: &mut ShareBalance,
    amount: u64,
    quotes: &PairQuotes,
) -> Result<u64> {
    let amount = if amount == 0 {
        free_collateral(pair, owner, quotes)?
    } else {
        amount
    };
    require!(amount > 0, WarpError::InvalidAmount);

    let remaining = owner
        .collateral
        .checked_sub(amount)
        .ok_or(WarpError::NotEnoughBalance)?;
    require_collateral_guard(pair, owner, remaining, quotes)?;

    owner.debit(WrappedKind::Collateral, amount)?;
    pair.total_collateral = pair
        .total_collateral
        .checked_sub(amount)
        .ok_or(WarpError::MathUnderflow)?;

    ledger::transfer(pair_collateral, to, amount)?;
    Ok(amount)
}

/// Moves wrapped balance between positions; collateral stays guarded
pub fn transfer_wrapped(
    pair: &LendingPair,
    from: &mut Position,
    to: &mut Position,
    kind: WrappedKind,
    amount: u64,
    quotes: &PairQuotes,
) -> Result<()> {
    require!(amount > 0, WarpError::InvalidAmount);

    if kind == WrappedKind::Collateral {
        let remaining = from
            .collateral
            .checked_sub(amount)
            .ok_or(WarpError::NotEnoughBalance)?;
        require_collateral_guard(pair, from, remaining, quotes)?;
    }

    from.debit(kind, amount)?;
    to.credit(kind, amount)
}

/// transfer_wrapped on the owner's behalf, spending the spender's allowance
pub fn transfer_wrapped_from(
    pair: &LendingPair,
    allowance: &mut WrappedAllowance,
    from: &mut Position,
    to: &mut Position,
    amount: u64,
    quotes: &PairQuotes,
) -> Result<()> {
    require!(
        from.wrapped(allowance.kind) >= amount,
        WarpError::NotEnoughBalance
    );
    require!(allowance.amount >= amount, WarpError::WrappedAllowanceExceeded);

    transfer_wrapped(pair, from, to, allowance.kind, amount, quotes)?;
    allowance.amount -= amount;
    Ok(())
}

// =============================================================================
// Liquidation
// =============================================================================

/// Takes over an undercollateralized position
///
/// The liquidator repays the debt plus the protocol cut and receives all of
/// the borrower's wrapped collateral. Returns None, changing nothing, when
/// the position is healthy.
pub fn liquidate(
    pair: &mut LendingPair,
    borrower: &mut Position,
    liquidator: &mut Position,
    liquidator_balance: &mut ShareBalance,
    pair_borrow: &mut ShareBalance,
    quotes: &PairQuotes,
) -> Result<Option<LiquidationOutcome>> {
    require!(borrower.owner != liquidator.owner, WarpError::NotLiquidateSelf);

    let debt = pair.debt_of(borrower)?;
    if debt == 0 {
        return Ok(None);
    }
    let debt_value = quotes.debt_value(debt)?;
    let collateral_value = quotes.collateral_value(borrower.collateral)?;
    if !pair.is_liquidatable(debt_value, collateral_value)? {
        return Ok(None);
    }

    let protocol_cut = pair.liquidation_protocol_cut(debt)?;
    let payment = debt
        .checked_add(protocol_cut)
        .ok_or(WarpError::MathOverflow)?;
    ledger::transfer(liquidator_balance, pair_borrow, payment)?;

    pair.total_reserves = pair
        .total_reserves
        .checked_add(protocol_cut)
        .ok_or(WarpError::MathOverflow)?;
    pair.total_borrows = pair.total_borrows.saturating_sub(debt);
    borrower.set_debt(0, pair.borrow_index);

    let seized = borrower.collateral;
    borrower.debit(WrappedKind::Collateral, seized)?;
    liquidator.credit(WrappedKind::Collateral, seized)?;

    Ok(Some(LiquidationOutcome {
        debt_repaid: debt,
        protocol_cut,
        collateral_seized: seized,
    }))
}

// =============================================================================
// Reserves
// =============================================================================

/// Reserves that cash can pay out right now
pub fn withdrawable_fees(pair: &LendingPair, cash: u64) -> u64 {
    pair.total_reserves.min(cash)
}

/// Pays reserves (`0` = all) to the fee receiver's ledger balance
pub fn withdraw_fees(
    pair: &mut LendingPair,
    pair_borrow: &mut ShareBalance,
    receiver: &mut ShareBalance,
    amount: u64,
) -> Result<u64> {
    let amount = pair.resolve_fee_withdrawal(amount)?;
    ledger::transfer(pair_borrow, receiver, amount)?;
    pair.total_reserves = pair
        .total_reserves
        .checked_sub(amount)
        .ok_or(WarpError::MathUnderflow)?;
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    const DOLLAR: u128 = 100_000_000;

    struct Fixed(u128);

    impl PriceSource for Fixed {
        fn price_in_usd(&self) -> Result<u128> {
            Ok(self.0)
        }
    }

    fn quotes(collateral_price: u128, borrow_price: u128) -> PairQuotes {
        let totals = AssetTotals::default();
        PairQuotes {
            collateral: AssetQuote::new(&Fixed(collateral_price), &totals, 0),
            borrow: AssetQuote::new(&Fixed(borrow_price), &totals, 0),
        }
    }

    fn pair() -> LendingPair {
        LendingPair {
            collateral_factor: DEFAULT_COLLATERAL_FACTOR,
            liquidation_fee: DEFAULT_LIQUIDATION_FEE,
            liquidation_fee_share: DEFAULT_LIQUIDATION_FEE_SHARE,
            reserve_factor: DEFAULT_RESERVE_FACTOR,
            initial_exchange_rate: DEFAULT_INITIAL_EXCHANGE_RATE,
            borrow_index: WAD,
            ..Default::default()
        }
    }

    fn position(owner: Pubkey) -> Position {
        Position { owner, ..Default::default() }
    }

    fn balance(shares: u64) -> ShareBalance {
        ShareBalance { shares, ..Default::default() }
    }

    /// Pair with 1000 collateral posted by `owner` and 1000 borrow-asset cash
    struct Market {
        pair: LendingPair,
        owner: Position,
        pair_collateral: ShareBalance,
        pair_borrow: ShareBalance,
        lender: Position,
    }

    fn market() -> Market {
        let mut m = Market {
            pair: pair(),
            owner: position(Pubkey::new_unique()),
            pair_collateral: balance(0),
            pair_borrow: balance(0),
            lender: position(Pubkey::new_unique()),
        };
        let mut owner_collateral = balance(1_000);
        let mut lender_funds = balance(1_000);

        deposit_collateral(
            &mut m.pair,
            &mut owner_collateral,
            &mut m.pair_collateral,
            &mut m.owner,
            1_000,
        )
        .unwrap();
        deposit_borrow_asset(
            &mut m.pair,
            &mut lender_funds,
            &mut m.pair_borrow,
            &mut m.lender,
            1_000,
        )
        .unwrap();
        m
    }

    fn borrow_self(m: &mut Market, to: &mut ShareBalance, amount: u64, q: &PairQuotes) -> Result<()> {
        let owner = m.owner.owner;
        borrow(
            &mut m.pair,
            &mut m.owner,
            &owner,
            None,
            &mut m.pair_borrow,
            to,
            amount,
            q,
        )
    }

    #[test]
    fn borrow_limit_at_150_percent() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);

        assert_eq!(
            borrow_self(&mut m, &mut wallet, 667, &q).unwrap_err(),
            WarpError::BorrowingMoreThanAllowed.into()
        );
        borrow_self(&mut m, &mut wallet, 666, &q).unwrap();

        assert_eq!(wallet.shares, 666);
        assert_eq!(m.pair.total_borrows, 666);
        assert_eq!(m.pair.debt_of(&m.owner).unwrap(), 666);
    }

    #[test]
    fn debt_limit_stops_the_last_unit() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        m.pair.risk_config.total_pair_debt_limit = 100;
        let mut wallet = balance(0);

        borrow_self(&mut m, &mut wallet, 90, &q).unwrap();
        borrow_self(&mut m, &mut wallet, 10, &q).unwrap();
        assert_eq!(
            borrow_self(&mut m, &mut wallet, 1, &q).unwrap_err(),
            WarpError::ExceedsTotalPairDebtLimit.into()
        );
    }

    #[test]
    fn borrow_needs_cash() {
        let q = quotes(10 * DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);

        assert_eq!(
            borrow_self(&mut m, &mut wallet, 1_001, &q).unwrap_err(),
            WarpError::NotEnoughBalance.into()
        );
    }

    #[test]
    fn delegate_spends_allowance() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let delegate = Pubkey::new_unique();
        let mut wallet = balance(0);

        let denied = borrow(
            &mut m.pair,
            &mut m.owner,
            &delegate,
            None,
            &mut m.pair_borrow,
            &mut wallet,
            10,
            &q,
        );
        assert_eq!(denied.unwrap_err(), WarpError::BorrowAllowanceExceeded.into());

        let mut allowance = BorrowAllowance { amount: 50, ..Default::default() };
        borrow(
            &mut m.pair,
            &mut m.owner,
            &delegate,
            Some(&mut allowance),
            &mut m.pair_borrow,
            &mut wallet,
            30,
            &q,
        )
        .unwrap();

        assert_eq!(allowance.amount, 20);
        assert_eq!(wallet.shares, 30);
        assert_eq!(m.pair.debt_of(&m.owner).unwrap(), 30);
    }

    #[test]
    fn repay_zero_clears_debt() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 100, &q).unwrap();

        assert_eq!(
            repay(&mut m.pair, &mut wallet, &mut m.pair_borrow, &mut m.owner, 101).unwrap_err(),
            WarpError::MoreThanOwed.into()
        );
        assert_eq!(
            repay(&mut m.pair, &mut wallet, &mut m.pair_borrow, &mut m.owner, 0).unwrap(),
            100
        );
        assert_eq!(m.pair.debt_of(&m.owner).unwrap(), 0);
        assert_eq!(m.pair.total_borrows, 0);
        assert_eq!(m.pair_borrow.shares, 1_000);

        assert_eq!(
            repay(&mut m.pair, &mut wallet, &mut m.pair_borrow, &mut m.owner, 0).unwrap_err(),
            WarpError::MoreThanOwed.into()
        );
    }

    #[test]
    fn liquidation_after_borrow_price_doubles() {
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 500, &quotes(DOLLAR, DOLLAR)).unwrap();

        let mut liquidator = position(Pubkey::new_unique());
        let mut liquidator_funds = balance(600);
        let doubled = quotes(DOLLAR, 2 * DOLLAR);

        let outcome = liquidate(
            &mut m.pair,
            &mut m.owner,
            &mut liquidator,
            &mut liquidator_funds,
            &mut m.pair_borrow,
            &doubled,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            outcome,
            LiquidationOutcome {
                debt_repaid: 500,
                protocol_cut: 1,
                collateral_seized: 1_000,
            }
        );
        assert_eq!(liquidator_funds.shares, 99);
        assert_eq!(liquidator.collateral, 1_000);
        assert_eq!(m.owner.collateral, 0);
        assert_eq!(m.pair.debt_of(&m.owner).unwrap(), 0);
        assert_eq!(m.pair.total_reserves, 1);
        assert_eq!(m.pair.total_borrows, 0);
    }

    #[test]
    fn healthy_position_is_left_alone() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 500, &q).unwrap();

        let mut liquidator = position(Pubkey::new_unique());
        let mut liquidator_funds = balance(600);

        let outcome = liquidate(
            &mut m.pair,
            &mut m.owner,
            &mut liquidator,
            &mut liquidator_funds,
            &mut m.pair_borrow,
            &q,
        )
        .unwrap();

        assert!(outcome.is_none());
        assert_eq!(liquidator_funds.shares, 600);
        assert_eq!(m.owner.collateral, 1_000);
    }

    #[test]
    fn cannot_liquidate_self() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut me = position(m.owner.owner);
        let mut funds = balance(0);

        assert_eq!(
            liquidate(&mut m.pair, &mut m.owner, &mut me, &mut funds, &mut m.pair_borrow, &q)
                .unwrap_err(),
            WarpError::NotLiquidateSelf.into()
        );
    }

    #[test]
    fn withdraw_zero_keeps_just_enough_collateral() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        let mut returned = balance(0);
        borrow_self(&mut m, &mut wallet, 400, &q).unwrap();

        let withdrawn = withdraw_collateral(
            &mut m.pair,
            &mut m.owner,
            &mut m.pair_collateral,
            &mut returned,
            0,
            &q,
        )
        .unwrap();

        // 400 debt needs 600 collateral at 150%
        assert_eq!(withdrawn, 400);
        assert_eq!(m.owner.collateral, 600);
        assert_eq!(returned.shares, 400);

        assert_eq!(
            withdraw_collateral(&mut m.pair, &mut m.owner, &mut m.pair_collateral, &mut returned, 1, &q)
                .unwrap_err(),
            WarpError::ExceedsAllowed.into()
        );
    }

    #[test]
    fn collateral_transfer_is_guarded() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 600, &q).unwrap();

        let mut friend = position(Pubkey::new_unique());
        assert_eq!(
            transfer_wrapped(&m.pair, &mut m.owner, &mut friend, WrappedKind::Collateral, 200, &q)
                .unwrap_err(),
            WarpError::ExceedsAllowed.into()
        );
        transfer_wrapped(&m.pair, &mut m.owner, &mut friend, WrappedKind::Collateral, 100, &q).unwrap();
        assert_eq!(friend.collateral, 100);
    }

    fn wrapped_allowance(kind: WrappedKind, amount: u64) -> WrappedAllowance {
        WrappedAllowance {
            pair: Pubkey::default(),
            owner: Pubkey::default(),
            spender: Pubkey::default(),
            kind,
            amount,
            bump: 0,
        }
    }

    #[test]
    fn spender_moves_up_to_the_allowance() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut bob = position(Pubkey::new_unique());
        let mut allowance = wrapped_allowance(WrappedKind::BorrowShares, 10);

        assert_eq!(
            transfer_wrapped_from(&m.pair, &mut allowance, &mut m.lender, &mut bob, 11, &q)
                .unwrap_err(),
            WarpError::WrappedAllowanceExceeded.into()
        );
        transfer_wrapped_from(&m.pair, &mut allowance, &mut m.lender, &mut bob, 5, &q).unwrap();

        assert_eq!(allowance.amount, 5);
        assert_eq!(bob.borrow_shares, 5);
        assert_eq!(m.lender.borrow_shares, 995);
    }

    #[test]
    fn collateral_allowance_still_respects_debt() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 600, &q).unwrap();

        let mut bob = position(Pubkey::new_unique());
        let mut allowance = wrapped_allowance(WrappedKind::Collateral, 500);

        assert_eq!(
            transfer_wrapped_from(&m.pair, &mut allowance, &mut m.owner, &mut bob, 200, &q)
                .unwrap_err(),
            WarpError::ExceedsAllowed.into()
        );
        assert_eq!(allowance.amount, 500);

        transfer_wrapped_from(&m.pair, &mut allowance, &mut m.owner, &mut bob, 100, &q).unwrap();
        assert_eq!(allowance.amount, 400);
        assert_eq!(bob.collateral, 100);
    }

    #[test]
    fn batch_liquidation_skips_healthy_positions() {
        // Two borrowers, only the heavier one goes under when the price moves
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 600, &quotes(DOLLAR, DOLLAR)).unwrap();

        let mut light = position(Pubkey::new_unique());
        let mut light_collateral = balance(1_000);
        deposit_collateral(&mut m.pair, &mut light_collateral, &mut m.pair_collateral, &mut light, 1_000)
            .unwrap();
        let light_owner = light.owner;
        borrow(
            &mut m.pair,
            &mut light,
            &light_owner,
            None,
            &mut m.pair_borrow,
            &mut wallet,
            100,
            &quotes(DOLLAR, DOLLAR),
        )
        .unwrap();

        let moved = quotes(DOLLAR, DOLLAR + DOLLAR / 5);
        let mut liquidator = position(Pubkey::new_unique());
        let mut funds = balance(1_000);
        let mut outcomes = Vec::new();
        for borrower in [&mut m.owner, &mut light] {
            if let Some(outcome) = liquidate(
                &mut m.pair,
                borrower,
                &mut liquidator,
                &mut funds,
                &mut m.pair_borrow,
                &moved,
            )
            .unwrap()
            {
                outcomes.push(outcome);
            }
        }

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].debt_repaid, 600);
        assert_eq!(liquidator.collateral, 1_000);
        assert_eq!(m.pair.debt_of(&light).unwrap(), 100);
        assert_eq!(light.collateral, 1_000);
        assert_eq!(m.pair.total_borrows, 100);
    }

    #[test]
    fn redeem_returns_interest_to_lenders() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 500, &q).unwrap();

        // Interest of 100, half kept as reserves
        m.pair.total_borrows += 100;
        m.pair.total_reserves += 50;
        m.pair.borrow_index = WAD + WAD / 5;

        let mut payer = balance(600);
        repay(&mut m.pair, &mut payer, &mut m.pair_borrow, &mut m.owner, 0).unwrap();
        assert_eq!(payer.shares, 0);

        let mut lender_wallet = balance(0);
        let (burned, paid) = redeem(
            &mut m.pair,
            &mut m.lender,
            &mut m.pair_borrow,
            &mut lender_wallet,
            0,
        )
        .unwrap();

        assert_eq!(burned, 1_000);
        assert_eq!(paid, 1_050);
        assert_eq!(m.pair_borrow.shares, 50);
        assert_eq!(m.pair.total_reserves, 50);
    }

    #[test]
    fn redeem_leaves_reserves_in_cash() {
        let q = quotes(DOLLAR, DOLLAR);
        let mut m = market();
        let mut wallet = balance(0);
        borrow_self(&mut m, &mut wallet, 500, &q).unwrap();

        // 500 cash, 600 owed, 50 of it reserves: exchange rate 1.05
        m.pair.total_borrows += 100;
        m.pair.total_reserves += 50;
        m.pair.borrow_index = WAD + WAD / 5;

        let mut lender_wallet = balance(0);
        // 472 is covered by cash but eats into the 50 of reserves
        assert_eq!(
            redeem(&mut m.pair, &mut m.lender, &mut m.pair_borrow, &mut lender_wallet, 450)
                .unwrap_err(),
            WarpError::NotEnoughBalance.into()
        );
        assert_eq!(m.lender.borrow_shares, 1_000);

        let (burned, paid) =
            redeem(&mut m.pair, &mut m.lender, &mut m.pair_borrow, &mut lender_wallet, 400).unwrap();
        assert_eq!((burned, paid), (400, 420));

        let mut receiver = balance(0);
        assert_eq!(
            withdraw_fees(&mut m.pair, &mut m.pair_borrow, &mut receiver, 0).unwrap(),
            50
        );
        assert_eq!(m.pair_borrow.shares, 30);
    }

    #[test]
    fn dust_debt_is_not_free() {
        // 9-decimal asset at 1e-8 USD: one unit is worth less than the
        // smallest USD step
        let totals = AssetTotals::default();
        let q = PairQuotes {
            collateral: AssetQuote::new(&Fixed(DOLLAR), &totals, 0),
            borrow: AssetQuote::new(&Fixed(1), &totals, 9),
        };
        let mut m = market();
        let mut nobody = position(Pubkey::new_unique());
        let owner = nobody.owner;
        let mut wallet = balance(0);

        let dust = borrow(
            &mut m.pair,
            &mut nobody,
            &owner,
            None,
            &mut m.pair_borrow,
            &mut wallet,
            1,
            &q,
        );
        assert_eq!(dust.unwrap_err(), WarpError::BorrowingMoreThanAllowed.into());
        assert_eq!(wallet.shares, 0);
    }

    #[test]
    fn deposit_limits_and_pause() {
        let mut m = market();
        let mut funds = balance(1_000);
        let mut depositor = position(Pubkey::new_unique());

        m.pair.risk_config.deposit_collateral_limit = 1_100;
        assert_eq!(
            deposit_collateral(&mut m.pair, &mut funds, &mut m.pair_collateral, &mut depositor, 101)
                .unwrap_err(),
            WarpError::ExceedsDepositCollateralLimit.into()
        );

        m.pair.risk_config.deposit_borrow_limit = 1_050;
        assert_eq!(
            deposit_borrow_asset(&mut m.pair, &mut funds, &mut m.pair_borrow, &mut depositor, 51)
                .unwrap_err(),
            WarpError::ExceedsDepositBorrowLimit.into()
        );

        m.pair.set_paused(PairAction::Deposit, true);
        assert_eq!(
            deposit_collateral(&mut m.pair, &mut funds, &mut m.pair_collateral, &mut depositor, 1)
                .unwrap_err(),
            WarpError::Paused.into()
        );
    }

    #[test]
    fn sweep_is_capped_by_cash() {
        let mut m = market();
        m.pair.total_reserves = 30;
        assert_eq!(withdrawable_fees(&m.pair, m.pair_borrow.shares), 30);

        m.pair_borrow.shares = 12;
        let amount = withdrawable_fees(&m.pair, m.pair_borrow.shares);
        assert_eq!(amount, 12);

        let mut receiver = balance(0);
        withdraw_fees(&mut m.pair, &mut m.pair_borrow, &mut receiver, amount).unwrap();
        assert_eq!(m.pair.total_reserves, 18);
        assert_eq!(withdrawable_fees(&m.pair, m.pair_borrow.shares), 0);
    }

    #[test]
    fn fees_go_to_receiver() {
        let mut m = market();
        m.pair.total_reserves = 30;
        let mut receiver = balance(0);

        assert_eq!(
            withdraw_fees(&mut m.pair, &mut m.pair_borrow, &mut receiver, 0).unwrap(),
            30
        );
        assert_eq!(receiver.shares, 30);
        assert_eq!(m.pair.total_reserves, 0);
        assert_eq!(m.pair_borrow.shares, 970);
    }
}
