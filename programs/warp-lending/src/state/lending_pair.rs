// =============================================================================
// Lending Pair State
// =============================================================================
// An isolated market: one collateral asset, one borrow asset, both held as
// ledger shares by the pair PDA.
//
// Borrow side accounting (all in borrow-asset ledger shares):
// - cash            = the pair's own ShareBalance of the borrow asset
// - total_borrows   = outstanding debt including accrued interest
// - total_reserves  = protocol cut, part of cash until withdrawn
// - exchange rate   = (cash + total_borrows - total_reserves) / total_borrow_shares
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::error::WarpError;
use crate::math::{mul_div_ceil, to_u64, wad_div, wad_mul};
use crate::state::Position;

// =============================================================================
// Risk Configuration
// =============================================================================

/// Deposit and debt ceilings, 0 = unlimited
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct RiskConfig {
    /// Ceiling on total wrapped collateral
    pub deposit_collateral_limit: u64,

    /// Ceiling on borrow-side supplied assets
    pub deposit_borrow_limit: u64,

    /// Ceiling on total_borrows
    pub total_pair_debt_limit: u64,
}

impl RiskConfig {
    fn within(limit: u64, total: u64) -> bool {
        limit == 0 || total <= limit
    }

    /// A new config must change something and cannot cap below what is committed
    pub fn validate_update(
        &self,
        next: &RiskConfig,
        total_collateral: u64,
        supplied: u64,
        total_borrows: u64,
    ) -> Result<()> {
        require!(next != self, WarpError::InvalidCollateralLimit);
        require!(
            Self::within(next.deposit_collateral_limit, total_collateral),
            WarpError::InvalidCollateralLimit
        );
        require!(
            Self::within(next.deposit_borrow_limit, supplied),
            WarpError::InvalidBorrowLimit
        );
        require!(
            Self::within(next.total_pair_debt_limit, total_borrows),
            WarpError::InvalidDebtLimit
        );
        Ok(())
    }
}

// =============================================================================
// Interest Rate Model
// =============================================================================

/// Borrow and supply rates as a function of the pair's balances
pub trait RateCurve {
    /// WAD interest per slot charged on total_borrows
    fn borrow_rate_per_period(&self, cash: u64, borrows: u64, reserves: u64) -> Result<u128>;

    /// WAD interest per slot earned by wrapped borrow shares
    fn supply_rate_per_period(
        &self,
        cash: u64,
        borrows: u64,
        reserves: u64,
        reserve_factor: u128,
    ) -> Result<u128> {
        let utilization = utilization_rate(cash, borrows, reserves)?;
        let borrow_rate = self.borrow_rate_per_period(cash, borrows, reserves)?;
        let kept = WAD
            .checked_sub(reserve_factor)
            .ok_or(WarpError::MathUnderflow)?;
        wad_mul(wad_mul(borrow_rate, kept)?, utilization)
    }
}

/// borrows / (cash + borrows - reserves) in WAD, zero without borrows
pub fn utilization_rate(cash: u64, borrows: u64, reserves: u64) -> Result<u128> {
    if borrows == 0 {
        return Ok(0);
    }
    let supplied = (cash as u128)
        .checked_add(borrows as u128)
        .ok_or(WarpError::MathOverflow)?
        .checked_sub(reserves as u128)
        .ok_or(WarpError::MathUnderflow)?;
    wad_div(borrows as u128, supplied)
}

/// Jump-rate curve: linear up to the kink, steeper above it
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct InterestRateModel {
    pub base_rate_per_slot: u128,
    pub multiplier_per_slot: u128,
    pub jump_multiplier_per_slot: u128,

    /// Utilization (WAD) where the jump multiplier takes over
    pub kink: u128,
}

impl RateCurve for InterestRateModel {
    fn borrow_rate_per_period(&self, cash: u64, borrows: u64, reserves: u64) -> Result<u128> {
        let utilization = utilization_rate(cash, borrows, reserves)?;

        if utilization <= self.kink {
            return self
                .base_rate_per_slot
                .checked_add(wad_mul(utilization, self.multiplier_per_slot)?)
                .ok_or(error!(WarpError::MathOverflow));
        }

        let normal = self
            .base_rate_per_slot
            .checked_add(wad_mul(self.kink, self.multiplier_per_slot)?)
            .ok_or(WarpError::MathOverflow)?;
        let excess = utilization
            .checked_sub(self.kink)
            .ok_or(WarpError::MathUnderflow)?;
        normal
            .checked_add(wad_mul(excess, self.jump_multiplier_per_slot)?)
            .ok_or(error!(WarpError::MathOverflow))
    }
}

// =============================================================================
// Pausable Actions
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PairAction {
    Deposit,
    Borrow,
}

impl PairAction {
    fn bit(&self) -> u8 {
        match self {
            PairAction::Deposit => 1 << 0,
            PairAction::Borrow => 1 << 1,
        }
    }
}

// =============================================================================
// Pair Configuration
// =============================================================================

/// Everything initialize_pair needs besides the two mints
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct PairConfig {
    pub guardian: Pubkey,
    pub fee_receiver: Pubkey,
    pub collateral_factor: u128,
    pub liquidation_fee: u128,
    pub liquidation_fee_share: u128,
    pub reserve_factor: u128,
    pub initial_exchange_rate: u128,
    pub interest_rate_model: InterestRateModel,
    pub risk_config: RiskConfig,
}

impl PairConfig {
    pub fn validate(&self) -> Result<()> {
        require!(
            self.guardian != Pubkey::default() && self.fee_receiver != Pubkey::default(),
            WarpError::InvalidConfig
        );
        // Debt may never outgrow the collateral it rests on
        require!(self.collateral_factor >= WAD, WarpError::InvalidConfig);
        require!(
            self.liquidation_fee <= WAD
                && self.liquidation_fee_share <= WAD
                && self.reserve_factor <= WAD,
            WarpError::InvalidConfig
        );
        require!(self.initial_exchange_rate > 0, WarpError::InvalidConfig);
        require!(self.interest_rate_model.kink <= WAD, WarpError::InvalidConfig);
        Ok(())
    }
}

// =============================================================================
// Lending Pair Account
// =============================================================================

/// PDA: ["pair", collateral_mint, borrow_mint]
#[account]
#[derive(InitSpace, Default)]
pub struct LendingPair {
    // =========================================================================
    // Roles
    // =========================================================================

    /// Manages risk config, pauses and fee withdrawals
    pub guardian: Pubkey,

    /// Ledger account credited by withdraw_fees
    pub fee_receiver: Pubkey,

    // =========================================================================
    // Assets
    // =========================================================================

    pub collateral_mint: Pubkey,
    pub borrow_mint: Pubkey,
    pub collateral_decimals: u8,
    pub borrow_decimals: u8,

    // =========================================================================
    // Risk Parameters (WAD)
    // =========================================================================

    /// Required collateral value per unit of debt value
    pub collateral_factor: u128,

    /// Fee charged on liquidated debt
    pub liquidation_fee: u128,

    /// Part of the liquidation fee kept as reserves
    pub liquidation_fee_share: u128,

    /// Part of accrued interest kept as reserves
    pub reserve_factor: u128,

    /// Exchange rate while no wrapped borrow shares exist
    pub initial_exchange_rate: u128,

    pub interest_rate_model: InterestRateModel,
    pub risk_config: RiskConfig,

    // =========================================================================
    // Borrow Side
    // =========================================================================

    pub total_borrows: u64,
    pub total_reserves: u64,

    /// Grows by (1 + rate * periods) at each accrual, starts at WAD
    pub borrow_index: u128,

    pub accrual_slot: u64,

    /// Wrapped borrow shares outstanding
    pub total_borrow_shares: u64,

    // =========================================================================
    // Collateral Side
    // =========================================================================

    /// Wrapped collateral outstanding, equals the pair's collateral ledger shares
    pub total_collateral: u64,

    // =========================================================================
    // Status
    // =========================================================================

    /// Bitmask over PairAction
    pub paused_actions: u8,

    /// Reward distributor fed by balance changes, default = none
    pub reward_distributor: Pubkey,

    pub bump: u8,
}

impl LendingPair {
    pub fn is_paused(&self, action: PairAction) -> bool {
        self.paused_actions & action.bit() != 0
    }

    pub fn set_paused(&mut self, action: PairAction, paused: bool) {
        if paused {
            self.paused_actions |= action.bit();
        } else {
            self.paused_actions &= !action.bit();
        }
    }

    pub fn require_active(&self, action: PairAction) -> Result<()> {
        require!(!self.is_paused(action), WarpError::Paused);
        Ok(())
    }

    pub fn has_reward_distributor(&self) -> bool {
        self.reward_distributor != Pubkey::default()
    }

    // =========================================================================
    // Interest
    // =========================================================================

    /// Accrue with the pair's own rate model. Returns the interest added.
    pub fn accrue_interest(&mut self, cash: u64, slot: u64) -> Result<u64> {
        let model = self.interest_rate_model;
        self.accrue_with(&model, cash, slot)
    }

    pub fn accrue_with(&mut self, curve: &impl RateCurve, cash: u64, slot: u64) -> Result<u64> {
        if slot <= self.accrual_slot {
            return Ok(0);
        }

        let periods = (slot - self.accrual_slot) as u128;
        let rate = curve.borrow_rate_per_period(cash, self.total_borrows, self.total_reserves)?;
        let simple_factor = rate
            .checked_mul(periods)
            .ok_or(WarpError::MathOverflow)?;

        let interest = to_u64(wad_mul(self.total_borrows as u128, simple_factor)?)?;
        let reserves_added = to_u64(wad_mul(interest as u128, self.reserve_factor)?)?;

        self.total_borrows = self
            .total_borrows
            .checked_add(interest)
            .ok_or(WarpError::MathOverflow)?;
        self.total_reserves = self
            .total_reserves
            .checked_add(reserves_added)
            .ok_or(WarpError::MathOverflow)?;
        self.borrow_index = wad_mul(
            self.borrow_index,
            WAD.checked_add(simple_factor).ok_or(WarpError::MathOverflow)?,
        )?;
        self.accrual_slot = slot;

        Ok(interest)
    }

    // =========================================================================
    // Borrow Side Conversions
    // =========================================================================

    /// cash + total_borrows - total_reserves
    pub fn supplied_assets(&self, cash: u64) -> Result<u64> {
        let supplied = (cash as u128)
            .checked_add(self.total_borrows as u128)
            .ok_or(WarpError::MathOverflow)?
            .checked_sub(self.total_reserves as u128)
            .ok_or(WarpError::MathUnderflow)?;
        to_u64(supplied)
    }

    pub fn exchange_rate(&self, cash: u64) -> Result<u128> {
        if self.total_borrow_shares == 0 {
            return Ok(self.initial_exchange_rate);
        }
        wad_div(
            self.supplied_assets(cash)? as u128,
            self.total_borrow_shares as u128,
        )
    }

    /// Wrapped borrow shares minted for `amount` ledger shares
    pub fn borrow_shares_for(&self, amount: u64, cash: u64) -> Result<u64> {
        to_u64(wad_div(amount as u128, self.exchange_rate(cash)?)?)
    }

    /// Ledger shares returned for burning `borrow_shares`
    pub fn underlying_for(&self, borrow_shares: u64, cash: u64) -> Result<u64> {
        to_u64(wad_mul(borrow_shares as u128, self.exchange_rate(cash)?)?)
    }

    // =========================================================================
    // Debt
    // =========================================================================

    pub fn debt_of(&self, position: &Position) -> Result<u64> {
        position.current_debt(self.borrow_index)
    }

    /// Protocol cut of a liquidation: debt * liquidation_fee * liquidation_fee_share
    pub fn liquidation_protocol_cut(&self, debt: u64) -> Result<u64> {
        let fee = wad_mul(debt as u128, self.liquidation_fee)?;
        to_u64(wad_mul(fee, self.liquidation_fee_share)?)
    }

    // =========================================================================
    // Solvency
    // =========================================================================

    /// Largest debt value `collateral_value` can carry
    pub fn borrow_limit(&self, collateral_value: u128) -> Result<u128> {
        wad_div(collateral_value, self.collateral_factor)
    }

    /// Collateral value needed to carry `debt_value`, rounded up
    pub fn required_collateral_value(&self, debt_value: u128) -> Result<u128> {
        mul_div_ceil(debt_value, self.collateral_factor, WAD)
    }

    pub fn require_can_borrow(
        &self,
        debt_value: u128,
        amount_value: u128,
        collateral_value: u128,
    ) -> Result<()> {
        let total = debt_value
            .checked_add(amount_value)
            .ok_or(WarpError::MathOverflow)?;
        require!(
            total <= self.borrow_limit(collateral_value)?,
            WarpError::BorrowingMoreThanAllowed
        );
        Ok(())
    }

    /// Collateral leaving a position must keep it borrow-safe
    pub fn require_collateral_covers(&self, remaining_value: u128, debt_value: u128) -> Result<()> {
        require!(
            self.borrow_limit(remaining_value)? >= debt_value,
            WarpError::ExceedsAllowed
        );
        Ok(())
    }

    pub fn is_liquidatable(&self, debt_value: u128, collateral_value: u128) -> Result<bool> {
        Ok(debt_value > self.borrow_limit(collateral_value)?)
    }

    // =========================================================================
    // Limits
    // =========================================================================

    pub fn require_collateral_limit(&self, amount: u64) -> Result<()> {
        let next = self
            .total_collateral
            .checked_add(amount)
            .ok_or(WarpError::MathOverflow)?;
        require!(
            RiskConfig::within(self.risk_config.deposit_collateral_limit, next),
            WarpError::ExceedsDepositCollateralLimit
        );
        Ok(())
    }

    pub fn require_borrow_deposit_limit(&self, amount: u64, cash: u64) -> Result<()> {
        let next = self
            .supplied_assets(cash)?
            .checked_add(amount)
            .ok_or(WarpError::MathOverflow)?;
        require!(
            RiskConfig::within(self.risk_config.deposit_borrow_limit, next),
            WarpError::ExceedsDepositBorrowLimit
        );
        Ok(())
    }

    pub fn require_debt_limit(&self, amount: u64) -> Result<()> {
        let next = self
            .total_borrows
            .checked_add(amount)
            .ok_or(WarpError::MathOverflow)?;
        require!(
            RiskConfig::within(self.risk_config.total_pair_debt_limit, next),
            WarpError::ExceedsTotalPairDebtLimit
        );
        Ok(())
    }

    /// Reserves withdrawable by the guardian, `0` = all
    pub fn resolve_fee_withdrawal(&self, amount: u64) -> Result<u64> {
        let amount = if amount == 0 { self.total_reserves } else { amount };
        require!(amount <= self.total_reserves, WarpError::NotEnoughBalance);
        Ok(amount)
    }
}
