use anchor_lang::prelude::*;

use crate::state::{PairAction, RiskConfig, WrappedKind};

// Ledger events
#[event]
pub struct Deposit {
    pub mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub shares: u64,
}

#[event]
pub struct Withdraw {
    pub mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub shares: u64,
    pub amount: u64,
}

#[event]
pub struct Transfer {
    pub mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub shares: u64,
}

#[event]
pub struct Approval {
    pub owner: Pubkey,
    pub contract: Pubkey,
    pub approved: bool,
    pub nonce: u64,
}

#[event]
pub struct FlashLoan {
    pub mint: Pubkey,
    pub borrower_program: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
    pub fee: u64,
}

#[event]
pub struct AllowContract {
    pub contract: Pubkey,
    pub allowed: bool,
}

#[event]
pub struct RescueFunds {
    pub mint: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct OwnershipTransferStarted {
    pub owner: Pubkey,
    pub pending_owner: Pubkey,
}

#[event]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
pub struct VaultPauseUpdated {
    pub paused: bool,
}

#[event]
pub struct FlashLoanRateUpdated {
    pub previous_rate: u128,
    pub new_rate: u128,
}

#[event]
pub struct PriceUpdated {
    pub mint: Pubkey,
    pub price: u64,
    pub slot: u64,
}

// Pair events
#[event]
pub struct PairInitialized {
    pub pair: Pubkey,
    pub collateral_mint: Pubkey,
    pub borrow_mint: Pubkey,
    pub guardian: Pubkey,
}

#[event]
pub struct InterestAccrued {
    pub pair: Pubkey,
    pub interest: u64,
    pub total_borrows: u64,
    pub total_reserves: u64,
    pub borrow_index: u128,
    pub slot: u64,
}

#[event]
pub struct CollateralDeposited {
    pub pair: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct BorrowAssetDeposited {
    pub pair: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub borrow_shares: u64,
}

#[event]
pub struct Borrowed {
    pub pair: Pubkey,
    pub debt_owner: Pubkey,
    pub borrower: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct Repaid {
    pub pair: Pubkey,
    pub payer: Pubkey,
    pub debt_owner: Pubkey,
    pub amount: u64,
}

#[event]
pub struct Redeemed {
    pub pair: Pubkey,
    pub owner: Pubkey,
    pub to: Pubkey,
    pub borrow_shares: u64,
    pub amount: u64,
}

#[event]
pub struct CollateralWithdrawn {
    pub pair: Pubkey,
    pub owner: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct WrappedTransfer {
    pub pair: Pubkey,
    pub kind: WrappedKind,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

/// Allowance of `spender` over `owner`'s wrapped balance after a change
#[event]
pub struct WrappedApproval {
    pub pair: Pubkey,
    pub kind: WrappedKind,
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u64,
}

#[event]
pub struct Liquidated {
    pub pair: Pubkey,
    pub borrower: Pubkey,
    pub liquidator: Pubkey,
    pub debt_repaid: u64,
    pub protocol_cut: u64,
    pub collateral_seized: u64,
}

#[event]
pub struct BorrowDelegated {
    pub pair: Pubkey,
    pub owner: Pubkey,
    pub delegate: Pubkey,
    pub amount: u64,
    pub nonce: u64,
}

#[event]
pub struct ReserveWithdrawn {
    pub pair: Pubkey,
    pub fee_receiver: Pubkey,
    pub amount: u64,
}

/// One withdraw_fees_many call, per-pair amounts are in ReserveWithdrawn
#[event]
pub struct FeesWithdrawnMany {
    pub guardian: Pubkey,
    pub pairs: u8,
}

#[event]
pub struct UpdateRiskConfiguration {
    pub pair: Pubkey,
    pub previous: RiskConfig,
    pub current: RiskConfig,
    pub slot: u64,
}

#[event]
pub struct ActionPauseUpdated {
    pub pair: Pubkey,
    pub action: PairAction,
    pub paused: bool,
}

#[event]
pub struct FeeReceiverUpdated {
    pub pair: Pubkey,
    pub fee_receiver: Pubkey,
}

#[event]
pub struct RewardDistributorUpdated {
    pub pair: Pubkey,
    pub distributor: Pubkey,
}

#[event]
pub struct WarpExecuted {
    pub pair: Pubkey,
    pub user: Pubkey,
    pub actions: u8,
    pub last_output: u64,
}
