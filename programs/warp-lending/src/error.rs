// =============================================================================
// Warp Lending Error Codes
// =============================================================================
// Messages are the reason strings clients match on, so several keep the
// short forms of the protocol (IDB, O_G, INV_C).
// =============================================================================

use anchor_lang::prelude::*;

#[error_code]
pub enum WarpError {
    // =========================================================================
    // Authorization Errors (6000-6009)
    // =========================================================================

    #[msg("ONLY_OWNER")]
    OnlyOwner,

    /// Contract has no approval from the share owner
    #[msg("ONLY_CONTRACT")]
    OnlyContract,

    /// Contract is not on the vault allow-list
    #[msg("NOT_WHITELISTED")]
    NotWhitelisted,

    #[msg("INVALID_SIGNATURE")]
    InvalidSignature,

    /// Only the pair guardian
    #[msg("O_G")]
    OnlyGuardian,

    #[msg("ONLY_PENDING_OWNER")]
    OnlyPendingOwner,

    // =========================================================================
    // Input Validation Errors (6010-6029)
    // =========================================================================

    #[msg("INVALID_TO_ADDRESS")]
    InvalidToAddress,

    #[msg("INVALID_OWNER")]
    InvalidOwner,

    #[msg("INVALID_NEW_OWNER")]
    InvalidNewOwner,

    #[msg("INVALID_CONTRACT")]
    InvalidContract,

    /// Invalid deposit beneficiary
    #[msg("IDB")]
    InvalidDepositBeneficiary,

    /// Invalid configuration value
    #[msg("INV_C")]
    InvalidConfig,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("INVALID_PRICE")]
    InvalidPrice,

    #[msg("Collateral and borrow asset must differ")]
    IdenticalAssets,

    #[msg("Recipient share balance was not provided")]
    RecipientBalanceMissing,

    #[msg("MISSING_PREVIOUS_OUTPUT")]
    MissingPreviousOutput,

    #[msg("REWARD_ACCOUNTS_MISSING")]
    RewardAccountsMissing,

    #[msg("Distributor is not registered for this pair")]
    UnknownDistributor,

    #[msg("Token account mint does not match the asset")]
    InvalidMint,

    #[msg("Token account owner is not the expected account")]
    InvalidTokenAccountOwner,

    #[msg("Flash loan receiver program is not executable")]
    InvalidFlashLoanReceiver,

    #[msg("Token account for this asset was not provided")]
    MissingTokenAccount,

    #[msg("Too many warp actions")]
    TooManyActions,

    #[msg("Too many borrowers in one liquidation batch")]
    TooManyLiquidations,

    /// Remaining accounts do not split into whole per-pair groups
    #[msg("Incomplete account group")]
    IncompleteAccountGroup,

    // =========================================================================
    // Ledger Errors (6030-6039)
    // =========================================================================

    #[msg("Insufficient shares")]
    InsufficientShares,

    #[msg("INVALID_RATIO")]
    InvalidRatio,

    #[msg("PAUSED")]
    Paused,

    #[msg("FLASH_LOAN_ACTIVE")]
    FlashLoanActive,

    #[msg("FLASH_LOAN_NOT_REPAID")]
    FlashLoanNotRepaid,

    #[msg("Flash loan exceeds available liquidity")]
    FlashLoanTooLarge,

    // =========================================================================
    // Pair Errors (6040-6059)
    // =========================================================================

    #[msg("EXCEEDS_ALLOWED")]
    ExceedsAllowed,

    #[msg("BORROWING_MORE_THAN_ALLOWED")]
    BorrowingMoreThanAllowed,

    #[msg("MORE_THAN_OWED")]
    MoreThanOwed,

    #[msg("NOT_ENOUGH_BALANCE")]
    NotEnoughBalance,

    #[msg("NOT_LIQUIDATE_SELF")]
    NotLiquidateSelf,

    #[msg("Exceeds Deposit Collateral Limit")]
    ExceedsDepositCollateralLimit,

    #[msg("Exceeds Deposit Borrow Limit")]
    ExceedsDepositBorrowLimit,

    #[msg("Exceeds Total Pair Debt Limit")]
    ExceedsTotalPairDebtLimit,

    #[msg("Invalid collaterLimit")]
    InvalidCollateralLimit,

    #[msg("Invalid borrowLimit")]
    InvalidBorrowLimit,

    #[msg("Invalid debtLimit")]
    InvalidDebtLimit,

    /// Delegate tried to borrow past the owner's allowance
    #[msg("Borrow allowance exceeded")]
    BorrowAllowanceExceeded,

    /// Spender moved more wrapped balance than approved, or an allowance
    /// was decreased below zero
    #[msg("Wrapped allowance exceeded")]
    WrappedAllowanceExceeded,

    // =========================================================================
    // Math Errors (6060-6069)
    // =========================================================================

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Math underflow")]
    MathUnderflow,

    #[msg("Division by zero")]
    DivisionByZero,
}
