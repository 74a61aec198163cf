use anchor_lang::prelude::*;

#[error_code]
pub enum RewardsError {
    // Ownership Errors (6000-6009)
    #[msg("ONLY_OWNER")]
    OnlyOwner,

    #[msg("INVALID_OWNER")]
    InvalidOwner,

    #[msg("INVALID_NEW_OWNER")]
    InvalidNewOwner,

    #[msg("ONLY_PENDING_OWNER")]
    OnlyPendingOwner,

    #[msg("ONLY_GUARDIAN")]
    OnlyGuardian,

    // Manager Errors (6010-6019)
    #[msg("ONLY_APPROVED_DISTRIBUTOR")]
    OnlyApprovedDistributor,

    #[msg("DISTRIBUTOR_EXISTS")]
    DistributorExists,

    #[msg("DISTRIBUTOR_NOT_FOUND")]
    DistributorNotFound,

    #[msg("Too many distributors registered for this token")]
    TooManyDistributors,

    // Distributor Errors (6020-6039)
    #[msg("token_exists")]
    TokenExists,

    #[msg("Token is not distributed by this distributor")]
    UnknownToken,

    #[msg("Distributor cannot take more tokens")]
    TooManyTokens,

    #[msg("INVALID_REWARD_PERIOD")]
    InvalidRewardPeriod,

    #[msg("REWARD_PERIOD_ACTIVE")]
    RewardPeriodActive,

    #[msg("Distributor name is too long")]
    NameTooLong,

    #[msg("ONLY_LENDING_PAIR")]
    OnlyLendingPair,

    #[msg("Reward pool does not match the requested kind")]
    InvalidRewardKind,

    #[msg("Reward pool belongs to another distributor")]
    InvalidRewardPool,

    #[msg("Insufficient balance in reward vault")]
    InsufficientRewardBalance,

    // Math Errors (6040-6049)
    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Math underflow")]
    MathUnderflow,

    #[msg("Division by zero")]
    DivisionByZero,
}
