// =============================================================================
// Warp Rewards Constants
// =============================================================================

// PDA Seeds
pub const MANAGER_SEED: &[u8] = b"manager";
pub const DISTRIBUTOR_STATUS_SEED: &[u8] = b"distributor_status";
pub const TOKEN_REWARDS_SEED: &[u8] = b"token_rewards";
pub const DISTRIBUTOR_SEED: &[u8] = b"distributor";
pub const REWARD_VAULT_SEED: &[u8] = b"reward_vault";
pub const REWARD_POOL_SEED: &[u8] = b"reward_pool";
pub const USER_REWARD_SEED: &[u8] = b"user_reward";

// Precision for acc_reward_per_share (12 decimals)
// staked_amount (u64) * acc_reward_per_share must stay inside u128
pub const REWARD_PRECISION: u128 = 1_000_000_000_000; // 10^12

// Rewards left unclaimed this long after a distribution ends can be swept by the guardian
pub const CLAIM_GRACE_PERIOD: i64 = 30 * 24 * 60 * 60; // 30 days

// Account sizing limits
pub const MAX_DISTRIBUTOR_NAME_LEN: usize = 32;
pub const MAX_PAIRS_PER_DISTRIBUTOR: usize = 16;
pub const MAX_DISTRIBUTORS_PER_TOKEN: usize = 8;
