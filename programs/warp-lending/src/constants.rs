// =============================================================================
// Warp Lending Constants
// =============================================================================
// Seeds, fixed-point scales and the default risk parameters new pairs start
// from. Anything tunable after deployment lives on VaultConfig or LendingPair.
// =============================================================================

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Vault configuration, also the authority of every reserve
/// Full seed: ["vault"]
pub const VAULT_SEED: &[u8] = b"vault";

/// Per-asset ledger totals
/// Full seed: ["asset", mint]
pub const ASSET_SEED: &[u8] = b"asset";

/// SPL token account holding an asset's underlying
/// Full seed: ["reserve", mint]
pub const RESERVE_SEED: &[u8] = b"reserve";

/// Ledger share balance of one account
/// Full seed: ["share", mint, owner]
pub const SHARE_SEED: &[u8] = b"share";

/// Allow-list entry for a contract
/// Full seed: ["allowed", contract]
pub const ALLOWED_SEED: &[u8] = b"allowed";

/// Owner -> contract authorization
/// Full seed: ["authorization", owner, contract]
pub const AUTHORIZATION_SEED: &[u8] = b"authorization";

/// Signed-message nonce of an owner
/// Full seed: ["nonce", owner]
pub const NONCE_SEED: &[u8] = b"nonce";

/// Admin-registered price of a mint
/// Full seed: ["oracle", mint]
pub const ORACLE_SEED: &[u8] = b"oracle";

/// Lending pair
/// Full seed: ["pair", collateral_mint, borrow_mint]
pub const PAIR_SEED: &[u8] = b"pair";

/// Wrapped balances and debt of one account in one pair
/// Full seed: ["position", pair, owner]
pub const POSITION_SEED: &[u8] = b"position";

/// Borrow delegation from owner to delegate
/// Full seed: ["borrow_allowance", pair, owner, delegate]
pub const BORROW_ALLOWANCE_SEED: &[u8] = b"borrow_allowance";

/// Allowance to move an owner's wrapped balance
/// Full seed: ["wrapped_allowance", pair, owner, spender, kind]
pub const WRAPPED_ALLOWANCE_SEED: &[u8] = b"wrapped_allowance";

// =============================================================================
// FIXED POINT
// =============================================================================

/// 1.0 in WAD precision, used for every ratio and rate
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Prices carry 8 decimals (1 USD = 100_000_000)
pub const PRICE_DECIMALS: u8 = 8;

// =============================================================================
// LEDGER
// =============================================================================

/// A withdrawal may not leave a nonzero balance below this many shares
pub const MINIMUM_SHARE_BALANCE: u64 = 1_000;

/// Flash loan fee when initialize_vault is not given one: 5%
pub const DEFAULT_FLASH_LOAN_RATE: u128 = 50_000_000_000_000_000;

// =============================================================================
// PAIR DEFAULTS
// =============================================================================

/// Collateral must be worth 150% of the debt
pub const DEFAULT_COLLATERAL_FACTOR: u128 = 1_500_000_000_000_000_000;

/// 5% liquidation fee
pub const DEFAULT_LIQUIDATION_FEE: u128 = 50_000_000_000_000_000;

/// 5% of the liquidation fee goes to reserves
pub const DEFAULT_LIQUIDATION_FEE_SHARE: u128 = 50_000_000_000_000_000;

/// 50% of accrued interest goes to reserves
pub const DEFAULT_RESERVE_FACTOR: u128 = 500_000_000_000_000_000;

/// Wrapped borrow shares start 1:1 with ledger shares
pub const DEFAULT_INITIAL_EXCHANGE_RATE: u128 = WAD;

// =============================================================================
// SIGNED MESSAGES
// =============================================================================

/// Prefix of the message an owner signs to authorize a contract
pub const APPROVAL_DOMAIN: &[u8] = b"WarpVault v1:approve";

/// Prefix of the message an owner signs to delegate borrowing
pub const DELEGATION_DOMAIN: &[u8] = b"WarpVault v1:delegate";

// =============================================================================
// WARP
// =============================================================================

/// Most actions one warp instruction may run
pub const MAX_WARP_ACTIONS: usize = 16;

// =============================================================================
// BATCHES
// =============================================================================

/// Most borrowers one liquidate_many instruction may take over
pub const MAX_LIQUIDATIONS: usize = 8;

/// Accounts per pair in withdraw_fees_many: pair, pair cash, receiver balance
pub const FEE_ACCOUNTS_PER_PAIR: usize = 3;
