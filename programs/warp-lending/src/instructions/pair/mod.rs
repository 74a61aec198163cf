// Lifecycle
pub mod accrue_interest;
pub mod initialize_pair;

// Supply side
pub mod deposit_borrow_asset;
pub mod deposit_collateral;
pub mod redeem;
pub mod transfer_wrapped;
pub mod withdraw_collateral;
pub mod wrapped_allowance;

// Debt
pub mod borrow;
pub mod delegate_borrow;
pub mod liquidate;
pub mod repay;

// Guardian
pub mod pair_admin;

pub use accrue_interest::*;
pub use borrow::*;
pub use delegate_borrow::*;
pub use deposit_borrow_asset::*;
pub use deposit_collateral::*;
pub use initialize_pair::*;
pub use liquidate::*;
pub use pair_admin::*;
pub use redeem::*;
pub use repay::*;
pub use transfer_wrapped::*;
pub use withdraw_collateral::*;
pub use wrapped_allowance::*;
