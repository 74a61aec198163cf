// Ledger
pub mod approve_contract;
pub mod deposit;
pub mod flash_loan;
pub mod transfer;
pub mod withdraw;

// Owner
pub mod initialize_vault;
pub mod set_price;
pub mod vault_admin;

// Read-only
pub mod views;

pub use approve_contract::*;
pub use deposit::*;
pub use flash_loan::*;
pub use initialize_vault::*;
pub use set_price::*;
pub use transfer::*;
pub use vault_admin::*;
pub use views::*;
pub use withdraw::*;
