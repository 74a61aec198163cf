// =============================================================================
// Instructions Module
// =============================================================================
// vault - share ledger, contract approvals, flash loans and vault admin
// pair  - isolated lending pairs built on ledger shares
// warp  - batched vault and pair actions for one signer
// =============================================================================

pub mod pair;
pub mod vault;
pub mod warp;

// The #[derive(Accounts)] helper modules need to be reachable from the crate root
pub use pair::*;
pub use vault::*;
pub use warp::*;
