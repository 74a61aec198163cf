// Manager
pub mod initialize_manager;
pub mod manager_admin;

// Distributor
pub mod accumulate_reward;
pub mod activate_pending_rewards;
pub mod add_distribution;
pub mod initialize_distributor;
pub mod set_distribution;
pub mod withdraw;
pub mod withdraw_unclaimed;

pub use accumulate_reward::*;
pub use activate_pending_rewards::*;
pub use add_distribution::*;
pub use initialize_distributor::*;
pub use initialize_manager::*;
pub use manager_admin::*;
pub use set_distribution::*;
pub use withdraw::*;
pub use withdraw_unclaimed::*;
