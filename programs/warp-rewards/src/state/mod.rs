pub mod distributor;
pub mod manager;
pub mod pool;

pub use distributor::*;
pub use manager::*;
pub use pool::*;
