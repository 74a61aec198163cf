pub mod asset;
pub mod authorization;
pub mod lending_pair;
pub mod oracle;
pub mod position;
pub mod vault_config;

pub use asset::*;
pub use authorization::*;
pub use lending_pair::*;
pub use oracle::*;
pub use position::*;
pub use vault_config::*;
