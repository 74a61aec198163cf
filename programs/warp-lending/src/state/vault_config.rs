use anchor_lang::prelude::*;

use crate::error::WarpError;
use crate::math::{to_u64, wad_mul};

/// Global ledger configuration
/// PDA: ["vault"]
///
/// Also signs for every asset reserve.
#[account]
#[derive(InitSpace, Default)]
pub struct VaultConfig {
    /// Allow-lists contracts, registers prices, creates pairs
    pub owner: Pubkey,

    /// Staged by transfer_ownership, zero when nothing is pending
    pub pending_owner: Pubkey,

    /// Flash loan fee as a WAD fraction of the borrowed amount
    pub flash_loan_rate: u128,

    /// Suspends deposit, withdraw and transfer
    pub paused: bool,

    pub bump: u8,
}

impl VaultConfig {
    /// Fee owed on a flash loan of `amount`, rounded down
    pub fn flash_fee(&self, amount: u64) -> Result<u64> {
        to_u64(wad_mul(amount as u128, self.flash_loan_rate)?)
    }

    pub fn stage_owner(&mut self, new_owner: Pubkey) -> Result<()> {
        require!(new_owner != Pubkey::default(), WarpError::InvalidNewOwner);
        self.pending_owner = new_owner;
        Ok(())
    }

    /// Returns the previous owner
    pub fn accept_owner(&mut self, caller: Pubkey) -> Result<Pubkey> {
        require!(
            self.pending_owner != Pubkey::default() && self.pending_owner == caller,
            WarpError::OnlyPendingOwner
        );
        let previous = self.owner;
        self.owner = caller;
        self.pending_owner = Pubkey::default();
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_FLASH_LOAN_RATE;

    #[test]
    fn flash_fee_is_rate_of_amount() {
        let config = VaultConfig {
            flash_loan_rate: DEFAULT_FLASH_LOAN_RATE,
            ..Default::default()
        };
        assert_eq!(config.flash_fee(1_000).unwrap(), 50);
        assert_eq!(config.flash_fee(19).unwrap(), 0);
    }

    #[test]
    fn only_staged_owner_can_accept() {
        let owner = Pubkey::new_unique();
        let next = Pubkey::new_unique();
        let mut config = VaultConfig { owner, ..Default::default() };

        assert!(config.accept_owner(next).is_err());
        assert!(config.stage_owner(Pubkey::default()).is_err());

        config.stage_owner(next).unwrap();
        assert!(config.accept_owner(owner).is_err());
        assert_eq!(config.accept_owner(next).unwrap(), owner);
        assert_eq!(config.owner, next);
    }
}
