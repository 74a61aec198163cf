use anchor_lang::prelude::*;

use crate::constants::MAX_DISTRIBUTORS_PER_TOKEN;
use crate::error::RewardsError;

/// Registry owner for reward distributors
/// PDA: ["manager"]
#[account]
#[derive(InitSpace, Default)]
pub struct RewardManager {
    /// Account allowed to approve distributors and remove rewards
    pub owner: Pubkey,

    /// Set by transfer_manager_ownership, must sign accept_manager_ownership
    pub pending_owner: Pubkey,

    /// PDA bump seed
    pub bump: u8,
}

impl RewardManager {
    /// Two-step ownership: stage a new owner
    pub fn stage_owner(&mut self, new_owner: Pubkey) -> Result<()> {
        require!(new_owner != Pubkey::default(), RewardsError::InvalidNewOwner);
        self.pending_owner = new_owner;
        Ok(())
    }

    /// Two-step ownership: the staged owner takes over
    pub fn accept_owner(&mut self, caller: Pubkey) -> Result<Pubkey> {
        require!(
            self.pending_owner != Pubkey::default() && self.pending_owner == caller,
            RewardsError::OnlyPendingOwner
        );
        let previous = self.owner;
        self.owner = caller;
        self.pending_owner = Pubkey::default();
        Ok(previous)
    }
}

/// Approval flag the manager keeps per distributor
/// PDA: ["distributor_status", distributor]
#[account]
#[derive(InitSpace, Default)]
pub struct DistributorStatus {
    pub distributor: Pubkey,
    pub approved: bool,
    pub bump: u8,
}

/// Distributors paying out rewards for one token (a lending pair)
/// PDA: ["token_rewards", token]
#[account]
#[derive(InitSpace, Default)]
pub struct TokenRewards {
    pub token: Pubkey,

    #[max_len(MAX_DISTRIBUTORS_PER_TOKEN)]
    pub distributors: Vec<Pubkey>,

    pub bump: u8,
}

impl TokenRewards {
    pub fn contains(&self, distributor: &Pubkey) -> bool {
        self.distributors.iter().any(|d| d == distributor)
    }

    pub fn add_distributor(&mut self, distributor: Pubkey) -> Result<()> {
        require!(!self.contains(&distributor), RewardsError::DistributorExists);
        require!(
            self.distributors.len() < MAX_DISTRIBUTORS_PER_TOKEN,
            RewardsError::TooManyDistributors
        );
        self.distributors.push(distributor);
        Ok(())
    }

    /// Swap-remove: the last entry takes the removed slot
    pub fn remove_distributor(&mut self, distributor: &Pubkey) -> Result<()> {
        let index = self
            .distributors
            .iter()
            .position(|d| d == distributor)
            .ok_or(RewardsError::DistributorNotFound)?;
        self.distributors.swap_remove(index);
        Ok(())
    }
}
