use anchor_lang::prelude::*;

use crate::constants::{CLAIM_GRACE_PERIOD, MAX_DISTRIBUTOR_NAME_LEN, MAX_PAIRS_PER_DISTRIBUTOR};
use crate::error::RewardsError;

/// A time-boxed reward program paying `reward_per_second` across its pools
/// PDA: ["distributor", reward_mint, id (le bytes)]
#[account]
#[derive(InitSpace, Default)]
pub struct RewardDistributor {
    /// Caller-chosen id, lets one reward mint back several programs
    pub id: u64,

    #[max_len(MAX_DISTRIBUTOR_NAME_LEN)]
    pub name: String,

    /// Adds pools, changes weights, sweeps unclaimed rewards
    pub guardian: Pubkey,

    /// Token paid out to stakers
    pub reward_mint: Pubkey,

    /// PDA token account holding the rewards, authority = this distributor
    pub reward_vault: Pubkey,

    /// Reward tokens emitted per second, shared by weight across pools
    pub reward_per_second: u64,

    pub start_timestamp: i64,
    pub end_timestamp: i64,

    /// Sum of every pool's alloc_point
    pub total_alloc_point: u64,

    /// Next pool id
    pub pool_count: u8,

    /// Lending pairs with pools in this distributor
    #[max_len(MAX_PAIRS_PER_DISTRIBUTOR)]
    pub pairs: Vec<Pubkey>,

    /// Set once the manager approved the distributor and rewards were activated
    pub activated: bool,

    pub bump: u8,
    pub vault_bump: u8,
}

impl RewardDistributor {
    pub fn validate_period(start: i64, end: i64) -> Result<()> {
        require!(start > 0 && start < end, RewardsError::InvalidRewardPeriod);
        Ok(())
    }

    /// Last moment rewards can still be withdrawn by stakers
    pub fn claim_deadline(&self) -> Result<i64> {
        self.end_timestamp
            .checked_add(CLAIM_GRACE_PERIOD)
            .ok_or(error!(RewardsError::MathOverflow))
    }

    pub fn grace_period_over(&self, now: i64) -> Result<bool> {
        Ok(now > self.claim_deadline()?)
    }

    /// Seconds of emission inside [from, to], clamped to [start, end]
    pub fn emission_seconds(&self, from: i64, to: i64) -> u64 {
        let from = from.max(self.start_timestamp);
        let to = to.min(self.end_timestamp);
        if to <= from {
            0
        } else {
            (to - from) as u64
        }
    }

    /// Rewards emitted over the whole program
    pub fn total_rewards(&self) -> Result<u64> {
        let seconds = self.emission_seconds(self.start_timestamp, self.end_timestamp);
        seconds
            .checked_mul(self.reward_per_second)
            .ok_or(error!(RewardsError::MathOverflow))
    }

    pub fn has_pair(&self, pair: &Pubkey) -> bool {
        self.pairs.iter().any(|p| p == pair)
    }

    /// Registers a pair and reserves three pool ids for it
    ///
    /// Returns the first pid (collateral), followed by debt and borrow asset.
    pub fn register_pair(&mut self, pair: Pubkey) -> Result<u8> {
        require!(!self.has_pair(&pair), RewardsError::TokenExists);
        require!(
            self.pairs.len() < MAX_PAIRS_PER_DISTRIBUTOR,
            RewardsError::TooManyTokens
        );

        let first_pid = self.pool_count;
        self.pool_count = self
            .pool_count
            .checked_add(3)
            .ok_or(RewardsError::MathOverflow)?;
        self.pairs.push(pair);

        Ok(first_pid)
    }

    /// Replaces one pool weight inside total_alloc_point
    pub fn reweight(&mut self, old_alloc_point: u64, new_alloc_point: u64) -> Result<()> {
        self.total_alloc_point = self
            .total_alloc_point
            .checked_sub(old_alloc_point)
            .ok_or(RewardsError::MathUnderflow)?
            .checked_add(new_alloc_point)
            .ok_or(RewardsError::MathOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distributor(start: i64, end: i64) -> RewardDistributor {
        RewardDistributor {
            reward_per_second: 10,
            start_timestamp: start,
            end_timestamp: end,
            ..Default::default()
        }
    }

    #[test]
    fn emission_is_clamped_to_program_window() {
        let d = distributor(100, 200);
        assert_eq!(d.emission_seconds(0, 100), 0);
        assert_eq!(d.emission_seconds(50, 150), 50);
        assert_eq!(d.emission_seconds(150, 500), 50);
        assert_eq!(d.emission_seconds(250, 500), 0);
        assert_eq!(d.total_rewards().unwrap(), 1000);
    }

    #[test]
    fn grace_period_follows_end() {
        let d = distributor(100, 200);
        assert!(!d.grace_period_over(200 + CLAIM_GRACE_PERIOD).unwrap());
        assert!(d.grace_period_over(201 + CLAIM_GRACE_PERIOD).unwrap());
    }

    #[test]
    fn period_must_be_ordered() {
        assert!(RewardDistributor::validate_period(10, 10).is_err());
        assert!(RewardDistributor::validate_period(20, 10).is_err());
        assert!(RewardDistributor::validate_period(10, 20).is_ok());
    }

    #[test]
    fn pair_registers_once_with_three_pools() {
        let mut d = distributor(100, 200);
        let pair = Pubkey::new_unique();

        assert_eq!(d.register_pair(pair).unwrap(), 0);
        assert_eq!(d.pool_count, 3);
        assert!(d.register_pair(pair).is_err());
        assert_eq!(d.register_pair(Pubkey::new_unique()).unwrap(), 3);
    }

    #[test]
    fn reweight_swaps_pool_weight() {
        let mut d = distributor(100, 200);
        d.total_alloc_point = 30;
        d.reweight(10, 25).unwrap();
        assert_eq!(d.total_alloc_point, 45);
        assert!(d.reweight(100, 0).is_err());
    }
}
