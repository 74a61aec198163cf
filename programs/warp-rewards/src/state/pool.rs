use anchor_lang::prelude::*;

use crate::constants::REWARD_PRECISION;
use crate::error::RewardsError;
use crate::state::RewardDistributor;

/// The three balances a lending pair reports for each user
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum RewardKind {
    /// Wrapped collateral shares
    #[default]
    Collateral,
    /// Outstanding debt
    Debt,
    /// Wrapped borrow-asset shares
    BorrowAsset,
}

impl RewardKind {
    pub const ALL: [RewardKind; 3] = [RewardKind::Collateral, RewardKind::Debt, RewardKind::BorrowAsset];

    /// Single-byte seed used in the reward pool PDA
    pub fn seed(&self) -> u8 {
        match self {
            RewardKind::Collateral => 0,
            RewardKind::Debt => 1,
            RewardKind::BorrowAsset => 2,
        }
    }
}

/// Reward pool for one (pair, kind)
/// PDA: ["reward_pool", distributor, pair, kind]
#[account]
#[derive(InitSpace, Default)]
pub struct RewardPool {
    pub distributor: Pubkey,

    /// Lending pair whose PDA reports balances into this pool
    pub pair: Pubkey,

    pub kind: RewardKind,
    pub pid: u8,

    /// Weight inside the distributor's total_alloc_point
    pub alloc_point: u64,

    /// Rewards per staked unit, scaled by REWARD_PRECISION
    pub acc_reward_per_share: u128,

    pub last_reward_timestamp: i64,

    /// Sum of staked_amount over all users of this pool
    pub total_staked: u64,

    pub bump: u8,
}

impl RewardPool {
    /// Bring acc_reward_per_share up to `now`
    ///
    /// Nothing accrues before start, after end, while the distributor is not
    /// activated, or while the pool has no stake.
    pub fn update(&mut self, distributor: &RewardDistributor, now: i64) -> Result<()> {
        if now <= self.last_reward_timestamp {
            return Ok(());
        }

        let seconds = distributor.emission_seconds(self.last_reward_timestamp, now);
        if seconds > 0
            && distributor.activated
            && self.total_staked > 0
            && distributor.total_alloc_point > 0
        {
            let reward = (seconds as u128)
                .checked_mul(distributor.reward_per_second as u128)
                .ok_or(RewardsError::MathOverflow)?
                .checked_mul(self.alloc_point as u128)
                .ok_or(RewardsError::MathOverflow)?
                .checked_div(distributor.total_alloc_point as u128)
                .ok_or(RewardsError::DivisionByZero)?;

            let increase = reward
                .checked_mul(REWARD_PRECISION)
                .ok_or(RewardsError::MathOverflow)?
                .checked_div(self.total_staked as u128)
                .ok_or(RewardsError::DivisionByZero)?;

            self.acc_reward_per_share = self
                .acc_reward_per_share
                .checked_add(increase)
                .ok_or(RewardsError::MathOverflow)?;
        }

        self.last_reward_timestamp = now;
        Ok(())
    }

    /// acc_reward_per_share as it would be at `now`, without mutating the pool
    pub fn projected_acc_reward_per_share(
        &self,
        distributor: &RewardDistributor,
        now: i64,
    ) -> Result<u128> {
        let mut projected = self.clone();
        projected.update(distributor, now)?;
        Ok(projected.acc_reward_per_share)
    }
}

/// One user's stake in a reward pool
/// PDA: ["user_reward", pool, user]
#[account]
#[derive(InitSpace, Default)]
pub struct UserReward {
    pub pool: Pubkey,
    pub user: Pubkey,

    /// Last balance reported by the pair
    pub staked_amount: u64,

    /// staked_amount * acc_reward_per_share at the last checkpoint (unscaled)
    pub reward_debt: u128,

    /// Rewards folded in at checkpoints and not yet withdrawn
    pub accumulated: u64,

    pub bump: u8,
}

impl UserReward {
    fn debt_at(staked: u64, acc_reward_per_share: u128) -> Result<u128> {
        (staked as u128)
            .checked_mul(acc_reward_per_share)
            .ok_or(error!(RewardsError::MathOverflow))
    }

    /// Rewards earned since the last checkpoint
    pub fn pending(&self, acc_reward_per_share: u128) -> Result<u64> {
        let pending = Self::debt_at(self.staked_amount, acc_reward_per_share)?
            .checked_sub(self.reward_debt)
            .ok_or(RewardsError::MathUnderflow)?
            / REWARD_PRECISION;
        u64::try_from(pending).map_err(|_| error!(RewardsError::MathOverflow))
    }

    /// Fold pending rewards into `accumulated` and record the new balance
    ///
    /// The pool must already be updated to the current time.
    pub fn checkpoint(&mut self, pool: &mut RewardPool, new_balance: u64) -> Result<u64> {
        let pending = self.pending(pool.acc_reward_per_share)?;
        self.accumulated = self
            .accumulated
            .checked_add(pending)
            .ok_or(RewardsError::MathOverflow)?;

        pool.total_staked = pool
            .total_staked
            .checked_sub(self.staked_amount)
            .ok_or(RewardsError::MathUnderflow)?
            .checked_add(new_balance)
            .ok_or(RewardsError::MathOverflow)?;

        self.staked_amount = new_balance;
        self.reward_debt = Self::debt_at(new_balance, pool.acc_reward_per_share)?;

        Ok(pending)
    }

    /// Accumulated plus pending rewards, zero once the grace period is over
    pub fn claimable(
        &self,
        pool: &RewardPool,
        distributor: &RewardDistributor,
        now: i64,
    ) -> Result<u64> {
        if distributor.grace_period_over(now)? {
            return Ok(0);
        }
        let acc = pool.projected_acc_reward_per_share(distributor, now)?;
        self.accumulated
            .checked_add(self.pending(acc)?)
            .ok_or(error!(RewardsError::MathOverflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CLAIM_GRACE_PERIOD;

    const START: i64 = 1_000;
    const END: i64 = 2_000;

    fn distributor() -> RewardDistributor {
        RewardDistributor {
            reward_per_second: 100,
            start_timestamp: START,
            end_timestamp: END,
            total_alloc_point: 3,
            activated: true,
            ..Default::default()
        }
    }

    fn pool() -> RewardPool {
        RewardPool {
            alloc_point: 1,
            last_reward_timestamp: 0,
            ..Default::default()
        }
    }

    #[test]
    fn nothing_accrues_before_start() {
        let d = distributor();
        let mut p = pool();
        let mut user = UserReward::default();

        p.update(&d, 500).unwrap();
        user.checkpoint(&mut p, 1_000).unwrap();
        p.update(&d, START).unwrap();

        assert_eq!(p.acc_reward_per_share, 0);
        assert_eq!(user.pending(p.acc_reward_per_share).unwrap(), 0);
    }

    #[test]
    fn accrual_stops_at_end() {
        let d = distributor();
        let mut p = pool();
        let mut user = UserReward::default();

        p.update(&d, START).unwrap();
        user.checkpoint(&mut p, 1_000).unwrap();

        p.update(&d, END).unwrap();
        let at_end = p.acc_reward_per_share;
        p.update(&d, END + 500).unwrap();

        assert_eq!(p.acc_reward_per_share, at_end);
        // 1000 seconds * 100 per second / 3 pools
        assert_eq!(user.pending(p.acc_reward_per_share).unwrap(), 33_333);
    }

    #[test]
    fn stakers_split_by_balance() {
        let d = distributor();
        let mut p = pool();
        let mut alice = UserReward::default();
        let mut bob = UserReward::default();

        p.update(&d, START).unwrap();
        alice.checkpoint(&mut p, 300).unwrap();
        bob.checkpoint(&mut p, 100).unwrap();
        assert_eq!(p.total_staked, 400);

        p.update(&d, START + 30).unwrap();
        // 30 seconds * 100 / 3 = 1000 for the pool
        assert_eq!(alice.pending(p.acc_reward_per_share).unwrap(), 750);
        assert_eq!(bob.pending(p.acc_reward_per_share).unwrap(), 250);
    }

    #[test]
    fn checkpoint_keeps_earned_rewards_when_balance_drops() {
        let d = distributor();
        let mut p = pool();
        let mut user = UserReward::default();

        p.update(&d, START).unwrap();
        user.checkpoint(&mut p, 100).unwrap();
        p.update(&d, START + 30).unwrap();

        let folded = user.checkpoint(&mut p, 0).unwrap();
        assert_eq!(folded, 1_000);
        assert_eq!(user.accumulated, 1_000);
        assert_eq!(p.total_staked, 0);

        p.update(&d, START + 60).unwrap();
        assert_eq!(user.pending(p.acc_reward_per_share).unwrap(), 0);
    }

    #[test]
    fn inactive_distributor_records_stake_without_accrual() {
        let mut d = distributor();
        d.activated = false;
        let mut p = pool();
        let mut user = UserReward::default();

        p.update(&d, START).unwrap();
        user.checkpoint(&mut p, 500).unwrap();
        p.update(&d, START + 100).unwrap();

        assert_eq!(p.total_staked, 500);
        assert_eq!(user.pending(p.acc_reward_per_share).unwrap(), 0);
    }

    #[test]
    fn claimable_projects_and_expires_after_grace() {
        let d = distributor();
        let mut p = pool();
        let mut user = UserReward::default();

        p.update(&d, START).unwrap();
        user.checkpoint(&mut p, 10).unwrap();

        assert_eq!(user.claimable(&p, &d, START + 3).unwrap(), 100);
        assert_eq!(p.acc_reward_per_share, 0);

        let within_grace = user.claimable(&p, &d, END + CLAIM_GRACE_PERIOD).unwrap();
        assert_eq!(within_grace, 33_333);
        assert_eq!(user.claimable(&p, &d, END + CLAIM_GRACE_PERIOD + 1).unwrap(), 0);
    }

    #[test]
    fn kind_seeds_are_distinct() {
        let seeds: Vec<u8> = RewardKind::ALL.iter().map(|k| k.seed()).collect();
        assert_eq!(seeds, vec![0, 1, 2]);
    }
}
