// =============================================================================
// Reward hook
// =============================================================================
// After a pair instruction changes wrapped or debt balances it reports the new
// balances to the pair's reward distributor. The pair PDA signs the CPI, which
// is how warp-rewards knows the report is genuine.
//
// Hook accounts travel in remaining_accounts and are matched by address:
//   warp-rewards program, distributor, and for every update the reward pool
//   ["reward_pool", distributor, pair, kind] and the user's reward account
//   ["user_reward", pool, user].
// =============================================================================

use anchor_lang::prelude::*;
use warp_rewards::constants::{REWARD_POOL_SEED, USER_REWARD_SEED};
use warp_rewards::state::RewardKind;

use crate::constants::PAIR_SEED;
use crate::error::WarpError;
use crate::state::{LendingPair, Position, WrappedKind};

/// One balance to report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardUpdate {
    pub kind: RewardKind,
    pub user: Pubkey,
    pub balance: u64,
}

impl RewardUpdate {
    pub fn collateral(position: &Position) -> Self {
        Self {
            kind: RewardKind::Collateral,
            user: position.owner,
            balance: position.collateral,
        }
    }

    pub fn borrow_asset(position: &Position) -> Self {
        Self {
            kind: RewardKind::BorrowAsset,
            user: position.owner,
            balance: position.borrow_shares,
        }
    }

    pub fn debt(pair: &LendingPair, position: &Position) -> Result<Self> {
        Ok(Self {
            kind: RewardKind::Debt,
            user: position.owner,
            balance: pair.debt_of(position)?,
        })
    }

    pub fn wrapped(kind: WrappedKind, position: &Position) -> Self {
        Self {
            kind: match kind {
                WrappedKind::Collateral => RewardKind::Collateral,
                WrappedKind::BorrowShares => RewardKind::BorrowAsset,
            },
            user: position.owner,
            balance: position.wrapped(kind),
        }
    }

    /// All three balances of a position
    pub fn all(pair: &LendingPair, position: &Position) -> Result<[Self; 3]> {
        Ok([
            Self::collateral(position),
            Self::debt(pair, position)?,
            Self::borrow_asset(position),
        ])
    }
}

/// Addresses of the reward accounts one update needs
pub fn reward_addresses(distributor: &Pubkey, pair: &Pubkey, update: &RewardUpdate) -> (Pubkey, Pubkey) {
    let (pool, _) = Pubkey::find_program_address(
        &[
            REWARD_POOL_SEED,
            distributor.as_ref(),
            pair.as_ref(),
            &[update.kind.seed()],
        ],
        &warp_rewards::ID,
    );
    let (user_reward, _) = Pubkey::find_program_address(
        &[USER_REWARD_SEED, pool.as_ref(), update.user.as_ref()],
        &warp_rewards::ID,
    );
    (pool, user_reward)
}

fn find_account<'a, 'info>(
    accounts: &'a [AccountInfo<'info>],
    key: &Pubkey,
) -> Result<&'a AccountInfo<'info>> {
    accounts
        .iter()
        .find(|info| info.key == key)
        .ok_or(error!(WarpError::RewardAccountsMissing))
}

/// Reports `updates` to the pair's distributor, no-op without one
pub fn sync_rewards<'info>(
    pair: &Account<'info, LendingPair>,
    payer: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    remaining_accounts: &[AccountInfo<'info>],
    updates: &[RewardUpdate],
) -> Result<()> {
    if !pair.has_reward_distributor() || updates.is_empty() {
        return Ok(());
    }

    let pair_key = pair.key();
    let distributor_key = pair.reward_distributor;
    let rewards_program = find_account(remaining_accounts, &warp_rewards::ID)?;
    let distributor = find_account(remaining_accounts, &distributor_key)?;

    let seeds = &[
        PAIR_SEED,
        pair.collateral_mint.as_ref(),
        pair.borrow_mint.as_ref(),
        &[pair.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    for update in updates {
        let (pool_key, user_reward_key) = reward_addresses(&distributor_key, &pair_key, update);
        let pool = find_account(remaining_accounts, &pool_key)?;
        let user_reward = find_account(remaining_accounts, &user_reward_key)?;

        warp_rewards::cpi::accumulate_reward(
            CpiContext::new_with_signer(
                rewards_program.clone(),
                warp_rewards::cpi::accounts::AccumulateReward {
                    pair: pair.to_account_info(),
                    payer: payer.clone(),
                    distributor: distributor.clone(),
                    pool: pool.clone(),
                    user_reward: user_reward.clone(),
                    system_program: system_program.clone(),
                },
                signer_seeds,
            ),
            update.kind,
            update.user,
            update.balance,
        )?;
    }

    msg!("Reported {} reward balances", updates.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    #[test]
    fn updates_carry_current_balances() {
        let pair = LendingPair { borrow_index: 2 * WAD, ..Default::default() };
        let mut position = Position {
            owner: Pubkey::new_unique(),
            collateral: 70,
            borrow_shares: 30,
            ..Default::default()
        };
        position.set_debt(10, WAD);

        let [collateral, debt, borrow_asset] = RewardUpdate::all(&pair, &position).unwrap();
        assert_eq!((collateral.kind, collateral.balance), (RewardKind::Collateral, 70));
        assert_eq!((debt.kind, debt.balance), (RewardKind::Debt, 20));
        assert_eq!((borrow_asset.kind, borrow_asset.balance), (RewardKind::BorrowAsset, 30));
    }

    #[test]
    fn wrapped_update_follows_kind() {
        let position = Position { collateral: 5, borrow_shares: 9, ..Default::default() };
        let update = RewardUpdate::wrapped(WrappedKind::BorrowShares, &position);
        assert_eq!((update.kind, update.balance), (RewardKind::BorrowAsset, 9));
        let update = RewardUpdate::wrapped(WrappedKind::Collateral, &position);
        assert_eq!((update.kind, update.balance), (RewardKind::Collateral, 5));
    }

    #[test]
    fn each_kind_has_its_own_pool() {
        let distributor = Pubkey::new_unique();
        let pair = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let update = |kind| RewardUpdate { kind, user, balance: 0 };

        let (collateral_pool, _) = reward_addresses(&distributor, &pair, &update(RewardKind::Collateral));
        let (debt_pool, _) = reward_addresses(&distributor, &pair, &update(RewardKind::Debt));
        assert_ne!(collateral_pool, debt_pool);
    }
}
