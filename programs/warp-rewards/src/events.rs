use anchor_lang::prelude::*;

use crate::state::RewardKind;

// Manager events
#[event]
pub struct DistributorStatusUpdated {
    pub distributor: Pubkey,
    pub approved: bool,
}

#[event]
pub struct AddReward {
    pub token: Pubkey,
    pub distributor: Pubkey,
}

#[event]
pub struct RemoveReward {
    pub token: Pubkey,
    pub distributor: Pubkey,
}

#[event]
pub struct TransferControl {
    pub owner: Pubkey,
    pub pending_owner: Pubkey,
}

#[event]
pub struct OwnershipAccepted {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

// Distributor events
#[event]
pub struct AddDistribution {
    pub distributor: Pubkey,
    pub pair: Pubkey,
    pub first_pid: u8,
    pub collateral_alloc_point: u64,
    pub debt_alloc_point: u64,
    pub borrow_asset_alloc_point: u64,
    pub total_alloc_point: u64,
}

#[event]
pub struct UpdateDistribution {
    pub distributor: Pubkey,
    pub pid: u8,
    pub alloc_point: u64,
    pub total_alloc_point: u64,
}

#[event]
pub struct RewardsActivated {
    pub distributor: Pubkey,
    pub pair: Pubkey,
}

#[event]
pub struct RewardAccumulated {
    pub pool: Pubkey,
    pub kind: RewardKind,
    pub user: Pubkey,
    pub staked_amount: u64,
    pub accumulated: u64,
}

#[event]
pub struct Withdraw {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct WithdrawUnclaimedReward {
    pub distributor: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}
