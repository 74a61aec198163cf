// =============================================================================
// Authorization store
// =============================================================================
// Which contracts may move an owner's shares, and the nonce that keeps every
// signed approval single-use.
// =============================================================================

use anchor_lang::prelude::*;

use crate::error::WarpError;

/// Vault owner's allow-list entry
/// PDA: ["allowed", contract]
#[account]
#[derive(InitSpace, Default)]
pub struct AllowedContract {
    pub contract: Pubkey,
    pub allowed: bool,
    pub bump: u8,
}

/// Owner's approval for a contract to move their shares
/// PDA: ["authorization", owner, contract]
#[account]
#[derive(InitSpace, Default)]
pub struct Authorization {
    pub owner: Pubkey,
    pub contract: Pubkey,
    pub approved: bool,
    pub bump: u8,
}

/// Next nonce an owner's signed message must carry
/// PDA: ["nonce", owner]
#[account]
#[derive(InitSpace, Default)]
pub struct UserNonce {
    pub owner: Pubkey,
    pub nonce: u64,
    pub bump: u8,
}

impl UserNonce {
    /// Returns the nonce the just-verified message used and moves past it
    pub fn consume(&mut self) -> Result<u64> {
        let used = self.nonce;
        self.nonce = self
            .nonce
            .checked_add(1)
            .ok_or(WarpError::MathOverflow)?;
        Ok(used)
    }
}

/// A contract may move `owner`'s shares only while it is allow-listed and approved
pub fn require_contract_access(
    allowed: &AllowedContract,
    authorization: &Authorization,
    contract: &Pubkey,
    owner: &Pubkey,
) -> Result<()> {
    require!(
        allowed.allowed && allowed.contract == *contract,
        WarpError::NotWhitelisted
    );
    require!(
        authorization.approved
            && authorization.contract == *contract
            && authorization.owner == *owner,
        WarpError::OnlyContract
    );
    Ok(())
}
