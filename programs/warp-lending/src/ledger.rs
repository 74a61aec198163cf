// =============================================================================
// Ledger primitives
// =============================================================================
// Share bookkeeping shared by the vault instructions, the pair instructions
// and warp. Token movement into and out of reserves goes through the two
// SPL helpers at the bottom; everything else is pure accounting.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer as SplTransfer};

use crate::constants::VAULT_SEED;
use crate::error::WarpError;
use crate::state::{AssetTotals, ShareBalance};

/// Books `amount` underlying for `to` and returns the shares credited
pub fn deposit(totals: &mut AssetTotals, to: &mut ShareBalance, amount: u64) -> Result<u64> {
    require!(!totals.flash_loan_active, WarpError::FlashLoanActive);
    let shares = totals.record_deposit(amount)?;
    to.credit(shares)?;
    Ok(shares)
}

/// Burns `shares` (0 = whole balance) and returns (shares burned, underlying owed)
pub fn withdraw(totals: &mut AssetTotals, from: &mut ShareBalance, shares: u64) -> Result<(u64, u64)> {
    require!(!totals.flash_loan_active, WarpError::FlashLoanActive);
    let shares = if shares == 0 { from.shares } else { shares };
    require!(shares > 0, WarpError::InvalidAmount);

    from.debit(shares)?;
    from.require_no_dust()?;
    let amount = totals.record_withdrawal(shares)?;
    Ok((shares, amount))
}

/// Moves shares between two balances of the same asset
pub fn transfer(from: &mut ShareBalance, to: &mut ShareBalance, shares: u64) -> Result<()> {
    from.debit(shares)?;
    to.credit(shares)
}

/// Owner's token account -> reserve, signed by the owner
pub fn pull_underlying<'info>(
    token_program: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    reserve: &AccountInfo<'info>,
    owner: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    token::transfer(
        CpiContext::new(
            token_program.clone(),
            SplTransfer {
                from: from.clone(),
                to: reserve.clone(),
                authority: owner.clone(),
            },
        ),
        amount,
    )
}

/// Reserve -> any token account, signed by the vault PDA
pub fn push_underlying<'info>(
    token_program: &AccountInfo<'info>,
    reserve: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    vault_config: &AccountInfo<'info>,
    vault_bump: u8,
    amount: u64,
) -> Result<()> {
    let seeds = &[VAULT_SEED, &[vault_bump]];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            token_program.clone(),
            SplTransfer {
                from: reserve.clone(),
                to: to.clone(),
                authority: vault_config.clone(),
            },
            signer_seeds,
        ),
        amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(shares: u64) -> ShareBalance {
        ShareBalance { shares, ..Default::default() }
    }

    #[test]
    fn shares_sum_to_total_minted() {
        let mut totals = AssetTotals::default();
        let mut alice = balance(0);
        let mut bob = balance(0);

        deposit(&mut totals, &mut alice, 5_000).unwrap();
        deposit(&mut totals, &mut bob, 3_000).unwrap();
        transfer(&mut alice, &mut bob, 1_500).unwrap();
        withdraw(&mut totals, &mut bob, 2_000).unwrap();

        assert_eq!(alice.shares + bob.shares, totals.total_shares_minted);
        assert!(totals.total_underlying_deposit >= totals.total_shares_minted);
    }

    #[test]
    fn zero_withdraws_whole_balance() {
        let mut totals = AssetTotals::default();
        let mut alice = balance(0);
        deposit(&mut totals, &mut alice, 2_500).unwrap();

        assert_eq!(withdraw(&mut totals, &mut alice, 0).unwrap(), (2_500, 2_500));
        assert_eq!(alice.shares, 0);
        assert_eq!(totals.total_shares_minted, 0);
    }

    #[test]
    fn withdrawal_cannot_leave_dust() {
        let mut totals = AssetTotals::default();
        let mut alice = balance(0);
        deposit(&mut totals, &mut alice, 2_500).unwrap();

        assert_eq!(
            withdraw(&mut totals, &mut alice, 2_000).unwrap_err(),
            WarpError::InvalidRatio.into()
        );
    }

    #[test]
    fn ledger_is_locked_during_flash_loan() {
        let mut totals = AssetTotals { flash_loan_active: true, ..Default::default() };
        let mut alice = balance(5_000);

        assert_eq!(
            deposit(&mut totals, &mut alice, 1_000).unwrap_err(),
            WarpError::FlashLoanActive.into()
        );
        assert!(withdraw(&mut totals, &mut alice, 1_000).is_err());
    }

    #[test]
    fn transfer_rejects_overdraft() {
        let mut alice = balance(10);
        let mut bob = balance(0);
        assert_eq!(
            transfer(&mut alice, &mut bob, 11).unwrap_err(),
            WarpError::InsufficientShares.into()
        );
        assert_eq!(alice.shares, 10);
    }
}
