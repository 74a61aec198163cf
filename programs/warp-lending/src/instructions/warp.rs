// =============================================================================
// Warp Instruction
// =============================================================================
// Runs a batch of ledger and pair actions for the signer as one unit. Any
// failing action fails the whole transaction.
//
// Every amount is an Option<u64>: Some(x) is used as given, None takes the
// output of the previous action. That lets a batch such as
//
//   approve -> vault deposit 10_000 -> deposit collateral (prev)
//           -> borrow 100 -> vault deposit (prev) -> repay (prev)
//
// be built without knowing share prices in advance.
//
// Funds always come from the signer. Each action names who receives the
// result (or, for repay, whose debt is paid). When that is the signer the
// named accounts below are used; anyone else's ShareBalance, Position or
// token account must already exist and travel, writable, in the remaining
// accounts. Reward hook accounts travel there as well.
//
// Interest accrues once, before the first action.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as instructions_sysvar;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::WarpError;
use crate::events::{
    BorrowAssetDeposited, Borrowed, CollateralDeposited, CollateralWithdrawn, Deposit, Redeemed,
    Repaid, Transfer, WarpExecuted, Withdraw,
};
use crate::instructions::pair::accrue_interest::accrue_pair;
use crate::instructions::vault::approve_contract::apply_signed_approval;
use crate::lending::{self, PairQuotes};
use crate::ledger;
use crate::rewards_hook::{sync_rewards, RewardUpdate};
use crate::state::{
    require_contract_access, AllowedContract, AssetTotals, Authorization, LendingPair, Position,
    PriceOracle, ShareBalance, UserNonce, VaultConfig,
};

/// Which of the pair's two assets a ledger action uses
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PairAsset {
    Collateral,
    Borrow,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum WarpAction {
    /// Signed approval of this pair by the signer (ed25519 instruction precedes)
    VaultApproveContract { approved: bool },
    VaultDeposit { asset: PairAsset, amount: Option<u64>, to: Pubkey },
    /// `to` owns the token account receiving the underlying
    VaultWithdraw { asset: PairAsset, shares: Option<u64>, to: Pubkey },
    VaultTransfer { asset: PairAsset, shares: Option<u64>, to: Pubkey },
    DepositBorrowAsset { amount: Option<u64>, to: Pubkey },
    DepositCollateral { amount: Option<u64>, to: Pubkey },
    /// Borrows against the signer's collateral, paying `to`
    Borrow { amount: Option<u64>, to: Pubkey },
    Repay { amount: Option<u64>, debt_owner: Pubkey },
    Redeem { shares: Option<u64>, to: Pubkey },
    WithdrawCollateral { amount: Option<u64>, to: Pubkey },
}

impl WarpAction {
    /// The action's amount, if it takes one
    pub fn amount(&self) -> Option<Option<u64>> {
        match *self {
            WarpAction::VaultApproveContract { .. } => None,
            WarpAction::VaultDeposit { amount, .. }
            | WarpAction::DepositBorrowAsset { amount, .. }
            | WarpAction::DepositCollateral { amount, .. }
            | WarpAction::Borrow { amount, .. }
            | WarpAction::Repay { amount, .. }
            | WarpAction::WithdrawCollateral { amount, .. } => Some(amount),
            WarpAction::VaultWithdraw { shares, .. }
            | WarpAction::VaultTransfer { shares, .. }
            | WarpAction::Redeem { shares, .. } => Some(shares),
        }
    }
}

/// Substitutes the previous output for a None amount
pub fn resolve_amount(amount: Option<u64>, previous: Option<u64>) -> Result<u64> {
    match amount {
        Some(amount) => Ok(amount),
        None => previous.ok_or(error!(WarpError::MissingPreviousOutput)),
    }
}

// =============================================================================
// Counterparty Accounts
// =============================================================================

/// Accounts of parties other than the signer, taken from remaining_accounts
///
/// Positions changed here are queued for the reward hook.
pub struct Counterparties<'info> {
    accounts: &'info [AccountInfo<'info>],
    reward_updates: Vec<RewardUpdate>,
}

impl<'info> Counterparties<'info> {
    pub fn new(accounts: &'info [AccountInfo<'info>]) -> Self {
        Self {
            accounts,
            reward_updates: Vec::new(),
        }
    }

    fn find_writable(&self, key: &Pubkey) -> Result<&'info AccountInfo<'info>> {
        self.accounts
            .iter()
            .find(|info| info.key == key && info.is_writable)
            .ok_or(error!(WarpError::RecipientBalanceMissing))
    }

    /// `owner`'s ledger balance of `mint`
    pub fn share_balance(&self, mint: &Pubkey, owner: &Pubkey) -> Result<Account<'info, ShareBalance>> {
        let (key, _) =
            Pubkey::find_program_address(&[SHARE_SEED, mint.as_ref(), owner.as_ref()], &crate::ID);
        Account::try_from(self.find_writable(&key)?)
    }

    /// `owner`'s position in `pair`
    pub fn position(&self, pair: &Pubkey, owner: &Pubkey) -> Result<Account<'info, Position>> {
        let (key, _) =
            Pubkey::find_program_address(&[POSITION_SEED, pair.as_ref(), owner.as_ref()], &crate::ID);
        Account::try_from(self.find_writable(&key)?)
    }

    /// First writable token account of `mint` owned by `owner`
    pub fn token_account(&self, mint: &Pubkey, owner: &Pubkey) -> Result<Account<'info, TokenAccount>> {
        self.accounts
            .iter()
            .filter(|info| info.is_writable)
            .find_map(|info| {
                Account::<TokenAccount>::try_from(info)
                    .ok()
                    .filter(|token| token.mint == *mint && token.owner == *owner)
            })
            .ok_or(error!(WarpError::MissingTokenAccount))
    }

    /// Writes a changed position back and queues its balances for rewards
    pub fn settle_position(&mut self, pair: &LendingPair, position: &Account<'info, Position>) -> Result<()> {
        position.exit(&crate::ID)?;
        self.reward_updates
            .extend(RewardUpdate::all(pair, position)?);
        Ok(())
    }

    pub fn into_reward_updates(self) -> Vec<RewardUpdate> {
        self.reward_updates
    }
}

#[derive(Accounts)]
pub struct Warp<'info> {
    // =========================================================================
    // Signer
    // =========================================================================

    /// The account every action spends from
    /// Must sign; pays for any balance or position created on first use
    #[account(mut)]
    pub user: Signer<'info>,

    // =========================================================================
    // Pair
    // =========================================================================

    /// Vault configuration, checked for pause by the ledger actions
    #[account(
        seeds = [VAULT_SEED],
        bump = vault_config.bump
    )]
    pub vault_config: Box<Account<'info, VaultConfig>>,

    /// The pair every pair action runs against
    /// Accrues interest once per warp
    #[account(
        mut,
        seeds = [PAIR_SEED, pair.collateral_mint.as_ref(), pair.borrow_mint.as_ref()],
        bump = pair.bump
    )]
    pub pair: Box<Account<'info, LendingPair>>,

    /// The signer's position in the pair
    /// init_if_needed: Created the first time the signer warps into this pair
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, pair.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    // =========================================================================
    // Assets
    // =========================================================================

    #[account(address = pair.collateral_mint)]
    pub collateral_mint: Box<Account<'info, Mint>>,

    #[account(address = pair.borrow_mint)]
    pub borrow_mint: Box<Account<'info, Mint>>,

    /// Share totals of the collateral asset
    /// init_if_needed: Created by the first deposit of this mint
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + AssetTotals::INIT_SPACE,
        seeds = [ASSET_SEED, collateral_mint.key().as_ref()],
        bump
    )]
    pub collateral_totals: Box<Account<'info, AssetTotals>>,

    #[account(
        init_if_needed,
        payer = user,
        space = 8 + AssetTotals::INIT_SPACE,
        seeds = [ASSET_SEED, borrow_mint.key().as_ref()],
        bump
    )]
    pub borrow_totals: Box<Account<'info, AssetTotals>>,

    /// Vault-owned token account holding the collateral underlying
    /// Constraints:
    /// - Mint must be the collateral mint
    /// - Authority is the vault config PDA
    #[account(
        init_if_needed,
        payer = user,
        seeds = [RESERVE_SEED, collateral_mint.key().as_ref()],
        bump,
        token::mint = collateral_mint,
        token::authority = vault_config
    )]
    pub collateral_reserve: Box<Account<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = user,
        seeds = [RESERVE_SEED, borrow_mint.key().as_ref()],
        bump,
        token::mint = borrow_mint,
        token::authority = vault_config
    )]
    pub borrow_reserve: Box<Account<'info, TokenAccount>>,

    // =========================================================================
    // Ledger Balances
    // =========================================================================

    /// The signer's collateral-asset shares
    /// init_if_needed: Created if the signer never held this asset
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, collateral_mint.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_collateral: Box<Account<'info, ShareBalance>>,

    /// The signer's borrow-asset shares
    /// init_if_needed: Created if the signer never held this asset
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + ShareBalance::INIT_SPACE,
        seeds = [SHARE_SEED, borrow_mint.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_borrow: Box<Account<'info, ShareBalance>>,

    /// Collateral shares held by the pair
    #[account(
        mut,
        seeds = [SHARE_SEED, collateral_mint.key().as_ref(), pair.key().as_ref()],
        bump = pair_collateral.bump
    )]
    pub pair_collateral: Box<Account<'info, ShareBalance>>,

    /// Borrow-asset shares held by the pair, its cash
    #[account(
        mut,
        seeds = [SHARE_SEED, borrow_mint.key().as_ref(), pair.key().as_ref()],
        bump = pair_borrow.bump
    )]
    pub pair_borrow: Box<Account<'info, ShareBalance>>,

    // =========================================================================
    // Token Accounts (only needed by vault deposit / withdraw)
    // =========================================================================

    /// Constraints:
    /// - Mint must be the collateral mint
    /// - Must be owned by the signer
    #[account(
        mut,
        constraint = user_collateral_token.mint == collateral_mint.key() @ WarpError::InvalidMint,
        constraint = user_collateral_token.owner == user.key() @ WarpError::InvalidTokenAccountOwner
    )]
    pub user_collateral_token: Option<Account<'info, TokenAccount>>,

    /// Constraints:
    /// - Mint must be the borrow mint
    /// - Must be owned by the signer
    #[account(
        mut,
        constraint = user_borrow_token.mint == borrow_mint.key() @ WarpError::InvalidMint,
        constraint = user_borrow_token.owner == user.key() @ WarpError::InvalidTokenAccountOwner
    )]
    pub user_borrow_token: Option<Account<'info, TokenAccount>>,

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Allow-list entry of the pair as a contract
    #[account(
        seeds = [ALLOWED_SEED, pair.key().as_ref()],
        bump = allowed_contract.bump
    )]
    pub allowed_contract: Box<Account<'info, AllowedContract>>,

    /// Whether the signer approved the pair to move their shares
    /// init_if_needed: Created by the first approval action
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + Authorization::INIT_SPACE,
        seeds = [AUTHORIZATION_SEED, user.key().as_ref(), pair.key().as_ref()],
        bump
    )]
    pub authorization: Box<Account<'info, Authorization>>,

    /// Replay counter for the signer's signed approvals
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + UserNonce::INIT_SPACE,
        seeds = [NONCE_SEED, user.key().as_ref()],
        bump
    )]
    pub user_nonce: Box<Account<'info, UserNonce>>,

    /// CHECK: address is the instructions sysvar
    #[account(address = instructions_sysvar::ID)]
    pub instructions: UncheckedAccount<'info>,

    // =========================================================================
    // Pricing
    // =========================================================================

    #[account(
        seeds = [ORACLE_SEED, collateral_mint.key().as_ref()],
        bump = collateral_oracle.bump
    )]
    pub collateral_oracle: Box<Account<'info, PriceOracle>>,

    #[account(
        seeds = [ORACLE_SEED, borrow_mint.key().as_ref()],
        bump = borrow_oracle.bump
    )]
    pub borrow_oracle: Box<Account<'info, PriceOracle>>,

    // =========================================================================
    // Programs
    // =========================================================================

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> Warp<'info> {
    fn quotes(&self) -> PairQuotes {
        PairQuotes::new(
            &self.pair,
            &**self.collateral_oracle,
            &self.collateral_totals,
            &**self.borrow_oracle,
            &self.borrow_totals,
        )
    }

    fn mint_of(&self, asset: PairAsset) -> Pubkey {
        match asset {
            PairAsset::Collateral => self.pair.collateral_mint,
            PairAsset::Borrow => self.pair.borrow_mint,
        }
    }

    fn require_vault_active(&self) -> Result<()> {
        require!(!self.vault_config.paused, WarpError::Paused);
        Ok(())
    }

    fn require_pair_access(&self) -> Result<()> {
        require_contract_access(
            &self.allowed_contract,
            &self.authorization,
            &self.pair.key(),
            &self.user.key(),
        )
    }

    /// Whether `to` is the signer, whose accounts are loaded above
    ///
    /// The pair and the vault hold their own balances and never receive.
    fn is_user(&self, to: Pubkey) -> Result<bool> {
        require!(
            to != Pubkey::default() && to != self.pair.key() && to != self.vault_config.key(),
            WarpError::InvalidToAddress
        );
        Ok(to == self.user.key())
    }

    // =========================================================================
    // Ledger Actions
    // =========================================================================

    fn vault_deposit(
        &mut self,
        parties: &mut Counterparties<'info>,
        asset: PairAsset,
        amount: u64,
        to: Pubkey,
    ) -> Result<u64> {
        self.require_vault_active()?;
        require!(amount > 0, WarpError::InvalidAmount);

        let mint = self.mint_of(asset);
        let mut recipient = match self.is_user(to)? {
            true => None,
            false => Some(parties.share_balance(&mint, &to)?),
        };

        let (totals, reserve, own_balance, source) = match asset {
            PairAsset::Collateral => (
                &mut self.collateral_totals,
                &self.collateral_reserve,
                &mut self.user_collateral,
                &self.user_collateral_token,
            ),
            PairAsset::Borrow => (
                &mut self.borrow_totals,
                &self.borrow_reserve,
                &mut self.user_borrow,
                &self.user_borrow_token,
            ),
        };
        let source = source.as_ref().ok_or(WarpError::MissingTokenAccount)?;
        let balance: &mut ShareBalance = match recipient.as_mut() {
            Some(recipient) => &mut **recipient,
            None => &mut ***own_balance,
        };

        let shares = ledger::deposit(totals, balance, amount)?;
        ledger::pull_underlying(
            &self.token_program.to_account_info(),
            &source.to_account_info(),
            &reserve.to_account_info(),
            &self.user.to_account_info(),
            amount,
        )?;
        if let Some(recipient) = recipient {
            recipient.exit(&crate::ID)?;
        }

        emit!(Deposit {
            mint,
            from: self.user.key(),
            to,
            amount,
            shares,
        });
        Ok(shares)
    }

    fn vault_withdraw(
        &mut self,
        parties: &Counterparties<'info>,
        asset: PairAsset,
        shares: u64,
        to: Pubkey,
    ) -> Result<u64> {
        self.require_vault_active()?;

        let mint = self.mint_of(asset);
        let external = match self.is_user(to)? {
            true => None,
            false => Some(parties.token_account(&mint, &to)?),
        };

        let (totals, reserve, balance, own_token) = match asset {
            PairAsset::Collateral => (
                &mut self.collateral_totals,
                &self.collateral_reserve,
                &mut self.user_collateral,
                &self.user_collateral_token,
            ),
            PairAsset::Borrow => (
                &mut self.borrow_totals,
                &self.borrow_reserve,
                &mut self.user_borrow,
                &self.user_borrow_token,
            ),
        };
        let destination = match external.as_ref() {
            Some(token) => token.to_account_info(),
            None => own_token
                .as_ref()
                .ok_or(WarpError::MissingTokenAccount)?
                .to_account_info(),
        };

        let (burned, amount) = ledger::withdraw(totals, balance, shares)?;
        ledger::push_underlying(
            &self.token_program.to_account_info(),
            &reserve.to_account_info(),
            &destination,
            &self.vault_config.to_account_info(),
            self.vault_config.bump,
            amount,
        )?;

        emit!(Withdraw {
            mint,
            from: self.user.key(),
            to,
            shares: burned,
            amount,
        });
        Ok(amount)
    }

    fn vault_transfer(
        &mut self,
        parties: &Counterparties<'info>,
        asset: PairAsset,
        shares: u64,
        to: Pubkey,
    ) -> Result<u64> {
        self.require_vault_active()?;
        require!(!self.is_user(to)?, WarpError::InvalidToAddress);
        require!(shares > 0, WarpError::InvalidAmount);

        let mint = self.mint_of(asset);
        let mut recipient = parties.share_balance(&mint, &to)?;

        let from = match asset {
            PairAsset::Collateral => &mut self.user_collateral,
            PairAsset::Borrow => &mut self.user_borrow,
        };
        ledger::transfer(from, &mut recipient, shares)?;
        recipient.exit(&crate::ID)?;

        emit!(Transfer {
            mint,
            from: self.user.key(),
            to,
            shares,
        });
        Ok(shares)
    }

    // =========================================================================
    // Pair Actions
    // =========================================================================

    fn deposit_collateral(
        &mut self,
        parties: &mut Counterparties<'info>,
        amount: u64,
        to: Pubkey,
    ) -> Result<u64> {
        self.require_pair_access()?;

        let pair_key = self.pair.key();
        let mut beneficiary = match self.is_user(to)? {
            true => None,
            false => Some(parties.position(&pair_key, &to)?),
        };
        let position: &mut Position = match beneficiary.as_mut() {
            Some(beneficiary) => &mut **beneficiary,
            None => &mut **self.position,
        };

        lending::deposit_collateral(
            &mut self.pair,
            &mut self.user_collateral,
            &mut self.pair_collateral,
            position,
            amount,
        )?;
        if let Some(beneficiary) = beneficiary.as_ref() {
            parties.settle_position(&self.pair, beneficiary)?;
        }

        emit!(CollateralDeposited {
            pair: pair_key,
            from: self.user.key(),
            to,
            amount,
        });
        Ok(amount)
    }

    /// Returns the wrapped borrow shares minted
    fn deposit_borrow_asset(
        &mut self,
        parties: &mut Counterparties<'info>,
        amount: u64,
        to: Pubkey,
    ) -> Result<u64> {
        self.require_pair_access()?;

        let pair_key = self.pair.key();
        let mut beneficiary = match self.is_user(to)? {
            true => None,
            false => Some(parties.position(&pair_key, &to)?),
        };
        let position: &mut Position = match beneficiary.as_mut() {
            Some(beneficiary) => &mut **beneficiary,
            None => &mut **self.position,
        };

        let minted = lending::deposit_borrow_asset(
            &mut self.pair,
            &mut self.user_borrow,
            &mut self.pair_borrow,
            position,
            amount,
        )?;
        if let Some(beneficiary) = beneficiary.as_ref() {
            parties.settle_position(&self.pair, beneficiary)?;
        }

        emit!(BorrowAssetDeposited {
            pair: pair_key,
            from: self.user.key(),
            to,
            amount,
            borrow_shares: minted,
        });
        Ok(minted)
    }

    fn borrow(&mut self, parties: &Counterparties<'info>, amount: u64, to: Pubkey) -> Result<u64> {
        let quotes = self.quotes();
        let user = self.user.key();
        let mut recipient = match self.is_user(to)? {
            true => None,
            false => Some(parties.share_balance(&self.pair.borrow_mint, &to)?),
        };
        let to_balance: &mut ShareBalance = match recipient.as_mut() {
            Some(recipient) => &mut **recipient,
            None => &mut **self.user_borrow,
        };

        lending::borrow(
            &mut self.pair,
            &mut self.position,
            &user,
            None,
            &mut self.pair_borrow,
            to_balance,
            amount,
            &quotes,
        )?;
        if let Some(recipient) = recipient {
            recipient.exit(&crate::ID)?;
        }

        emit!(Borrowed {
            pair: self.pair.key(),
            debt_owner: user,
            borrower: user,
            to,
            amount,
        });
        Ok(amount)
    }

    fn repay(
        &mut self,
        parties: &mut Counterparties<'info>,
        amount: u64,
        debt_owner: Pubkey,
    ) -> Result<u64> {
        self.require_pair_access()?;

        let pair_key = self.pair.key();
        let mut other = match self.is_user(debt_owner)? {
            true => None,
            false => Some(parties.position(&pair_key, &debt_owner)?),
        };
        let position: &mut Position = match other.as_mut() {
            Some(other) => &mut **other,
            None => &mut **self.position,
        };

        let repaid = lending::repay(
            &mut self.pair,
            &mut self.user_borrow,
            &mut self.pair_borrow,
            position,
            amount,
        )?;
        if let Some(other) = other.as_ref() {
            parties.settle_position(&self.pair, other)?;
        }

        emit!(Repaid {
            pair: pair_key,
            payer: self.user.key(),
            debt_owner,
            amount: repaid,
        });
        Ok(repaid)
    }

    fn redeem(&mut self, parties: &Counterparties<'info>, shares: u64, to: Pubkey) -> Result<u64> {
        let mut recipient = match self.is_user(to)? {
            true => None,
            false => Some(parties.share_balance(&self.pair.borrow_mint, &to)?),
        };
        let to_balance: &mut ShareBalance = match recipient.as_mut() {
            Some(recipient) => &mut **recipient,
            None => &mut **self.user_borrow,
        };

        let (burned, amount) = lending::redeem(
            &mut self.pair,
            &mut self.position,
            &mut self.pair_borrow,
            to_balance,
            shares,
        )?;
        if let Some(recipient) = recipient {
            recipient.exit(&crate::ID)?;
        }

        emit!(Redeemed {
            pair: self.pair.key(),
            owner: self.user.key(),
            to,
            borrow_shares: burned,
            amount,
        });
        Ok(amount)
    }

    fn withdraw_collateral(
        &mut self,
        parties: &Counterparties<'info>,
        amount: u64,
        to: Pubkey,
    ) -> Result<u64> {
        let quotes = self.quotes();
        let mut recipient = match self.is_user(to)? {
            true => None,
            false => Some(parties.share_balance(&self.pair.collateral_mint, &to)?),
        };
        let to_balance: &mut ShareBalance = match recipient.as_mut() {
            Some(recipient) => &mut **recipient,
            None => &mut **self.user_collateral,
        };

        let withdrawn = lending::withdraw_collateral(
            &mut self.pair,
            &mut self.position,
            &mut self.pair_collateral,
            to_balance,
            amount,
            &quotes,
        )?;
        if let Some(recipient) = recipient {
            recipient.exit(&crate::ID)?;
        }

        emit!(CollateralWithdrawn {
            pair: self.pair.key(),
            owner: self.user.key(),
            to,
            amount: withdrawn,
        });
        Ok(withdrawn)
    }
}

/// # Arguments
/// * `actions` - Actions to run in order, at most MAX_WARP_ACTIONS
pub fn handler_warp<'info>(
    ctx: Context<'_, '_, 'info, 'info, Warp<'info>>,
    actions: Vec<WarpAction>,
) -> Result<()> {
    require!(!actions.is_empty(), WarpError::InvalidAmount);
    require!(actions.len() <= MAX_WARP_ACTIONS, WarpError::TooManyActions);

    let bumps = &ctx.bumps;
    let accounts = ctx.accounts;
    let pair_key = accounts.pair.key();
    let user = accounts.user.key();
    let mut parties = Counterparties::new(ctx.remaining_accounts);

    // =========================================================================
    // Bind Accounts Created On First Use
    // =========================================================================

    accounts.position.bind(pair_key, user, bumps.position);
    accounts
        .user_collateral
        .bind(accounts.pair.collateral_mint, user, bumps.user_collateral);
    accounts
        .user_borrow
        .bind(accounts.pair.borrow_mint, user, bumps.user_borrow);

    if accounts.collateral_totals.mint == Pubkey::default() {
        accounts.collateral_totals.mint = accounts.pair.collateral_mint;
        accounts.collateral_totals.bump = bumps.collateral_totals;
        accounts.collateral_totals.reserve_bump = bumps.collateral_reserve;
    }
    if accounts.borrow_totals.mint == Pubkey::default() {
        accounts.borrow_totals.mint = accounts.pair.borrow_mint;
        accounts.borrow_totals.bump = bumps.borrow_totals;
        accounts.borrow_totals.reserve_bump = bumps.borrow_reserve;
    }

    accrue_pair(&mut accounts.pair, pair_key, accounts.pair_borrow.shares)?;

    // =========================================================================
    // Run Actions
    // =========================================================================

    let mut previous: Option<u64> = None;
    for (index, action) in actions.iter().enumerate() {
        let amount = match action.amount() {
            Some(amount) => resolve_amount(amount, previous)?,
            None => 0,
        };

        let output = match *action {
            WarpAction::VaultApproveContract { approved } => {
                apply_signed_approval(
                    &accounts.allowed_contract,
                    &mut accounts.authorization,
                    bumps.authorization,
                    &mut accounts.user_nonce,
                    bumps.user_nonce,
                    &accounts.instructions.to_account_info(),
                    user,
                    pair_key,
                    approved,
                )?;
                0
            }
            WarpAction::VaultDeposit { asset, to, .. } => {
                accounts.vault_deposit(&mut parties, asset, amount, to)?
            }
            WarpAction::VaultWithdraw { asset, to, .. } => {
                accounts.vault_withdraw(&parties, asset, amount, to)?
            }
            WarpAction::VaultTransfer { asset, to, .. } => {
                accounts.vault_transfer(&parties, asset, amount, to)?
            }
            WarpAction::DepositBorrowAsset { to, .. } => {
                accounts.deposit_borrow_asset(&mut parties, amount, to)?
            }
            WarpAction::DepositCollateral { to, .. } => {
                accounts.deposit_collateral(&mut parties, amount, to)?
            }
            WarpAction::Borrow { to, .. } => accounts.borrow(&parties, amount, to)?,
            WarpAction::Repay { debt_owner, .. } => {
                accounts.repay(&mut parties, amount, debt_owner)?
            }
            WarpAction::Redeem { to, .. } => accounts.redeem(&parties, amount, to)?,
            WarpAction::WithdrawCollateral { to, .. } => {
                accounts.withdraw_collateral(&parties, amount, to)?
            }
        };

        msg!("Warp action {}: {:?} -> {}", index, action, output);
        previous = Some(output);
    }

    let last_output = previous.unwrap_or_default();
    emit!(WarpExecuted {
        pair: pair_key,
        user,
        actions: actions.len() as u8,
        last_output,
    });

    msg!("Warp finished {} actions", actions.len());
    msg!(
        "Position: collateral {}, borrow shares {}, debt {}",
        accounts.position.collateral,
        accounts.position.borrow_shares,
        accounts.pair.debt_of(&accounts.position)?
    );

    let mut updates = parties.into_reward_updates();
    updates.extend(RewardUpdate::all(&accounts.pair, &accounts.position)?);
    sync_rewards(
        &accounts.pair,
        &accounts.user.to_account_info(),
        &accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &updates,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Owned account data for building AccountInfos
    struct TestAccount {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
        is_writable: bool,
    }

    impl TestAccount {
        fn share_balance(mint: Pubkey, holder: Pubkey, shares: u64, is_writable: bool) -> Self {
            let (key, _) =
                Pubkey::find_program_address(&[SHARE_SEED, mint.as_ref(), holder.as_ref()], &crate::ID);
            let mut data = Vec::new();
            ShareBalance { mint, owner: holder, shares, bump: 0 }
                .try_serialize(&mut data)
                .unwrap();
            Self { key, owner: crate::ID, lamports: 1_000_000, data, is_writable }
        }

        fn to_info(&mut self) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                false,
                self.is_writable,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                false,
                0,
            )
        }
    }

    #[test]
    fn explicit_amount_wins_over_previous_output() {
        assert_eq!(resolve_amount(Some(7), Some(100)).unwrap(), 7);
        assert_eq!(resolve_amount(Some(0), None).unwrap(), 0);
    }

    #[test]
    fn none_takes_previous_output() {
        assert_eq!(resolve_amount(None, Some(100)).unwrap(), 100);
        assert_eq!(
            resolve_amount(None, None).unwrap_err(),
            WarpError::MissingPreviousOutput.into()
        );
    }

    #[test]
    fn every_amount_bearing_action_exposes_its_amount() {
        let friend = Pubkey::new_unique();
        let actions = [
            WarpAction::VaultDeposit { asset: PairAsset::Collateral, amount: Some(10_000), to: friend },
            WarpAction::DepositCollateral { amount: None, to: friend },
            WarpAction::Borrow { amount: Some(100), to: friend },
            WarpAction::Repay { amount: Some(5), debt_owner: friend },
            WarpAction::VaultTransfer { asset: PairAsset::Borrow, shares: None, to: friend },
        ];
        let amounts: Vec<_> = actions.iter().map(|a| a.amount()).collect();
        assert_eq!(
            amounts,
            vec![Some(Some(10_000)), Some(None), Some(Some(100)), Some(Some(5)), Some(None)]
        );
        assert_eq!(WarpAction::VaultApproveContract { approved: true }.amount(), None);
    }

    #[test]
    fn chained_outputs_feed_forward() {
        // Outputs of vault deposit 10_000 (1:1), deposit collateral, borrow 100,
        // vault deposit, repay
        let me = Pubkey::new_unique();
        let actions = [
            WarpAction::VaultDeposit { asset: PairAsset::Collateral, amount: Some(10_000), to: me },
            WarpAction::DepositCollateral { amount: None, to: me },
            WarpAction::Borrow { amount: Some(100), to: me },
            WarpAction::VaultDeposit { asset: PairAsset::Borrow, amount: None, to: me },
            WarpAction::Repay { amount: None, debt_owner: me },
        ];

        let mut previous = None;
        let mut resolved = Vec::new();
        for action in actions.iter() {
            let amount = resolve_amount(action.amount().unwrap(), previous).unwrap();
            resolved.push(amount);
            previous = Some(amount);
        }
        assert_eq!(resolved, vec![10_000, 10_000, 100, 100, 100]);
    }

    #[test]
    fn counterparty_balance_is_found_by_address() {
        let mint = Pubkey::new_unique();
        let friend = Pubkey::new_unique();
        let mut stranger = TestAccount::share_balance(mint, Pubkey::new_unique(), 1, true);
        let mut theirs = TestAccount::share_balance(mint, friend, 42, true);
        let infos = [stranger.to_info(), theirs.to_info()];
        let parties = Counterparties::new(&infos);

        let balance = parties.share_balance(&mint, &friend).unwrap();
        assert_eq!(balance.owner, friend);
        assert_eq!(balance.shares, 42);

        assert_eq!(
            parties.share_balance(&Pubkey::new_unique(), &friend).unwrap_err(),
            WarpError::RecipientBalanceMissing.into()
        );
    }

    #[test]
    fn read_only_counterparty_is_ignored() {
        let mint = Pubkey::new_unique();
        let friend = Pubkey::new_unique();
        let mut theirs = TestAccount::share_balance(mint, friend, 42, false);
        let infos = [theirs.to_info()];
        let parties = Counterparties::new(&infos);

        assert_eq!(
            parties.share_balance(&mint, &friend).unwrap_err(),
            WarpError::RecipientBalanceMissing.into()
        );
        assert_eq!(
            parties.token_account(&mint, &friend).unwrap_err(),
            WarpError::MissingTokenAccount.into()
        );
    }

    #[test]
    fn deposit_then_borrow_for_a_friend() {
        // Signer funds a friend's collateral, then borrows against their own
        // and pays the friend; the friend's debt stays untouched
        let me = Pubkey::new_unique();
        let friend = Pubkey::new_unique();
        let dollar = PriceOracle { price: 100_000_000, ..Default::default() };
        let mut pair = LendingPair {
            collateral_factor: DEFAULT_COLLATERAL_FACTOR,
            initial_exchange_rate: DEFAULT_INITIAL_EXCHANGE_RATE,
            borrow_index: WAD,
            ..Default::default()
        };
        let mut mine = Position { owner: me, ..Default::default() };
        let mut theirs = Position { owner: friend, ..Default::default() };
        let totals = AssetTotals::default();
        let mut my_collateral = ShareBalance { shares: 3_000, ..Default::default() };
        let mut friend_borrow = ShareBalance::default();
        let mut pair_collateral = ShareBalance::default();
        let mut pair_borrow = ShareBalance { shares: 1_000, ..Default::default() };

        lending::deposit_collateral(&mut pair, &mut my_collateral, &mut pair_collateral, &mut mine, 1_500)
            .unwrap();
        lending::deposit_collateral(&mut pair, &mut my_collateral, &mut pair_collateral, &mut theirs, 1_500)
            .unwrap();

        let quotes = PairQuotes::new(&pair, &dollar, &totals, &dollar, &totals);
        lending::borrow(&mut pair, &mut mine, &me, None, &mut pair_borrow, &mut friend_borrow, 1_000, &quotes)
            .unwrap();

        assert_eq!((mine.collateral, theirs.collateral), (1_500, 1_500));
        assert_eq!(pair.debt_of(&mine).unwrap(), 1_000);
        assert_eq!(pair.debt_of(&theirs).unwrap(), 0);
        assert_eq!(friend_borrow.shares, 1_000);
        assert_eq!(my_collateral.shares, 0);
    }

    #[test]
    fn deposit_borrow_repay_batch_clears_debt() {
        let user = Pubkey::new_unique();
        let dollar = PriceOracle { price: 100_000_000, ..Default::default() };
        let mut pair = LendingPair {
            collateral_factor: DEFAULT_COLLATERAL_FACTOR,
            initial_exchange_rate: DEFAULT_INITIAL_EXCHANGE_RATE,
            borrow_index: WAD,
            ..Default::default()
        };
        let mut position = Position { owner: user, ..Default::default() };
        let mut collateral_totals = AssetTotals::default();
        let mut borrow_totals = AssetTotals::default();
        let mut user_collateral = ShareBalance::default();
        let mut user_borrow = ShareBalance::default();
        let mut pair_collateral = ShareBalance::default();
        let mut pair_borrow = ShareBalance::default();

        // Someone else already lent 1000 into the pair
        let mut lender = ShareBalance::default();
        ledger::deposit(&mut borrow_totals, &mut lender, 1_000).unwrap();
        ledger::transfer(&mut lender, &mut pair_borrow, 1_000).unwrap();

        // vault deposit 10_000
        let deposited = ledger::deposit(
            &mut collateral_totals,
            &mut user_collateral,
            resolve_amount(Some(10_000), None).unwrap(),
        )
        .unwrap();

        // deposit collateral (prev)
        let wrapped = resolve_amount(None, Some(deposited)).unwrap();
        lending::deposit_collateral(
            &mut pair,
            &mut user_collateral,
            &mut pair_collateral,
            &mut position,
            wrapped,
        )
        .unwrap();

        // borrow 100
        let quotes = PairQuotes::new(&pair, &dollar, &collateral_totals, &dollar, &borrow_totals);
        let borrowed = resolve_amount(Some(100), Some(wrapped)).unwrap();
        lending::borrow(
            &mut pair,
            &mut position,
            &user,
            None,
            &mut pair_borrow,
            &mut user_borrow,
            borrowed,
            &quotes,
        )
        .unwrap();
        assert_eq!(pair.debt_of(&position).unwrap(), 100);

        // vault deposit (prev) of the borrow asset, then repay (prev)
        let topped_up = ledger::deposit(
            &mut borrow_totals,
            &mut user_borrow,
            resolve_amount(None, Some(borrowed)).unwrap(),
        )
        .unwrap();
        let repaid = lending::repay(
            &mut pair,
            &mut user_borrow,
            &mut pair_borrow,
            &mut position,
            resolve_amount(None, Some(topped_up)).unwrap(),
        )
        .unwrap();

        assert_eq!(repaid, 100);
        assert_eq!(pair.debt_of(&position).unwrap(), 0);
        assert_eq!(pair.total_borrows, 0);
        assert_eq!(position.collateral, 10_000);
        assert_eq!(user_borrow.shares, 100);
        assert_eq!(pair_borrow.shares, 1_000);
    }

    #[test]
    fn supplying_reports_minted_shares() {
        // A 2:1 initial exchange rate mints twice the supplied shares, and
        // the batch output is the minted count
        let mut pair = LendingPair {
            initial_exchange_rate: WAD / 2,
            borrow_index: WAD,
            ..Default::default()
        };
        let mut funds = ShareBalance { shares: 100, ..Default::default() };
        let mut pair_borrow = ShareBalance::default();
        let mut supplier = Position::default();

        let minted =
            lending::deposit_borrow_asset(&mut pair, &mut funds, &mut pair_borrow, &mut supplier, 100)
                .unwrap();
        assert_eq!(minted, 200);
        assert_eq!(supplier.borrow_shares, 200);
        assert_eq!(resolve_amount(None, Some(minted)).unwrap(), 200);
    }
}
