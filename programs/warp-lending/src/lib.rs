// =============================================================================
// WARP LENDING - Share ledger, isolated lending pairs and batched actions
// =============================================================================
//
// Vault: every asset is held in a program reserve and tracked as shares.
// Shares move between accounts, and approved contracts may move them on an
// owner's behalf. Flash loans pay a fee that raises the share price.
//
// Pairs: one collateral asset and one borrow asset, both as ledger shares.
// Suppliers earn interest through wrapped borrow shares, borrowers post
// collateral and carry indexed debt, and undercollateralized positions are
// taken over by liquidators.
//
// Warp: runs a list of vault and pair actions for one signer, chaining each
// action's output into the next.
// =============================================================================

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod lending;
pub mod math;
pub mod rewards_hook;
pub mod signature;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use error::*;
pub use events::*;
pub use instructions::*;
pub use state::*;

declare_id!("GtSffDFJ1vwchzKzksRwZg7rs3xQg8Ug7VZYrfvsr17V");

#[program]
pub mod warp_lending {
    use super::*;

    // =========================================================================
    // Vault Setup
    // =========================================================================

    /// Create the singleton vault configuration
    ///
    /// # Arguments
    /// * `owner` - Vault owner
    /// * `flash_loan_rate` - WAD fee rate, None for the 5% default
    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        owner: Pubkey,
        flash_loan_rate: Option<u128>,
    ) -> Result<()> {
        instructions::initialize_vault::handler_initialize_vault(ctx, owner, flash_loan_rate)
    }

    /// Register or update the price of a mint (owner only)
    pub fn set_price(ctx: Context<SetPrice>, price: u64) -> Result<()> {
        instructions::set_price::handler_set_price(ctx, price)
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Deposit underlying tokens and credit shares to `to`
    pub fn deposit(ctx: Context<DepositToVault>, amount: u64, to: Pubkey) -> Result<()> {
        instructions::deposit::handler_deposit(ctx, amount, to)
    }

    /// Burn shares (0 = whole balance) and send the underlying to `to`
    pub fn withdraw(ctx: Context<WithdrawFromVault>, shares: u64, to: Pubkey) -> Result<()> {
        instructions::withdraw::handler_withdraw(ctx, shares, to)
    }

    pub fn transfer(ctx: Context<TransferShares>, shares: u64, to: Pubkey) -> Result<()> {
        instructions::transfer::handler_transfer(ctx, shares, to)
    }

    /// Approve or revoke a contract with the owner's signed message
    ///
    /// The ed25519 program instruction carrying the signature must come
    /// directly before this one.
    pub fn approve_contract(
        ctx: Context<ApproveContract>,
        owner: Pubkey,
        contract: Pubkey,
        approved: bool,
    ) -> Result<()> {
        instructions::approve_contract::handler_approve_contract(ctx, owner, contract, approved)
    }

    /// Lend `amount` to a borrower program for the duration of one callback
    ///
    /// # Arguments
    /// * `amount` - Underlying to lend
    /// * `data` - Instruction data passed to the borrower program
    pub fn flash_loan<'info>(
        ctx: Context<'_, '_, '_, 'info, ExecuteFlashLoan<'info>>,
        amount: u64,
        data: Vec<u8>,
    ) -> Result<()> {
        instructions::flash_loan::handler_flash_loan(ctx, amount, data)
    }

    // =========================================================================
    // Ledger Views
    // =========================================================================

    pub fn to_shares(ctx: Context<AssetView>, amount: u64) -> Result<u64> {
        instructions::views::handler_to_shares(ctx, amount)
    }

    pub fn to_underlying(ctx: Context<AssetView>, shares: u64) -> Result<u64> {
        instructions::views::handler_to_underlying(ctx, shares)
    }

    pub fn max_flash_loan(ctx: Context<AssetView>) -> Result<u64> {
        instructions::views::handler_max_flash_loan(ctx)
    }

    pub fn flash_fee(ctx: Context<AssetView>, amount: u64) -> Result<u64> {
        instructions::views::handler_flash_fee(ctx, amount)
    }

    // =========================================================================
    // Vault Admin (owner only)
    // =========================================================================

    /// Suspend or resume deposit, withdraw and transfer
    pub fn set_vault_paused(ctx: Context<SetVaultPaused>, paused: bool) -> Result<()> {
        instructions::vault_admin::handler_set_vault_paused(ctx, paused)
    }

    /// Stage a new owner, who must accept
    pub fn transfer_ownership(ctx: Context<TransferVaultOwnership>, new_owner: Pubkey) -> Result<()> {
        instructions::vault_admin::handler_transfer_ownership(ctx, new_owner)
    }

    pub fn accept_ownership(ctx: Context<AcceptVaultOwnership>) -> Result<()> {
        instructions::vault_admin::handler_accept_ownership(ctx)
    }

    /// Add or remove a contract from the allow-list
    pub fn allow_contract(
        ctx: Context<SetAllowedContract>,
        contract: Pubkey,
        allowed: bool,
    ) -> Result<()> {
        instructions::vault_admin::handler_allow_contract(ctx, contract, allowed)
    }

    pub fn update_flash_loan_rate(ctx: Context<UpdateFlashLoanRate>, new_rate: u128) -> Result<()> {
        instructions::vault_admin::handler_update_flash_loan_rate(ctx, new_rate)
    }

    /// Sweep reserve tokens not owed to share holders to the owner
    pub fn rescue_funds(ctx: Context<RescueReserve>) -> Result<()> {
        instructions::vault_admin::handler_rescue_funds(ctx)
    }

    // =========================================================================
    // Pair Lifecycle
    // =========================================================================

    /// Create a lending pair (vault owner only)
    pub fn initialize_pair(ctx: Context<InitializePair>, config: PairConfig) -> Result<()> {
        instructions::initialize_pair::handler_initialize_pair(ctx, config)
    }

    /// Accrue interest up to the current slot (permissionless)
    pub fn accrue_interest(ctx: Context<AccrueInterest>) -> Result<()> {
        instructions::accrue_interest::handler_accrue_interest(ctx)
    }

    /// Current per-slot rates and exchange rate
    pub fn pair_rates(ctx: Context<PairView>) -> Result<PairRates> {
        instructions::accrue_interest::handler_pair_rates(ctx)
    }

    // =========================================================================
    // Pair Supply Side
    // =========================================================================

    /// Supply borrow-asset shares and mint wrapped borrow shares to `to`
    pub fn deposit_borrow_asset<'info>(
        ctx: Context<'_, '_, '_, 'info, DepositBorrowAssetToPair<'info>>,
        amount: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::deposit_borrow_asset::handler_deposit_borrow_asset(ctx, amount, to)
    }

    /// Wrap collateral shares 1:1 into `to`'s position
    pub fn deposit_collateral<'info>(
        ctx: Context<'_, '_, '_, 'info, DepositCollateralToPair<'info>>,
        amount: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::deposit_collateral::handler_deposit_collateral(ctx, amount, to)
    }

    /// Burn wrapped borrow shares (0 = all) for ledger shares
    pub fn redeem<'info>(
        ctx: Context<'_, '_, '_, 'info, RedeemFromPair<'info>>,
        borrow_shares: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::redeem::handler_redeem(ctx, borrow_shares, to)
    }

    /// Unwrap collateral (0 = everything free)
    pub fn withdraw_collateral<'info>(
        ctx: Context<'_, '_, '_, 'info, WithdrawCollateralFromPair<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::withdraw_collateral::handler_withdraw_collateral(ctx, amount)
    }

    pub fn transfer_wrapped<'info>(
        ctx: Context<'_, '_, '_, 'info, TransferWrapped<'info>>,
        kind: WrappedKind,
        amount: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::transfer_wrapped::handler_transfer_wrapped(ctx, kind, amount, to)
    }

    // =========================================================================
    // Wrapped Allowances
    // =========================================================================

    /// Let `spender` move up to `amount` of the signer's wrapped `kind`
    pub fn approve_wrapped(
        ctx: Context<SetWrappedAllowance>,
        kind: WrappedKind,
        spender: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::wrapped_allowance::handler_change_wrapped_allowance(
            ctx,
            kind,
            spender,
            AllowanceChange::Set(amount),
        )
    }

    pub fn increase_wrapped_allowance(
        ctx: Context<SetWrappedAllowance>,
        kind: WrappedKind,
        spender: Pubkey,
        added: u64,
    ) -> Result<()> {
        instructions::wrapped_allowance::handler_change_wrapped_allowance(
            ctx,
            kind,
            spender,
            AllowanceChange::Increase(added),
        )
    }

    /// Fails rather than going below zero
    pub fn decrease_wrapped_allowance(
        ctx: Context<SetWrappedAllowance>,
        kind: WrappedKind,
        spender: Pubkey,
        subtracted: u64,
    ) -> Result<()> {
        instructions::wrapped_allowance::handler_change_wrapped_allowance(
            ctx,
            kind,
            spender,
            AllowanceChange::Decrease(subtracted),
        )
    }

    /// Move `from`'s wrapped balance to `to`, spending the signer's allowance
    pub fn transfer_wrapped_from<'info>(
        ctx: Context<'_, '_, '_, 'info, TransferWrappedFrom<'info>>,
        kind: WrappedKind,
        from: Pubkey,
        amount: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::wrapped_allowance::handler_transfer_wrapped_from(ctx, kind, from, amount, to)
    }

    // =========================================================================
    // Pair Debt
    // =========================================================================

    /// Borrow against `debt_owner`'s collateral, paying `to`
    ///
    /// A signer other than the debt owner needs a borrow allowance.
    pub fn borrow<'info>(
        ctx: Context<'_, '_, '_, 'info, BorrowFromPair<'info>>,
        amount: u64,
        debt_owner: Pubkey,
        to: Pubkey,
    ) -> Result<()> {
        instructions::borrow::handler_borrow(ctx, amount, debt_owner, to)
    }

    /// Repay `debt_owner`'s debt (0 = all of it)
    pub fn repay<'info>(
        ctx: Context<'_, '_, '_, 'info, RepayToPair<'info>>,
        amount: u64,
        debt_owner: Pubkey,
    ) -> Result<()> {
        instructions::repay::handler_repay(ctx, amount, debt_owner)
    }

    /// Let `delegate` borrow up to `amount` against `owner`'s collateral
    ///
    /// The owner's ed25519 signature over the delegation message must come
    /// directly before this instruction.
    pub fn delegate_borrow(
        ctx: Context<DelegateBorrow>,
        owner: Pubkey,
        delegate: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::delegate_borrow::handler_delegate_borrow(ctx, owner, delegate, amount)
    }

    /// Take over an undercollateralized position, no-op when it is healthy
    pub fn liquidate<'info>(
        ctx: Context<'_, '_, '_, 'info, LiquidatePosition<'info>>,
        borrower: Pubkey,
    ) -> Result<()> {
        instructions::liquidate::handler_liquidate(ctx, borrower)
    }

    /// Liquidate every unhealthy position among `borrowers`
    ///
    /// Borrower positions travel, writable, in the remaining accounts.
    pub fn liquidate_many<'info>(
        ctx: Context<'_, '_, 'info, 'info, LiquidateMany<'info>>,
        borrowers: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::liquidate::handler_liquidate_many(ctx, borrowers)
    }

    // =========================================================================
    // Pair Guardian
    // =========================================================================

    pub fn update_risk_config(ctx: Context<PairGuardian>, config: RiskConfig) -> Result<()> {
        instructions::pair_admin::handler_update_risk_config(ctx, config)
    }

    pub fn set_pair_action_paused(
        ctx: Context<PairGuardian>,
        action: PairAction,
        paused: bool,
    ) -> Result<()> {
        instructions::pair_admin::handler_set_pair_action_paused(ctx, action, paused)
    }

    pub fn update_fee_receiver(ctx: Context<PairGuardian>, fee_receiver: Pubkey) -> Result<()> {
        instructions::pair_admin::handler_update_fee_receiver(ctx, fee_receiver)
    }

    /// Move reserves (0 = all) to the fee receiver's ledger balance
    pub fn withdraw_fees(ctx: Context<WithdrawPairFees>, amount: u64) -> Result<()> {
        instructions::pair_admin::handler_withdraw_fees(ctx, amount)
    }

    /// Sweep reserves of several guarded pairs to their fee receivers
    ///
    /// Remaining accounts: (pair, pair cash, fee receiver balance) per pair.
    pub fn withdraw_fees_many<'info>(
        ctx: Context<'_, '_, 'info, 'info, WithdrawFeesMany<'info>>,
    ) -> Result<()> {
        instructions::pair_admin::handler_withdraw_fees_many(ctx)
    }

    /// Attach a registered reward distributor, default detaches
    pub fn set_reward_distributor(
        ctx: Context<SetPairRewardDistributor>,
        distributor: Pubkey,
    ) -> Result<()> {
        instructions::pair_admin::handler_set_reward_distributor(ctx, distributor)
    }

    // =========================================================================
    // Warp
    // =========================================================================

    /// Run vault and pair actions in order for the signer
    ///
    /// # Arguments
    /// * `actions` - Actions to run; a None amount takes the previous output
    pub fn warp<'info>(
        ctx: Context<'_, '_, 'info, 'info, Warp<'info>>,
        actions: Vec<WarpAction>,
    ) -> Result<()> {
        instructions::warp::handler_warp(ctx, actions)
    }
}
