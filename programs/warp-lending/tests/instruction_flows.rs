//! Instruction flows run against the built program in LiteSVM
//!
//! Scenarios:
//! 1. Flash loan repaid with its fee raises total_underlying_deposit only
//! 2. Flash loan repaid without the fee reverts with FlashLoanNotRepaid
//! 3. A signed contract approval cannot be replayed
//! 4. Warp supplies the borrow asset on behalf of another user
//! 5. Warp to another user fails when their position is not passed
//!
//! Build BPF: anchor build (or cargo build-sbf)
//! Run: cargo test --test instruction_flows -- --nocapture
//!
//! Each scenario prints a note and returns when target/deploy/warp_lending.so
//! has not been built.

use solana_sdk_ids::ed25519_program;
use anchor_lang::{AccountDeserialize, AccountSerialize, InstructionData, Space, ToAccountMetas};
use litesvm::LiteSVM;
use solana_sdk::{
    account::Account,
    instruction::{AccountMeta, Instruction, InstructionError},
    program_option::COption,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
    sysvar,
    transaction::{Transaction, TransactionError},
};
use std::path::PathBuf;

use anchor_spl::token::spl_token;
use spl_token::state::{Account as TokenAccount, AccountState, Mint};

use warp_lending::constants::*;
use warp_lending::error::WarpError;
use warp_lending::instructions::warp::{PairAsset, WarpAction};
use warp_lending::signature::approval_message;
use warp_lending::state::{
    AssetTotals, InterestRateModel, PairConfig, Position, RiskConfig, ShareBalance, UserNonce,
};

const WAD: u128 = 1_000_000_000_000_000_000;
const START_BALANCE: u64 = 1_000_000_000;

fn program_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../target/deploy/warp_lending.so");
    path
}

fn make_mint_data(decimals: u8) -> Vec<u8> {
    let mut data = vec![0u8; Mint::LEN];
    let mint = Mint {
        mint_authority: COption::None,
        supply: 0,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    };
    Mint::pack(mint, &mut data).unwrap();
    data
}

fn make_token_account_data(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; TokenAccount::LEN];
    let account = TokenAccount {
        mint: *mint,
        owner: *owner,
        amount,
        state: AccountState::Initialized,
        ..TokenAccount::default()
    };
    TokenAccount::pack(account, &mut data).unwrap();
    data
}

/// One ed25519 entry with its pubkey, signature and message inline
fn ed25519_instruction(signer: &Keypair, message: &[u8]) -> Instruction {
    let pubkey_offset: u16 = 16;
    let signature_offset: u16 = pubkey_offset + 32;
    let message_offset: u16 = signature_offset + 64;
    let inline = u16::MAX;

    let mut data = vec![1u8, 0];
    for field in [
        signature_offset,
        inline,
        pubkey_offset,
        inline,
        message_offset,
        message.len() as u16,
        inline,
    ] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(signer.pubkey().as_ref());
    data.extend_from_slice(signer.sign_message(message).as_ref());
    data.extend_from_slice(message);

    Instruction {
        program_id: ed25519_program::ID,
        accounts: vec![],
        data,
    }
}

/// SPL token transfer, used as the flash loan callback
fn token_transfer_data(amount: u64) -> Vec<u8> {
    let mut data = vec![3u8];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

fn custom_error(error: WarpError) -> u32 {
    anchor_lang::error::ERROR_CODE_OFFSET + error as u32
}

fn pda(seeds: &[&[u8]]) -> Pubkey {
    Pubkey::find_program_address(seeds, &warp_lending::ID).0
}

struct WarpTestEnv {
    svm: LiteSVM,
    owner: Keypair,
    collateral_mint: Pubkey,
    borrow_mint: Pubkey,
}

impl WarpTestEnv {
    fn new() -> Option<Self> {
        let path = program_path();
        if !path.exists() {
            eprintln!("warp_lending.so not found at {:?}, skipping. Run: anchor build", path);
            return None;
        }

        let mut svm = LiteSVM::new();
        let program_bytes = std::fs::read(&path).expect("Failed to read program");
        svm.add_program(warp_lending::ID, &program_bytes);

        let owner = Keypair::new();
        svm.airdrop(&owner.pubkey(), 100_000_000_000).unwrap();

        let collateral_mint = Pubkey::new_unique();
        let borrow_mint = Pubkey::new_unique();
        for mint in [collateral_mint, borrow_mint] {
            svm.set_account(
                mint,
                Account {
                    lamports: 1_000_000_000,
                    data: make_mint_data(6),
                    owner: spl_token::ID,
                    executable: false,
                    rent_epoch: 0,
                },
            )
            .unwrap();
        }

        let mut env = WarpTestEnv {
            svm,
            owner,
            collateral_mint,
            borrow_mint,
        };
        env.init_vault();
        env.set_price(collateral_mint, 1_000_000);
        env.set_price(borrow_mint, 1_000_000);
        Some(env)
    }

    fn send(&mut self, instructions: &[Instruction], signers: &[&Keypair]) -> Result<(), TransactionError> {
        let payer = signers[0].pubkey();
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer),
            signers,
            self.svm.latest_blockhash(),
        );
        let result = self.svm.send_transaction(tx).map(|_| ()).map_err(|failed| failed.err);
        self.svm.expire_blockhash();
        result
    }

    fn user(&mut self) -> Keypair {
        let user = Keypair::new();
        self.svm.airdrop(&user.pubkey(), 10_000_000_000).unwrap();
        user
    }

    fn create_token_account(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Pubkey {
        let address = Pubkey::new_unique();
        self.svm
            .set_account(
                address,
                Account {
                    lamports: 1_000_000_000,
                    data: make_token_account_data(mint, owner, amount),
                    owner: spl_token::ID,
                    executable: false,
                    rent_epoch: 0,
                },
            )
            .unwrap();
        address
    }

    fn token_amount(&self, address: &Pubkey) -> u64 {
        let account = self.svm.get_account(address).unwrap();
        TokenAccount::unpack(&account.data).unwrap().amount
    }

    fn read<T: AccountDeserialize>(&self, address: &Pubkey) -> T {
        let account = self.svm.get_account(address).unwrap();
        T::try_deserialize(&mut account.data.as_slice()).unwrap()
    }

    /// Writes a program account directly, as if created by an earlier instruction
    fn seed_account<T: AccountSerialize>(&mut self, address: Pubkey, value: &T, space: usize) {
        let mut data = Vec::with_capacity(space);
        value.try_serialize(&mut data).unwrap();
        data.resize(space, 0);
        let lamports = self.svm.minimum_balance_for_rent_exemption(space);
        self.svm
            .set_account(
                address,
                Account {
                    lamports,
                    data,
                    owner: warp_lending::ID,
                    executable: false,
                    rent_epoch: 0,
                },
            )
            .unwrap();
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    fn vault_config(&self) -> Pubkey {
        pda(&[VAULT_SEED])
    }

    fn pair(&self) -> Pubkey {
        pda(&[PAIR_SEED, self.collateral_mint.as_ref(), self.borrow_mint.as_ref()])
    }

    fn share_balance(&self, mint: &Pubkey, owner: &Pubkey) -> Pubkey {
        pda(&[SHARE_SEED, mint.as_ref(), owner.as_ref()])
    }

    fn position(&self, owner: &Pubkey) -> Pubkey {
        pda(&[POSITION_SEED, self.pair().as_ref(), owner.as_ref()])
    }

    // =========================================================================
    // Setup Instructions
    // =========================================================================

    fn init_vault(&mut self) {
        let owner = self.owner.insecure_clone();
        let ix = Instruction {
            program_id: warp_lending::ID,
            accounts: warp_lending::accounts::InitializeVault {
                payer: owner.pubkey(),
                vault_config: self.vault_config(),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: warp_lending::instruction::InitializeVault {
                owner: owner.pubkey(),
                flash_loan_rate: None,
            }
            .data(),
        };
        self.send(&[ix], &[&owner]).expect("initialize_vault failed");
    }

    fn set_price(&mut self, mint: Pubkey, price: u64) {
        let owner = self.owner.insecure_clone();
        let ix = Instruction {
            program_id: warp_lending::ID,
            accounts: warp_lending::accounts::SetPrice {
                owner: owner.pubkey(),
                vault_config: self.vault_config(),
                mint,
                oracle: pda(&[ORACLE_SEED, mint.as_ref()]),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: warp_lending::instruction::SetPrice { price }.data(),
        };
        self.send(&[ix], &[&owner]).expect("set_price failed");
    }

    fn allow_contract(&mut self, contract: Pubkey) {
        let owner = self.owner.insecure_clone();
        let ix = Instruction {
            program_id: warp_lending::ID,
            accounts: warp_lending::accounts::SetAllowedContract {
                owner: owner.pubkey(),
                vault_config: self.vault_config(),
                allowed_contract: pda(&[ALLOWED_SEED, contract.as_ref()]),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: warp_lending::instruction::AllowContract {
                contract,
                allowed: true,
            }
            .data(),
        };
        self.send(&[ix], &[&owner]).expect("allow_contract failed");
    }

    fn init_pair(&mut self) {
        let owner = self.owner.insecure_clone();
        let pair = self.pair();
        let config = PairConfig {
            guardian: owner.pubkey(),
            fee_receiver: owner.pubkey(),
            collateral_factor: WAD * 3 / 2,
            liquidation_fee: WAD / 20,
            liquidation_fee_share: WAD / 2,
            reserve_factor: WAD / 10,
            initial_exchange_rate: WAD,
            interest_rate_model: InterestRateModel {
                base_rate_per_slot: 0,
                multiplier_per_slot: 0,
                jump_multiplier_per_slot: 0,
                kink: WAD * 8 / 10,
            },
            risk_config: RiskConfig {
                deposit_collateral_limit: 0,
                deposit_borrow_limit: 0,
                total_pair_debt_limit: 0,
            },
        };
        let ix = Instruction {
            program_id: warp_lending::ID,
            accounts: warp_lending::accounts::InitializePair {
                owner: owner.pubkey(),
                vault_config: self.vault_config(),
                collateral_mint: self.collateral_mint,
                borrow_mint: self.borrow_mint,
                pair,
                pair_collateral: self.share_balance(&self.collateral_mint, &pair),
                pair_borrow: self.share_balance(&self.borrow_mint, &pair),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: warp_lending::instruction::InitializePair { config }.data(),
        };
        self.send(&[ix], &[&owner]).expect("initialize_pair failed");
    }

    fn deposit_ix(&self, depositor: &Pubkey, mint: Pubkey, source: Pubkey, amount: u64) -> Instruction {
        Instruction {
            program_id: warp_lending::ID,
            accounts: warp_lending::accounts::DepositToVault {
                depositor: *depositor,
                vault_config: self.vault_config(),
                mint,
                asset_totals: pda(&[ASSET_SEED, mint.as_ref()]),
                reserve: pda(&[RESERVE_SEED, mint.as_ref()]),
                to_balance: self.share_balance(&mint, depositor),
                source,
                system_program: system_program::ID,
                token_program: spl_token::ID,
            }
            .to_account_metas(None),
            data: warp_lending::instruction::Deposit {
                amount,
                to: *depositor,
            }
            .data(),
        }
    }

    fn approve_contract_ix(&self, relayer: &Pubkey, owner: &Pubkey, contract: Pubkey) -> Instruction {
        Instruction {
            program_id: warp_lending::ID,
            accounts: warp_lending::accounts::ApproveContract {
                payer: *relayer,
                allowed_contract: pda(&[ALLOWED_SEED, contract.as_ref()]),
                authorization: pda(&[AUTHORIZATION_SEED, owner.as_ref(), contract.as_ref()]),
                user_nonce: pda(&[NONCE_SEED, owner.as_ref()]),
                instructions: sysvar::instructions::ID,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: warp_lending::instruction::ApproveContract {
                owner: *owner,
                contract,
                approved: true,
            }
            .data(),
        }
    }

    /// Flash loan of the borrow asset whose callback transfers `repay` back
    fn flash_loan_ix(&self, user: &Pubkey, receiver: Pubkey, amount: u64, repay: u64) -> Instruction {
        let mint = self.borrow_mint;
        let reserve = pda(&[RESERVE_SEED, mint.as_ref()]);
        let mut accounts = warp_lending::accounts::ExecuteFlashLoan {
            initiator: *user,
            vault_config: self.vault_config(),
            mint,
            asset_totals: pda(&[ASSET_SEED, mint.as_ref()]),
            reserve,
            receiver,
            borrower_program: spl_token::ID,
            token_program: spl_token::ID,
        }
        .to_account_metas(None);
        accounts.extend([
            AccountMeta::new(receiver, false),
            AccountMeta::new(reserve, false),
            AccountMeta::new_readonly(*user, true),
        ]);

        Instruction {
            program_id: warp_lending::ID,
            accounts,
            data: warp_lending::instruction::FlashLoan {
                amount,
                data: token_transfer_data(repay),
            }
            .data(),
        }
    }

    fn warp_ix(
        &self,
        user: &Pubkey,
        borrow_token: Pubkey,
        actions: Vec<WarpAction>,
        remaining: Vec<AccountMeta>,
    ) -> Instruction {
        let pair = self.pair();
        let collateral = self.collateral_mint;
        let borrow = self.borrow_mint;
        let mut accounts = warp_lending::accounts::Warp {
            user: *user,
            vault_config: self.vault_config(),
            pair,
            position: self.position(user),
            collateral_mint: collateral,
            borrow_mint: borrow,
            collateral_totals: pda(&[ASSET_SEED, collateral.as_ref()]),
            borrow_totals: pda(&[ASSET_SEED, borrow.as_ref()]),
            collateral_reserve: pda(&[RESERVE_SEED, collateral.as_ref()]),
            borrow_reserve: pda(&[RESERVE_SEED, borrow.as_ref()]),
            user_collateral: self.share_balance(&collateral, user),
            user_borrow: self.share_balance(&borrow, user),
            pair_collateral: self.share_balance(&collateral, &pair),
            pair_borrow: self.share_balance(&borrow, &pair),
            user_collateral_token: None,
            user_borrow_token: Some(borrow_token),
            allowed_contract: pda(&[ALLOWED_SEED, pair.as_ref()]),
            authorization: pda(&[AUTHORIZATION_SEED, user.as_ref(), pair.as_ref()]),
            user_nonce: pda(&[NONCE_SEED, user.as_ref()]),
            instructions: sysvar::instructions::ID,
            collateral_oracle: pda(&[ORACLE_SEED, collateral.as_ref()]),
            borrow_oracle: pda(&[ORACLE_SEED, borrow.as_ref()]),
            token_program: spl_token::ID,
            system_program: system_program::ID,
        }
        .to_account_metas(None);
        accounts.extend(remaining);

        Instruction {
            program_id: warp_lending::ID,
            accounts,
            data: warp_lending::instruction::Warp { actions }.data(),
        }
    }

    /// A position for `owner` as left behind by an earlier pair action
    fn seed_position(&mut self, owner: &Pubkey) -> Pubkey {
        let pair = self.pair();
        let address = self.position(owner);
        let bump = Pubkey::find_program_address(
            &[POSITION_SEED, pair.as_ref(), owner.as_ref()],
            &warp_lending::ID,
        )
        .1;
        let position = Position {
            pair,
            owner: *owner,
            collateral: 0,
            borrow_shares: 0,
            debt_principal: 0,
            debt_index: WAD,
            bump,
        };
        self.seed_account(address, &position, 8 + Position::INIT_SPACE);
        address
    }
}

fn assert_custom(result: Result<(), TransactionError>, index: u8, error: WarpError) {
    match result {
        Err(TransactionError::InstructionError(at, InstructionError::Custom(code))) => {
            assert_eq!(at, index, "failed at the wrong instruction");
            assert_eq!(code, custom_error(error));
        }
        other => panic!("expected custom error {}, got {:?}", custom_error(error), other),
    }
}

// =============================================================================
// Flash Loans
// =============================================================================

#[test]
fn flash_loan_repaid_with_fee_raises_underlying_only() {
    let Some(mut env) = WarpTestEnv::new() else { return };
    let lender = env.user();
    let borrower = env.user();
    let mint = env.borrow_mint;

    let lender_token = env.create_token_account(&mint, &lender.pubkey(), START_BALANCE);
    let ix = env.deposit_ix(&lender.pubkey(), mint, lender_token, 100_000);
    env.send(&[ix], &[&lender]).expect("deposit failed");

    let totals_address = pda(&[ASSET_SEED, mint.as_ref()]);
    let before: AssetTotals = env.read(&totals_address);
    assert_eq!(before.total_underlying_deposit, 100_000);

    // Default rate is 5%: 10_000 borrowed costs 500
    let receiver = env.create_token_account(&mint, &borrower.pubkey(), 500);
    let ix = env.flash_loan_ix(&borrower.pubkey(), receiver, 10_000, 10_500);
    env.send(&[ix], &[&borrower]).expect("flash loan failed");

    let after: AssetTotals = env.read(&totals_address);
    assert_eq!(after.total_underlying_deposit, 100_500);
    assert_eq!(after.total_shares_minted, before.total_shares_minted);
    assert!(!after.flash_loan_active);
    assert_eq!(env.token_amount(&receiver), 0);
    assert_eq!(env.token_amount(&pda(&[RESERVE_SEED, mint.as_ref()])), 100_500);
}

#[test]
fn flash_loan_without_fee_reverts() {
    let Some(mut env) = WarpTestEnv::new() else { return };
    let lender = env.user();
    let borrower = env.user();
    let mint = env.borrow_mint;

    let lender_token = env.create_token_account(&mint, &lender.pubkey(), START_BALANCE);
    let ix = env.deposit_ix(&lender.pubkey(), mint, lender_token, 100_000);
    env.send(&[ix], &[&lender]).expect("deposit failed");

    let receiver = env.create_token_account(&mint, &borrower.pubkey(), 500);
    let ix = env.flash_loan_ix(&borrower.pubkey(), receiver, 10_000, 10_000);
    assert_custom(env.send(&[ix], &[&borrower]), 0, WarpError::FlashLoanNotRepaid);

    // Reverted: nothing moved and the asset is not left locked
    let totals: AssetTotals = env.read(&pda(&[ASSET_SEED, mint.as_ref()]));
    assert_eq!(totals.total_underlying_deposit, 100_000);
    assert!(!totals.flash_loan_active);
    assert_eq!(env.token_amount(&receiver), 500);
}

// =============================================================================
// Signed Approvals
// =============================================================================

#[test]
fn signed_approval_cannot_be_replayed() {
    let Some(mut env) = WarpTestEnv::new() else { return };
    let holder = env.user();
    let relayer = env.user();
    let contract = Pubkey::new_unique();
    env.allow_contract(contract);

    let first = approval_message(&holder.pubkey(), &contract, true, 0);
    let ixs = [
        ed25519_instruction(&holder, &first),
        env.approve_contract_ix(&relayer.pubkey(), &holder.pubkey(), contract),
    ];
    env.send(&ixs, &[&relayer]).expect("approval failed");

    let nonce: UserNonce = env.read(&pda(&[NONCE_SEED, holder.pubkey().as_ref()]));
    assert_eq!(nonce.nonce, 1);

    // Same signed bytes again: the nonce has moved on
    assert_custom(env.send(&ixs, &[&relayer]), 1, WarpError::InvalidSignature);

    let second = approval_message(&holder.pubkey(), &contract, true, 1);
    let ixs = [
        ed25519_instruction(&holder, &second),
        env.approve_contract_ix(&relayer.pubkey(), &holder.pubkey(), contract),
    ];
    env.send(&ixs, &[&relayer]).expect("fresh approval failed");

    let nonce: UserNonce = env.read(&pda(&[NONCE_SEED, holder.pubkey().as_ref()]));
    assert_eq!(nonce.nonce, 2);
}

// =============================================================================
// Warp
// =============================================================================

#[test]
fn warp_supplies_for_another_user() {
    let Some(mut env) = WarpTestEnv::new() else { return };
    env.init_pair();
    let pair = env.pair();
    env.allow_contract(pair);

    let user = env.user();
    let friend = Pubkey::new_unique();
    let friend_position = env.seed_position(&friend);
    let mint = env.borrow_mint;
    let borrow_token = env.create_token_account(&mint, &user.pubkey(), START_BALANCE);

    let message = approval_message(&user.pubkey(), &pair, true, 0);
    let actions = vec![
        WarpAction::VaultApproveContract { approved: true },
        WarpAction::VaultDeposit {
            asset: PairAsset::Borrow,
            amount: Some(1_000),
            to: user.pubkey(),
        },
        WarpAction::DepositBorrowAsset {
            amount: None,
            to: friend,
        },
    ];
    let ixs = [
        ed25519_instruction(&user, &message),
        env.warp_ix(
            &user.pubkey(),
            borrow_token,
            actions,
            vec![AccountMeta::new(friend_position, false)],
        ),
    ];
    env.send(&ixs, &[&user]).expect("warp failed");

    let friend_state: Position = env.read(&friend_position);
    assert_eq!(friend_state.borrow_shares, 1_000);

    let own: Position = env.read(&env.position(&user.pubkey()));
    assert_eq!(own.borrow_shares, 0);

    // The signer paid: their shares moved into the pair's cash
    let user_shares: ShareBalance = env.read(&env.share_balance(&mint, &user.pubkey()));
    assert_eq!(user_shares.shares, 0);
    let cash: ShareBalance = env.read(&env.share_balance(&mint, &pair));
    assert_eq!(cash.shares, 1_000);
    assert_eq!(env.token_amount(&borrow_token), START_BALANCE - 1_000);
}

#[test]
fn warp_to_another_user_needs_their_position() {
    let Some(mut env) = WarpTestEnv::new() else { return };
    env.init_pair();
    let pair = env.pair();
    env.allow_contract(pair);

    let user = env.user();
    let friend = Pubkey::new_unique();
    let mint = env.borrow_mint;
    let borrow_token = env.create_token_account(&mint, &user.pubkey(), START_BALANCE);

    let message = approval_message(&user.pubkey(), &pair, true, 0);
    let actions = vec![
        WarpAction::VaultApproveContract { approved: true },
        WarpAction::VaultDeposit {
            asset: PairAsset::Borrow,
            amount: Some(1_000),
            to: user.pubkey(),
        },
        WarpAction::DepositBorrowAsset {
            amount: None,
            to: friend,
        },
    ];
    let ixs = [
        ed25519_instruction(&user, &message),
        env.warp_ix(&user.pubkey(), borrow_token, actions, vec![]),
    ];
    assert_custom(env.send(&ixs, &[&user]), 1, WarpError::RecipientBalanceMissing);

    // The whole batch reverted
    assert!(env.svm.get_account(&env.position(&user.pubkey())).is_none());
    assert_eq!(env.token_amount(&borrow_token), START_BALANCE);
}
