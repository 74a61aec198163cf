// =============================================================================
// Signed message verification
// =============================================================================
// Owners approve contracts and delegate borrowing by signing a message off
// chain. The transaction carries an ed25519 native-program instruction right
// before ours; the runtime has already verified its signatures, so we only
// check that one of them is the expected owner over the expected bytes.
//
// ed25519 instruction data:
//   [0]      num_signatures
//   [1]      padding
//   [2..]    num_signatures * 14-byte offset entries:
//            signature_offset, signature_instruction_index,
//            public_key_offset, public_key_instruction_index,
//            message_data_offset, message_data_size, message_instruction_index
// Index 0xFFFF means "inside this same instruction".
// =============================================================================

use anchor_lang::prelude::*;
use solana_sdk_ids::ed25519_program;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

use crate::constants::{APPROVAL_DOMAIN, DELEGATION_DOMAIN};
use crate::error::WarpError;

const OFFSETS_START: usize = 2;
const OFFSETS_LEN: usize = 14;
const SAME_INSTRUCTION: u16 = u16::MAX;

/// Bytes an owner signs to approve or revoke a contract
pub fn approval_message(owner: &Pubkey, contract: &Pubkey, approved: bool, nonce: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(APPROVAL_DOMAIN.len() + 32 * 3 + 1 + 8);
    message.extend_from_slice(APPROVAL_DOMAIN);
    message.extend_from_slice(crate::ID.as_ref());
    message.extend_from_slice(owner.as_ref());
    message.extend_from_slice(contract.as_ref());
    message.push(approved as u8);
    message.extend_from_slice(&nonce.to_le_bytes());
    message
}

/// Bytes an owner signs to let `delegate` borrow `amount` on their behalf
pub fn delegation_message(
    pair: &Pubkey,
    owner: &Pubkey,
    delegate: &Pubkey,
    amount: u64,
    nonce: u64,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(DELEGATION_DOMAIN.len() + 32 * 4 + 8 + 8);
    message.extend_from_slice(DELEGATION_DOMAIN);
    message.extend_from_slice(crate::ID.as_ref());
    message.extend_from_slice(pair.as_ref());
    message.extend_from_slice(owner.as_ref());
    message.extend_from_slice(delegate.as_ref());
    message.extend_from_slice(&amount.to_le_bytes());
    message.extend_from_slice(&nonce.to_le_bytes());
    message
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn slice_at(data: &[u8], offset: u16, len: usize) -> Option<&[u8]> {
    let start = offset as usize;
    data.get(start..start.checked_add(len)?)
}

/// True when one signature entry of `data` is `signer` over exactly `message`
pub fn contains_signed_message(data: &[u8], signer: &Pubkey, message: &[u8]) -> bool {
    let count = match data.first() {
        Some(count) => *count as usize,
        None => return false,
    };

    (0..count).any(|i| {
        let base = OFFSETS_START + i * OFFSETS_LEN;
        let entry = (|| {
            let signature_ix = read_u16(data, base + 2)?;
            let pubkey_offset = read_u16(data, base + 4)?;
            let pubkey_ix = read_u16(data, base + 6)?;
            let message_offset = read_u16(data, base + 8)?;
            let message_size = read_u16(data, base + 10)?;
            let message_ix = read_u16(data, base + 12)?;

            if signature_ix != SAME_INSTRUCTION
                || pubkey_ix != SAME_INSTRUCTION
                || message_ix != SAME_INSTRUCTION
            {
                return None;
            }

            let pubkey = slice_at(data, pubkey_offset, 32)?;
            let signed = slice_at(data, message_offset, message_size as usize)?;
            Some(pubkey == signer.as_ref() && signed == message)
        })();
        entry.unwrap_or(false)
    })
}

/// Requires the instruction before the current one to be an ed25519
/// verification of `message` by `signer`
pub fn verify_signed_message(
    instructions_sysvar: &AccountInfo,
    signer: &Pubkey,
    message: &[u8],
) -> Result<()> {
    let current = load_current_index_checked(instructions_sysvar)?;
    require!(current > 0, WarpError::InvalidSignature);

    let previous = load_instruction_at_checked(current as usize - 1, instructions_sysvar)?;
    require_keys_eq!(
        previous.program_id,
        ed25519_program::ID,
        WarpError::InvalidSignature
    );
    require!(
        contains_signed_message(&previous.data, signer, message),
        WarpError::InvalidSignature
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays out one ed25519 entry the way the native program expects
    fn ed25519_data(signer: &Pubkey, message: &[u8], index: u16) -> Vec<u8> {
        let header = OFFSETS_START + OFFSETS_LEN;
        let pubkey_offset = header as u16;
        let signature_offset = pubkey_offset + 32;
        let message_offset = signature_offset + 64;

        let mut data = vec![1u8, 0];
        for field in [
            signature_offset,
            index,
            pubkey_offset,
            index,
            message_offset,
            message.len() as u16,
            index,
        ] {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.extend_from_slice(signer.as_ref());
        data.extend_from_slice(&[7u8; 64]);
        data.extend_from_slice(message);
        data
    }

    #[test]
    fn matching_signer_and_message_is_accepted() {
        let owner = Pubkey::new_unique();
        let contract = Pubkey::new_unique();
        let message = approval_message(&owner, &contract, true, 0);
        let data = ed25519_data(&owner, &message, SAME_INSTRUCTION);

        assert!(contains_signed_message(&data, &owner, &message));
        assert!(!contains_signed_message(&data, &Pubkey::new_unique(), &message));
    }

    #[test]
    fn stale_nonce_does_not_match() {
        let owner = Pubkey::new_unique();
        let contract = Pubkey::new_unique();
        let signed = approval_message(&owner, &contract, true, 0);
        let data = ed25519_data(&owner, &signed, SAME_INSTRUCTION);

        let expected_now = approval_message(&owner, &contract, true, 1);
        assert!(!contains_signed_message(&data, &owner, &expected_now));
    }

    #[test]
    fn data_from_other_instructions_is_ignored() {
        let owner = Pubkey::new_unique();
        let message = delegation_message(&Pubkey::new_unique(), &owner, &Pubkey::new_unique(), 50, 3);
        let data = ed25519_data(&owner, &message, 0);

        assert!(!contains_signed_message(&data, &owner, &message));
    }

    #[test]
    fn truncated_data_is_rejected() {
        let owner = Pubkey::new_unique();
        let message = approval_message(&owner, &Pubkey::new_unique(), false, 9);
        let data = ed25519_data(&owner, &message, SAME_INSTRUCTION);

        assert!(!contains_signed_message(&data[..data.len() - 1], &owner, &message));
        assert!(!contains_signed_message(&[], &owner, &message));
    }

    #[test]
    fn approve_and_revoke_sign_different_bytes() {
        let owner = Pubkey::new_unique();
        let contract = Pubkey::new_unique();
        assert_ne!(
            approval_message(&owner, &contract, true, 0),
            approval_message(&owner, &contract, false, 0)
        );
    }
}
