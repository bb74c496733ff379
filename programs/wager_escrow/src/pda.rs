//! PDA derivation helpers for clients and programs integrating with the
//! wager escrow program.
//!
//! A bet is addressed by its title. Raw PDA seeds are capped at 32 bytes,
//! so the title is first reduced to its sha256 digest; any two calls with
//! the same title land on the same bet account, which is what makes the
//! title a uniqueness key.
//!
//! # Example
//!
//! ```ignore
//! use wager_escrow::pda;
//!
//! let (bet, _) = pda::derive_bet_pda("SOL above $500 by December?", &wager_escrow::ID);
//! let (vault, _) = pda::derive_vault_token_account_pda(&bet, &wager_escrow::ID);
//! let (wager, _) = pda::derive_wager_pda(&bet, &bettor, &wager_escrow::ID);
//! ```

use anchor_lang::prelude::*;
use solana_hash::Hash;
use solana_sha256_hasher::hashv;

/// Fixed 32-byte seed derived from a bet title
pub fn title_seed(title: &str) -> [u8; 32] {
    let digest: Hash = hashv(&[title.as_bytes()]);
    digest.to_bytes()
}

/// Derive the bet PDA address from its title
pub fn derive_bet_pda(title: &str, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"bet", &title_seed(title)], program_id)
}

/// Derive the vault authority PDA address
pub fn derive_vault_authority_pda(bet: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"vault", bet.as_ref()], program_id)
}

/// Derive the vault token account PDA address
pub fn derive_vault_token_account_pda(bet: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"vault_token_account", bet.as_ref()], program_id)
}

/// Derive the wager PDA address for one bettor on one bet
pub fn derive_wager_pda(bet: &Pubkey, bettor: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"wager", bet.as_ref(), bettor.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_title_derives_same_bet_address() {
        let (a, bump_a) = derive_bet_pda("SOL above $500 by December?", &crate::ID);
        let (b, bump_b) = derive_bet_pda("SOL above $500 by December?", &crate::ID);
        assert_eq!(a, b);
        assert_eq!(bump_a, bump_b);
    }

    #[test]
    fn distinct_titles_derive_distinct_bet_addresses() {
        let (a, _) = derive_bet_pda("SOL above $500 by December?", &crate::ID);
        let (b, _) = derive_bet_pda("SOL above $600 by December?", &crate::ID);
        assert_ne!(a, b);
    }

    #[test]
    fn titles_longer_than_a_raw_seed_still_derive() {
        // raw seeds max out at 32 bytes, the digest step lifts that cap
        let title = "a".repeat(crate::MAX_TITLE_LEN);
        assert_eq!(title_seed(&title).len(), 32);
        let (a, _) = derive_bet_pda(&title, &crate::ID);
        let (b, _) = derive_bet_pda(&title[..title.len() - 1], &crate::ID);
        assert_ne!(a, b);
    }

    #[test]
    fn wager_address_is_per_bettor() {
        let (bet, _) = derive_bet_pda("Will it rain tomorrow?", &crate::ID);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let (wager_alice, _) = derive_wager_pda(&bet, &alice, &crate::ID);
        let (wager_bob, _) = derive_wager_pda(&bet, &bob, &crate::ID);
        assert_ne!(wager_alice, wager_bob);
    }

    #[test]
    fn vault_accounts_are_per_bet() {
        let (bet_a, _) = derive_bet_pda("Bet A", &crate::ID);
        let (bet_b, _) = derive_bet_pda("Bet B", &crate::ID);
        assert_ne!(
            derive_vault_token_account_pda(&bet_a, &crate::ID).0,
            derive_vault_token_account_pda(&bet_b, &crate::ID).0,
        );
        assert_ne!(
            derive_vault_authority_pda(&bet_a, &crate::ID).0,
            derive_vault_authority_pda(&bet_b, &crate::ID).0,
        );
    }
}
