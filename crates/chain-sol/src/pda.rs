//! Program-derived address search.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id ||
//! "ProgramDerivedAddress")` for the highest bump in `255..=0` whose digest is
//! NOT a valid Ed25519 point. No private key exists for such an address.

use sha2::{Digest, Sha256};

use crate::address::{is_on_curve, Pubkey};
use crate::error::SolError;

/// Maximum byte length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Find the canonical program-derived address and its bump seed.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    check_seeds(seeds, 1)?;

    for bump in (0u8..=255).rev() {
        if let Some(address) = derive(seeds, Some(bump), program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::InvalidSeeds(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Create a program address from seeds that already include the bump.
///
/// Fails if the resulting digest lies on the Ed25519 curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, SolError> {
    check_seeds(seeds, 0)?;

    derive(seeds, None, program_id).ok_or_else(|| {
        SolError::InvalidSeeds("derived address falls on the ed25519 curve".into())
    })
}

fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), SolError> {
    if seeds.len() + reserved > MAX_SEEDS {
        return Err(SolError::InvalidSeeds(format!(
            "at most {} seeds allowed, got {}",
            MAX_SEEDS - reserved,
            seeds.len()
        )));
    }

    if let Some((i, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidSeeds(format!(
            "seed {i} is {} bytes, max {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    Ok(())
}

fn derive(seeds: &[&[u8]], bump: Option<u8>, program_id: &Pubkey) -> Option<Pubkey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(Pubkey::new_from_array(hash))
}
