//! Compliant password generation.

use rand::seq::{IndexedRandom, SliceRandom};

use shipdesk_core::config::PasswordPolicy;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

/// Generates a random password of `length` satisfying `policy`.
///
/// One character is seeded from each required class, the remainder is
/// drawn from the union alphabet, and the result is uniformly shuffled so
/// the required characters are not predictably front-loaded.
pub(super) fn generate(policy: &PasswordPolicy, length: usize) -> String {
    let mut pools: Vec<&[u8]> = Vec::with_capacity(4);
    if policy.require_uppercase {
        pools.push(UPPERCASE);
    }
    if policy.require_lowercase {
        pools.push(LOWERCASE);
    }
    if policy.require_numbers {
        pools.push(DIGITS);
    }
    if policy.require_special_chars {
        pools.push(SPECIAL);
    }
    if pools.is_empty() {
        pools.push(LOWERCASE);
        pools.push(DIGITS);
    }
    let union: Vec<u8> = pools.concat();

    let mut rng = rand::rng();
    let mut chars: Vec<u8> = Vec::with_capacity(length);
    for pool in pools.iter().take(length) {
        chars.push(*pool.choose(&mut rng).expect("pool is non-empty"));
    }
    while chars.len() < length {
        chars.push(*union.choose(&mut rng).expect("union is non-empty"));
    }
    chars.shuffle(&mut rng);

    String::from_utf8(chars).expect("alphabets are ASCII")
}
