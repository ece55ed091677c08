//! Random password generation.

use rand::seq::SliceRandom;
use rand::Rng;

/// Length of generated passwords.
pub const PASSWORD_LENGTH: usize = 12;

/// How many passwords `generate` prints when no count is given.
pub const DEFAULT_BATCH: usize = 10;

/// Largest count `generate` accepts.
pub const MAX_BATCH: usize = 1000;

const SYMBOLS: &[u8] = b"*+,-.";

/// Generate one password.
///
/// Every ten characters contain a digit, a symbol and an uppercase letter;
/// the rest are lowercase. The characters are shuffled afterwards.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut buf: Vec<u8> = (0..PASSWORD_LENGTH)
        .map(|i| match i % 10 {
            0 => rng.gen_range(b'0'..=b'9'),
            1 => SYMBOLS[rng.gen_range(0..SYMBOLS.len())],
            2 => rng.gen_range(b'A'..=b'Z'),
            _ => rng.gen_range(b'a'..=b'z'),
        })
        .collect();
    buf.shuffle(rng);

    buf.into_iter().map(char::from).collect()
}

/// Generate `count` passwords.
pub fn generate_batch<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    (0..count).map(|_| generate_password(rng)).collect()
}
