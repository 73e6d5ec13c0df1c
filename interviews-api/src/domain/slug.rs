//! URL slugs for interviews.
//!
//! A slug is the slugified title followed by a random base-36 suffix of
//! fixed width, e.g. `hello-world-0k3x9a`. The suffix only makes collisions
//! unlikely; uniqueness is enforced by the interview store at insert time.

use rand::Rng;

/// Width of the random suffix.
pub const SUFFIX_WIDTH: usize = 6;

/// Exclusive upper bound of the suffix value (36^6).
const SUFFIX_SPACE: u64 = 36u64.pow(SUFFIX_WIDTH as u32);

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a slug for `title` using the thread-local RNG.
pub fn generate_slug(title: &str) -> String {
    generate_slug_with(title, &mut rand::thread_rng())
}

/// Generates a slug for `title` drawing the suffix from `rng`.
pub fn generate_slug_with<R: Rng + ?Sized>(title: &str, rng: &mut R) -> String {
    let suffix = to_base36(rng.gen_range(0..SUFFIX_SPACE));
    let base = ::slug::slugify(title);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// Renders `value` in lowercase base 36, zero padded to [`SUFFIX_WIDTH`].
fn to_base36(mut value: u64) -> String {
    let mut digits = [b'0'; SUFFIX_WIDTH];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36_DIGITS[(value % 36) as usize];
        value /= 36;
    }
    // digits only ever holds ASCII from BASE36_DIGITS
    digits.iter().map(|&b| b as char).collect()
}
