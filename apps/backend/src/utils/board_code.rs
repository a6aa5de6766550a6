//! Board code generation.
//!
//! Codes are short uppercase strings meant to be read aloud or typed into
//! a join form. Generation is best-effort random; uniqueness is enforced
//! by the boards table, and callers retry on collision.

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a shareable board code of the given length.
///
/// Characters are drawn uniformly from the uppercase ASCII alphabet using
/// the OS's cryptographically secure RNG.
pub fn generate_board_code(length: usize) -> String {
    let mut rng = OsRng;
    let dist = Uniform::from(0..ALPHABET.len());

    let mut s = String::with_capacity(length);
    for _ in 0..length {
        s.push(ALPHABET[dist.sample(&mut rng)] as char);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_board_code(6).len(), 6);
        assert_eq!(generate_board_code(10).len(), 10);
    }

    #[test]
    fn generates_uppercase_ascii_only() {
        let code = generate_board_code(64);
        assert!(code.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn consecutive_codes_differ() {
        // 26^12 outcomes; a collision here means the RNG is broken
        let code1 = generate_board_code(12);
        let code2 = generate_board_code(12);
        assert_ne!(code1, code2);
    }
}
