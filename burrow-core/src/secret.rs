//! Credential generation.
//!
//! Secrets end up verbatim in compose descriptors and `.env` files, so the
//! alphabet excludes `$` (compose variable interpolation) along with quotes
//! and backslashes that would need escaping in those formats.

use rand::rngs::OsRng;
use rand::RngCore;

/// Characters safe to embed in rendered configuration artifacts.
const ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#%^&*_-+=";

/// Alphabet for tenant identifiers (lowercase, DNS-label friendly).
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a cryptographically secure random secret of `length` characters.
///
/// Draws `length` bytes from the OS CSPRNG and maps each modulo the alphabet
/// size. `OsRng` aborts the process if the randomness source fails, which is
/// the intended behavior: provisioning must never continue with weak secrets.
pub fn generate(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char).collect()
}

/// Generate a fresh tenant identifier in the form `ten_xxxxxxxx`.
pub fn tenant_id() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    let suffix: String =
        bytes.iter().map(|b| ID_ALPHABET[*b as usize % ID_ALPHABET.len()] as char).collect();
    format!("ten_{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length() {
        assert_eq!(generate(16).len(), 16);
        assert_eq!(generate(20).len(), 20);
        assert_eq!(generate(0).len(), 0);
    }

    #[test]
    fn test_generate_excludes_unsafe_characters() {
        let secret = generate(4096);
        assert!(!secret.contains('$'));
        assert!(!secret.contains('"'));
        assert!(!secret.contains('\''));
        assert!(!secret.contains('\\'));
        assert!(secret.chars().all(|c| ALPHABET.contains(&(c as u8))));
    }

    #[test]
    fn test_tenant_id_shape() {
        let id = tenant_id();
        assert!(id.starts_with("ten_"));
        assert_eq!(id.len(), 12);
        assert!(id[4..].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }
}
