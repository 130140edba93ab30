//! Session tokens.
//!
//! Tokens are 32 random bytes from the OS CSPRNG, hex-encoded. Only the
//! SHA-256 digest of a token is persisted, so a leaked sessions table cannot
//! be replayed.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use memberlink_core::service::credentials::TokenIssuer;

/// Random bearer tokens hashed with SHA-256.
#[derive(Default)]
pub struct Sha256TokenIssuer;

impl Sha256TokenIssuer {
    pub fn new() -> Self {
        Self
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl TokenIssuer for Sha256TokenIssuer {
    fn generate_token(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        to_hex(&bytes)
    }

    fn hash_token(&self, token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let issuer = Sha256TokenIssuer::new();
        let token = issuer.generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, issuer.generate_token());
    }

    #[test]
    fn test_hash_token_known_value() {
        let issuer = Sha256TokenIssuer::new();
        assert_eq!(
            issuer.hash_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(issuer.hash_token("abc"), issuer.hash_token("abc"));
    }
}
