//! Credential hashing traits.
//!
//! Defined in memberlink-core so the account service can hash passwords and
//! session tokens without coupling to a specific algorithm. The argon2 and
//! SHA-256 adapters live in memberlink-infra.

/// Slow, salted password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing hash string.
    fn hash_password(&self, password: &str) -> Result<String, String>;

    /// Check a plaintext password against a stored hash. Malformed hashes
    /// never verify.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Opaque bearer token issuing.
pub trait TokenIssuer: Send + Sync {
    /// A fresh random token handed to the client once.
    fn generate_token(&self) -> String;

    /// Deterministic hash under which the token is stored.
    fn hash_token(&self, token: &str) -> String;
}
