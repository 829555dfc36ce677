use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Plaintext stored for users created without a password.
pub const DEFAULT_PASSWORD: &str = "password";

/// One-way argon2 hash in PHC string format.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use argon2::{PasswordHash, PasswordVerifier};

    use super::*;

    fn verifies(plain: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).expect("valid PHC string");
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn hash_verifies_against_plaintext() {
        let hash = hash_password("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verifies("Secur3P@ssw0rd!", &hash));
        assert!(!verifies("wrong-password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password(DEFAULT_PASSWORD).unwrap();
        let b = hash_password(DEFAULT_PASSWORD).unwrap();
        assert_ne!(a, b);
        assert!(!a.contains(DEFAULT_PASSWORD));
    }
}
