use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

use crate::app::AppError;

const SALT_SIZE: usize = 16;

/// Well-formed hash with the default parameters that no password matches.
/// Verified against when the account is unknown.
pub const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZGF6emxlLXVua25vd24tdQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Hashes `password` with Argon2id and a random salt, returning the PHC string to store.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| AppError::Storage(format!("salt encoding: {}", err)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Storage(format!("password hashing: {}", err)))
}

/// Checks `password` against a stored PHC string. A malformed hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("stored password hash could not be parsed: {}", err);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("Correct horse battery staple", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("same password", &first));
        assert!(verify_password("same password", &second));
    }

    #[test]
    fn test_unknown_user_hash_costs_as_much_as_a_real_one() {
        let fallback = PasswordHash::new(UNKNOWN_USER_HASH).unwrap();
        let real_hash = hash_password("cobol-forever").unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();

        pretty_assertions::assert_eq!(fallback.algorithm, real.algorithm);
        pretty_assertions::assert_eq!(fallback.version, real.version);
        pretty_assertions::assert_eq!(fallback.params.to_string(), real.params.to_string());
        pretty_assertions::assert_eq!(
            fallback.hash.map(|output| output.len()),
            real.hash.map(|output| output.len())
        );
        assert!(!verify_password("cobol-forever", UNKNOWN_USER_HASH));
        assert!(!verify_password("", UNKNOWN_USER_HASH));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }
}
