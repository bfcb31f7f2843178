//! Password hashing and verification with bcrypt.

use crate::config;

pub const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt silently truncates beyond 72 bytes; reject instead
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("password cannot be longer than {MAX_PASSWORD_BYTES} bytes")]
    TooLong,
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password(password)?;
    Ok(bcrypt::hash(password, config::config().security.bcrypt_cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_hash(password: &str) -> String {
        validate_password(password).unwrap();
        // Min cost keeps the test suite fast (bcrypt's MIN_COST is 4)
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn hash_and_verify() {
        let hash = quick_hash("correct horse battery");
        assert_ne!(hash, "correct horse battery");
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password!", &hash).unwrap());
    }

    #[test]
    fn short_passwords_rejected() {
        assert!(matches!(validate_password("short"), Err(PasswordError::TooShort)));
    }

    #[test]
    fn oversize_passwords_rejected() {
        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(validate_password(&long), Err(PasswordError::TooLong)));
    }

    #[test]
    fn boundary_lengths_accepted() {
        assert!(validate_password(&"a".repeat(MIN_PASSWORD_LENGTH)).is_ok());
        assert!(validate_password(&"a".repeat(MAX_PASSWORD_BYTES)).is_ok());
    }
}
