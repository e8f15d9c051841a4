use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    /// `false` for a wrong password; malformed stored hashes are errors.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, BcryptError> {
        verify(password, password_hash)
    }

    pub fn is_long_enough(password: &str, min_length: usize) -> bool {
        password.chars().count() >= min_length
    }
}
