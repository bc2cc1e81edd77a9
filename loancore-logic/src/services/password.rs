use loancore_api::{LoanCoreError, LoanCoreResult};

/// bcrypt cost used for every hash this service mints. Higher than the
/// bcrypt default (10) because login is infrequent relative to how costly
/// an offline crack attempt should be made.
const BCRYPT_COST: u32 = 12;

pub fn hash_password(plaintext: &str) -> LoanCoreResult<String> {
    bcrypt::hash(plaintext, BCRYPT_COST).map_err(|e| LoanCoreError::Internal(format!("password hashing failed: {e}")))
}

/// Never distinguishes "malformed hash" from "wrong password" in its
/// return value; both are simply `false` to the caller.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_hash_verifies_against_its_own_plaintext() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
    }

    #[test]
    fn the_wrong_password_fails_verification() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn a_malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
