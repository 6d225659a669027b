use bcrypt::{hash, verify};

use super::AuthError;

/// Work factor used unless configured otherwise.
pub const DEFAULT_COST: u32 = 10;

/// Salted one-way password hashing with bcrypt.
///
/// The produced hash embeds its salt and cost, so verification needs nothing
/// but the stored string.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// `cost` must be within bcrypt's 4..=31 range.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash(password, self.cost)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {}", e)))
    }

    /// Returns `false` for a wrong password and for a malformed `hashed`
    /// value alike.
    pub fn verify(&self, password: &str, hashed: &str) -> bool {
        verify(password, hashed).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        // minimum bcrypt cost keeps the suite fast
        PasswordHasher::with_cost(4)
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = hasher();
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert!(hasher.verify(password, &hashed));
        assert!(!hasher.verify("wrong_password", &hashed));
    }

    #[test]
    fn test_hash_embeds_cost_and_salt() {
        let hasher = hasher();
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert!(first.starts_with("$2b$04$"));
        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &second));
    }

    #[test]
    fn test_no_false_positives_across_distinct_passwords() {
        let hasher = hasher();
        let passwords = ["secret1", "secret2", "Secret1", "secret1 ", "", "pässwörd"];
        let hashes: Vec<String> = passwords.iter().map(|p| hasher.hash(p).unwrap()).collect();

        for (i, hashed) in hashes.iter().enumerate() {
            for (j, candidate) in passwords.iter().enumerate() {
                assert_eq!(
                    hasher.verify(candidate, hashed),
                    i == j,
                    "verify({:?}) against hash of {:?}",
                    candidate,
                    passwords[i]
                );
            }
        }
    }

    #[test]
    fn test_verify_with_invalid_hash_fails_closed() {
        let hasher = hasher();
        assert!(!hasher.verify("test_password123", "invalidhashformat"));
        assert!(!hasher.verify("test_password123", ""));
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(PasswordHasher::default().cost(), 10);
    }
}
