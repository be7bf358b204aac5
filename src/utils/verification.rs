use rand::Rng;
use sha2::{Digest, Sha256};

/// 5-digit code sent by email. Returns the code and the hash stored at
/// rest.
pub fn generate_verification_code() -> (String, String) {
    let code = rand::rng().random_range(10000..=99999).to_string();
    let hash = hash_code(&code);
    (code, hash)
}

pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());

    format!("{:x}", hasher.finalize())
}

/// One-time numeric password issued to new staff and approved managers.
pub fn generate_numeric_password() -> String {
    rand::rng().random_range(100000..=999999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_matches_its_hash() {
        let (code, hash) = generate_verification_code();
        assert_eq!(code.len(), 5);
        assert_eq!(hash_code(&code), hash);
    }

    #[test]
    fn test_numeric_password_shape() {
        let pass = generate_numeric_password();
        assert_eq!(pass.len(), 6);
        assert!(pass.chars().all(|c| c.is_ascii_digit()));
    }
}
