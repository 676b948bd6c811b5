use sha2::{Digest, Sha256};

pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Compares the submitted password against the configured hex SHA-256
/// digest. Digest case is ignored; the password itself is not.
pub fn verify_password(candidate: &str, expected_sha256_hex: &str) -> bool {
    hash_password(candidate).eq_ignore_ascii_case(expected_sha256_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_known_vector() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn verify_accepts_matching_password() {
        let digest = hash_password("open sesame");
        assert!(verify_password("open sesame", &digest));
        assert!(verify_password("open sesame", &digest.to_uppercase()));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let digest = hash_password("open sesame");
        assert!(!verify_password("Open Sesame", &digest));
        assert!(!verify_password("", &digest));
    }
}
