use sha2::Sha256;

const ROUNDS: u32 = 10_000;

/// Hash a password with pbkdf2_hmac sha256 and a random salt.
/// The result encodes salt and key as `hex(salt)$hex(key)`.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let key = derive_key(password, &salt);
    format!("{}${}", hex::encode(salt), hex::encode(key))
}

/// Check a password against a stored `salt$key` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, key_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let key = derive_key(password, &salt);
    hex::encode(key) == key_hex
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ROUNDS, &mut key);
    key
}

/// Generate a random account uid.
pub fn generate_uid() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_salted() {
        // Same password, different salt, different hash
        assert_ne!(hash_password("s3cret"), hash_password("s3cret"));
    }

    #[test]
    fn test_malformed_hash() {
        assert!(!verify_password("s3cret", "not-a-hash"));
        assert!(!verify_password("s3cret", "zz$zz"));
    }

    #[test]
    fn test_generate_uid() {
        let uid = generate_uid();
        assert_eq!(uid.len(), 32);
        assert_ne!(uid, generate_uid());
    }
}
