//! PIN digests.
//!
//! PINs are stored as `pbkdf2$<rounds>$<salt>$<key>` with base64 salt and key.
//! Rows written before digests were introduced hold the bare PIN; those still
//! verify, and [`needs_rehash`] tells the caller to upgrade them.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const SCHEME: &str = "pbkdf2";
const PBKDF2_ROUNDS: u32 = 10_000;

fn derive_key(pin: &str, salt: &[u8], rounds: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, rounds, &mut key);
    key
}

pub fn hash_pin(pin: &str) -> String {
    let salt = uuid::Uuid::new_v4();
    let key = derive_key(pin, salt.as_bytes(), PBKDF2_ROUNDS);
    format!(
        "{}${}${}${}",
        SCHEME,
        PBKDF2_ROUNDS,
        B64.encode(salt.as_bytes()),
        B64.encode(key)
    )
}

pub fn verify_pin(pin: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    match parts.as_slice() {
        [SCHEME, rounds, salt, key] => {
            let (Ok(rounds), Ok(salt), Ok(key)) =
                (rounds.parse::<u32>(), B64.decode(salt), B64.decode(key))
            else {
                return false;
            };
            derive_key(pin, &salt, rounds.max(1)).as_slice() == key.as_slice()
        }
        _ => !stored.is_empty() && stored.trim() == pin,
    }
}

/// True for stored values that are not a digest yet.
pub fn needs_rehash(stored: &str) -> bool {
    !stored.starts_with(SCHEME)
}
