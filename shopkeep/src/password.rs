//! Salted PBKDF2 password hashing for the `users.password` column.
//!
//! Stored form is `pbkdf2-sha256$<rounds>$<salt hex>$<key hex>`. The round
//! count travels with the hash, so raising [`ROUNDS`] leaves older hashes
//! verifiable.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{Error, Result};

/// Scheme tag at the start of every stored hash.
pub const SCHEME: &str = "pbkdf2-sha256";
/// PBKDF2 iterations for new hashes.
pub const ROUNDS: u32 = 100_000;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let key = derive(password, &salt, ROUNDS);
    format!("{SCHEME}${ROUNDS}${}${}", hex::encode(salt), hex::encode(key))
}

/// Check a password against a stored hash.
///
/// A stored value that is not in the hash format is [`Error::PasswordHash`].
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(Error::PasswordHash);
    };

    let rounds: u32 = rounds.parse().map_err(|_| Error::PasswordHash)?;
    let salt = hex::decode(salt).map_err(|_| Error::PasswordHash)?;
    let expected = hex::decode(expected).map_err(|_| Error::PasswordHash)?;
    if rounds == 0 || salt.len() != SALT_LEN || expected.len() != KEY_LEN {
        return Err(Error::PasswordHash);
    }

    let key = derive(password, &salt, rounds);
    Ok(key.as_slice().ct_eq(expected.as_slice()).into())
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut key);
    key
}
