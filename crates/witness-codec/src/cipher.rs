//! Blob format and the encrypt/decrypt primitives.
//!
//! Blob layout (bytes, in order, then standard base64 with padding):
//!   1. salt        16 bytes, fresh per call
//!   2. nonce       16 bytes, fresh per call
//!   3. auth tag    16 bytes
//!   4. ciphertext  remainder
//!
//! Key: PBKDF2-HMAC-SHA256(password, salt, `PBKDF2_ROUNDS`) → 32 bytes.
//! Cipher: AES-256-GCM with a 128-bit nonce and empty associated data.
//!
//! These are the parameters WebCrypto exposes, so the browser viewer decrypts
//! the same blobs.

use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use witness_contracts::error::{WitnessError, WitnessResult};

/// PBKDF2 iteration count. Part of the persisted format: changing it makes
/// every existing entry undecryptable.
pub const PBKDF2_ROUNDS: u32 = 100_000;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 16;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Encrypt `plaintext` under `password` into a self-contained text blob.
///
/// Every call draws a new salt and nonce from the OS RNG, so encrypting the
/// same plaintext twice yields different blobs.
///
/// # Panics
///
/// Panics if `plaintext` exceeds the AES-GCM message limit (64 GiB), which a
/// single log entry never approaches.
pub fn encrypt(plaintext: &str, password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(&key));

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
        .expect("log entry must fit within the AES-GCM message limit");

    let mut blob = Vec::with_capacity(HEADER_LEN + buffer.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&buffer);

    STANDARD.encode(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Returns `DecryptionError` for bad base64, a blob too short to hold the
/// header, a wrong password or altered bytes (tag mismatch), or plaintext
/// that is not UTF-8.
pub fn decrypt(blob: &str, password: &str) -> WitnessResult<String> {
    let raw = STANDARD.decode(blob.trim()).map_err(|e| WitnessError::DecryptionError {
        reason: format!("blob is not valid base64: {}", e),
    })?;

    if raw.len() < HEADER_LEN {
        return Err(WitnessError::DecryptionError {
            reason: format!("blob is {} bytes, shorter than the {}-byte header", raw.len(), HEADER_LEN),
        });
    }

    let (salt, rest) = raw.split_at(SALT_LEN);
    let (nonce, rest) = rest.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(&key));

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| WitnessError::DecryptionError {
            reason: "authentication failed (wrong password or altered blob)".to_string(),
        })?;

    String::from_utf8(buffer).map_err(|_| WitnessError::DecryptionError {
        reason: "decrypted payload is not UTF-8".to_string(),
    })
}
