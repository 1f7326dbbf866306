//! At-rest encryption for profile payloads.
//!
//! The store holds a single AES-256-GCM key, generated once and persisted in a
//! key file beside the records (never inside a record). Output format for
//! encrypted payloads: [nonce 12B][ciphertext].

use aes_gcm::{
  aead::{Aead, AeadCore, KeyInit, OsRng},
  Aes256Gcm, Key,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;

pub const KEY_FILE_NAME: &str = "store.key";

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
  #[error("Encryption failed: {0}")]
  Encrypt(String),

  #[error("Decryption failed: {0}")]
  Decrypt(String),

  #[error("Key file error: {0}")]
  KeyFile(String),
}

/// Store-held symmetric key for profile payloads.
#[derive(Clone)]
pub struct StoreKey {
  key: [u8; 32],
}

impl StoreKey {
  /// Load the key from `dir`, generating and persisting a fresh one on first use.
  pub fn load_or_create(dir: &Path) -> Result<Self, CryptoError> {
    let key_path = dir.join(KEY_FILE_NAME);

    if key_path.exists() {
      let encoded = std::fs::read_to_string(&key_path)
        .map_err(|e| CryptoError::KeyFile(format!("Failed to read key file: {e}")))?;
      let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| CryptoError::KeyFile(format!("Invalid key encoding: {e}")))?;
      let key: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::KeyFile("Invalid key length".to_string()))?;
      return Ok(Self { key });
    }

    std::fs::create_dir_all(dir)
      .map_err(|e| CryptoError::KeyFile(format!("Failed to create store directory: {e}")))?;

    let mut key = [0u8; 32];
    use aes_gcm::aead::rand_core::RngCore;
    OsRng.fill_bytes(&mut key);

    std::fs::write(&key_path, BASE64.encode(key))
      .map_err(|e| CryptoError::KeyFile(format!("Failed to write key file: {e}")))?;

    Ok(Self { key })
  }

  /// Encrypt a serialized payload. Output format: [nonce 12B][ciphertext]
  pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let aes_key = Key::<Aes256Gcm>::from(self.key);
    let cipher = Aes256Gcm::new(&aes_key);
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
      .encrypt(&nonce, plaintext)
      .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    let mut output = Vec::with_capacity(12 + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
  }

  /// Decrypt a payload produced by [`encrypt`](Self::encrypt).
  pub fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if encrypted.len() < 12 {
      return Err(CryptoError::Decrypt("Encrypted data too short".to_string()));
    }

    let nonce_bytes: [u8; 12] = encrypted[..12]
      .try_into()
      .map_err(|_| CryptoError::Decrypt("Invalid nonce".to_string()))?;
    let nonce = aes_gcm::Nonce::from(nonce_bytes);
    let ciphertext = &encrypted[12..];

    let aes_key = Key::<Aes256Gcm>::from(self.key);
    let cipher = Aes256Gcm::new(&aes_key);

    cipher
      .decrypt(&nonce, ciphertext)
      .map_err(|e| CryptoError::Decrypt(e.to_string()))
  }
}
