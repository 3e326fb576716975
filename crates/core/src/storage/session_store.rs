use std::path::Path;

use tracing::debug;

use super::encryption::{self, KdfParams};
use super::format::{self, SessionHeader};
use crate::errors::CoreError;
use crate::models::session::Session;

/// Saves and restores the signed-in session at process boundaries.
///
/// Flow: Session → bincode → AES-256-GCM(Argon2id(password)) → FDSN bytes.
/// The API key never touches disk in clear text.
pub struct SessionStore {
    kdf_params: KdfParams,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            kdf_params: KdfParams::default(),
        }
    }

    /// Use custom Argon2 costs (e.g. cheap ones in tests).
    pub fn with_kdf_params(kdf_params: KdfParams) -> Self {
        Self { kdf_params }
    }

    pub fn save_to_bytes(&self, session: &Session, password: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(session)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize session: {e}")))?;

        let header = SessionHeader {
            version: format::CURRENT_VERSION,
            kdf_params: self.kdf_params,
            salt: encryption::random_bytes()?,
            nonce: encryption::random_bytes()?,
        };
        let key = encryption::derive_key(password, &header.salt, &header.kdf_params)?;
        let ciphertext = encryption::encrypt(&plaintext, &key, &header.nonce)?;

        format::write_file(&header, &ciphertext)
    }

    /// Uses the KDF parameters stored in the file, not `self`'s.
    pub fn load_from_bytes(&self, data: &[u8], password: &str) -> Result<Session, CoreError> {
        let (header, ciphertext) = format::read_file(data)?;
        let key = encryption::derive_key(password, &header.salt, &header.kdf_params)?;
        let plaintext = encryption::decrypt(ciphertext, &key, &header.nonce)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize session: {e}")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&self, session: &Session, path: &Path, password: &str) -> Result<(), CoreError> {
        let bytes = self.save_to_bytes(session, password)?;
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    /// `Ok(None)` when no session has been saved yet.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(&self, path: &Path, password: &str) -> Result<Option<Session>, CoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = self.load_from_bytes(&bytes, password)?;
        debug!(path = %path.display(), restaurant_id = %session.restaurant_id, "session restored");
        Ok(Some(session))
    }

    /// Forget the saved session (sign-out). Missing file is not an error.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn clear_file(&self, path: &Path) -> Result<(), CoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
