// ═══════════════════════════════════════════════════════════════════
// Storage Tests — encrypted session files
// ═══════════════════════════════════════════════════════════════════

use merchant_dashboard_core::errors::CoreError;
use merchant_dashboard_core::models::session::Session;
use merchant_dashboard_core::storage::encryption::{self, KdfParams};
use merchant_dashboard_core::storage::format::{self, SessionHeader, HEADER_SIZE, MAGIC};
use merchant_dashboard_core::storage::session_store::SessionStore;

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

/// Argon2 costs low enough to keep the suite fast.
fn cheap_params() -> KdfParams {
    KdfParams {
        memory_cost: 64,
        time_cost: 1,
        parallelism: 1,
    }
}

fn store() -> SessionStore {
    SessionStore::with_kdf_params(cheap_params())
}

fn session() -> Session {
    Session::new("42", "sk_live_abc")
}

// ═══════════════════════════════════════════════════════════════════
// Round trips
// ═══════════════════════════════════════════════════════════════════

mod round_trip {
    use super::*;

    #[test]
    fn bytes_round_trip() {
        let bytes = store().save_to_bytes(&session(), "pw").unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(store().load_from_bytes(&bytes, "pw").unwrap(), session());
    }

    #[test]
    fn api_key_not_stored_in_clear() {
        let bytes = store().save_to_bytes(&session(), "pw").unwrap();
        let needle = b"sk_live_abc";
        assert!(!bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn each_save_uses_fresh_salt_and_nonce() {
        let a = store().save_to_bytes(&session(), "pw").unwrap();
        let b = store().save_to_bytes(&session(), "pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn load_uses_params_from_file() {
        let bytes = store().save_to_bytes(&session(), "pw").unwrap();
        // A store configured with default costs still reads the cheap file.
        let loaded = SessionStore::new().load_from_bytes(&bytes, "pw").unwrap();
        assert_eq!(loaded, session());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Rejections
// ═══════════════════════════════════════════════════════════════════

mod rejections {
    use super::*;

    #[test]
    fn wrong_password() {
        let bytes = store().save_to_bytes(&session(), "pw").unwrap();
        let err = store().load_from_bytes(&bytes, "nope").unwrap_err();
        assert!(matches!(err, CoreError::Decryption));
    }

    #[test]
    fn tampered_ciphertext() {
        let mut bytes = store().save_to_bytes(&session(), "pw").unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(
            store().load_from_bytes(&bytes, "pw"),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn bad_magic() {
        let mut bytes = store().save_to_bytes(&session(), "pw").unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            store().load_from_bytes(&bytes, "pw"),
            Err(CoreError::InvalidFileFormat(_))
        ));
    }

    #[test]
    fn too_small() {
        assert!(matches!(
            format::read_file(&[0u8; HEADER_SIZE - 1]),
            Err(CoreError::InvalidFileFormat(_))
        ));
    }

    #[test]
    fn unsupported_versions() {
        for version in [0u16, 2] {
            let mut bytes = store().save_to_bytes(&session(), "pw").unwrap();
            bytes[4..6].copy_from_slice(&version.to_le_bytes());
            assert!(matches!(
                format::read_file(&bytes),
                Err(CoreError::UnsupportedVersion(v)) if v == version
            ));
        }
    }

    #[test]
    fn truncated_ciphertext() {
        let bytes = store().save_to_bytes(&session(), "pw").unwrap();
        let cut = &bytes[..bytes.len() - 3];
        let err = format::read_file(cut).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(msg) if msg.contains("truncated")));
    }

    #[test]
    fn hostile_kdf_params() {
        let header = SessionHeader {
            version: format::CURRENT_VERSION,
            kdf_params: KdfParams {
                memory_cost: 4_000_000,
                time_cost: 1,
                parallelism: 1,
            },
            salt: [0; 16],
            nonce: [0; 12],
        };
        let bytes = format::write_file(&header, b"x").unwrap();
        assert!(matches!(
            format::read_file(&bytes),
            Err(CoreError::InvalidFileFormat(msg)) if msg.contains("memory_cost")
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Format and primitives
// ═══════════════════════════════════════════════════════════════════

mod primitives {
    use super::*;

    #[test]
    fn header_layout() {
        let header = SessionHeader {
            version: 1,
            kdf_params: cheap_params(),
            salt: [7; 16],
            nonce: [9; 12],
        };
        let bytes = format::write_file(&header, &[1, 2, 3]).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 3);

        let (parsed, ciphertext) = format::read_file(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(ciphertext, &[1, 2, 3]);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let header = SessionHeader {
            version: 1,
            kdf_params: cheap_params(),
            salt: [0; 16],
            nonce: [0; 12],
        };
        let mut bytes = format::write_file(&header, &[5, 6]).unwrap();
        bytes.extend_from_slice(&[0xAA; 4]);
        let (_, ciphertext) = format::read_file(&bytes).unwrap();
        assert_eq!(ciphertext, &[5, 6]);
    }

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [3u8; 16];
        let a = encryption::derive_key("pw", &salt, &cheap_params()).unwrap();
        let b = encryption::derive_key("pw", &salt, &cheap_params()).unwrap();
        let c = encryption::derive_key("other", &salt, &cheap_params()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn encrypt_decrypt() {
        let key = [1u8; 32];
        let nonce = [2u8; 12];
        let ct = encryption::encrypt(b"hello", &key, &nonce).unwrap();
        assert_eq!(ct.len(), 5 + 16);
        assert_eq!(encryption::decrypt(&ct, &key, &nonce).unwrap(), b"hello");
        assert!(matches!(
            encryption::decrypt(&ct, &[0u8; 32], &nonce),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn default_kdf_params_are_in_bounds() {
        assert!(KdfParams::default().check_bounds().is_ok());
        assert!(cheap_params().check_bounds().is_ok());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Files
// ═══════════════════════════════════════════════════════════════════

mod files {
    use super::*;

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.fdsn");

        store().save_to_file(&session(), &path, "pw").unwrap();
        let loaded = store().load_from_file(&path, "pw").unwrap();
        assert_eq!(loaded, Some(session()));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = store()
            .load_from_file(&dir.path().join("absent.fdsn"), "pw")
            .unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.fdsn");
        store().save_to_file(&session(), &path, "pw").unwrap();

        store().clear_file(&path).unwrap();
        assert!(!path.exists());
        store().clear_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.fdsn");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(matches!(
            store().load_from_file(&path, "pw"),
            Err(CoreError::InvalidFileFormat(_))
        ));
    }
}
