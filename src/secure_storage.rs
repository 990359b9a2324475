//! Secure storage for sensitive data (the LLM provider API key).
//!
//! `LLM_API_KEY` is normally read straight from the environment (see
//! `config.rs`), but once a caller persists a key through the settings
//! surface it is written to an AES-GCM encrypted file under the app data
//! directory rather than in plaintext in SQLite. OS keychains are out of
//! scope here — this is the teacher's documented fallback path, kept as
//! the only path since there is no cross-platform keychain crate in the
//! dependency stack.

use crate::db::get_app_data_dir;
use crate::encryption::{decrypt, encrypt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub created_at: String,
    pub last_rotated_at: String,
    pub rotation_count: u32,
}

fn secure_storage_dir() -> PathBuf {
    get_app_data_dir().join("secure_storage")
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn secret_path(key: &str) -> PathBuf {
    secure_storage_dir().join(sanitize_key(key))
}

fn metadata_path(key: &str) -> PathBuf {
    secure_storage_dir().join(format!("{}.meta.json", sanitize_key(key)))
}

/// Store a secret, replacing any previous value. Storing an empty value
/// removes the secret (mirrors clearing a field in a settings form).
pub fn store_secret(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return remove_secret(key);
    }

    let dir = secure_storage_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create secure storage directory: {}", e))?;

    let encrypted = encrypt(value)?;
    std::fs::write(secret_path(key), encrypted)
        .map_err(|e| format!("Failed to write secure storage file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = secret_path(key);
        let mut perms = std::fs::metadata(&path)
            .map_err(|e| format!("Failed to stat secure storage file: {}", e))?
            .permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .map_err(|e| format!("Failed to set secure storage file permissions: {}", e))?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let metadata = KeyMetadata {
        created_at: get_key_metadata(key)
            .map(|m| m.created_at)
            .unwrap_or_else(|_| now.clone()),
        last_rotated_at: now,
        rotation_count: get_key_metadata(key).map(|m| m.rotation_count + 1).unwrap_or(1),
    };
    let metadata_json = serde_json::to_string(&metadata)
        .map_err(|e| format!("Failed to serialize key metadata: {}", e))?;
    let _ = std::fs::write(metadata_path(key), metadata_json);

    Ok(())
}

pub fn get_secret(key: &str) -> Result<Option<String>, String> {
    let path = secret_path(key);
    if !path.exists() {
        return Ok(None);
    }
    let encrypted = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read secure storage file: {}", e))?;
    Ok(Some(decrypt(&encrypted)?))
}

pub fn remove_secret(key: &str) -> Result<(), String> {
    let path = secret_path(key);
    if path.exists() {
        std::fs::remove_file(&path)
            .map_err(|e| format!("Failed to remove secure storage file: {}", e))?;
    }
    let meta = metadata_path(key);
    if meta.exists() {
        let _ = std::fs::remove_file(&meta);
    }
    Ok(())
}

pub fn get_key_metadata(key: &str) -> Result<KeyMetadata, String> {
    let path = metadata_path(key);
    let raw = std::fs::read_to_string(&path).map_err(|e| format!("No metadata: {}", e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid metadata: {}", e))
}
