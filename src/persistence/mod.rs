//! Save/load of the economy snapshot
//!
//! Features:
//! - Versioned JSON envelope
//! - Write to a temp file, then rename over the save
//! - Missing save file is not an error (fresh start)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::economy::EconomySnapshot;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {})", SAVE_VERSION)]
    UnsupportedVersion { found: u32 },
}

/// On-disk envelope around the economy snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub version: u32,
    #[serde(flatten)]
    pub economy: EconomySnapshot,
}

impl SaveRecord {
    pub fn new(economy: EconomySnapshot) -> Self {
        Self {
            version: SAVE_VERSION,
            economy,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let record: Self = serde_json::from_str(json)?;
        if record.version != SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: record.version,
            });
        }
        Ok(record)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the snapshot to `path`
pub fn save(path: impl AsRef<Path>, economy: &EconomySnapshot) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let json = SaveRecord::new(economy.clone()).to_json()?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    log::info!("Saved economy to {} (bank {})", path.display(), economy.bank);
    Ok(())
}

/// Read the snapshot at `path`; `Ok(None)` when no save exists yet
pub fn load(path: impl AsRef<Path>) -> Result<Option<EconomySnapshot>, PersistenceError> {
    let path = path.as_ref();
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No save at {}, starting fresh", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let record = SaveRecord::from_json(&json)?;
    log::info!("Loaded economy from {} (bank {})", path.display(), record.economy.bank);
    Ok(Some(record.economy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot() -> EconomySnapshot {
        let mut levels = BTreeMap::new();
        levels.insert("damage".to_string(), 3);
        levels.insert("resonance".to_string(), 1);
        EconomySnapshot { bank: 1234, levels }
    }

    #[test]
    fn test_record_json_shape() {
        let json = SaveRecord::new(snapshot()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["bank"], 1234);
        assert_eq!(value["levels"]["damage"], 3);
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{ "version": 99, "bank": 0, "levels": {} }"#;
        assert!(matches!(
            SaveRecord::from_json(json),
            Err(PersistenceError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = std::env::temp_dir().join(format!("cosmic-save-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("economy.json");

        assert_eq!(load(&path).unwrap(), None);
        save(&path, &snapshot()).unwrap();
        assert_eq!(load(&path).unwrap(), Some(snapshot()));
        assert!(!temp_path(&path).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
