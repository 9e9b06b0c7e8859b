//! JSON snapshot of every ledger, Poka set and sale register

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{GodownEntry, GreyFabricEntry, PokaItem, ProductionEntry, SoldPoka, YarnEntry};

use crate::error::{AppError, AppResult};

/// Bumped whenever the stored layout changes incompatibly
pub const SNAPSHOT_VERSION: u32 = 1;

/// Stored state of one finished-goods location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot<E> {
    pub entries: Vec<E>,
    pub active: Vec<PokaItem>,
    #[serde(default)]
    pub sold: Vec<SoldPoka>,
}

impl<E> Default for BookSnapshot<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            active: Vec::new(),
            sold: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub yarn: Vec<YarnEntry>,
    pub grey_fabric: Vec<GreyFabricEntry>,
    pub biratnagar: BookSnapshot<ProductionEntry>,
    pub birgunj: BookSnapshot<GodownEntry>,
}

/// Read a snapshot, returning `None` when the file does not exist yet
pub async fn read(path: &Path) -> AppResult<Option<Snapshot>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(AppError::Storage(format!(
                "reading {}: {}",
                path.display(),
                err
            )))
        }
    };

    let snapshot: Snapshot = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Storage(format!("parsing {}: {}", path.display(), e)))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(AppError::Storage(format!(
            "{} has snapshot version {}, expected {}",
            path.display(),
            snapshot.version,
            SNAPSHOT_VERSION
        )));
    }

    Ok(Some(snapshot))
}

/// Write a snapshot through a temporary file so a crash never leaves half a file
pub async fn write(path: &Path, snapshot: &Snapshot) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Storage(format!("creating {}: {}", parent.display(), e)))?;
    }

    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| AppError::Storage(format!("serializing snapshot: {}", e)))?;

    let temp = temp_path(path);
    tokio::fs::write(&temp, bytes)
        .await
        .map_err(|e| AppError::Storage(format!("writing {}: {}", temp.display(), e)))?;
    tokio::fs::rename(&temp, path)
        .await
        .map_err(|e| AppError::Storage(format!("replacing {}: {}", path.display(), e)))?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            yarn: Vec::new(),
            grey_fabric: Vec::new(),
            biratnagar: BookSnapshot::default(),
            birgunj: BookSnapshot::default(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = read(&dir.path().join("stock.json")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("stock.json");

        write(&path, &empty()).await.unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        assert!(read(&path).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.json");
        let mut snapshot = empty();
        snapshot.version = SNAPSHOT_VERSION + 1;
        write(&path, &snapshot).await.unwrap();

        assert!(matches!(read(&path).await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        assert!(matches!(read(&path).await, Err(AppError::Storage(_))));
    }
}
