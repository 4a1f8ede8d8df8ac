//! Build manifest
//!
//! A small JSON description of a finished build, written next to the index
//! files. The postings format itself does not embed the codec identity (the
//! caller selects it at open time); the manifest lets drivers detect an
//! obvious codec mismatch before decoding garbage.

use crate::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Codec name as understood by `Codec::parse`.
    pub codec: String,
    /// Number of blocks merged into the final index.
    pub blocks: u32,
    /// Documents interned into the doc id map.
    pub documents: u32,
    /// Terms interned into the term id map.
    pub terms: u32,
}

impl IndexManifest {
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| IndexError::at_path(&path, e))
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).map_err(|e| IndexError::at_path(&path, e))?;
        serde_json::from_str(&json).map_err(|e| IndexError::Serialization(e.to_string()))
    }

    /// Whether `dir` carries a manifest at all.
    pub fn exists(dir: &Path) -> bool {
        dir.join(MANIFEST_FILE).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = IndexManifest {
            codec: "vbyte".to_string(),
            blocks: 3,
            documents: 120,
            terms: 4512,
        };
        manifest.save(temp_dir.path()).unwrap();

        assert!(IndexManifest::exists(temp_dir.path()));
        assert_eq!(IndexManifest::load(temp_dir.path()).unwrap(), manifest);
    }

    #[test]
    fn test_missing_manifest_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!IndexManifest::exists(temp_dir.path()));
        assert!(IndexManifest::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_garbage_manifest_is_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(MANIFEST_FILE), "not json").unwrap();
        assert!(matches!(
            IndexManifest::load(temp_dir.path()),
            Err(IndexError::Serialization(_))
        ));
    }
}
