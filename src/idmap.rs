//! Bidirectional string <-> id mapping
//!
//! Terms and document names are interned into dense ids assigned in
//! first-seen order. The map owns both directions: forward lookup allocates
//! on miss, reverse lookup is an index access into the insertion-ordered
//! name list. Persisted as one bincode blob inside the crc32 frame, so ids
//! survive a save/load cycle unchanged.

use crate::checksum;
use crate::{IndexError, Result};
use ahash::AHashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IdMap {
    /// Insertion-ordered names; the position of a name is its id.
    names: Vec<String>,
    ids: AHashMap<String, u32>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, allocating the next sequential id on
    /// first sight.
    pub fn id_of(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Look up an id without allocating.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Resolve an id back to its name. Ids never handed out are an error.
    pub fn name_of(&self, id: u32) -> Result<&str> {
        self.names
            .get(id as usize)
            .map(String::as_str)
            .ok_or_else(|| {
                IndexError::InvalidArgument(format!(
                    "id {} out of range (map holds {})",
                    id,
                    self.names.len()
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Persist to `path` as bincode inside the crc32 frame. Only the name
    /// list is written; the forward map is rebuilt on load.
    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = bincode::serialize(&self.names)?;
        fs::write(path, checksum::frame(&payload)).map_err(|e| IndexError::at_path(path, e))
    }

    /// Load a map persisted by `save`. Ids come back identical to the ones
    /// assigned at build time.
    pub fn load(path: &Path) -> Result<Self> {
        let framed = fs::read(path).map_err(|e| IndexError::at_path(path, e))?;
        let names: Vec<String> = bincode::deserialize(checksum::unframe(&framed)?)?;
        let ids = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as u32))
            .collect();
        Ok(Self { names, ids })
    }
}
