//! On-disk inverted index files
//!
//! An index `name` in directory `dir` is a pair of files:
//! - `{dir}/{name}.index` - concatenated encoded postings blobs
//! - `{dir}/{name}.dict` - the dictionary: term id -> (offset, count, bytes)
//!   plus the insertion-ordered term list, bincode inside the crc32 frame
//!
//! The writer is append-only and must be fed strictly increasing term ids;
//! the reader offers random access by term id (one seek, one blob) and
//! streaming iteration in insertion order, holding one decoded list at a
//! time. The codec is chosen by the caller at open time and must match the
//! one used at write time; it is not embedded in the files.

mod reader;
mod writer;

pub use reader::InvertedIndexReader;
pub use writer::InvertedIndexWriter;

use crate::TermId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dictionary entry: where a term's postings blob lives and what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingsEntry {
    /// Byte offset of the blob in the postings file.
    pub offset: u64,
    /// Number of doc ids in the list.
    pub count: u32,
    /// Encoded blob size in bytes.
    pub bytes: u32,
}

/// Serialized payload of a `.dict` file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Dictionary {
    pub(crate) entries: AHashMap<TermId, PostingsEntry>,
    /// Term ids in append order; blob concatenation follows this order.
    pub(crate) terms: Vec<TermId>,
}

pub(crate) fn postings_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.index", name))
}

pub(crate) fn dictionary_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.dict", name))
}
