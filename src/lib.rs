//! invex - disk-resident blocked inverted index
//!
//! Builds a compressed inverted index over a corpus of plain-text documents
//! organized into block sub-directories, and answers conjunctive keyword
//! queries against it.
//!
//! ## Architecture
//! - Build: blocked sort-based indexing - per-block parse, in-memory
//!   inversion, intermediate index on disk, k-way merge into `main_index`
//! - Storage: paired files per index - `.index` (concatenated encoded
//!   postings blobs) and `.dict` (term id to offset/count/bytes dictionary)
//! - Compression: interchangeable postings codecs (fixed-width baseline,
//!   gap-based variable-byte, binary interpolative)
//! - Query: the build-time analyzer re-applied, postings intersected
//!   shortest-first, doc ids resolved back to names

pub mod analyze;
pub mod builder;
pub mod checksum;
pub mod codec;
pub mod idmap;
pub mod index;
pub mod manifest;
pub mod search;

mod error;

pub use error::{IndexError, Result};

pub use analyze::{Analyzer, StandardAnalyzer};
pub use builder::{BsbiIndexer, MAIN_INDEX_NAME};
pub use codec::Codec;
pub use idmap::IdMap;
pub use index::{InvertedIndexReader, InvertedIndexWriter, PostingsEntry};
pub use manifest::IndexManifest;
pub use search::{sorted_intersect, Searcher};

/// Term identifier, dense, assigned in first-seen order.
pub type TermId = u32;

/// Document identifier, dense, assigned in first-seen order.
pub type DocId = u32;
