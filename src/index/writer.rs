//! Append-only inverted index writer

use super::{dictionary_path, postings_path, Dictionary, PostingsEntry};
use crate::checksum;
use crate::codec::Codec;
use crate::{DocId, IndexError, Result, TermId};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one inverted index: postings blobs appended to `{name}.index`,
/// dictionary flushed to `{name}.dict` on `close`.
///
/// `append` must be called in strictly increasing term-id order, and each
/// postings list must itself be strictly increasing; both are build
/// invariants, violations are fatal.
pub struct InvertedIndexWriter {
    postings_file: BufWriter<File>,
    dict_path: PathBuf,
    codec: Codec,
    dictionary: Dictionary,
    offset: u64,
}

impl InvertedIndexWriter {
    /// Create (truncating) the index file pair in `dir`.
    pub fn create(name: &str, dir: &Path, codec: Codec) -> Result<Self> {
        let postings = postings_path(dir, name);
        let file = File::create(&postings).map_err(|e| IndexError::at_path(&postings, e))?;
        Ok(Self {
            postings_file: BufWriter::new(file),
            dict_path: dictionary_path(dir, name),
            codec,
            dictionary: Dictionary::default(),
            offset: 0,
        })
    }

    /// Append one term's postings list at the end of the postings file.
    pub fn append(&mut self, term_id: TermId, postings: &[DocId]) -> Result<()> {
        if let Some(&last) = self.dictionary.terms.last() {
            if term_id <= last {
                return Err(IndexError::Build(format!(
                    "term ids must be appended in increasing order: {} after {}",
                    term_id, last
                )));
            }
        }
        let encoded = self.codec.encode(postings)?;
        self.dictionary.entries.insert(
            term_id,
            PostingsEntry {
                offset: self.offset,
                count: postings.len() as u32,
                bytes: encoded.len() as u32,
            },
        );
        self.dictionary.terms.push(term_id);
        self.postings_file.write_all(&encoded)?;
        self.offset += encoded.len() as u64;
        Ok(())
    }

    /// Number of terms appended so far.
    pub fn len(&self) -> usize {
        self.dictionary.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.terms.is_empty()
    }

    /// Flush and fsync the postings file, then write the dictionary.
    /// Dropping the writer without calling this abandons the index: the
    /// dictionary never reaches disk.
    pub fn close(mut self) -> Result<()> {
        self.postings_file.flush()?;
        self.postings_file.get_ref().sync_all()?;
        let payload = bincode::serialize(&self.dictionary)?;
        std::fs::write(&self.dict_path, checksum::frame(&payload))
            .map_err(|e| IndexError::at_path(&self.dict_path, e))
    }
}
