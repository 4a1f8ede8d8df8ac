//! Random-access and streaming inverted index reader

use super::{dictionary_path, postings_path, Dictionary, PostingsEntry};
use crate::checksum;
use crate::codec::Codec;
use crate::{DocId, IndexError, Result, TermId};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Reads one inverted index written by `InvertedIndexWriter`. The whole
/// dictionary is resident; postings are decoded one list at a time, either
/// by direct seek (`get_postings`) or in append order (`next_entry`).
pub struct InvertedIndexReader {
    postings_file: File,
    codec: Codec,
    dictionary: Dictionary,
    /// Cursor into `dictionary.terms` for streaming iteration.
    cursor: usize,
}

impl InvertedIndexReader {
    /// Open the index file pair in `dir`. The codec must be the one used at
    /// write time.
    pub fn open(name: &str, dir: &Path, codec: Codec) -> Result<Self> {
        let dict_path = dictionary_path(dir, name);
        let framed = std::fs::read(&dict_path).map_err(|e| IndexError::at_path(&dict_path, e))?;
        let dictionary: Dictionary = bincode::deserialize(checksum::unframe(&framed)?)?;

        let postings = postings_path(dir, name);
        let postings_file = File::open(&postings).map_err(|e| IndexError::at_path(&postings, e))?;

        Ok(Self {
            postings_file,
            codec,
            dictionary,
            cursor: 0,
        })
    }

    /// Dictionary entry for a term, if present.
    pub fn entry(&self, term_id: TermId) -> Option<PostingsEntry> {
        self.dictionary.entries.get(&term_id).copied()
    }

    pub fn contains(&self, term_id: TermId) -> bool {
        self.dictionary.entries.contains_key(&term_id)
    }

    /// Term ids in append order.
    pub fn term_ids(&self) -> &[TermId] {
        &self.dictionary.terms
    }

    /// Number of terms in the index.
    pub fn len(&self) -> usize {
        self.dictionary.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.terms.is_empty()
    }

    /// Decode one term's postings list by direct seek.
    pub fn get_postings(&mut self, term_id: TermId) -> Result<Vec<DocId>> {
        let entry = self
            .entry(term_id)
            .ok_or(IndexError::TermNotFound(term_id))?;
        self.read_entry(term_id, entry)
    }

    /// Next `(term_id, postings)` pair in append order; `None` after the
    /// last. Exactly one decoded list is in memory at a time.
    pub fn next_entry(&mut self) -> Result<Option<(TermId, Vec<DocId>)>> {
        let Some(&term_id) = self.dictionary.terms.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        let entry = self.entry(term_id).ok_or_else(|| {
            IndexError::Corruption(format!(
                "dictionary lists term {} without a postings entry",
                term_id
            ))
        })?;
        let postings = self.read_entry(term_id, entry)?;
        Ok(Some((term_id, postings)))
    }

    /// Rewind the file cursor and the term iterator.
    pub fn reset(&mut self) -> Result<()> {
        self.postings_file.seek(SeekFrom::Start(0))?;
        self.cursor = 0;
        Ok(())
    }

    fn read_entry(&mut self, term_id: TermId, entry: PostingsEntry) -> Result<Vec<DocId>> {
        self.postings_file.seek(SeekFrom::Start(entry.offset))?;
        let mut blob = vec![0u8; entry.bytes as usize];
        self.postings_file
            .read_exact(&mut blob)
            .map_err(|e| IndexError::MalformedPostings {
                term_id,
                offset: entry.offset,
                reason: format!("short read: {}", e),
            })?;

        let postings =
            self.codec
                .decode(&blob, entry.count)
                .map_err(|e| IndexError::MalformedPostings {
                    term_id,
                    offset: entry.offset,
                    reason: e.to_string(),
                })?;

        if postings.len() as u32 != entry.count {
            return Err(IndexError::MalformedPostings {
                term_id,
                offset: entry.offset,
                reason: format!(
                    "decoded {} postings, dictionary records {}",
                    postings.len(),
                    entry.count
                ),
            });
        }
        if postings.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(IndexError::MalformedPostings {
                term_id,
                offset: entry.offset,
                reason: "decoded postings are not strictly increasing".into(),
            });
        }
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::super::InvertedIndexWriter;
    use super::*;
    use tempfile::TempDir;

    fn write_sample(dir: &Path, codec: Codec) {
        let mut writer = InvertedIndexWriter::create("test", dir, codec).unwrap();
        writer.append(1, &[2, 3, 4, 8, 10]).unwrap();
        writer.append(2, &[3, 4, 5]).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_random_access() {
        for codec in [Codec::Standard, Codec::VByte, Codec::Interpolative] {
            let temp_dir = TempDir::new().unwrap();
            write_sample(temp_dir.path(), codec);

            let mut reader = InvertedIndexReader::open("test", temp_dir.path(), codec).unwrap();
            assert_eq!(reader.len(), 2);
            assert_eq!(reader.get_postings(2).unwrap(), vec![3, 4, 5]);
            assert_eq!(reader.get_postings(1).unwrap(), vec![2, 3, 4, 8, 10]);
            assert!(matches!(
                reader.get_postings(9),
                Err(IndexError::TermNotFound(9))
            ));
        }
    }

    #[test]
    fn test_entries_are_contiguous() {
        let temp_dir = TempDir::new().unwrap();
        write_sample(temp_dir.path(), Codec::VByte);

        let reader = InvertedIndexReader::open("test", temp_dir.path(), Codec::VByte).unwrap();
        let first = reader.entry(1).unwrap();
        let second = reader.entry(2).unwrap();
        assert_eq!(first.offset, 0);
        assert_eq!(first.count, 5);
        assert_eq!(second.offset, u64::from(first.bytes));
        assert_eq!(second.count, 3);

        let file_len = std::fs::metadata(temp_dir.path().join("test.index"))
            .unwrap()
            .len();
        assert_eq!(file_len, u64::from(first.bytes) + u64::from(second.bytes));
    }

    #[test]
    fn test_streaming_iteration_and_reset() {
        let temp_dir = TempDir::new().unwrap();
        write_sample(temp_dir.path(), Codec::VByte);

        let mut reader = InvertedIndexReader::open("test", temp_dir.path(), Codec::VByte).unwrap();
        let mut seen = Vec::new();
        while let Some((term_id, postings)) = reader.next_entry().unwrap() {
            seen.push((term_id, postings));
        }
        assert_eq!(
            seen,
            vec![(1, vec![2, 3, 4, 8, 10]), (2, vec![3, 4, 5])]
        );
        assert!(reader.next_entry().unwrap().is_none());

        reader.reset().unwrap();
        let (term_id, postings) = reader.next_entry().unwrap().unwrap();
        assert_eq!(term_id, 1);
        assert_eq!(postings, vec![2, 3, 4, 8, 10]);
    }

    #[test]
    fn test_missing_files_are_errors() {
        let temp_dir = TempDir::new().unwrap();
        assert!(InvertedIndexReader::open("absent", temp_dir.path(), Codec::VByte).is_err());
    }

    #[test]
    fn test_corrupted_dictionary_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_sample(temp_dir.path(), Codec::VByte);

        let dict_path = temp_dir.path().join("test.dict");
        let mut bytes = std::fs::read(&dict_path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        std::fs::write(&dict_path, bytes).unwrap();

        assert!(InvertedIndexReader::open("test", temp_dir.path(), Codec::VByte).is_err());
    }

    #[test]
    fn test_truncated_postings_file_surfaces_term_and_offset() {
        let temp_dir = TempDir::new().unwrap();
        write_sample(temp_dir.path(), Codec::VByte);

        let index_path = temp_dir.path().join("test.index");
        let bytes = std::fs::read(&index_path).unwrap();
        std::fs::write(&index_path, &bytes[..bytes.len() - 2]).unwrap();

        let mut reader = InvertedIndexReader::open("test", temp_dir.path(), Codec::VByte).unwrap();
        match reader.get_postings(2) {
            Err(IndexError::MalformedPostings { term_id, .. }) => assert_eq!(term_id, 2),
            other => panic!("expected malformed postings, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_wrong_codec_detected() {
        let temp_dir = TempDir::new().unwrap();
        write_sample(temp_dir.path(), Codec::VByte);

        // fixed-width decode of a vbyte blob cannot both parse and agree
        // with the recorded count
        let mut reader =
            InvertedIndexReader::open("test", temp_dir.path(), Codec::Standard).unwrap();
        assert!(reader.get_postings(1).is_err());
    }
}
