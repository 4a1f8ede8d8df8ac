//! Blocked sort-based indexing
//!
//! The corpus lives at `{data_dir}/{block}/{doc}.txt`, one sub-directory per
//! block. Each block is parsed into (term id, doc id) pairs, inverted in
//! memory, and written out as an intermediate index; the intermediates are
//! then merged into the final index with a k-way heap merge that keeps one
//! decoded postings list per source in memory.
//!
//! Documents are keyed by file basename, so the same basename in two blocks
//! resolves to the same doc id.

use crate::analyze::{Analyzer, StandardAnalyzer};
use crate::codec::Codec;
use crate::idmap::IdMap;
use crate::index::{InvertedIndexReader, InvertedIndexWriter};
use crate::manifest::IndexManifest;
use crate::{DocId, IndexError, Result, TermId};
use ahash::AHashMap;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the merged index produced by a build.
pub const MAIN_INDEX_NAME: &str = "main_index";

pub(crate) const TERMS_FILE: &str = "terms.dict";
pub(crate) const DOCS_FILE: &str = "docs.dict";

pub struct BsbiIndexer {
    term_ids: IdMap,
    doc_ids: IdMap,
    data_dir: PathBuf,
    output_dir: PathBuf,
    codec: Codec,
    index_name: String,
    analyzer: Arc<dyn Analyzer>,
    /// Names of the intermediate indices written so far.
    intermediate: Vec<String>,
}

impl BsbiIndexer {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        codec: Codec,
    ) -> Self {
        Self {
            term_ids: IdMap::new(),
            doc_ids: IdMap::new(),
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            codec,
            index_name: MAIN_INDEX_NAME.to_string(),
            analyzer: Arc::new(StandardAnalyzer::default()),
            intermediate: Vec::new(),
        }
    }

    /// Replace the analyzer. Retrieval must use the same one.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Override the merged index name.
    pub fn with_index_name(mut self, name: &str) -> Self {
        self.index_name = name.to_string();
        self
    }

    /// Build the full index set: one intermediate index per block, the two
    /// id maps, the merged index and the manifest, all under `output_dir`.
    pub fn index(&mut self) -> Result<IndexManifest> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| IndexError::at_path(&self.output_dir, e))?;

        let blocks = self.list_blocks()?;
        for block in &blocks {
            let pairs = self.parse_block(block)?;
            let name = format!("intermediate_index_{}", block);
            let mut writer = InvertedIndexWriter::create(&name, &self.output_dir, self.codec)?;
            Self::invert_write(pairs, &mut writer)?;
            writer.close()?;
            self.intermediate.push(name);
        }

        self.term_ids.save(&self.output_dir.join(TERMS_FILE))?;
        self.doc_ids.save(&self.output_dir.join(DOCS_FILE))?;

        let mut readers = self
            .intermediate
            .iter()
            .map(|name| InvertedIndexReader::open(name, &self.output_dir, self.codec))
            .collect::<Result<Vec<_>>>()?;
        let mut writer =
            InvertedIndexWriter::create(&self.index_name, &self.output_dir, self.codec)?;
        Self::merge(&mut readers, &mut writer)?;
        writer.close()?;

        let manifest = IndexManifest {
            codec: self.codec.name().to_string(),
            blocks: blocks.len() as u32,
            documents: self.doc_ids.len() as u32,
            terms: self.term_ids.len() as u32,
        };
        manifest.save(&self.output_dir)?;
        Ok(manifest)
    }

    /// Immediate sub-directories of `data_dir`, sorted lexically.
    fn list_blocks(&self) -> Result<Vec<String>> {
        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| IndexError::at_path(&self.data_dir, e))?;
        let mut blocks = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                blocks.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        blocks.sort();
        Ok(blocks)
    }

    /// Parse one block into (term id, doc id) pairs. Files are visited in
    /// name order so id assignment is reproducible.
    fn parse_block(&mut self, block: &str) -> Result<Vec<(TermId, DocId)>> {
        let block_dir = self.data_dir.join(block);
        let mut files = Vec::new();
        for entry in fs::read_dir(&block_dir).map_err(|e| IndexError::at_path(&block_dir, e))? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                files.push(path);
            }
        }
        files.sort();

        let mut pairs = Vec::new();
        for path in files {
            let Some(doc_name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|e| IndexError::at_path(&path, e))?;
            let doc_id = self.doc_ids.id_of(&doc_name);
            let tokens = self.analyzer.analyze(&text);
            for token in &tokens {
                pairs.push((self.term_ids.id_of(token), doc_id));
            }
        }
        Ok(pairs)
    }

    /// Invert pairs into term -> sorted unique doc ids and append every
    /// term in ascending id order.
    fn invert_write(
        pairs: Vec<(TermId, DocId)>,
        writer: &mut InvertedIndexWriter,
    ) -> Result<()> {
        let mut inverted: AHashMap<TermId, Vec<DocId>> = AHashMap::new();
        for (term_id, doc_id) in pairs {
            inverted.entry(term_id).or_default().push(doc_id);
        }

        let mut term_ids: Vec<TermId> = inverted.keys().copied().collect();
        term_ids.sort_unstable();
        for term_id in term_ids {
            let mut postings = inverted.remove(&term_id).unwrap_or_default();
            postings.sort_unstable();
            postings.dedup();
            writer.append(term_id, &postings)?;
        }
        Ok(())
    }

    /// External merge: k-way heap merge over the intermediate readers, each
    /// yielding (term id, postings) in ascending term order. Sources holding
    /// the same term are drained together and their lists unioned.
    fn merge(
        readers: &mut [InvertedIndexReader],
        writer: &mut InvertedIndexWriter,
    ) -> Result<()> {
        let mut heap: BinaryHeap<Reverse<HeapItem>> = BinaryHeap::new();
        for (source_id, reader) in readers.iter_mut().enumerate() {
            if let Some((term_id, postings)) = reader.next_entry()? {
                heap.push(Reverse(HeapItem {
                    term_id,
                    source_id,
                    postings,
                }));
            }
        }

        while let Some(Reverse(head)) = heap.pop() {
            let term_id = head.term_id;
            let mut lists = vec![head.postings];
            refill(readers, &mut heap, head.source_id)?;

            loop {
                match heap.peek() {
                    Some(Reverse(next)) if next.term_id == term_id => {}
                    _ => break,
                }
                if let Some(Reverse(next)) = heap.pop() {
                    lists.push(next.postings);
                    refill(readers, &mut heap, next.source_id)?;
                }
            }

            writer.append(term_id, &union_sorted(lists))?;
        }
        Ok(())
    }
}

/// Head of one merge source.
#[derive(Debug)]
struct HeapItem {
    term_id: TermId,
    source_id: usize,
    postings: Vec<DocId>,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.term_id == other.term_id && self.source_id == other.source_id
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // by term ascending, ties broken by source order
        self.term_id
            .cmp(&other.term_id)
            .then(self.source_id.cmp(&other.source_id))
    }
}

/// Read the next entry of one source and push it back onto the heap.
fn refill(
    readers: &mut [InvertedIndexReader],
    heap: &mut BinaryHeap<Reverse<HeapItem>>,
    source_id: usize,
) -> Result<()> {
    if let Some(reader) = readers.get_mut(source_id) {
        if let Some((term_id, postings)) = reader.next_entry()? {
            heap.push(Reverse(HeapItem {
                term_id,
                source_id,
                postings,
            }));
        }
    }
    Ok(())
}

/// Sorted set-union of already-sorted lists.
fn union_sorted(lists: Vec<Vec<DocId>>) -> Vec<DocId> {
    lists
        .into_iter()
        .fold(Vec::new(), |acc, next| merge_union(&acc, &next))
}

fn merge_union(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, block: &str, name: &str, text: &str) {
        let block_dir = dir.join(block);
        fs::create_dir_all(&block_dir).unwrap();
        fs::write(block_dir.join(name), text).unwrap();
    }

    #[test]
    fn test_union_sorted() {
        assert_eq!(
            union_sorted(vec![vec![2, 5, 9], vec![3, 5, 10]]),
            vec![2, 3, 5, 9, 10]
        );
        assert_eq!(union_sorted(vec![vec![1, 2]]), vec![1, 2]);
        assert_eq!(union_sorted(vec![]), Vec::<DocId>::new());
    }

    #[test]
    fn test_merge_unions_duplicate_terms() {
        let temp_dir = TempDir::new().unwrap();

        let mut writer =
            InvertedIndexWriter::create("intermediate_index_0", temp_dir.path(), Codec::VByte)
                .unwrap();
        writer.append(7, &[2, 5, 9]).unwrap();
        writer.close().unwrap();

        let mut writer =
            InvertedIndexWriter::create("intermediate_index_1", temp_dir.path(), Codec::VByte)
                .unwrap();
        writer.append(7, &[3, 5, 10]).unwrap();
        writer.append(8, &[1]).unwrap();
        writer.close().unwrap();

        let mut readers = vec![
            InvertedIndexReader::open("intermediate_index_0", temp_dir.path(), Codec::VByte)
                .unwrap(),
            InvertedIndexReader::open("intermediate_index_1", temp_dir.path(), Codec::VByte)
                .unwrap(),
        ];
        let mut writer =
            InvertedIndexWriter::create("merged", temp_dir.path(), Codec::VByte).unwrap();
        BsbiIndexer::merge(&mut readers, &mut writer).unwrap();
        writer.close().unwrap();

        let mut merged =
            InvertedIndexReader::open("merged", temp_dir.path(), Codec::VByte).unwrap();
        assert_eq!(merged.term_ids(), &[7, 8]);
        assert_eq!(merged.get_postings(7).unwrap(), vec![2, 3, 5, 9, 10]);
        assert_eq!(merged.get_postings(8).unwrap(), vec![1]);
    }

    #[test]
    fn test_index_builds_expected_files() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("collection");
        let output_dir = temp_dir.path().join("output");
        write_doc(&data_dir, "0", "a.txt", "apple banana");
        write_doc(&data_dir, "1", "b.txt", "banana cherry");

        let mut indexer = BsbiIndexer::new(&data_dir, &output_dir, Codec::VByte);
        let manifest = indexer.index().unwrap();

        assert_eq!(manifest.blocks, 2);
        assert_eq!(manifest.documents, 2);
        assert_eq!(manifest.terms, 3);
        for file in [
            "terms.dict",
            "docs.dict",
            "main_index.index",
            "main_index.dict",
            "intermediate_index_0.index",
            "intermediate_index_0.dict",
            "intermediate_index_1.index",
            "intermediate_index_1.dict",
            "manifest.json",
        ] {
            assert!(output_dir.join(file).exists(), "missing {}", file);
        }
    }

    #[test]
    fn test_merged_offsets_cover_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("collection");
        let output_dir = temp_dir.path().join("output");
        write_doc(&data_dir, "0", "a.txt", "apple banana cherry date");
        write_doc(&data_dir, "0", "b.txt", "banana date");
        write_doc(&data_dir, "1", "c.txt", "apple elder");

        let mut indexer = BsbiIndexer::new(&data_dir, &output_dir, Codec::Interpolative);
        indexer.index().unwrap();

        let reader =
            InvertedIndexReader::open(MAIN_INDEX_NAME, &output_dir, Codec::Interpolative).unwrap();
        let mut expected_offset = 0u64;
        for &term_id in reader.term_ids() {
            let entry = reader.entry(term_id).unwrap();
            assert_eq!(entry.offset, expected_offset);
            expected_offset += u64::from(entry.bytes);
        }
        let file_len = fs::metadata(output_dir.join("main_index.index"))
            .unwrap()
            .len();
        assert_eq!(expected_offset, file_len);
    }

    #[test]
    fn test_same_basename_collides_to_one_doc() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("collection");
        let output_dir = temp_dir.path().join("output");
        write_doc(&data_dir, "0", "gamma.txt", "apple");
        write_doc(&data_dir, "1", "gamma.txt", "banana");

        let mut indexer = BsbiIndexer::new(&data_dir, &output_dir, Codec::VByte);
        let manifest = indexer.index().unwrap();
        assert_eq!(manifest.documents, 1);

        // both terms point at the single shared doc id
        let mut reader =
            InvertedIndexReader::open(MAIN_INDEX_NAME, &output_dir, Codec::VByte).unwrap();
        for &term_id in &reader.term_ids().to_vec() {
            assert_eq!(reader.get_postings(term_id).unwrap(), vec![0]);
        }
    }

    #[test]
    fn test_missing_data_dir_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut indexer = BsbiIndexer::new(
            temp_dir.path().join("nowhere"),
            temp_dir.path().join("output"),
            Codec::VByte,
        );
        assert!(indexer.index().is_err());
    }

    #[test]
    fn test_non_txt_files_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("collection");
        let output_dir = temp_dir.path().join("output");
        write_doc(&data_dir, "0", "a.txt", "apple");
        write_doc(&data_dir, "0", "notes.md", "banana");

        let mut indexer = BsbiIndexer::new(&data_dir, &output_dir, Codec::VByte);
        let manifest = indexer.index().unwrap();
        assert_eq!(manifest.documents, 1);
        assert_eq!(manifest.terms, 1);
    }
}
