//! Conjunctive boolean retrieval
//!
//! A query is normalized with the same analyzer used at build time, each
//! term resolved through the term id map and the main index dictionary, and
//! the postings lists intersected shortest-first so the running
//! intersection stays as small as possible. A query term missing from the
//! index short-circuits to an empty result; that is the only silently
//! recovered error.

use crate::analyze::{Analyzer, StandardAnalyzer};
use crate::builder::{DOCS_FILE, MAIN_INDEX_NAME, TERMS_FILE};
use crate::codec::Codec;
use crate::idmap::IdMap;
use crate::index::InvertedIndexReader;
use crate::{DocId, Result, TermId};
use lru::LruCache;
use parking_lot::{
    MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

/// Decoded postings lists kept hot across queries.
const DEFAULT_CACHE_SIZE: usize = 64;

struct IdMaps {
    terms: IdMap,
    docs: IdMap,
}

pub struct Searcher {
    output_dir: PathBuf,
    codec: Codec,
    index_name: String,
    analyzer: Arc<dyn Analyzer>,
    /// Loaded lazily on the first query.
    maps: RwLock<Option<IdMaps>>,
    cache: Mutex<LruCache<TermId, Arc<Vec<DocId>>>>,
}

impl Searcher {
    /// Point a searcher at the output directory of a finished build. The
    /// codec must be the one the index was built with.
    pub fn new(output_dir: impl Into<PathBuf>, codec: Codec) -> Self {
        Self {
            output_dir: output_dir.into(),
            codec,
            index_name: MAIN_INDEX_NAME.to_string(),
            analyzer: Arc::new(StandardAnalyzer::default()),
            maps: RwLock::new(None),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap(),
            )),
        }
    }

    /// Replace the analyzer. Must match the one used at build time.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Query an index built under a non-default name.
    pub fn with_index_name(mut self, name: &str) -> Self {
        self.index_name = name.to_string();
        self
    }

    /// Resize the postings cache.
    pub fn with_cache_size(mut self, entries: usize) -> Self {
        self.cache = Mutex::new(LruCache::new(NonZeroUsize::new(entries.max(1)).unwrap()));
        self
    }

    /// All documents containing every query term, in doc-id order.
    pub fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let terms = self.analyzer.analyze(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let maps = self.maps()?;
        let mut reader =
            InvertedIndexReader::open(&self.index_name, &self.output_dir, self.codec)?;

        // resolve every term up front; one unknown term already empties
        // the conjunction
        let mut resolved: Vec<(TermId, u32)> = Vec::with_capacity(terms.len());
        for term in &terms {
            let Some(term_id) = maps.terms.get(term) else {
                return Ok(Vec::new());
            };
            let Some(entry) = reader.entry(term_id) else {
                return Ok(Vec::new());
            };
            resolved.push((term_id, entry.count));
        }

        // intersect shortest-first
        resolved.sort_unstable_by_key(|&(_, count)| count);

        let mut intersection: Option<Vec<DocId>> = None;
        for (term_id, _) in resolved {
            let postings = self.cached_postings(&mut reader, term_id)?;
            intersection = Some(match intersection {
                None => postings.as_ref().clone(),
                Some(acc) => sorted_intersect(&acc, &postings),
            });
            if matches!(intersection.as_deref(), Some([])) {
                break;
            }
        }

        let doc_ids = intersection.unwrap_or_default();
        let mut names = Vec::with_capacity(doc_ids.len());
        for doc_id in doc_ids {
            names.push(maps.docs.name_of(doc_id)?.to_string());
        }
        Ok(names)
    }

    /// Id maps, loading them from disk on first use.
    fn maps(&self) -> Result<MappedRwLockReadGuard<'_, IdMaps>> {
        {
            let guard = self.maps.read();
            if guard.is_some() {
                return Ok(RwLockReadGuard::map(guard, |m| m.as_ref().unwrap()));
            }
        }
        let mut guard = self.maps.write();
        if guard.is_none() {
            *guard = Some(IdMaps {
                terms: IdMap::load(&self.output_dir.join(TERMS_FILE))?,
                docs: IdMap::load(&self.output_dir.join(DOCS_FILE))?,
            });
        }
        let guard = RwLockWriteGuard::downgrade(guard);
        Ok(RwLockReadGuard::map(guard, |m| m.as_ref().unwrap()))
    }

    fn cached_postings(
        &self,
        reader: &mut InvertedIndexReader,
        term_id: TermId,
    ) -> Result<Arc<Vec<DocId>>> {
        if let Some(hit) = self.cache.lock().get(&term_id) {
            return Ok(hit.clone());
        }
        let postings = Arc::new(reader.get_postings(term_id)?);
        self.cache.lock().put(term_id, postings.clone());
        Ok(postings)
    }
}

/// Ordered intersection of two ascending lists: two cursors advance
/// together, emitting matches and advancing the smaller side on mismatch.
/// O(|a| + |b|).
pub fn sorted_intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
