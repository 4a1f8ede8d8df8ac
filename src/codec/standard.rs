//! Fixed-width baseline codec
//!
//! Each doc id is packed as a 4-byte little-endian unsigned value and the
//! values are concatenated. No compression; the element count is implied by
//! the blob length.

use crate::{DocId, IndexError, Result};

pub(super) fn encode(postings: &[DocId]) -> Result<Vec<u8>> {
    super::ensure_strictly_increasing(postings)?;
    let mut bytes = Vec::with_capacity(postings.len() * 4);
    for &doc_id in postings {
        bytes.extend_from_slice(&doc_id.to_le_bytes());
    }
    Ok(bytes)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Vec<DocId>> {
    if bytes.len() % 4 != 0 {
        return Err(IndexError::Codec(format!(
            "fixed-width blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| DocId::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
