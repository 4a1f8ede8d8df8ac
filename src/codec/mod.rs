//! Postings codecs
//!
//! A postings list is a strictly increasing sequence of doc ids. Three
//! interchangeable codecs turn such a sequence into bytes and back:
//!
//! - `Standard`: 4-byte little-endian per id, no compression (baseline)
//! - `VByte`: gap transform + big-endian base-128 variable bytes
//! - `Interpolative`: binary interpolative coding, a bit-exact recursive
//!   subdivision that beats VByte on dense lists
//!
//! Selection is by value, dispatch is direct. Codecs that cannot infer the
//! element count from the bytes alone report `requires_len() == true`; the
//! index dictionary records the count for every term regardless, so any
//! codec can be wired in.

mod bic;
mod standard;
mod vbyte;

use crate::{DocId, IndexError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Standard,
    VByte,
    Interpolative,
}

impl Codec {
    /// Encode a strictly increasing postings list to bytes.
    pub fn encode(&self, postings: &[DocId]) -> Result<Vec<u8>> {
        match self {
            Codec::Standard => standard::encode(postings),
            Codec::VByte => vbyte::encode(postings),
            Codec::Interpolative => bic::encode(postings),
        }
    }

    /// Decode bytes produced by `encode`. `count` is the posting count the
    /// writer recorded; codecs with `requires_len() == false` ignore it.
    pub fn decode(&self, bytes: &[u8], count: u32) -> Result<Vec<DocId>> {
        match self {
            Codec::Standard => standard::decode(bytes),
            Codec::VByte => vbyte::decode(bytes),
            Codec::Interpolative => bic::decode(bytes, count as usize),
        }
    }

    /// Whether `decode` needs the element count supplied.
    pub fn requires_len(&self) -> bool {
        matches!(self, Codec::Interpolative)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Standard => "standard",
            Codec::VByte => "vbyte",
            Codec::Interpolative => "bic",
        }
    }

    /// Parse a codec name as accepted by the CLI and stored in the manifest.
    pub fn parse(name: &str) -> Result<Codec> {
        match name {
            "standard" => Ok(Codec::Standard),
            "vbyte" => Ok(Codec::VByte),
            "bic" | "interpolative" => Ok(Codec::Interpolative),
            other => Err(IndexError::InvalidArgument(format!(
                "unknown codec: {}",
                other
            ))),
        }
    }
}

/// Postings lists must be strictly increasing; a violation here means the
/// build pipeline fed unsorted or duplicated doc ids.
fn ensure_strictly_increasing(postings: &[DocId]) -> Result<()> {
    for pair in postings.windows(2) {
        if pair[0] >= pair[1] {
            return Err(IndexError::Codec(format!(
                "postings must be strictly increasing: {} followed by {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}
