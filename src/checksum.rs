//! Metadata file integrity
//!
//! Every metadata file the engine writes (id maps, index dictionaries) is
//! framed as `[payload_len: u32 LE][payload][crc32: u32 LE]`, so a truncated
//! or silently corrupted file is detected at load time instead of being
//! decoded into garbage.

use crate::{IndexError, Result};
use crc32fast::Hasher;

/// Compute the crc32 of a byte slice.
pub fn compute(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verify data against an expected crc32.
pub fn verify(data: &[u8], expected: u32) -> Result<()> {
    let actual = compute(data);
    if actual != expected {
        return Err(IndexError::Corruption(format!(
            "checksum mismatch: expected {:#010x}, got {:#010x} (data_len={})",
            expected,
            actual,
            data.len()
        )));
    }
    Ok(())
}

/// Frame a payload for writing: `[payload_len: u32 LE][payload][crc32: u32 LE]`.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let checksum = compute(payload);
    let mut framed = Vec::with_capacity(4 + payload.len() + 4);
    framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    framed.extend_from_slice(payload);
    framed.extend_from_slice(&checksum.to_le_bytes());
    framed
}

/// Unframe and verify, returning the payload slice.
pub fn unframe(framed: &[u8]) -> Result<&[u8]> {
    if framed.len() < 8 {
        return Err(IndexError::Corruption(format!(
            "framed payload too short: {} bytes",
            framed.len()
        )));
    }
    let payload_len = u32::from_le_bytes([framed[0], framed[1], framed[2], framed[3]]) as usize;
    if framed.len() != 4 + payload_len + 4 {
        return Err(IndexError::Corruption(format!(
            "framed payload length mismatch: header says {} bytes, file carries {}",
            payload_len,
            framed.len().saturating_sub(8)
        )));
    }
    let payload = &framed[4..4 + payload_len];
    let expected = u32::from_le_bytes([
        framed[4 + payload_len],
        framed[4 + payload_len + 1],
        framed[4 + payload_len + 2],
        framed[4 + payload_len + 3],
    ]);
    verify(payload, expected)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_roundtrip() {
        let payload = b"some dictionary bytes";
        let framed = frame(payload);
        assert_eq!(unframe(&framed).unwrap(), payload);
    }

    #[test]
    fn test_frame_empty_payload() {
        let framed = frame(b"");
        assert_eq!(unframe(&framed).unwrap(), b"");
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut framed = frame(b"hello index");
        framed[6] ^= 0xFF;
        let err = unframe(&framed).unwrap_err();
        assert!(matches!(err, IndexError::Corruption(_)));
    }

    #[test]
    fn test_truncated_file_detected() {
        let framed = frame(b"hello index");
        assert!(unframe(&framed[..framed.len() - 3]).is_err());
        assert!(unframe(b"abc").is_err());
    }

    #[test]
    fn test_checksum_deterministic() {
        let data = b"deterministic";
        assert_eq!(compute(data), compute(data));
        assert!(verify(data, compute(data)).is_ok());
        assert!(verify(data, compute(data) ^ 1).is_err());
    }
}
