//! Binary interpolative coding
//!
//! Bit-optimal coding for sorted integer sets with known range and count.
//! The blob opens with a preamble: 5 bits for the bit length of the largest
//! element, then the element itself. The remaining n-1 values are coded by
//! recursive range subdivision: the middle element of each sub-range is
//! written in just enough bits for the values it can still take given its
//! neighbors, then both halves are coded the same way. The decoder replays
//! the identical subdivision, so every width computation must agree
//! byte-for-byte with the encoder.
//!
//! The recursion is expressed with an explicit stack (long postings lists
//! would overflow the call stack). The right sub-range is pushed before the
//! left, so the left pops first and the emission order matches the
//! recursive formulation bit-for-bit.

use crate::{DocId, IndexError, Result};

/// Bits needed for `value`, floored to 1 so a zero still occupies one bit.
fn bit_width(value: u32) -> u32 {
    if value == 0 {
        1
    } else {
        32 - value.leading_zeros()
    }
}

/// MSB-first bit accumulator, zero-padded to a byte boundary on `finish`.
struct BitWriter {
    bytes: Vec<u8>,
    /// Bits used in the final partial byte (0 means byte-aligned).
    used: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            used: 0,
        }
    }

    /// Append the low `width` bits of `value`, most significant first.
    fn put(&mut self, value: u32, width: u32) {
        for shift in (0..width).rev() {
            if self.used == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> shift) & 1) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= bit << (7 - self.used);
            self.used = (self.used + 1) % 8;
        }
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// MSB-first bit cursor over an encoded blob.
struct BitReader<'a> {
    bytes: &'a [u8],
    /// Absolute bit position.
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Read `width` bits, most significant first.
    fn take(&mut self, width: u32) -> Result<u32> {
        if self.pos + width as usize > self.bytes.len() * 8 {
            return Err(IndexError::Codec(
                "interpolative bit stream underflow".into(),
            ));
        }
        let mut value = 0u32;
        for _ in 0..width {
            let bit = (self.bytes[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }
}

pub(super) fn encode(postings: &[DocId]) -> Result<Vec<u8>> {
    super::ensure_strictly_increasing(postings)?;
    if postings.is_empty() {
        return Ok(Vec::new());
    }

    let hi = postings[postings.len() - 1];
    let hi_bits = bit_width(hi);
    if hi_bits > 31 {
        // the preamble length field is 5 bits wide
        return Err(IndexError::Codec(format!(
            "doc id {} needs {} bits, the preamble holds at most 31",
            hi, hi_bits
        )));
    }

    let mut writer = BitWriter::new();
    writer.put(hi_bits, 5);
    writer.put(hi, hi_bits);
    // the largest element is the known upper bound; only the rest is coded
    if postings.len() > 1 {
        encode_body(&mut writer, &postings[..postings.len() - 1], 0, hi);
    }
    Ok(writer.finish())
}

/// Interpolative body over `s`, every element within `[lo, hi]`.
fn encode_body(writer: &mut BitWriter, s: &[DocId], lo: DocId, hi: DocId) {
    // (offset, count, lo, hi); right pushed before left so left pops first
    let mut stack: Vec<(usize, usize, DocId, DocId)> = vec![(0, s.len(), lo, hi)];
    while let Some((offset, n, lo, hi)) = stack.pop() {
        let m = n / 2;
        let x = s[offset + m];
        // values admissible for x once m smaller and n-m-1 larger
        // neighbors are accounted for
        let r = (hi - lo) + 1 - n as u32;
        writer.put(x - lo - m as u32, bit_width(r));

        let right = n - m - 1;
        if right > 0 {
            stack.push((offset + m + 1, right, x + 1, hi));
        }
        if m > 0 {
            stack.push((offset, m, lo, x - 1));
        }
    }
}

pub(super) fn decode(bytes: &[u8], count: usize) -> Result<Vec<DocId>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let mut reader = BitReader::new(bytes);
    let hi_bits = reader.take(5)?;
    let hi = reader.take(hi_bits)?;

    let mut postings = vec![0 as DocId; count];
    if count > 1 {
        decode_body(&mut reader, &mut postings[..count - 1], 0, hi)?;
    }
    postings[count - 1] = hi;
    Ok(postings)
}

/// Mirror of `encode_body`: identical traversal, identical widths.
fn decode_body(reader: &mut BitReader, out: &mut [DocId], lo: DocId, hi: DocId) -> Result<()> {
    let mut stack: Vec<(usize, usize, DocId, DocId)> = vec![(0, out.len(), lo, hi)];
    while let Some((offset, n, lo, hi)) = stack.pop() {
        let m = n / 2;
        // on well-formed input hi - lo >= n - 1; anything else is corruption
        let r = (i64::from(hi) - i64::from(lo)) + 1 - n as i64;
        if r < 0 {
            return Err(IndexError::Codec(
                "interpolative range underflow, blob does not match count".into(),
            ));
        }
        let read = reader.take(bit_width(r as u32))?;
        let x = u64::from(read) + u64::from(lo) + m as u64;
        if x > u64::from(hi) {
            return Err(IndexError::Codec(format!(
                "interpolative value {} exceeds range upper bound {}",
                x, hi
            )));
        }
        let x = x as DocId;
        out[offset + m] = x;

        let right = n - m - 1;
        if right > 0 {
            stack.push((offset + m + 1, right, x + 1, hi));
        }
        if m > 0 {
            stack.push((offset, m, lo, x - 1));
        }
    }
    Ok(())
}
