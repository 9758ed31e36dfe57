//! Forward-only cursor over the `.mrf` binary payload stream.
//!
//! # Block Structure
//! ```text
//! [8 bytes] Body length in bytes (u64, PayloadByteOrder)
//! [N bytes] Body
//! ```
//!
//! Blocks carry no type tag. The i-th block belongs to the i-th
//! binary-bearing property announced by the index stream, so every block
//! must be consumed in full whether or not it is decoded.

use std::io::{self, BufRead, Read};

use byteorder::{BigEndian, ByteOrder};
use log::trace;

use crate::stars::types::error::{Result, StarsError};

/// Byte order of every length prefix and float in the payload stream.
///
/// The simulator writes big-endian regardless of the host it runs on.
pub type PayloadByteOrder = BigEndian;

/// Width of the block length prefix.
pub const LENGTH_PREFIX_WIDTH: u64 = 8;

/// Width of one encoded float64.
pub const F64_WIDTH: usize = 8;

/// Largest vector width whose byte length still fits in `usize`.
pub const MAX_F64_COUNT: usize = usize::MAX / F64_WIDTH;

/// Upper bound for the initial buffer reservation, so a corrupt length
/// prefix cannot trigger a huge allocation before the read fails.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Decodes `count` float64 values from `raw`.
///
/// Fails with [`StarsError::TruncatedBinary`] unless `raw` is exactly
/// `count * 8` bytes long. The reported offset is relative to `raw`.
pub fn decode_f64_array(raw: &[u8], count: usize) -> Result<Vec<f64>> {
    let expected = (count as u64).saturating_mul(F64_WIDTH as u64);
    if raw.len() as u64 != expected {
        return Err(StarsError::TruncatedBinary {
            context: format!("float64 array of {} values", count),
            offset: 0,
            expected,
            found: raw.len() as u64,
        });
    }
    let mut values = vec![0f64; count];
    PayloadByteOrder::read_f64_into(raw, &mut values);
    Ok(values)
}

/// Sequential reader over length-prefixed payload blocks.
///
/// Tracks the absolute byte offset so errors can point at the exact spot
/// where the stream stopped matching the index.
#[derive(Debug)]
pub struct BinaryPayloadReader<R> {
    inner: R,
    offset: u64,
    /// Offset of the body of the most recently read block.
    block_offset: u64,
}

impl<R: BufRead> BinaryPayloadReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            block_offset: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads exactly `n_bytes` raw bytes.
    pub fn read_exact(&mut self, n_bytes: u64) -> Result<Vec<u8>> {
        self.read_exact_for(n_bytes, "raw read")
    }

    fn read_exact_for(&mut self, n_bytes: u64, context: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n_bytes.min(MAX_PREALLOCATION) as usize);
        let found = (&mut self.inner).take(n_bytes).read_to_end(&mut buf)? as u64;
        if found != n_bytes {
            return Err(StarsError::TruncatedBinary {
                context: context.to_string(),
                offset: self.offset,
                expected: n_bytes,
                found,
            });
        }
        self.offset += n_bytes;
        Ok(buf)
    }

    fn read_length_prefix(&mut self) -> Result<u64> {
        let prefix = self.read_exact_for(LENGTH_PREFIX_WIDTH, "block length prefix")?;
        Ok(PayloadByteOrder::read_u64(&prefix))
    }

    /// Reads one block and returns its body.
    pub fn read_length_prefixed_block(&mut self) -> Result<Vec<u8>> {
        let declared = self.read_length_prefix()?;
        self.block_offset = self.offset;
        trace!("Reading payload block: offset={}, length={} bytes", self.block_offset, declared);
        self.read_exact_for(declared, "block body")
    }

    /// Consumes one block without buffering its body. Returns the body length.
    pub fn skip_length_prefixed_block(&mut self) -> Result<u64> {
        let declared = self.read_length_prefix()?;
        self.block_offset = self.offset;
        trace!("Skipping payload block: offset={}, length={} bytes", self.block_offset, declared);
        let skipped = io::copy(&mut (&mut self.inner).take(declared), &mut io::sink())?;
        if skipped != declared {
            return Err(StarsError::TruncatedBinary {
                context: "skipped block body".to_string(),
                offset: self.offset,
                expected: declared,
                found: skipped,
            });
        }
        self.offset += declared;
        Ok(declared)
    }

    /// Consumes `count` consecutive blocks without decoding them.
    pub fn skip_blocks(&mut self, count: usize) -> Result<u64> {
        let mut total = 0;
        for _ in 0..count {
            total += self.skip_length_prefixed_block()?;
        }
        Ok(total)
    }

    /// Decodes `count` float64 values from the body of the last block read.
    ///
    /// Same contract as the free [`decode_f64_array`], with the error offset
    /// rebased onto the stream.
    pub fn decode_f64_array(&self, raw: &[u8], count: usize) -> Result<Vec<f64>> {
        decode_f64_array(raw, count).map_err(|e| match e {
            StarsError::TruncatedBinary {
                context,
                expected,
                found,
                ..
            } => StarsError::TruncatedBinary {
                context,
                offset: self.block_offset,
                expected,
                found,
            },
            other => other,
        })
    }

    /// Offset of the body of the most recently read or skipped block.
    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }

    /// True once every byte of the stream has been consumed.
    pub fn at_end(&mut self) -> Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    /// Consumes and counts whatever is left in the stream.
    pub fn drain_remaining(&mut self) -> Result<u64> {
        let trailing = io::copy(&mut self.inner, &mut io::sink())?;
        self.offset += trailing;
        Ok(trailing)
    }
}
