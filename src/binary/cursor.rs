//! Bounds-checked typed reads over a borrowed byte buffer

use crate::error::{Error, Result};

/// Read position over an immutable byte slice
///
/// Every `read_*` method reads at the current position and advances past the
/// value. Reads that would run past the end fail with
/// [`Error::UnexpectedEof`] and leave the position unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor positioned at `offset`
    ///
    /// The offset is not checked until the first read.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, pos: offset }
    }

    /// Create a cursor at a block offset read from a file header
    ///
    /// `None` when the offset is zero, meaning the block is absent, or lies
    /// past the end of `data`.
    pub fn block_at(data: &'a [u8], offset: u32) -> Option<Self> {
        if offset == 0 {
            return None;
        }
        let mut cursor = Self::new(data);
        cursor.seek(usize::try_from(offset).ok()?).ok()?;
        Some(cursor)
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(Error::eof(offset, 0, self.data.len()));
        }
        self.pos = offset;
        Ok(())
    }

    /// Advance past `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Borrow the next `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::eof(self.pos, n, self.data.len()))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a little-endian `u16`
    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a big-endian `u16`
    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a little-endian `u32`
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a big-endian `u32`
    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a little-endian IEEE-754 `f32`
    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }
}

/// Read a little-endian `u32` at `offset` without a cursor
pub fn u32_le_at(data: &[u8], offset: usize) -> Option<u32> {
    ByteCursor::at(data, offset).read_u32_le().ok()
}

/// Read a little-endian `f32` at `offset` without a cursor
pub fn f32_le_at(data: &[u8], offset: usize) -> Option<f32> {
    ByteCursor::at(data, offset).read_f32_le().ok()
}
