//! Typed, bounds-checked view over WASM linear memory
//!
//! The legacy harness did raw offset arithmetic against a cached typed array:
//! an unaligned offset was silently right-shifted into the wrong slot and a
//! stale buffer reference survived memory growth. `MemoryView` replaces both
//! failure modes with loud errors and a borrow that cannot outlive the call
//! that produced it.

use crate::error::{HostError, Result};

/// Read-only accessor over a snapshot of linear memory.
///
/// A view borrows the memory slice, so it cannot be cached across a call into
/// the module (any such call needs the store mutably). Re-acquire a fresh view
/// after every invocation; see `DistilModule::with_view`.
#[derive(Debug, Clone, Copy)]
pub struct MemoryView<'a> {
    memory: &'a [u8],
}

impl<'a> MemoryView<'a> {
    /// Create a view over a memory snapshot
    pub fn new(memory: &'a [u8]) -> Self {
        MemoryView { memory }
    }

    /// Size of the viewed memory in bytes
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Whether the viewed memory is empty
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn read_bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(HostError::OutOfBounds {
            offset,
            len,
            memory_len: self.memory.len(),
        })?;
        self.memory
            .get(offset..end)
            .ok_or(HostError::OutOfBounds {
                offset,
                len,
                memory_len: self.memory.len(),
            })
    }

    /// Read a little-endian signed 32-bit integer at a 4-byte-aligned offset
    pub fn read_i32_at(&self, offset: usize) -> Result<i32> {
        Ok(self.read_u32_at(offset)? as i32)
    }

    /// Read a little-endian unsigned 32-bit integer at a 4-byte-aligned offset
    ///
    /// Pointers crossing the module boundary are read with this. Unaligned
    /// offsets are an error: the legacy `ptr >> 2` indexing would have
    /// truncated them into a neighboring slot without any signal.
    pub fn read_u32_at(&self, offset: usize) -> Result<u32> {
        if offset % 4 != 0 {
            return Err(HostError::UnalignedRead { offset, align: 4 });
        }
        let bytes = self.read_bytes_at(offset, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read `count` consecutive little-endian i32 values starting at `offset`
    pub fn read_i32_array_at(&self, offset: usize, count: usize) -> Result<Vec<i32>> {
        if offset % 4 != 0 {
            return Err(HostError::UnalignedRead { offset, align: 4 });
        }
        let bytes = self.read_bytes_at(offset, count.saturating_mul(4))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Read `len` bytes as an ASCII string, one char per byte
    ///
    /// Bytes are coerced to chars 0-255 with no encoding validation, matching
    /// the module's string convention (a `String.fromCharCode` loop on the
    /// legacy side).
    pub fn read_ascii_at(&self, offset: usize, len: usize) -> Result<String> {
        let bytes = self.read_bytes_at(offset, len)?;
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    /// Read a NUL-terminated ASCII string starting at `offset`
    ///
    /// Errors if no terminator exists before the end of memory.
    pub fn read_cstr_at(&self, offset: usize) -> Result<String> {
        let tail = self.memory.get(offset..).ok_or(HostError::OutOfBounds {
            offset,
            len: 1,
            memory_len: self.memory.len(),
        })?;
        let nul = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(HostError::UnterminatedString {
                offset,
                limit: tail.len(),
            })?;
        self.read_ascii_at(offset, nul)
    }

    /// Read exactly 3 bytes at `offset` as an RGB triplet
    pub fn read_rgb_at(&self, offset: usize) -> Result<[u8; 3]> {
        let bytes = self.read_bytes_at(offset, 3)?;
        Ok([bytes[0], bytes[1], bytes[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_bytes_bounds_checked() {
        let mem = [1u8, 2, 3, 4];
        let view = MemoryView::new(&mem);

        assert_eq!(view.read_bytes_at(1, 2).unwrap(), &[2, 3]);
        assert!(matches!(
            view.read_bytes_at(2, 3),
            Err(HostError::OutOfBounds { .. })
        ));
        assert!(matches!(
            view.read_bytes_at(usize::MAX, 2),
            Err(HostError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn i32_array_round_trip() {
        let mut mem = Vec::new();
        for v in [1i32, -1, 1000] {
            mem.extend_from_slice(&v.to_le_bytes());
        }
        let view = MemoryView::new(&mem);
        assert_eq!(view.read_i32_array_at(0, 3).unwrap(), vec![1, -1, 1000]);
    }

    #[test]
    fn unaligned_i32_is_an_error() {
        let mem = [0u8; 16];
        let view = MemoryView::new(&mem);
        assert!(matches!(
            view.read_i32_at(3),
            Err(HostError::UnalignedRead { offset: 3, align: 4 })
        ));
        assert!(matches!(
            view.read_i32_array_at(2, 2),
            Err(HostError::UnalignedRead { .. })
        ));
        assert!(view.read_i32_at(8).is_ok());
    }

    #[test]
    fn ascii_decode() {
        let mem = [72u8, 101, 121];
        let view = MemoryView::new(&mem);
        assert_eq!(view.read_ascii_at(0, 3).unwrap(), "Hey");
    }

    #[test]
    fn ascii_decode_coerces_arbitrary_bytes() {
        // No encoding validation: every byte value maps to a char.
        let mem = [0xffu8, 0x00, 0x7f];
        let view = MemoryView::new(&mem);
        let s = view.read_ascii_at(0, 3).unwrap();
        assert_eq!(s.chars().map(|c| c as u32).collect::<Vec<_>>(), vec![255, 0, 127]);
    }

    #[test]
    fn cstr_decode() {
        let mem = [b'P', 0, b'x'];
        let view = MemoryView::new(&mem);
        assert_eq!(view.read_cstr_at(0).unwrap(), "P");

        let unterminated = [b'P', b'x'];
        let view = MemoryView::new(&unterminated);
        assert!(matches!(
            view.read_cstr_at(0),
            Err(HostError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn rgb_triplet() {
        let mem = [10u8, 20, 30, 40];
        let view = MemoryView::new(&mem);
        assert_eq!(view.read_rgb_at(1).unwrap(), [20, 30, 40]);
        assert!(view.read_rgb_at(2).is_err());
    }
}
