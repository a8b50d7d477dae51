//! Memory bridge: allocation capability and copy-in
//!
//! Bridges the host heap and the module's linear memory. The module supplies
//! the allocation capability (its `alloc` or `_malloc` export); the bridge
//! copies host bytes into the returned region and hands back a
//! [`MemoryHandle`]. There is no reclaim handshake: once a handle crosses into
//! the module, the module owns the region's lifetime.

use crate::error::{HostError, Result};

/// A region inside the module's linear memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryHandle {
    /// Start offset in linear memory
    pub offset: u32,
    /// Size in bytes
    pub len: u32,
}

impl MemoryHandle {
    /// Create a handle for a region
    pub fn new(offset: u32, len: u32) -> Self {
        MemoryHandle { offset, len }
    }

    /// End offset (exclusive)
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Check if two handles describe overlapping regions
    pub fn overlaps(&self, other: &MemoryHandle) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Allocation capability over a linear memory region.
///
/// One interface regardless of the export naming convention behind it:
/// `DistilModule` implements this over whichever of `alloc` / `_malloc` the
/// module exports, and [`BumpAllocator`] implements it host-side for staging
/// and tests. The returned region is trusted to be valid and non-overlapping
/// with any previously returned one.
pub trait Allocator {
    /// Reserve `len` bytes and return the region's starting offset
    fn allocate(&mut self, len: usize) -> Result<u32>;
}

/// Aligned bump allocator over a fixed-size region
#[derive(Debug, Clone)]
pub struct BumpAllocator {
    total: usize,
    cursor: usize,
    alignment: usize,
}

impl BumpAllocator {
    /// Create an allocator over `total` bytes with the given alignment
    pub fn new(total: usize, alignment: usize) -> Self {
        BumpAllocator {
            total,
            cursor: 0,
            alignment,
        }
    }

    /// Reset the allocator to the start of the region
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.cursor)
    }

    fn align(&self, offset: usize) -> usize {
        (offset + self.alignment - 1) & !(self.alignment - 1)
    }
}

impl Allocator for BumpAllocator {
    fn allocate(&mut self, len: usize) -> Result<u32> {
        let start = self.align(self.cursor);
        let end = start.checked_add(len).ok_or(HostError::AllocationFailed {
            requested: len,
            remaining: self.remaining(),
        })?;
        if end > self.total {
            return Err(HostError::AllocationFailed {
                requested: len,
                remaining: self.remaining(),
            });
        }
        self.cursor = end;
        Ok(start as u32)
    }
}

/// Copy `bytes` into `memory` at `offset` as one bulk operation
///
/// Bounds are checked before any byte moves, so the copy either happens in
/// full or not at all.
pub fn copy_at(memory: &mut [u8], offset: u32, bytes: &[u8]) -> Result<MemoryHandle> {
    let start = offset as usize;
    let end = start
        .checked_add(bytes.len())
        .filter(|&end| end <= memory.len())
        .ok_or(HostError::OutOfBounds {
            offset: start,
            len: bytes.len(),
            memory_len: memory.len(),
        })?;
    memory[start..end].copy_from_slice(bytes);
    Ok(MemoryHandle::new(offset, bytes.len() as u32))
}

/// Allocate a region and copy `bytes` into it
pub fn load_bytes<A: Allocator>(
    allocator: &mut A,
    memory: &mut [u8],
    bytes: &[u8],
) -> Result<MemoryHandle> {
    let offset = allocator.allocate(bytes.len())?;
    copy_at(memory, offset, bytes)
}
