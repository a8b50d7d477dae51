//! Error types for the host harness

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Main error type for the host harness
///
/// The legacy harness had no error taxonomy at all: layout mismatches decoded
/// garbage silently and everything else surfaced as an unhandled host failure.
/// Every one of those categories is a loud variant here.
#[derive(Error, Debug)]
pub enum HostError {
    /// Filesystem I/O failure while loading a resource
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network fetch failure (transport error or non-success status)
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        /// Resource locator that failed
        url: String,
        /// Transport-level description
        message: String,
    },

    /// Memory access outside the linear memory bounds
    #[error("out of bounds read: offset={offset}, len={len}, memory={memory_len}")]
    OutOfBounds {
        /// Start offset of the attempted access
        offset: usize,
        /// Length of the attempted access
        len: usize,
        /// Size of the memory at the time of the access
        memory_len: usize,
    },

    /// Multi-byte read at an offset that is not aligned for the value type
    #[error("unaligned read: offset {offset} is not {align}-byte aligned")]
    UnalignedRead {
        /// Offending byte offset
        offset: usize,
        /// Required alignment
        align: usize,
    },

    /// NUL-terminated string read ran off the end of memory
    #[error("string at offset {offset} has no terminator within {limit} bytes")]
    UnterminatedString {
        /// Start offset of the string
        offset: usize,
        /// Bytes scanned before giving up
        limit: usize,
    },

    /// The allocation capability could not satisfy a request
    #[error("allocation failed: {requested} bytes requested, {remaining} available")]
    AllocationFailed {
        /// Requested size in bytes
        requested: usize,
        /// Bytes still available in the region
        remaining: usize,
    },

    /// A required module export is absent
    #[error("module export not found: {name}")]
    MissingExport {
        /// Export name (or the naming conventions tried, slash-separated)
        name: String,
    },

    /// The module imports something the harness cannot provide
    #[error("unsupported import: {module}::{name} ({kind})")]
    UnsupportedImport {
        /// Import module namespace
        module: String,
        /// Import name
        name: String,
        /// Kind of the import (memory, table, global, exotic function type)
        kind: String,
    },

    /// Fixed-layout struct did not carry the expected schema tag
    #[error("schema tag mismatch: expected {expected:#010x}, got {actual:#010x}")]
    SchemaMismatch {
        /// Tag the decoder requires
        expected: u32,
        /// Tag found in memory
        actual: u32,
    },

    /// wasmtime-level failure: compilation, instantiation, or a trap
    #[error("wasm module error: {0}")]
    Module(String),
}

impl From<wasmtime::Error> for HostError {
    fn from(err: wasmtime::Error) -> Self {
        HostError::Module(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_offsets() {
        let err = HostError::OutOfBounds {
            offset: 100,
            len: 64,
            memory_len: 128,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("64"));

        let err = HostError::UnalignedRead {
            offset: 3,
            align: 4,
        };
        assert!(err.to_string().contains("not 4-byte aligned"));
    }

    #[test]
    fn schema_mismatch_is_hex() {
        let err = HostError::SchemaMismatch {
            expected: 0x31305450,
            actual: 0,
        };
        assert!(err.to_string().contains("0x31305450"));
    }
}
