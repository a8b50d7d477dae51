//! Host harness for the Distil palette WASM module
//!
//! Distil is an image palette distiller compiled to a standalone `.wasm`
//! artifact. This crate is the embedding side of that contract: it loads an
//! image resource, copies its bytes into the module's linear memory, invokes
//! the exported entry points (`read_img`, `_getPoint`) and decodes the
//! fixed-layout results (RGB palettes, ASCII strings, structs) back into host
//! values for display.
//!
//! # Architecture
//!
//! The pipeline is a strict one-shot sequence:
//! - **loader** fetches the image and module bytes (file or HTTP)
//! - **bridge** allocates a region inside the module and copies bytes in
//! - **module** owns the wasmtime instance and calls its exports
//! - **decode** interprets result pointers against known fixed layouts
//!
//! All reads of module memory go through [`view::MemoryView`], a bounds- and
//! alignment-checked accessor that is re-acquired after every call into the
//! module. Linear memory can grow on any call, so a cached view is a stale
//! view; [`module::DistilModule::with_view`] makes caching impossible.
//!
//! # Example
//!
//! ```rust,ignore
//! use distil_host::{loader, module::DistilModule, pipeline};
//!
//! let wasm = loader::load_resource("distil_wasm.gc.wasm")?;
//! let image = loader::load_resource("photo.jpg")?;
//! let mut module = DistilModule::instantiate(&wasm)?;
//! let swatches = pipeline::distil(&mut module, &image, 8)?;
//! println!("{}", pipeline::render_swatches(&swatches));
//! ```

pub mod bridge;
pub mod decode;
pub mod error;
pub mod loader;
pub mod module;
pub mod pipeline;
pub mod view;

// Re-exports
pub use bridge::{Allocator, BumpAllocator, MemoryHandle};
pub use decode::{Point, Swatch, POINT_SCHEMA_TAG};
pub use error::{HostError, Result};
pub use module::DistilModule;
pub use view::MemoryView;

/// Default file name of the Distil module artifact
pub const DEFAULT_MODULE_FILE: &str = "distil_wasm.gc.wasm";

/// WASM page size in bytes (64KB)
pub const WASM_PAGE_SIZE: usize = 65536;

/// MIME type the legacy harness stamped on every data URI, kept as the
/// compatibility default; see [`decode::sniff_image_mime`] for the accurate one
pub const DEFAULT_IMAGE_MIME: &str = "image/jpg";
