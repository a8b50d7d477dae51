//! Fixed-layout decoders for values crossing the module boundary
//!
//! The module communicates results as pointers into its own linear memory,
//! laid out by its compiled memory layout rather than any self-describing
//! format. Each decoder here owns one of those layouts: RGB triplets, the
//! palette pointer table returned by `read_img`, the `Point` struct behind
//! `_getPoint`, and the base64 data-URI re-encoding of raw image bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};
use crate::view::MemoryView;

/// Schema tag stamped into slot 2 of the `Point` layout (ASCII "PT01").
///
/// A layout drift between the module and this decoder used to corrupt decoded
/// values without any signal. The tag turns that into a [`HostError::SchemaMismatch`]:
/// modules built against the untagged layout fail loudly instead of decoding
/// garbage.
pub const POINT_SCHEMA_TAG: u32 = u32::from_le_bytes(*b"PT01");

/// Decoded `Point` struct from the module
///
/// Layout, in 4-byte slots from the base pointer: slot 0 = `a`, slot 1 = `b`,
/// slot 2 = schema tag, slot 3 = pointer to the NUL-terminated ASCII name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// First integer field
    pub a: i32,
    /// Second integer field
    pub b: i32,
    /// Name string referenced by the struct
    pub name: String,
}

/// One decoded palette color, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    /// Raw channel values
    pub rgb: [u8; 3],
    /// `#rrggbb` form of the same color
    pub hex: String,
}

impl Swatch {
    /// Build a swatch from raw channels
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Swatch {
            hex: rgb_to_hex(rgb[0], rgb[1], rgb[2]),
            rgb,
        }
    }
}

/// Format RGB channels as a `#rrggbb` hex color, zero-padding each channel
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Decode the tagged `Point` struct at `base`
pub fn decode_point(view: &MemoryView<'_>, base: usize) -> Result<Point> {
    let a = view.read_i32_at(base)?;
    let b = view.read_i32_at(base + 4)?;
    let tag = view.read_u32_at(base + 8)?;
    if tag != POINT_SCHEMA_TAG {
        return Err(HostError::SchemaMismatch {
            expected: POINT_SCHEMA_TAG,
            actual: tag,
        });
    }
    let name_ptr = view.read_u32_at(base + 12)?;
    let name = view.read_cstr_at(name_ptr as usize)?;
    Ok(Point { a, b, name })
}

/// Decode the palette returned by `read_img`
///
/// `ptr` addresses a table of `count` u32 pointers, each to a 3-byte RGB
/// triplet. The legacy harness only ever pulled the first entry out of this
/// table even though the module computes the whole palette; the full walk is
/// the intended contract.
pub fn decode_palette(view: &MemoryView<'_>, ptr: u32, count: usize) -> Result<Vec<[u8; 3]>> {
    let base = ptr as usize;
    let mut colors = Vec::with_capacity(count);
    for i in 0..count {
        let color_ptr = view.read_u32_at(base + i * 4)?;
        colors.push(view.read_rgb_at(color_ptr as usize)?);
    }
    Ok(colors)
}

/// Re-encode raw bytes as a `data:` URI with the given MIME type
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Guess the MIME type of image bytes from their magic number
///
/// The legacy harness labeled everything `image/jpg` no matter what was
/// loaded. Callers that care pass the sniffed type to [`to_data_uri`];
/// callers that need bug-compatible output keep `DEFAULT_IMAGE_MIME`.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
        Some("image/png")
    } else {
        None
    }
}
