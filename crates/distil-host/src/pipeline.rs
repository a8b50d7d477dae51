//! One-shot distil pipeline: load, marshal, invoke, decode
//!
//! Stages run in strict sequence; each stage's output is the next stage's
//! input and every failure propagates immediately. Nothing is retried.

use crate::decode::{self, Swatch};
use crate::error::Result;
use crate::module::DistilModule;

/// Run the full pipeline against an already instantiated module
///
/// Copies `image_bytes` into the module, calls `read_img` asking for
/// `palette_size` colors, and decodes the resulting pointer table into
/// swatches. The decode happens under a view acquired after the call, so the
/// result pointer is always read against the current memory, even if the
/// invocation grew it.
pub fn distil(
    module: &mut DistilModule,
    image_bytes: &[u8],
    palette_size: usize,
) -> Result<Vec<Swatch>> {
    tracing::debug!(len = image_bytes.len(), "copying image into module memory");
    let handle = module.load_bytes(image_bytes)?;

    tracing::debug!(offset = handle.offset, palette_size, "invoking read_img");
    let palette_ptr = module.read_img(handle, palette_size as u32)?;

    module.with_view(|view| {
        let colors = decode::decode_palette(view, palette_ptr, palette_size)?;
        Ok(colors.into_iter().map(Swatch::from_rgb).collect())
    })
}

/// Render swatches as the display fragment the host page consumes
///
/// One `div.sample` per swatch, background-colored with the hex value. The
/// caller replaces its previous fragment wholesale, which is what clears the
/// prior render.
pub fn render_swatches(swatches: &[Swatch]) -> String {
    let mut html = String::with_capacity(swatches.len() * 64);
    for swatch in swatches {
        html.push_str(&format!(
            "<div class=\"sample\" style=\"background-color: {}\"></div>\n",
            swatch.hex
        ));
    }
    html
}
