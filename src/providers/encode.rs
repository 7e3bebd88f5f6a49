//! Image encoding: uploaded PNG/JPEG bytes → base64 `ImageData` for a VLM.
//!
//! Images that already fit within `max_pixels` on their longest edge are
//! forwarded byte-for-byte with their own MIME type, which keeps JPEG photos
//! small. Larger images are decoded, downscaled and re-encoded as PNG so the
//! resampled text stays crisp.
//!
//! `detail: "high"` asks GPT-4-class models for the full tile set; without
//! it small print and exponents on a scanned exam page are lost.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Prepare an uploaded image for a vision request.
pub fn encode_image(
    bytes: &[u8],
    mime: &str,
    max_pixels: u32,
) -> Result<ImageData, image::ImageError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;

    if width.max(height) <= max_pixels {
        let b64 = STANDARD.encode(bytes);
        debug!("Forwarding {}x{} image as-is ({} bytes base64)", width, height, b64.len());
        return Ok(ImageData::new(b64, mime).with_detail("high"));
    }

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    let resized = img.resize(max_pixels, max_pixels, FilterType::Triangle);
    debug!(
        "Downscaled {}x{} → {}x{}",
        width,
        height,
        resized.width(),
        resized.height()
    );
    encode_png(&resized)
}

/// Encode a decoded image as a base64 PNG.
fn encode_png(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
