//! Image decoding for each resolved source variant.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tokio::io::AsyncReadExt;

use crate::error::DecodeError;
use crate::pipeline::source::ResolvedSource;

/// A decoded image plus the facts the codec established about it.
///
/// Wraps codec state and is owned by the invocation that produced it until
/// it transfers into an [`IdentifiedImage`](crate::message::IdentifiedImage).
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl DecodedImage {
    /// Short lowercase name of the detected format.
    pub fn format_name(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::WebP => "webp",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Ico => "ico",
            ImageFormat::Pnm => "pnm",
            ImageFormat::Avif => "avif",
            _ => "unknown",
        }
    }
}

/// Decode whatever [`resolve`](crate::pipeline::source::resolve) produced.
///
/// A stream source suspends while its bytes are read in; buffer and path
/// sources decode synchronously on the calling task, decode being cheap
/// next to hashing.
pub async fn decode(source: ResolvedSource) -> Result<DecodedImage, DecodeError> {
    match source {
        ResolvedSource::Stream(mut stream) => {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await?;
            decode_bytes(&buf, None)
        }
        ResolvedSource::Bytes(bytes) => decode_bytes(&bytes, None),
        ResolvedSource::Path(path) => {
            let bytes = std::fs::read(&path)?;
            decode_bytes(&bytes, Some(&path))
        }
    }
}

/// Decode from bytes. Format detection is by content, with the path
/// extension as a fallback when the source has one.
fn decode_bytes(bytes: &[u8], path: Option<&Path>) -> Result<DecodedImage, DecodeError> {
    let mut reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

    if reader.format().is_none() {
        if let Some(format) = path.and_then(|p| ImageFormat::from_path(p).ok()) {
            reader.set_format(format);
        }
    }
    let format = reader.format().ok_or(DecodeError::UnknownFormat)?;

    let image = reader.decode().map_err(DecodeError::from_image)?;
    let (width, height) = image.dimensions();

    Ok(DecodedImage {
        image,
        format,
        width,
        height,
    })
}
