//! Screenshot capture adapter.

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};
use transparent_core::capture::{
    CaptureError, CapturePayload, CapturedFrame, ScreenSource, SourceHint,
};
use transparent_core::media;

use super::artifact_store::ArtifactStore;

/// Captures the single available screen as a PNG payload.
pub struct ScreenshotAdapter {
    source: Arc<dyn ScreenSource>,
    store: ArtifactStore,
}

impl ScreenshotAdapter {
    pub fn new(source: Arc<dyn ScreenSource>, store: ArtifactStore) -> Self {
        Self { source, store }
    }

    /// Enumerates sources, captures the only one and persists a copy.
    ///
    /// Fails with [`CaptureError::NoUniqueSource`] before anything is written
    /// when zero or several sources are present.
    pub async fn capture(&self) -> Result<CapturePayload, CaptureError> {
        let sources = self.source.list_sources().await?;
        let [source] = sources.as_slice() else {
            return Err(CaptureError::NoUniqueSource {
                found: sources.len(),
            });
        };

        debug!(source_id = %source.id, source_name = %source.name, "Capturing screen");
        let frame = self.source.capture(source).await?;
        let png = encode_png(frame)?;

        self.store.persist(&png).await;
        info!(size = png.len(), "Screenshot captured");

        Ok(CapturePayload::new(png, media::PNG, SourceHint::Screen))
    }
}

/// Encodes raw frames as PNG and checks that pre-encoded frames really are PNG.
pub fn encode_png(frame: CapturedFrame) -> Result<Vec<u8>, CaptureError> {
    match frame {
        CapturedFrame::Png(bytes) => match image::guess_format(&bytes) {
            Ok(ImageFormat::Png) => Ok(bytes),
            Ok(other) => Err(CaptureError::Encoding(format!(
                "expected a PNG frame, got {:?}",
                other
            ))),
            Err(err) => Err(CaptureError::Encoding(err.to_string())),
        },
        CapturedFrame::Rgba {
            width,
            height,
            pixels,
        } => {
            let buffer = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
                CaptureError::Encoding(format!(
                    "pixel buffer does not match {}x{} RGBA",
                    width, height
                ))
            })?;

            let mut bytes = Vec::new();
            DynamicImage::ImageRgba8(buffer)
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|err| CaptureError::Encoding(err.to_string()))?;
            Ok(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_rgba_frame_is_encoded_as_png() {
        let frame = CapturedFrame::Rgba {
            width: 2,
            height: 2,
            pixels: vec![255; 16],
        };

        let png = encode_png(frame).unwrap();

        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let frame = CapturedFrame::Rgba {
            width: 4,
            height: 4,
            pixels: vec![0; 3],
        };
        assert!(matches!(encode_png(frame), Err(CaptureError::Encoding(_))));
    }

    #[test]
    fn test_non_png_bytes_are_rejected() {
        let frame = CapturedFrame::Png(b"definitely not an image".to_vec());
        assert!(matches!(encode_png(frame), Err(CaptureError::Encoding(_))));
    }
}
