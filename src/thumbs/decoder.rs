/// Image decoder boundary
///
/// Decode/encode work is external capability: hosts differ in what they can
/// do (some have a native "video thumbnail at size" primitive, some only a
/// frame extractor). The cache asks the decoder what it supports and picks
/// the tier accordingly.

use std::io::Cursor;
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

pub trait ThumbnailDecoder: Send + Sync {
    /// Decode an image asset at roughly 1/`downsample` of its dimensions
    /// (bounded memory); `None` on any failure.
    fn decode_image(&self, locator: &str, downsample: u32) -> Option<DynamicImage>;

    /// Whether the host has a native sized video-thumbnail primitive.
    /// When false, the cache falls back to `representative_frame`.
    fn supports_video_thumbnail(&self) -> bool;

    /// Native sized video thumbnail; only called when supported.
    fn video_thumbnail(&self, locator: &str, width: u32, height: u32) -> Option<DynamicImage>;

    /// Legacy fallback: one representative decoded frame of a video.
    fn representative_frame(&self, locator: &str) -> Option<DynamicImage>;

    /// Encode a bitmap to lossy JPEG at the given quality; `None` on failure.
    fn encode_jpeg(&self, bitmap: &DynamicImage, quality: u8) -> Option<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
        bitmap.to_rgb8().write_with_encoder(encoder).ok()?;
        Some(bytes)
    }
}

/// Production decoder built on the `image` crate. Handles file-backed
/// locators only; synthesized `media://` locators have no byte source here
/// and decode to `None`.
#[derive(Default)]
pub struct ImageRsDecoder;

impl ImageRsDecoder {
    pub fn new() -> Self {
        ImageRsDecoder
    }

    fn locator_path(locator: &str) -> Option<PathBuf> {
        if let Some(path) = locator.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if locator.contains("://") {
            return None;
        }
        Some(PathBuf::from(locator))
    }
}

impl ThumbnailDecoder for ImageRsDecoder {
    fn decode_image(&self, locator: &str, downsample: u32) -> Option<DynamicImage> {
        let path = Self::locator_path(locator)?;
        let bytes = std::fs::read(path).ok()?;
        let full = image::load_from_memory(&bytes).ok()?;

        let factor = downsample.max(1);
        let w = (full.width() / factor).max(1);
        let h = (full.height() / factor).max(1);
        Some(full.thumbnail(w, h))
    }

    fn supports_video_thumbnail(&self) -> bool {
        // No native video pipeline on this host
        false
    }

    fn video_thumbnail(&self, _locator: &str, _width: u32, _height: u32) -> Option<DynamicImage> {
        None
    }

    fn representative_frame(&self, locator: &str) -> Option<DynamicImage> {
        // Video containers commonly embed a cover JPEG; scanning for the
        // largest SOI..EOI span recovers it without a video decoder.
        let path = Self::locator_path(locator)?;
        let bytes = std::fs::read(path).ok()?;
        let jpeg = scan_for_largest_jpeg(&bytes)?;
        image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).ok()
    }
}

/// Scan a buffer for JPEG start/end markers and return the largest span
fn scan_for_largest_jpeg(buffer: &[u8]) -> Option<Vec<u8>> {
    let jpeg_start = b"\xff\xd8\xff"; // SOI
    let jpeg_end = b"\xff\xd9"; // EOI

    let mut largest: Option<Vec<u8>> = None;
    let mut largest_size = 0;

    let mut pos = 0;
    while pos + 3 < buffer.len() {
        if buffer[pos..].starts_with(jpeg_start) {
            if let Some(end) = buffer[pos..]
                .windows(2)
                .position(|w| w == jpeg_end)
                .map(|p| pos + p + 2)
            {
                let size = end - pos;
                if size > largest_size {
                    largest_size = size;
                    largest = Some(buffer[pos..end].to_vec());
                }
                pos = end;
            } else {
                pos += 1;
            }
        } else {
            pos += 1;
        }
    }

    largest
}
