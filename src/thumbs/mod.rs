/// Thumbnail cache
///
/// Content-addressed file cache on local scratch storage, keyed by a digest
/// of the asset locator. Entries are immutable once written: a hit returns
/// the existing file with no revalidation, a miss is simply an absent file.
/// Generation failures are `None`, never errors: a listing must survive
/// any number of missing thumbnails.

pub mod decoder;

use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::catalog::MediaKind;
use crate::error::{GalleryError, GalleryResult};

pub use decoder::{ImageRsDecoder, ThumbnailDecoder};

/// Edge of the square requested from a native video-thumbnail primitive
pub const THUMBNAIL_SIZE: u32 = 512;

/// Fixed downsample factor for image decodes (bounded memory)
const IMAGE_DOWNSAMPLE: u32 = 4;

/// Fixed JPEG quality for persisted thumbnails
const JPEG_QUALITY: u8 = 85;

pub struct ThumbnailCache<D> {
    cache_dir: PathBuf,
    decoder: D,
}

impl<D: ThumbnailDecoder> ThumbnailCache<D> {
    /// Cache under the user's scratch directory:
    /// ~/.cache/gallery-core/thumbnails on Linux.
    pub fn new(decoder: D) -> GalleryResult<Self> {
        let mut dir = dirs_next::cache_dir()
            .or_else(dirs_next::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        dir.push("gallery-core");
        dir.push("thumbnails");
        Self::in_dir(dir, decoder)
    }

    /// Cache under an explicit directory (created if missing)
    pub fn in_dir(cache_dir: PathBuf, decoder: D) -> GalleryResult<Self> {
        fs::create_dir_all(&cache_dir)
            .map_err(|e| GalleryError::SideState(format!("create thumbnail cache dir: {e}")))?;
        Ok(ThumbnailCache { cache_dir, decoder })
    }

    /// Deterministic cache location for a locator (does not generate)
    pub fn cache_path(&self, asset_uri: &str) -> PathBuf {
        let digest = Sha256::digest(asset_uri.as_bytes());
        self.cache_dir.join(format!("thumb_{:x}.jpg", digest))
    }

    /// Return the cached thumbnail for an asset, generating it on miss.
    /// `None` means "unavailable", not failure of the surrounding listing.
    pub fn get_or_create(&self, asset_uri: &str, kind: MediaKind) -> Option<PathBuf> {
        let path = self.cache_path(asset_uri);
        if path.exists() {
            return Some(path);
        }

        let bitmap = match kind {
            MediaKind::Image => self.decoder.decode_image(asset_uri, IMAGE_DOWNSAMPLE)?,
            MediaKind::Video => {
                if self.decoder.supports_video_thumbnail() {
                    self.decoder
                        .video_thumbnail(asset_uri, THUMBNAIL_SIZE, THUMBNAIL_SIZE)?
                } else {
                    self.decoder.representative_frame(asset_uri)?
                }
            }
        };

        let bytes = self.decoder.encode_jpeg(&bitmap, JPEG_QUALITY)?;

        // All-or-nothing: no reader may ever observe a partial file at the
        // final path, so write fully to a sibling and rename into place.
        let tmp = path.with_extension("jpg.tmp");
        fs::write(&tmp, &bytes).ok()?;
        if fs::rename(&tmp, &path).is_err() {
            let _ = fs::remove_file(&tmp);
            return None;
        }
        Some(path)
    }
}
