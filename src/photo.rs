//! Photo source boundary.
//!
//! The assemblers ask a [`PhotoSource`] for the owner/driver portraits. Any
//! failure (missing reference, missing file, unreadable or undecodable bytes)
//! is reported as a [`PhotoError`] and handled by falling back to a text-only
//! story block.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::error::PhotoError;

/// A decoded-and-validated photo ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Original encoded bytes (PNG or JPEG).
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub px_width: u32,
    pub px_height: u32,
}

impl Photo {
    /// Validate `bytes` by decoding them and record the pixel size.
    pub fn from_bytes(bytes: Vec<u8>, origin: &Path) -> Result<Self, PhotoError> {
        let format = ::image::guess_format(&bytes).map_err(|source| PhotoError::Decode {
            path: origin.to_path_buf(),
            source,
        })?;
        let decoded =
            ::image::load_from_memory_with_format(&bytes, format).map_err(|source| {
                PhotoError::Decode {
                    path: origin.to_path_buf(),
                    source,
                }
            })?;
        let mime = match format {
            ::image::ImageFormat::Jpeg => "image/jpeg",
            _ => "image/png",
        };
        Ok(Self {
            px_width: decoded.width(),
            px_height: decoded.height(),
            mime,
            bytes,
        })
    }

    /// `data:<mime>;base64,...` form, as stored in a layout config.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64_STD.encode(&self.bytes))
    }
}

/// Lookup of photos by reference.
pub trait PhotoSource: Send + Sync {
    fn load(&self, reference: &str) -> Result<Photo, PhotoError>;
}

/// Loads photos from the local filesystem.
///
/// Relative references are resolved against `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FsPhotoSource {
    base_dir: Option<PathBuf>,
}

impl FsPhotoSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl PhotoSource for FsPhotoSource {
    fn load(&self, reference: &str) -> Result<Photo, PhotoError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(PhotoError::MissingReference);
        }
        let path = self.resolve(reference);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PhotoError::NotFound(path));
            }
            Err(source) => return Err(PhotoError::Unreadable { path, source }),
        };
        Photo::from_bytes(bytes, &path)
    }
}

/// A source with no photos at all; every lookup is "not found".
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPhotos;

impl PhotoSource for NoPhotos {
    fn load(&self, reference: &str) -> Result<Photo, PhotoError> {
        Err(PhotoError::NotFound(PathBuf::from(reference)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 1×1 transparent PNG.
    pub(crate) const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64,
        0xF8, 0xCF, 0x50, 0x0F, 0x00, 0x03, 0x86, 0x01, 0x80, 0x5A, 0x34, 0x7D, 0x6B, 0x00, 0x00,
        0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn decodes_png_bytes() {
        let photo = Photo::from_bytes(TINY_PNG.to_vec(), Path::new("tiny.png")).unwrap();
        assert_eq!((photo.px_width, photo.px_height), (1, 1));
        assert_eq!(photo.mime, "image/png");
        assert!(photo.to_data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = Photo::from_bytes(b"not an image".to_vec(), Path::new("x.jpg")).unwrap_err();
        assert!(matches!(err, PhotoError::Decode { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let src = FsPhotoSource::new();
        let err = src.load("/definitely/not/here/owner.jpg").unwrap_err();
        assert!(matches!(err, PhotoError::NotFound(_)));
    }

    #[test]
    fn blank_reference_is_missing() {
        let src = FsPhotoSource::new();
        assert!(matches!(src.load("  "), Err(PhotoError::MissingReference)));
    }

    #[test]
    fn relative_references_use_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("owner.png"), TINY_PNG).unwrap();

        let src = FsPhotoSource::with_base_dir(dir.path());
        let photo = src.load("owner.png").unwrap();
        assert_eq!(photo.px_width, 1);
    }

    #[test]
    fn no_photos_never_loads() {
        assert!(NoPhotos.load("anything.png").is_err());
    }
}
