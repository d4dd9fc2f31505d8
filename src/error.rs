use std::path::PathBuf;

use thiserror::Error;

/// An order record could not be read.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("invalid order JSON: {0}")]
    /// [serde_json] rejected the input
    Json(#[from] serde_json::Error),
}

/// A photo reference could not be turned into an embeddable image.
///
/// The assemblers never propagate this; it only selects the text-only
/// variant of a story card.
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("no photo reference given")]
    MissingReference,

    #[error("photo not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("photo unreadable: {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("photo could not be decoded: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// All errors a render call can surface to the caller.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("layout failed: {0}")]
    Layout(String),

    #[error(transparent)]
    /// An I/O error occurred while writing the output
    Io(#[from] std::io::Error),

    #[error("could not move finished document into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl From<taffy::TaffyError> for RenderError {
    fn from(e: taffy::TaffyError) -> Self {
        RenderError::Layout(e.to_string())
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
