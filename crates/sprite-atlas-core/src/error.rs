use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid settings: {0}")]
    InvalidConfig(String),
    #[error("Elements do not fit within the maximum atlas size")]
    OutOfSpace,
    #[error("Packing produced {0} bins; only single-bin layouts are accepted")]
    MultiBin(usize),
    #[error("Atlas has no storage destination yet")]
    NoDestination,
    #[error("Nothing to pack")]
    Empty,
}

pub type Result<T> = std::result::Result<T, AtlasError>;
