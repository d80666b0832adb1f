use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Invalid resolution: {0} (must be finite and > 0)")]
    InvalidResolution(f32),

    #[error("Invalid extent: half_width={half_width}, half_height={half_height}")]
    InvalidExtent { half_width: f32, half_height: f32 },

    #[error("Grid too large: {width}x{height} cells (limit {limit} cells)")]
    GridTooLarge { width: f32, height: f32, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;
