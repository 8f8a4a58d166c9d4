/// Everything that can abort a run. None of these are recovered from.
#[derive(Debug, thiserror::Error)]
pub enum PanoError{
    #[error("Equirect: invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("Equirect: no horizon points were selected")]
    NoHorizonSelected,

    #[error("Equirect: image is already taller ({height}px) than the equirectangular target ({target}px)")]
    ImageAlreadyTooTall{ target: u32, height: u32 },

    #[error("Equirect: invalid horizon point '{0}', expected X,Y")]
    InvalidPoint(String),

    #[error("Equirect: io failure: {0}")]
    Io(String),
}

impl From<image::ImageError> for PanoError{
    fn from(e: image::ImageError) -> Self{
        match e{
            image::ImageError::Unsupported(u) => Self::InvalidImageFormat(u.to_string()),
            e => Self::Io(e.to_string()),
        }
    }
}

impl From<std::io::Error> for PanoError{
    fn from(e: std::io::Error) -> Self{
        Self::Io(e.to_string())
    }
}

/// SDL reports its failures as plain strings.
impl From<String> for PanoError{
    fn from(e: String) -> Self{
        Self::Io(e)
    }
}

pub type PanoResult<T> = Result<T, PanoError>;
