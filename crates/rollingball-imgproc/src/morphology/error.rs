use rollingball_image::ImageError;

/// Errors related to the rolling ball operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MorphologyError {
    /// The ball radius must be finite and strictly positive.
    #[error("Ball radius must be a positive finite number, got {0}")]
    InvalidRadius(f32),

    /// An error coming from the image containers.
    #[error(transparent)]
    Image(#[from] ImageError),
}
