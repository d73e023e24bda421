//! Morphological operations with a spherical structuring element.
//!
//! The background of an image is estimated as the grayscale opening of the
//! intensity surface by a discretized sphere cap: the highest surface that can
//! be reached from below by a ball without poking through the data.

/// Error types used by the rolling ball operations.
pub mod error;
pub use error::MorphologyError;

/// The spherical structuring element.
pub mod kernel;
pub use kernel::RollingBall;

/// Cyclic buffer of source rows used by the sliding footprint.
pub mod row_cache;
pub use row_cache::RowCache;

/// The rolling ball opening.
mod rolling_ball;
pub use rolling_ball::roll_ball;
