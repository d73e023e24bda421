#![deny(missing_docs)]
//! Image types and helpers used by the background estimation pipeline.

/// image representation for intensity processing.
pub mod image;

/// Error types for the image module.
pub mod error;

/// image level operations such as casting.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
