#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// background estimation and subtraction pipeline.
pub mod background;

/// image filtering module.
pub mod filter;

/// morphological operations with the rolling ball structuring element.
pub mod morphology;

/// module containing parallization utilities.
pub mod parallel;
