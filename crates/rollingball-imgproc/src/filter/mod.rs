//! Filter operations
//!
//! This module provides filter operations for image processing.

/// Filter operations
mod ops;
pub use ops::*;
