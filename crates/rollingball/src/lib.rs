#![doc = include_str!("../README.md")]

#[doc(inline)]
pub use rollingball_image as image;

#[doc(inline)]
pub use rollingball_imgproc as imgproc;
