//! Background estimation and subtraction with a rolling ball.
//!
//! The pipeline converts the 8-bit input to a float working image, inverts it
//! for light backgrounds so the background is always the lower envelope,
//! optionally smooths it, rolls the ball beneath it and recombines the
//! estimated surface with the original samples.
//!
//! The background surface handed between the steps is always expressed in the
//! working domain, i.e. negated when `light_background` is set. The consumers
//! of the surface undo the inversion themselves.

use rollingball_image::{ops::cast_and_scale, Image, ImageError};

use crate::filter::mean_filter;
use crate::morphology::{roll_ball, MorphologyError, RollingBall};
use crate::parallel;

/// Parameters of the rolling ball background subtraction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollingBallConfig {
    /// Radius of the ball in pixels. Features smaller than the ball are
    /// treated as foreground.
    pub radius: f32,
    /// Whether the background is brighter than the objects.
    pub light_background: bool,
    /// Whether to smooth the image with a mean filter before rolling the ball.
    pub smoothing: bool,
    /// Side of the smoothing window. Must be odd.
    pub smoothing_window: usize,
    /// Output the background itself instead of the corrected image.
    pub create_background: bool,
}

impl Default for RollingBallConfig {
    fn default() -> Self {
        Self {
            radius: 50.0,
            light_background: false,
            smoothing: true,
            smoothing_window: 3,
            create_background: false,
        }
    }
}

impl RollingBallConfig {
    /// Create a configuration with the given ball radius and default options.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    /// Set whether the background is brighter than the objects.
    pub fn with_light_background(mut self, light_background: bool) -> Self {
        self.light_background = light_background;
        self
    }

    /// Enable or disable the smoothing pre-pass.
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the side of the smoothing window.
    pub fn with_smoothing_window(mut self, smoothing_window: usize) -> Self {
        self.smoothing_window = smoothing_window;
        self
    }

    /// Output the estimated background instead of the corrected image.
    pub fn with_create_background(mut self, create_background: bool) -> Self {
        self.create_background = create_background;
        self
    }

    /// Check the parameters before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::InvalidRadius`] for a non-positive or
    /// non-finite radius and [`ImageError::InvalidKernelSize`] for a zero or
    /// even smoothing window when smoothing is enabled.
    pub fn validate(&self) -> Result<(), MorphologyError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(MorphologyError::InvalidRadius(self.radius));
        }

        if self.smoothing && (self.smoothing_window == 0 || self.smoothing_window % 2 == 0) {
            return Err(ImageError::InvalidKernelSize(self.smoothing_window).into());
        }

        Ok(())
    }
}

fn check_same_size<T, U>(src: &Image<T, 1>, dst: &Image<U, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }
    Ok(())
}

/// Prepare the working image fed to [`roll_ball`].
///
/// Negates every sample when `light_background` is set and then, if a
/// smoothing window is given, applies a [`mean_filter`] of that size.
///
/// # Arguments
///
/// * `src` - The float image with shape (H, W, 1).
/// * `dst` - The working image with shape (H, W, 1).
/// * `light_background` - Whether to invert the samples.
/// * `smoothing_window` - The side of the mean filter window, if any.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size or the window is invalid.
pub fn preprocess(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    light_background: bool,
    smoothing_window: Option<usize>,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let sign = if light_background { -1.0 } else { 1.0 };

    match smoothing_window {
        Some(window) => {
            let mut inverted = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
            parallel::par_iter_rows_val(src, &mut inverted, |&s, d| *d = sign * s);
            mean_filter(&inverted, dst, window)?;
        }
        None => parallel::par_iter_rows_val(src, dst, |&s, d| *d = sign * s),
    }

    Ok(())
}

/// Estimate the background surface of an 8-bit image.
///
/// The returned surface is in the working domain: it is negated when
/// `config.light_background` is set. Pass it as is to
/// [`subtract_background`] or [`render_background`].
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the image is empty or
/// `src` and `dst` differ in size.
///
/// # Examples
///
/// ```
/// use rollingball_image::Image;
/// use rollingball_imgproc::background::{estimate_background, RollingBallConfig};
///
/// let src = Image::<u8, 1>::from_size_val([8, 8].into(), 100).unwrap();
/// let mut background = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// let config = RollingBallConfig::new(5.0).with_smoothing(false);
/// estimate_background(&src, &config, &mut background).unwrap();
///
/// assert!(background.as_slice().iter().all(|&v| (v - 100.0).abs() < 1e-4));
/// ```
pub fn estimate_background(
    src: &Image<u8, 1>,
    config: &RollingBallConfig,
    dst: &mut Image<f32, 1>,
) -> Result<(), MorphologyError> {
    config.validate()?;
    check_same_size(src, dst)?;

    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.width(), src.height()).into());
    }

    let ball = RollingBall::new(config.radius)?;

    let mut float_image = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    cast_and_scale(src, &mut float_image, 1.0)?;

    let smoothing_window = config.smoothing.then_some(config.smoothing_window);
    let mut working = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    preprocess(
        &float_image,
        &mut working,
        config.light_background,
        smoothing_window,
    )?;
    log::trace!(
        "preprocessed {} (inverted: {}, smoothing: {:?})",
        src.size(),
        config.light_background,
        smoothing_window
    );

    roll_ball(&working, &ball, dst)?;

    Ok(())
}

/// Subtract the background surface from the original image.
///
/// Undoes the inversion of the surface when `light_background` is set and
/// computes `original - (background + 255) + offset`, with an offset of 255.5
/// for light backgrounds and 0.5 otherwise. The result is clamped to
/// `[0, 255]` and truncated. A flat field maps to 0 in both modes.
///
/// # Arguments
///
/// * `src` - The original 8-bit image.
/// * `background` - The surface from [`estimate_background`], in the working domain.
/// * `light_background` - Whether the surface was estimated on the inverted image.
/// * `dst` - The corrected 8-bit image.
///
/// # Errors
///
/// Returns an error if the three images differ in size.
pub fn subtract_background(
    src: &Image<u8, 1>,
    background: &Image<f32, 1>,
    light_background: bool,
    dst: &mut Image<u8, 1>,
) -> Result<(), ImageError> {
    check_same_size(src, background)?;
    check_same_size(src, dst)?;

    let (sign, offset) = if light_background {
        (-1.0, 255.5)
    } else {
        (1.0, 0.5)
    };

    parallel::par_iter_rows_val_two(src, background, dst, |&original, &surface, out| {
        let restored = sign * surface;
        let value = original as f32 - (restored + 255.0) + offset;
        *out = value.clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Convert the background surface to an 8-bit image.
///
/// Undoes the inversion of the surface when `light_background` is set and
/// rounds it to the nearest 8-bit value.
///
/// # Errors
///
/// Returns an error if `background` and `dst` differ in size.
pub fn render_background(
    background: &Image<f32, 1>,
    light_background: bool,
    dst: &mut Image<u8, 1>,
) -> Result<(), ImageError> {
    check_same_size(background, dst)?;

    let sign = if light_background { -1.0 } else { 1.0 };

    parallel::par_iter_rows_val(background, dst, |&surface, out| {
        *out = (sign * surface + 0.5).clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Remove the smooth background of an 8-bit greyscale image.
///
/// Runs the full pipeline: preprocessing, rolling ball estimation and either
/// subtraction or, with `config.create_background`, rendering of the
/// background itself.
///
/// # Arguments
///
/// * `src` - The original 8-bit image with shape (H, W, 1).
/// * `config` - The pipeline parameters.
/// * `dst` - The output 8-bit image with shape (H, W, 1).
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the image is empty or
/// `src` and `dst` differ in size. Nothing is written to `dst` on error.
///
/// # Examples
///
/// ```
/// use rollingball_image::Image;
/// use rollingball_imgproc::background::{rolling_ball_background, RollingBallConfig};
///
/// // a dark ramp
/// let size = [16, 16].into();
/// let data = (0..16 * 16).map(|i| ((i % 16) * 4) as u8).collect();
/// let src = Image::<u8, 1>::new(size, data).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// let config = RollingBallConfig::new(6.0)
///     .with_smoothing(false)
///     .with_create_background(true);
/// rolling_ball_background(&src, &config, &mut dst).unwrap();
///
/// // a ramp is smooth enough to be all background
/// assert_eq!(dst, src);
///
/// rolling_ball_background(&src, &config.with_create_background(false), &mut dst).unwrap();
/// assert!(dst.as_slice().iter().all(|&v| v == 0));
/// /// ```
pub fn rolling_ball_background(
    src: &Image<u8, 1>,
    config: &RollingBallConfig,
    dst: &mut Image<u8, 1>,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;

    log::debug!("rolling ball background on {} with {:?}", src.size(), config);

    let mut background = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    estimate_background(src, config, &mut background)?;

    if config.create_background {
        render_background(&background, config.light_background, dst)?;
    } else {
        subtract_background(src, &background, config.light_background, dst)?;
    }

    log::debug!("rolling ball background done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_builder() {
        let config = RollingBallConfig::default();
        assert_eq!(config.radius, 50.0);
        assert!(!config.light_background);
        assert!(config.smoothing);
        assert_eq!(config.smoothing_window, 3);
        assert!(!config.create_background);

        let config = RollingBallConfig::new(12.5)
            .with_light_background(true)
            .with_smoothing(false)
            .with_smoothing_window(5)
            .with_create_background(true);
        assert_eq!(config.radius, 12.5);
        assert!(config.light_background);
        assert!(!config.smoothing);
        assert_eq!(config.smoothing_window, 5);
        assert!(config.create_background);
    }

    #[test]
    fn test_config_validate() {
        assert_eq!(RollingBallConfig::new(1.0).validate(), Ok(()));
        assert_eq!(
            RollingBallConfig::new(0.0).validate(),
            Err(MorphologyError::InvalidRadius(0.0))
        );
        assert_eq!(
            RollingBallConfig::new(5.0)
                .with_smoothing_window(2)
                .validate(),
            Err(MorphologyError::Image(ImageError::InvalidKernelSize(2)))
        );
        // the window is ignored without smoothing
        assert_eq!(
            RollingBallConfig::new(5.0)
                .with_smoothing(false)
                .with_smoothing_window(2)
                .validate(),
            Ok(())
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde() -> Result<(), serde_json::Error> {
        let config = RollingBallConfig::new(20.0).with_light_background(true);
        let json = serde_json::to_string(&config)?;
        let decoded: RollingBallConfig = serde_json::from_str(&json)?;
        assert_eq!(decoded, config);
        Ok(())
    }

    #[test]
    fn test_preprocess_invert() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 10.0, 255.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

        preprocess(&src, &mut dst, true, None)?;
        assert_eq!(dst.as_slice(), &[-0.0, -10.0, -255.0]);

        preprocess(&src, &mut dst, false, None)?;
        assert_eq!(dst.as_slice(), src.as_slice());

        Ok(())
    }

    #[test]
    fn test_preprocess_invert_and_smooth() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 3.0, 6.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

        preprocess(&src, &mut dst, true, Some(3))?;
        assert_eq!(dst.as_slice(), &[-1.5, -3.0, -4.5]);

        // the input is left untouched
        assert_eq!(src.as_slice(), &[0.0, 3.0, 6.0]);

        Ok(())
    }

    #[test]
    fn test_subtract_background_dark() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([5, 1].into(), vec![150, 100, 120, 255, 255])?;
        let background =
            Image::<f32, 1>::new([5, 1].into(), vec![100.0, 100.0, 100.0, -100.0, 0.2])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        subtract_background(&src, &background, false, &mut dst)?;

        // 255 - (-100 + 255) + 0.5 = 100.5 and 255 - (0.2 + 255) + 0.5 = 0.3
        assert_eq!(dst.as_slice(), &[0, 0, 0, 100, 0]);
        Ok(())
    }

    #[test]
    fn test_subtract_background_light() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([4, 1].into(), vec![100, 40, 250, 255])?;
        // working domain surface of a light background at 100
        let background =
            Image::<f32, 1>::new([4, 1].into(), vec![-100.0, -100.0, -100.0, -100.0])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        subtract_background(&src, &background, true, &mut dst)?;

        // v - (100 + 255) + 255.5
        assert_eq!(dst.as_slice(), &[0, 0, 150, 155]);
        Ok(())
    }

    #[test]
    fn test_render_background() -> Result<(), ImageError> {
        let background = Image::<f32, 1>::new([4, 1].into(), vec![-12.4, -12.6, -300.0, 5.0])?;
        let mut dst = Image::<u8, 1>::from_size_val(background.size(), 0)?;

        render_background(&background, true, &mut dst)?;
        assert_eq!(dst.as_slice(), &[12, 13, 255, 0]);

        render_background(&background, false, &mut dst)?;
        assert_eq!(dst.as_slice(), &[0, 0, 0, 5]);

        Ok(())
    }

    #[test]
    fn test_pipeline_rejects_invalid_input() -> Result<(), MorphologyError> {
        let src = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([4, 4].into(), 7)?;

        let res = rolling_ball_background(&src, &RollingBallConfig::new(-1.0), &mut dst);
        assert_eq!(res, Err(MorphologyError::InvalidRadius(-1.0)));
        assert!(dst.as_slice().iter().all(|&v| v == 7));

        let mut wrong = Image::<u8, 1>::from_size_val([4, 5].into(), 0)?;
        let res = rolling_ball_background(&src, &RollingBallConfig::new(3.0), &mut wrong);
        assert_eq!(
            res,
            Err(MorphologyError::Image(ImageError::InvalidImageSize(4, 4, 4, 5)))
        );

        let empty = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        let mut empty_dst = empty.clone();
        let res = rolling_ball_background(&empty, &RollingBallConfig::new(3.0), &mut empty_dst);
        assert_eq!(
            res,
            Err(MorphologyError::Image(ImageError::EmptyImage(0, 0)))
        );

        Ok(())
    }
}
