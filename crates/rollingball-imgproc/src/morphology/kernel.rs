use super::MorphologyError;

/// A rolling ball, or rather the square patch of its top cap.
///
/// The patch is a `width x width` grid of height offsets relative to the
/// apex plane of the sphere. The center holds the apex height and the values
/// fall to zero at the trimmed rim; cells outside the sphere are zero.
///
/// The shrink factor and arc trim are derived from the radius. The shrink
/// factor only scales the ball down, the image itself is never resampled.
#[derive(Clone, Debug, PartialEq)]
pub struct RollingBall {
    radius: f32,
    shrink_factor: usize,
    arc_trim_percent: usize,
    half_width: usize,
    data: Vec<f32>,
}

/// Shrink factor and arc trim percentage for a given ball radius.
fn radius_bucket(radius: f32) -> (usize, usize) {
    if radius <= 10.0 {
        (1, 24)
    } else if radius <= 30.0 {
        (2, 24)
    } else if radius <= 100.0 {
        (4, 32)
    } else {
        (8, 40)
    }
}

impl RollingBall {
    /// Build the ball for the given radius in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::InvalidRadius`] if the radius is not a
    /// positive finite number.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollingball_imgproc::morphology::RollingBall;
    ///
    /// let ball = RollingBall::new(5.0).unwrap();
    ///
    /// assert_eq!(ball.width(), 9);
    /// assert_eq!(ball.get(4, 4), 5.0);
    /// assert_eq!(ball.get(0, 0), 0.0);
    /// ```
    pub fn new(radius: f32) -> Result<Self, MorphologyError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(MorphologyError::InvalidRadius(radius));
        }

        let (shrink_factor, arc_trim_percent) = radius_bucket(radius);

        let small_radius = (radius as f64 / shrink_factor as f64).max(1.0);
        let r_square = small_radius * small_radius;
        let x_trim = (arc_trim_percent as f64 * small_radius) as usize / 100;
        let half_width = (small_radius - x_trim as f64).round() as usize;
        let width = 2 * half_width + 1;

        let mut data = vec![0.0f32; width * width];
        for (y, row) in data.chunks_exact_mut(width).enumerate() {
            let dy = y as f64 - half_width as f64;
            for (x, value) in row.iter_mut().enumerate() {
                let dx = x as f64 - half_width as f64;
                let t = r_square - dx * dx - dy * dy;
                if t > 0.0 {
                    *value = t.sqrt() as f32;
                }
            }
        }

        log::debug!(
            "built rolling ball: radius={radius} shrink_factor={shrink_factor} \
             arc_trim={arc_trim_percent}% width={width}"
        );

        Ok(Self {
            radius,
            shrink_factor,
            arc_trim_percent,
            half_width,
            data,
        })
    }

    /// The radius the ball was requested with.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Shrink factor of the radius bucket, kept for reference only.
    pub fn shrink_factor(&self) -> usize {
        self.shrink_factor
    }

    /// Percentage of the radius trimmed from the rim of the patch.
    pub fn arc_trim_percent(&self) -> usize {
        self.arc_trim_percent
    }

    /// Half the side of the patch, excluding the center cell.
    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Side of the square patch. Always odd.
    pub fn width(&self) -> usize {
        2 * self.half_width + 1
    }

    /// Height offset at column `x` and row `y` of the patch.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not smaller than [`RollingBall::width`].
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width() + x]
    }

    /// The patch row `y`.
    pub fn row(&self, y: usize) -> &[f32] {
        let width = self.width();
        &self.data[y * width..(y + 1) * width]
    }

    /// The patch as a flat row-major slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
