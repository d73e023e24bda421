use rollingball_image::{Image, ImageError};

use super::{RollingBall, RowCache};

/// Roll a ball beneath the intensity surface of an image.
///
/// Think of the image as a height field. The patch of the ball is slid
/// along every scan line so that it touches the surface in at least one
/// point while every other point of the patch stays below it. Every point
/// on or below the patch at some position belongs to the background. This
/// is the grayscale opening of `src` by the ball.
///
/// The scan runs over a virtual range `half_width` pixels larger than the
/// image on every side. Footprints are truncated to the image, but the ball
/// offsets are taken relative to the unclamped virtual center, so pixels
/// near the border are compared against a partial cross-section of the ball.
///
/// # Arguments
///
/// * `src` - The working image with shape (H, W, 1).
/// * `ball` - The structuring element.
/// * `dst` - The background surface with shape (H, W, 1).
///
/// # Errors
///
/// Returns an error if the image is empty or `src` and `dst` differ in size.
///
/// # Examples
///
/// ```
/// use rollingball_image::Image;
/// use rollingball_imgproc::morphology::{roll_ball, RollingBall};
///
/// let src = Image::<f32, 1>::from_size_val([6, 4].into(), 42.0).unwrap();
/// let mut background = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// let ball = RollingBall::new(3.0).unwrap();
/// roll_ball(&src, &ball, &mut background).unwrap();
///
/// assert!(background.as_slice().iter().all(|&v| (v - 42.0).abs() < 1e-4));
/// ```
pub fn roll_ball(
    src: &Image<f32, 1>,
    ball: &RollingBall,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }

    let width = src.width() as isize;
    let height = src.height() as isize;
    let radius = ball.half_width() as isize;

    let mut cache = RowCache::new(ball.width(), src.width());

    for y in -radius..height + radius {
        // bring in the row entering the footprint and reset its accumulator
        let next_row = y + radius;
        if next_row < height {
            let row = next_row as usize;
            cache.write(row, src.row(row));
            dst.row_mut(row).fill(f32::NEG_INFINITY);
        }

        let y_start = (y - radius).max(0);
        let y_end = (y + radius).min(height - 1);
        let y_ball_start = (y_start - y + radius) as usize;

        for x in -radius..width + radius {
            let x_start = (x - radius).max(0);
            let x_end = (x + radius).min(width - 1);
            let x_ball_start = (x_start - x + radius) as usize;

            let cols = x_start as usize..(x_end + 1) as usize;
            let ball_cols = x_ball_start..x_ball_start + cols.len();
            let rows = (y_start as usize..=y_end as usize).zip(y_ball_start..);

            // height of the apex when the patch rests on the lowest contact point
            let mut z = f32::INFINITY;
            for (yp, ball_y) in rows.clone() {
                let samples = cache.read(yp, cols.clone());
                let ball_row = &ball.row(ball_y)[ball_cols.clone()];
                for (&sample, &offset) in samples.iter().zip(ball_row) {
                    let z_reduced = sample - offset;
                    if z > z_reduced {
                        z = z_reduced;
                    }
                }
            }

            // raise the surface under the patch to the resting ball
            for (yp, ball_y) in rows {
                let ball_row = &ball.row(ball_y)[ball_cols.clone()];
                let out = &mut dst.row_mut(yp)[cols.clone()];
                for (acc, &offset) in out.iter_mut().zip(ball_row) {
                    let z_min = z + offset;
                    if *acc < z_min {
                        *acc = z_min;
                    }
                }
            }
        }
    }

    Ok(())
}
