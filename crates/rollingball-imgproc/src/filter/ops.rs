use rollingball_image::{Image, ImageError};

use crate::parallel;

/// Smooth an image with a square mean filter.
///
/// Each output sample is the arithmetic mean of the input samples inside the
/// `window x window` neighbourhood intersected with the image. No padding is
/// applied, windows at the border simply average fewer samples.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `window` - The side of the window. Must be odd.
///
/// # Errors
///
/// Returns an error if the window is zero or even, the image is empty, or
/// `src` and `dst` differ in size.
///
/// # Examples
///
/// ```
/// use rollingball_image::Image;
/// use rollingball_imgproc::filter::mean_filter;
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 3.0, 6.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// mean_filter(&src, &mut dst, 3).unwrap();
///
/// assert_eq!(dst.as_slice(), &[1.5, 3.0, 4.5]);
/// ```
pub fn mean_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    window: usize,
) -> Result<(), ImageError> {
    if window == 0 || window % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(window));
    }

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

    let (width, height) = (src.width(), src.height());
    let half = window / 2;

    let span = |center: usize, len: usize| center.saturating_sub(half)..(center + half + 1).min(len);

    // horizontal window sums, then average them vertically
    let mut row_sums = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    parallel::par_iter_rows_indexed(&mut row_sums, |y, out| {
        let row = src.row(y);
        for (x, sum) in out.iter_mut().enumerate() {
            *sum = row[span(x, width)].iter().sum();
        }
    });

    parallel::par_iter_rows_indexed(dst, |y, out| {
        let rows = span(y, height);
        let num_rows = rows.len();
        for (x, mean) in out.iter_mut().enumerate() {
            let count = (num_rows * span(x, width).len()) as f32;
            let sum: f32 = rows.clone().map(|yy| row_sums.row(yy)[x]).sum();
            *mean = sum / count;
        }
    });

    Ok(())
}
