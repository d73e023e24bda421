use rayon::prelude::*;

use rollingball_image::Image;

/// Apply a function to each row of the destination image in parallel.
///
/// The closure receives the row index and the mutable row slice.
pub fn par_iter_rows_indexed<T: Send>(
    dst: &mut Image<T, 1>,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) {
    if dst.is_empty() {
        return;
    }

    let width = dst.width();
    dst.as_slice_mut()
        .par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Apply a function to each pixel of `src` and write the result to `dst`.
///
/// `src` must be at least as large as `dst`.
pub fn par_iter_rows_val<T1: Sync, T2: Send>(
    src: &Image<T1, 1>,
    dst: &mut Image<T2, 1>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) {
    par_iter_rows_indexed(dst, |y, row| {
        row.iter_mut().zip(src.row(y)).for_each(|(d, s)| f(s, d));
    });
}

/// Apply a function to each pair of pixels of `src1` and `src2` and write
/// the result to `dst`.
///
/// Both sources must be at least as large as `dst`.
pub fn par_iter_rows_val_two<T1: Sync, T2: Sync, T3: Send>(
    src1: &Image<T1, 1>,
    src2: &Image<T2, 1>,
    dst: &mut Image<T3, 1>,
    f: impl Fn(&T1, &T2, &mut T3) + Send + Sync,
) {
    par_iter_rows_indexed(dst, |y, row| {
        row.iter_mut()
            .zip(src1.row(y).iter().zip(src2.row(y)))
            .for_each(|(d, (a, b))| f(a, b, d));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollingball_image::ImageError;

    #[test]
    fn test_par_iter_rows_val() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([2, 2].into(), vec![1, 2, 3, 4])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        par_iter_rows_val(&src, &mut dst, |s, d| *d = *s as f32 * 2.0);
        assert_eq!(dst.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_val_two() -> Result<(), ImageError> {
        let a = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 3.0])?;
        let b = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 1.0, 1.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(a.size(), 0.0)?;
        par_iter_rows_val_two(&a, &b, &mut dst, |x, y, d| *d = x - y);
        assert_eq!(dst.as_slice(), &[0.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_val_empty() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([0, 4].into(), vec![])?;
        let mut dst = Image::<u8, 1>::new([0, 4].into(), vec![])?;
        par_iter_rows_val(&src, &mut dst, |s, d| *d = *s);
        assert!(dst.is_empty());
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_indexed() -> Result<(), ImageError> {
        let mut dst = Image::<usize, 1>::from_size_val([2, 3].into(), 0)?;
        par_iter_rows_indexed(&mut dst, |y, row| row.iter_mut().for_each(|v| *v = y));
        assert_eq!(dst.as_slice(), &[0, 0, 1, 1, 2, 2]);
        Ok(())
    }
}
