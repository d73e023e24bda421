use std::ops::Range;

/// A fixed height ring buffer of image rows.
///
/// Row `y` of the source lives in slot `y % capacity`. Every slot remembers
/// which absolute row it holds, so a read of a row that was never written or
/// was already recycled by a later row is caught in debug builds.
#[derive(Debug, Clone)]
pub struct RowCache {
    data: Vec<f32>,
    width: usize,
    rows: Vec<Option<usize>>,
}

impl RowCache {
    /// Create a cache holding `capacity` rows of `width` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, width: usize) -> Self {
        assert!(capacity > 0, "row cache capacity must be non-zero");
        Self {
            data: vec![0.0; capacity * width],
            width,
            rows: vec![None; capacity],
        }
    }

    /// Number of rows the cache holds at once.
    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Number of samples per row.
    pub fn width(&self) -> usize {
        self.width
    }

    fn slot(&self, row: usize) -> usize {
        row % self.rows.len()
    }

    /// Store the samples of absolute row `row`, evicting whatever row shared
    /// its slot.
    ///
    /// # Panics
    ///
    /// Panics if `src` is not exactly [`RowCache::width`] samples long.
    pub fn write(&mut self, row: usize, src: &[f32]) {
        let slot = self.slot(row);
        let start = slot * self.width;
        self.data[start..start + self.width].copy_from_slice(src);
        self.rows[slot] = Some(row);
    }

    /// Whether absolute row `row` is currently held by the cache.
    pub fn contains(&self, row: usize) -> bool {
        self.rows[self.slot(row)] == Some(row)
    }

    /// Read the columns `cols` of absolute row `row`.
    ///
    /// The row must have been written and not evicted since.
    pub fn read(&self, row: usize, cols: Range<usize>) -> &[f32] {
        debug_assert!(
            self.contains(row),
            "row {row} is not cached (slot holds {:?})",
            self.rows[self.slot(row)]
        );
        let start = self.slot(row) * self.width;
        &self.data[start + cols.start..start + cols.end]
    }
}
