use parking_lot::Mutex;
use rand::prelude::*;

/// Dense matrix in one contiguous buffer with stride-based row indexing.
///
/// Row accessors panic on out-of-range indices; callers are expected to stay
/// inside the dimensions they allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    pub fn zeros(rows: usize, cols: usize) -> DenseMatrix {
        DenseMatrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// A flat view of `count` consecutive rows starting at `first`.
    pub fn rows_flat(&self, first: usize, count: usize) -> &[f64] {
        &self.data[first * self.cols..(first + count) * self.cols]
    }

    pub fn rows_flat_mut(&mut self, first: usize, count: usize) -> &mut [f64] {
        &mut self.data[first * self.cols..(first + count) * self.cols]
    }

    /// Split the buffer before row `row`: everything above, everything from
    /// `row` down. Lets the owner of a pivot row read it while mutating rows
    /// stored below it.
    pub fn split_at_row_mut(&mut self, row: usize) -> (&mut [f64], &mut [f64]) {
        self.data.split_at_mut(row * self.cols)
    }

    /// Fill the first `filled_rows` rows with uniform values in `[0, 10)`,
    /// quantized to four decimals. Remaining rows stay zero.
    pub fn fill_random(&mut self, filled_rows: usize, rng: &mut StdRng) {
        for i in 0..filled_rows {
            for v in self.row_mut(i) {
                *v = rng.gen_range(0, 100_000) as f64 / 10_000.0;
            }
        }
    }

    /// Drop every row from `rows` on; used to trim padding before output.
    pub fn truncate_rows(&mut self, rows: usize) {
        self.data.truncate(rows * self.cols);
        self.rows = rows;
    }
}

/// A PE's block of matrix rows, shared with incoming active messages.
///
/// The mutex serializes assembly-time message deliveries against the local
/// main thread; during elimination only the main thread touches it.
#[derive(Debug)]
pub struct LocalStore {
    pub rows: Mutex<DenseMatrix>,
}

impl LocalStore {
    pub fn new(rows: usize, cols: usize) -> LocalStore {
        LocalStore {
            rows: Mutex::new(DenseMatrix::zeros(rows, cols)),
        }
    }
}
