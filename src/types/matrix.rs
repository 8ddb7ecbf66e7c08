use ndarray::{Array2, ArrayView1, Axis, s};
use serde::Serialize;

use super::timestamp::Timestamp;

/// Unpacked acquisition: one row per pixel, `timestamps_per_cycle * cycles`
/// columns per row with the slot index varying fastest.
///
/// Cells hold picoseconds or `-1` for empty slots. Use [`TimestampMatrix::get`]
/// or [`TimestampMatrix::hits`] to read them without testing for `-1` by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestampMatrix {
    data: Array2<f64>,
    timestamps_per_cycle: usize,
}

impl TimestampMatrix {
    pub(crate) fn new(data: Array2<f64>, timestamps_per_cycle: usize) -> Self {
        Self {
            data,
            timestamps_per_cycle,
        }
    }

    pub fn pixels(&self) -> usize {
        self.data.nrows()
    }

    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    pub fn timestamps_per_cycle(&self) -> usize {
        self.timestamps_per_cycle
    }

    pub fn cycles(&self) -> usize {
        self.columns() / self.timestamps_per_cycle
    }

    /// `None` when the cell is out of bounds
    pub fn get(&self, pixel: usize, column: usize) -> Option<Timestamp> {
        self.data
            .get((pixel, column))
            .map(|&v| Timestamp::from_sentinel(v))
    }

    /// Full row of one pixel, sentinel included
    pub fn pixel(&self, pixel: usize) -> Option<ArrayView1<'_, f64>> {
        (pixel < self.pixels()).then(|| self.data.row(pixel))
    }

    /// The `timestamps_per_cycle` slots of one pixel in one cycle
    pub fn cycle(&self, pixel: usize, cycle: usize) -> Option<ArrayView1<'_, f64>> {
        if cycle >= self.cycles() {
            return None;
        }
        let start = cycle * self.timestamps_per_cycle;
        self.pixel(pixel)
            .map(|row| row.slice_move(s![start..start + self.timestamps_per_cycle]))
    }

    /// Valid `(column, ps)` pairs of one pixel
    pub fn hits(&self, pixel: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.pixel(pixel)
            .into_iter()
            .flat_map(|row| row.into_iter().enumerate())
            .filter_map(|(column, &v)| Timestamp::from_sentinel(v).ps().map(|ps| (column, ps)))
    }

    pub fn valid_mask(&self) -> Array2<bool> {
        self.data.mapv(|v| v >= 0.0)
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| v >= 0.0).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.data.len() - self.valid_count()
    }

    /// Valid hits per pixel
    pub fn hit_counts(&self) -> Vec<usize> {
        self.data
            .axis_iter(Axis(0))
            .map(|row| row.iter().filter(|&&v| v >= 0.0).count())
            .collect()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }
}
