//! Folds the flat word stream into the pixel x (cycle, slot) matrix.
//!
//! The stream is ordered cycle-major, then pixel, then slot: the
//! `timestamps_per_cycle` values at flat offset `(pixel + 256 * cycle) * T`
//! belong to row `pixel`, columns `cycle * T .. cycle * T + T`.

use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView1, Axis, s};

use crate::error::{UnpackError, UnpackResult};
use crate::types::AcquisitionGeometry;
use crate::types::packet::constants::PIXEL_COUNT;

/// Reshapes `flat` into a `PIXEL_COUNT x (T * cycles)` matrix.
///
/// Every cell starts as `fill`; rows are filled in parallel. Fails with
/// `Geometry` when `flat.len()` is not a whole number of cycles.
pub fn reshape_cycles<T>(
    flat: &[T],
    timestamps_per_cycle: usize,
    fill: T,
) -> UnpackResult<Array2<T>>
where
    T: Copy + Send + Sync,
{
    let geometry = AcquisitionGeometry::builder()
        .word_count(flat.len())
        .timestamps_per_cycle(timestamps_per_cycle)
        .build()?;
    let slots = geometry.timestamps_per_cycle;

    let mut matrix = Array2::from_elem((PIXEL_COUNT, geometry.columns()), fill);
    matrix
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(pixel, mut row)| {
            for cycle in 0..geometry.cycles {
                let src = geometry.flat_offset(pixel, cycle);
                let dst = cycle * slots;
                row.slice_mut(s![dst..dst + slots])
                    .assign(&ArrayView1::from(&flat[src..src + slots]));
            }
        });

    Ok(matrix)
}

/// Inverse of [`reshape_cycles`]: restores the original stream order.
pub fn flatten_cycles<T>(matrix: &Array2<T>, timestamps_per_cycle: usize) -> UnpackResult<Vec<T>>
where
    T: Copy,
{
    let (rows, columns) = matrix.dim();
    if rows != PIXEL_COUNT || timestamps_per_cycle == 0 || columns % timestamps_per_cycle != 0 {
        return Err(UnpackError::Geometry {
            words: matrix.len(),
            timestamps_per_cycle,
            pixels: PIXEL_COUNT,
        });
    }

    let cycles = columns / timestamps_per_cycle;
    let mut flat = Vec::with_capacity(matrix.len());
    for cycle in 0..cycles {
        let start = cycle * timestamps_per_cycle;
        for row in matrix.axis_iter(Axis(0)) {
            flat.extend(row.slice(s![start..start + timestamps_per_cycle]).iter().copied());
        }
    }
    Ok(flat)
}
