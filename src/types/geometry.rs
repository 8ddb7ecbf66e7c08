use bon::bon;
use serde::Serialize;

use super::packet::constants::PIXEL_COUNT;
use crate::error::{UnpackError, UnpackResult};

/// Shape of one acquisition: how a flat word stream folds into
/// `PIXEL_COUNT` rows of `timestamps_per_cycle * cycles` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcquisitionGeometry {
    pub word_count: usize,
    pub timestamps_per_cycle: usize,
    pub cycles: usize,
}

#[bon]
impl AcquisitionGeometry {
    /// Fails with `Geometry` unless `word_count` is a whole number of
    /// `timestamps_per_cycle * PIXEL_COUNT` cycles.
    #[builder]
    pub fn new(word_count: usize, timestamps_per_cycle: usize) -> UnpackResult<Self> {
        let words_per_cycle = timestamps_per_cycle
            .checked_mul(PIXEL_COUNT)
            .filter(|&n| n > 0)
            .ok_or(UnpackError::Geometry {
                words: word_count,
                timestamps_per_cycle,
                pixels: PIXEL_COUNT,
            })?;

        if word_count % words_per_cycle != 0 {
            return Err(UnpackError::Geometry {
                words: word_count,
                timestamps_per_cycle,
                pixels: PIXEL_COUNT,
            });
        }

        Ok(Self {
            word_count,
            timestamps_per_cycle,
            cycles: word_count / words_per_cycle,
        })
    }

    pub fn pixels(&self) -> usize {
        PIXEL_COUNT
    }

    /// Row length of the reshaped matrix
    pub fn columns(&self) -> usize {
        self.timestamps_per_cycle * self.cycles
    }

    /// Flat stream offset of the first slot of `pixel` in `cycle`
    pub fn flat_offset(&self, pixel: usize, cycle: usize) -> usize {
        (pixel + PIXEL_COUNT * cycle) * self.timestamps_per_cycle
    }
}
