//! Decode + reshape (+ correct) entry points

use std::io::Read;

use tracing::{debug, info};

use super::correction::CalibrationCorrector;
use super::reshape::reshape_cycles;
use crate::error::UnpackResult;
use crate::parser::{PacketStream, decode_raw_counts, decode_timestamps};
use crate::types::packet::constants::SENTINEL;
use crate::types::{CalibrationTable, Packet, TimestampMatrix};

/// Decodes and reshapes a whole byte stream; no calibration.
///
/// Entries are `raw_count * 17.857` ps or `-1`.
pub fn unpack(stream: &[u8], timestamps_per_cycle: usize) -> UnpackResult<TimestampMatrix> {
    let flat = decode_timestamps(stream)?;
    finish_unpack(flat, timestamps_per_cycle)
}

/// Decodes, reshapes and applies the TDC calibration.
pub fn unpack_calibrated(
    stream: &[u8],
    timestamps_per_cycle: usize,
    calibration: &CalibrationTable,
) -> UnpackResult<TimestampMatrix> {
    let flat = decode_raw_counts(stream)?;
    finish_calibrated(flat, timestamps_per_cycle, calibration)
}

/// Same as [`unpack`], reading the stream from `reader`
pub fn unpack_reader<R: Read>(
    reader: R,
    timestamps_per_cycle: usize,
) -> UnpackResult<TimestampMatrix> {
    let flat = PacketStream::new(reader)
        .map(|p| p.map(Packet::timestamp_ps))
        .collect::<UnpackResult<Vec<_>>>()?;
    finish_unpack(flat, timestamps_per_cycle)
}

/// Same as [`unpack_calibrated`], reading the stream from `reader`
pub fn unpack_reader_calibrated<R: Read>(
    reader: R,
    timestamps_per_cycle: usize,
    calibration: &CalibrationTable,
) -> UnpackResult<TimestampMatrix> {
    let flat = PacketStream::new(reader)
        .map(|p| p.map(Packet::raw_count_or_sentinel))
        .collect::<UnpackResult<Vec<_>>>()?;
    finish_calibrated(flat, timestamps_per_cycle, calibration)
}

fn finish_unpack(flat: Vec<f64>, timestamps_per_cycle: usize) -> UnpackResult<TimestampMatrix> {
    debug!(words = flat.len(), timestamps_per_cycle, "reshaping decoded stream");
    let matrix = reshape_cycles(&flat, timestamps_per_cycle, SENTINEL)?;
    let matrix = TimestampMatrix::new(matrix, timestamps_per_cycle);
    info!(
        cycles = matrix.cycles(),
        columns = matrix.columns(),
        "unpacked acquisition"
    );
    Ok(matrix)
}

fn finish_calibrated(
    flat: Vec<f64>,
    timestamps_per_cycle: usize,
    calibration: &CalibrationTable,
) -> UnpackResult<TimestampMatrix> {
    debug!(words = flat.len(), timestamps_per_cycle, "reshaping raw counts");
    let mut matrix = reshape_cycles(&flat, timestamps_per_cycle, SENTINEL)?;
    CalibrationCorrector::new(calibration).apply(&mut matrix)?;
    let matrix = TimestampMatrix::new(matrix, timestamps_per_cycle);
    info!(
        cycles = matrix.cycles(),
        columns = matrix.columns(),
        "unpacked acquisition with calibration"
    );
    Ok(matrix)
}
