pub mod correction;
pub mod reshape;
pub mod stats;
pub mod unpack;

// Re-export for easier access
pub use correction::CalibrationCorrector;
pub use reshape::{flatten_cycles, reshape_cycles};
pub use stats::{StreamStats, scan_packets, scan_stream};
pub use unpack::{unpack, unpack_calibrated, unpack_reader, unpack_reader_calibrated};
