//! Type definitions for the LinoSPAD2 binary data format

pub mod calibration;
pub mod geometry;
pub mod matrix;
pub mod packet;
pub mod timestamp;

// Re-export the main types for convenience
pub use calibration::CalibrationTable;
pub use geometry::AcquisitionGeometry;
pub use matrix::TimestampMatrix;
pub use packet::{Packet, constants};
pub use timestamp::Timestamp;
