use std::io::Read;

use serde::Serialize;

use crate::error::UnpackResult;
use crate::parser::PacketStream;
use crate::types::Packet;

/// Word-level statistics collected in a single pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub words: u64,
    pub valid: u64,
    pub invalid: u64,
    /// Words per value of the 2-bit address field
    pub address_counts: [u64; 4],
    pub min_raw_count: Option<u32>,
    pub max_raw_count: Option<u32>,
}

impl StreamStats {
    pub fn record(&mut self, packet: Packet) {
        self.words += 1;
        self.address_counts[packet.address() as usize] += 1;
        if !packet.is_valid() {
            self.invalid += 1;
            return;
        }
        self.valid += 1;
        let raw = packet.raw_count();
        self.min_raw_count = Some(self.min_raw_count.map_or(raw, |m| m.min(raw)));
        self.max_raw_count = Some(self.max_raw_count.map_or(raw, |m| m.max(raw)));
    }

    pub fn valid_fraction(&self) -> f64 {
        if self.words == 0 {
            0.0
        } else {
            self.valid as f64 / self.words as f64
        }
    }
}

/// Collects statistics from an in-memory packet sequence
pub fn scan_packets(packets: impl IntoIterator<Item = Packet>) -> StreamStats {
    let mut stats = StreamStats::default();
    for packet in packets {
        stats.record(packet);
    }
    stats
}

/// Collects statistics from a reader in fixed memory
pub fn scan_stream<R: Read>(reader: R) -> UnpackResult<StreamStats> {
    let mut stats = StreamStats::default();
    for packet in PacketStream::new(reader) {
        stats.record(packet?);
    }
    Ok(stats)
}
