//! LinoSPAD2 data-word parsing

pub mod packet_parser;

// Re-export the parsing functions
pub use packet_parser::{
    PacketStream, decode_raw_counts, decode_timestamps, packets, parse_packet, word_count,
};
