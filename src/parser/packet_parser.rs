use std::io::{ErrorKind, Read};

use rayon::prelude::*;
use winnow::{Parser, binary::le_u32, error::ContextError};

use crate::error::{UnpackError, UnpackResult};
use crate::types::packet::{Packet, constants::WORD_SIZE};

const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Parses one 4-byte little-endian data word
pub fn parse_packet(input: &mut &[u8]) -> Result<Packet, ContextError> {
    le_u32.map(Packet::new).parse_next(input)
}

/// Number of whole words in `bytes`, or `Format` if a partial word trails
pub fn word_count(bytes: &[u8]) -> UnpackResult<usize> {
    let trailing = bytes.len() % WORD_SIZE;
    if trailing != 0 {
        return Err(UnpackError::Format {
            len: bytes.len() as u64,
            trailing,
        });
    }
    Ok(bytes.len() / WORD_SIZE)
}

/// Sequential view of the words in a buffer
pub fn packets(bytes: &[u8]) -> UnpackResult<impl Iterator<Item = Packet> + '_> {
    word_count(bytes)?;
    Ok(bytes.chunks_exact(WORD_SIZE).map(packet_from_chunk))
}

/// Decodes every word to picoseconds (`-1` for invalid words), in input order
pub fn decode_timestamps(bytes: &[u8]) -> UnpackResult<Vec<f64>> {
    decode_with(bytes, Packet::timestamp_ps)
}

/// Decodes every word to its unscaled bin count (`-1` for invalid words)
pub fn decode_raw_counts(bytes: &[u8]) -> UnpackResult<Vec<f64>> {
    decode_with(bytes, Packet::raw_count_or_sentinel)
}

fn decode_with<F>(bytes: &[u8], project: F) -> UnpackResult<Vec<f64>>
where
    F: Fn(Packet) -> f64 + Sync + Send,
{
    word_count(bytes)?;
    Ok(bytes
        .par_chunks_exact(WORD_SIZE)
        .map(|chunk| project(packet_from_chunk(chunk)))
        .collect())
}

#[inline]
fn packet_from_chunk(chunk: &[u8]) -> Packet {
    Packet::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}

/// Streaming decoder over any reader.
///
/// Memory use is one fixed buffer regardless of stream length. A trailing
/// partial word is reported once as `Format`, after which the stream ends.
pub struct PacketStream<R> {
    reader: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    consumed: u64,
    done: bool,
}

impl<R: Read> PacketStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0u8; STREAM_BUFFER_SIZE].into_boxed_slice(),
            start: 0,
            end: 0,
            consumed: 0,
            done: false,
        }
    }

    /// Bytes handed out as packets so far
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Refills until at least one whole word is buffered or the reader is
    /// exhausted. Returns the number of buffered bytes.
    fn fill(&mut self) -> std::io::Result<usize> {
        if self.end - self.start >= WORD_SIZE {
            return Ok(self.end - self.start);
        }
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;

        while self.end < WORD_SIZE {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => break,
                Ok(n) => self.end += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(self.end)
    }
}

impl<R: Read> Iterator for PacketStream<R> {
    type Item = UnpackResult<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let available = match self.fill() {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };

        if available == 0 {
            self.done = true;
            return None;
        }
        if available < WORD_SIZE {
            self.done = true;
            return Some(Err(UnpackError::Format {
                len: self.consumed + available as u64,
                trailing: available,
            }));
        }

        let mut input = &self.buf[self.start..self.end];
        match parse_packet.parse_next(&mut input) {
            Ok(packet) => {
                self.start += WORD_SIZE;
                self.consumed += WORD_SIZE as u64;
                Some(Ok(packet))
            }
            Err(_) => {
                self.done = true;
                Some(Err(UnpackError::Format {
                    len: self.consumed + available as u64,
                    trailing: available % WORD_SIZE,
                }))
            }
        }
    }
}
