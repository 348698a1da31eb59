//! Snapshot byte codecs
//!
//! Every codec writes the same frame around its payload:
//!
//! ```text
//! magic "VTXS" | version u8 | format u8 | flags u8 | sha256(payload) [32] | len u64 LE | payload
//! ```
//!
//! `flags` bit 0 marks a gzip-compressed payload. The digest covers the
//! payload exactly as stored, so corruption is caught before decompression.

use super::{GraphSnapshot, PersistenceError, PersistenceResult};
use crate::config::SnapshotConfig;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"VTXS";
const VERSION: u8 = 1;
const FLAG_GZIP: u8 = 0b0000_0001;
const HEADER_LEN: usize = 4 + 1 + 1 + 1 + 32 + 8;

/// Default cap on a decompressed payload
pub const DEFAULT_MAX_PAYLOAD: u64 = 1 << 30;

/// Payload encoding carried in the frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SnapshotFormat {
    Bincode = 0,
    Json = 1,
}

impl SnapshotFormat {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(SnapshotFormat::Bincode),
            1 => Some(SnapshotFormat::Json),
            _ => None,
        }
    }
}

/// Turns a [`GraphSnapshot`] into bytes and back
pub trait SnapshotCodec: Send + Sync {
    fn encode(&self, snapshot: &GraphSnapshot) -> PersistenceResult<Vec<u8>>;

    /// Fails with `CorruptSnapshot` on anything it cannot read back
    fn decode(&self, bytes: &[u8]) -> PersistenceResult<GraphSnapshot>;
}

/// Compact binary snapshots (bincode payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCodec {
    compression: Option<u32>,
    max_payload: u64,
}

impl BinaryCodec {
    /// Uncompressed payload
    pub fn new() -> Self {
        Self {
            compression: None,
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Gzip payload at `level` (clamped to 0-9)
    pub fn compressed(level: u32) -> Self {
        Self {
            compression: Some(level.min(9)),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Reject compressed payloads that expand past `bytes`
    pub fn with_max_payload(mut self, bytes: u64) -> Self {
        self.max_payload = bytes;
        self
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        let codec = if config.compression {
            Self::compressed(config.compression_level)
        } else {
            Self::new()
        };
        codec.with_max_payload(config.max_payload_bytes)
    }
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self::compressed(6)
    }
}

impl SnapshotCodec for BinaryCodec {
    fn encode(&self, snapshot: &GraphSnapshot) -> PersistenceResult<Vec<u8>> {
        let payload = bincode::serialize(snapshot)
            .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        frame(SnapshotFormat::Bincode, payload, self.compression)
    }

    fn decode(&self, bytes: &[u8]) -> PersistenceResult<GraphSnapshot> {
        let payload = unframe(SnapshotFormat::Bincode, bytes, self.max_payload)?;
        bincode::deserialize(&payload)
            .map_err(|e| PersistenceError::CorruptSnapshot(format!("undecodable payload: {}", e)))
    }
}

/// Human-readable snapshots (JSON payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    compression: Option<u32>,
    max_payload: u64,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self {
            compression: None,
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    pub fn compressed(level: u32) -> Self {
        Self {
            compression: Some(level.min(9)),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    pub fn with_max_payload(mut self, bytes: u64) -> Self {
        self.max_payload = bytes;
        self
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCodec for JsonCodec {
    fn encode(&self, snapshot: &GraphSnapshot) -> PersistenceResult<Vec<u8>> {
        let payload = serde_json::to_vec(snapshot)
            .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        frame(SnapshotFormat::Json, payload, self.compression)
    }

    fn decode(&self, bytes: &[u8]) -> PersistenceResult<GraphSnapshot> {
        let payload = unframe(SnapshotFormat::Json, bytes, self.max_payload)?;
        serde_json::from_slice(&payload)
            .map_err(|e| PersistenceError::CorruptSnapshot(format!("undecodable payload: {}", e)))
    }
}

fn frame(format: SnapshotFormat, payload: Vec<u8>, compression: Option<u32>) -> PersistenceResult<Vec<u8>> {
    let (flags, payload) = match compression {
        Some(level) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
            encoder.write_all(&payload)?;
            (FLAG_GZIP, encoder.finish()?)
        }
        None => (0, payload),
    };

    let digest = Sha256::digest(&payload);
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(format as u8);
    out.push(flags);
    out.extend_from_slice(digest.as_slice());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

fn unframe(expected: SnapshotFormat, bytes: &[u8], max_payload: u64) -> PersistenceResult<Vec<u8>> {
    let corrupt = |reason: &str| PersistenceError::CorruptSnapshot(reason.to_string());

    if bytes.len() < HEADER_LEN {
        return Err(corrupt("truncated header"));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[0..4] != MAGIC {
        return Err(corrupt("bad magic"));
    }
    if header[4] != VERSION {
        return Err(PersistenceError::CorruptSnapshot(format!(
            "unsupported version {}",
            header[4]
        )));
    }
    match SnapshotFormat::from_byte(header[5]) {
        Some(format) if format == expected => {}
        Some(format) => {
            return Err(PersistenceError::CorruptSnapshot(format!(
                "expected {:?} payload, found {:?}",
                expected, format
            )))
        }
        None => return Err(corrupt("unknown payload format")),
    }
    let flags = header[6];
    if flags & !FLAG_GZIP != 0 {
        return Err(corrupt("unknown flags"));
    }

    let digest = &header[7..39];
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[39..47]);
    let len = u64::from_le_bytes(len_bytes);
    if len != payload.len() as u64 {
        return Err(corrupt("payload length mismatch"));
    }
    if Sha256::digest(payload).as_slice() != digest {
        return Err(corrupt("checksum mismatch"));
    }

    if flags & FLAG_GZIP == 0 {
        return Ok(payload.to_vec());
    }
    let mut decoded = Vec::new();
    GzDecoder::new(payload)
        .take(max_payload.saturating_add(1))
        .read_to_end(&mut decoded)
        .map_err(|e| PersistenceError::CorruptSnapshot(format!("bad compressed payload: {}", e)))?;
    if decoded.len() as u64 > max_payload {
        return Err(PersistenceError::CorruptSnapshot(format!(
            "compressed payload expands past {} bytes",
            max_payload
        )));
    }
    Ok(decoded)
}
