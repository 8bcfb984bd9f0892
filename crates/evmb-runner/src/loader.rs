//! Hex input loading

use crate::error::{RunnerError, RunnerResult};
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Where the creation code comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    /// File holding hex text
    Path(PathBuf),
    /// Hex given inline
    Inline(String),
}

impl CodeSource {
    /// Read and decode the creation code
    pub fn load(&self) -> RunnerResult<Bytes> {
        match self {
            CodeSource::Path(path) => load_hex_file(path),
            CodeSource::Inline(text) => decode_hex("contract code", text),
        }
    }
}

/// Decode hex with an optional `0x` prefix and surrounding whitespace
pub fn decode_hex(what: &'static str, text: &str) -> RunnerResult<Bytes> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|source| RunnerError::InvalidHex { what, source })
}

/// Read a file of hex text and decode it
pub fn load_hex_file(path: &Path) -> RunnerResult<Bytes> {
    let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_hex("contract code file", &text)
}
