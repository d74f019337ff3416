// Licensed under the Apache-2.0 license

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, splitting or patching flash images.
#[derive(Error, Debug)]
pub enum FlashError {
    #[error("Unknown flash scheme '{0}'.")]
    UnknownScheme(String),
    #[error("Scheme '{0}' has no partitions.")]
    EmptyScheme(String),
    #[error("Unknown partition '{0}'.")]
    UnknownPartition(String),
    #[error("Partitions '{first}' and '{second}' overlap.")]
    OverlappingPartitions { first: String, second: String },
    #[error("Size mismatch for '{name}': expected 0x{expected:x} bytes, got 0x{actual:x}.")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },
    #[error("Unexpected image size: expected 0x{expected:x} bytes, got 0x{actual:x}.")]
    UnexpectedImageSize { expected: usize, actual: usize },
    #[error("Payload of 0x{actual:x} bytes does not fit into '{name}' (limit 0x{limit:x}).")]
    PayloadTooLarge {
        name: String,
        limit: usize,
        actual: usize,
    },
    #[error("Range 0x{start:x}..0x{end:x} is outside of the 0x{len:x} byte image.")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("Block at offset 0x{start:x} failed validation: {findings}.")]
    UnverifiedBlock { start: usize, findings: String },
    #[error("Cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid layout file '{}': {source}", .path.display())]
    Layout {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, FlashError>;
