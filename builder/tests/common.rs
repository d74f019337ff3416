// Licensed under the Apache-2.0 license
#![allow(dead_code)]

use flash_builder::{PartitionSpec, PartitionTable};
use flash_image::Trailer;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zerocopy::IntoBytes;

pub const BUNDLE_SIGNATURE: &[u8; 10] = b"FW-BUNDLE1";

pub fn setup() -> TempDir {
    // Initialize log level to debug (only once)
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// 2 MiB layout with flash starting at the boot partition.
pub fn test_table() -> PartitionTable {
    PartitionTable::new(
        "test-2mb",
        0x20_0000,
        vec![
            PartitionSpec::new("boot", 0x2_0000, 0x2_0000, "boot.bin"),
            PartitionSpec::new("code", 0x4_0000, 0x10_0000, "code.bin"),
            PartitionSpec::new("web", 0x14_0000, 0xd_0000, "web.bin"),
            PartitionSpec::new("config", 0x21_0000, 0x1_0000, "config.bin"),
        ],
    )
    .expect("Invalid test table")
}

/// Deterministic bytes that never end in 0xFF.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| ((i as u32).wrapping_mul(31).wrapping_add(seed as u32) % 0xfe) as u8)
        .collect()
}

/// A deflated zip entry header followed by pattern bytes.
pub fn zip_entry(len: usize, seed: u8) -> Vec<u8> {
    let mut entry = pattern(len, seed);
    entry[..4].copy_from_slice(b"PK\x03\x04");
    entry[4..10].copy_from_slice(&[0x14, 0x00, 0x00, 0x00, 0x08, 0x00]);
    entry
}

/// Vendor bundle layout: a header, then each block with padding and trailer,
/// then the signature. Blocks are given in file order.
pub fn build_bundle(blocks: &[(&[u8], usize)]) -> Vec<u8> {
    let mut bundle = b"VENDOR HEADER".to_vec();
    for (payload, padding) in blocks {
        bundle.extend_from_slice(payload);
        bundle.extend(std::iter::repeat(0xff).take(*padding));
        bundle.extend_from_slice(Trailer::for_payload(payload).as_bytes());
    }
    bundle.extend_from_slice(BUNDLE_SIGNATURE);
    bundle
}

pub fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("Failed to write test file");
    path
}

pub fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read test file")
}
