// Licensed under the Apache-2.0 license

//! Whole-file operations: each one loads its inputs and transforms buffers in
//! memory before writing anything. Single-output operations leave their output
//! untouched on failure; `split_image` may leave earlier partition files
//! behind when a later write fails.

use crate::error::{FlashError, Result};
use crate::flash_image::FlashImage;
use crate::io::{create_dir, read_file, write_file};
use crate::locator::{self, EmbeddedBlock};
use crate::partition::Partition;
use crate::scanner::{self, ScanMatch, Window};
use crate::table::PartitionTable;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Writes an erased image.
pub fn create_image(table: &PartitionTable, output: &Path) -> Result<()> {
    FlashImage::create(table).store(output)
}

/// Splits an image into one file per partition.
pub fn split_image(table: &PartitionTable, image: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    let image = FlashImage::load(table, image)?;
    create_dir(dir)?;
    let mut files = Vec::new();
    for spec in table.partitions() {
        let dest = dir.join(&spec.file_label);
        image.extract_partition_file(spec, &dest)?;
        files.push(dest);
    }
    info!("Split '{}' into {} partitions", table.name(), files.len());
    Ok(files)
}

/// Builds an image from the partition files in `dir`.
///
/// Partitions without a file stay erased.
pub fn merge_image(table: &PartitionTable, dir: &Path, output: &Path) -> Result<()> {
    let mut image = FlashImage::create(table);
    for spec in table.partitions() {
        let src = dir.join(&spec.file_label);
        if !src.exists() {
            warn!(
                "No file {} for partition '{}', leaving it erased",
                src.display(),
                spec.name
            );
            continue;
        }
        image.merge_partition_file(spec, &src)?;
    }
    image.store(output)
}

/// Replaces the payload of one partition of an image.
pub fn change_partition(
    table: &PartitionTable,
    image_path: &Path,
    name: &str,
    payload_path: &Path,
    output: &Path,
) -> Result<()> {
    let spec = table.resolve(name)?;
    let mut image = FlashImage::load(table, image_path)?;
    let payload = read_file(payload_path)?;

    let mut partition = Partition::new(table, spec);
    partition.update(&payload)?;
    image.apply_partition(&partition)?;
    info!(
        "Partition '{}' now holds 0x{:x} of 0x{:x} bytes",
        name,
        payload.len(),
        partition.capacity()
    );
    image.store(output)
}

pub struct ExtractFirmwareArgs<'a> {
    pub bundle: &'a Path,
    /// Existing image to patch; a fresh erased image when `None`.
    pub image: Option<&'a Path>,
    /// Partitions receiving the recovered blocks, last block of the bundle first.
    pub partitions: &'a [String],
    pub output: &'a Path,
    /// Refuse blocks that fail any validation check.
    pub strict: bool,
}

/// Recovers the blocks of a vendor bundle and writes them into partitions.
pub fn extract_firmware(table: &PartitionTable, args: ExtractFirmwareArgs) -> Result<Vec<EmbeddedBlock>> {
    let bundle = read_file(args.bundle)?;
    let mut image = match args.image {
        Some(path) => FlashImage::load(table, path)?,
        None => FlashImage::create(table),
    };

    let mut found = Vec::new();
    let mut offset = locator::signature_offset(&bundle);
    for name in args.partitions {
        let spec = table.resolve(name)?;
        let block = locator::locate(&bundle, offset);
        debug!(
            "Block for '{}' at 0x{:x}, 0x{:x} bytes",
            name, block.start, block.length
        );
        report_findings(&block);
        if args.strict && !block.is_valid() {
            return Err(unverified(&block));
        }

        let payload = block.payload(&bundle).ok_or(FlashError::OutOfBounds {
            start: block.range().start,
            end: block.range().end,
            len: bundle.len(),
        })?;
        let mut partition = Partition::new(table, spec);
        partition.update(payload)?;
        image.apply_partition(&partition)?;
        info!("Partition '{}' <- 0x{:x} bytes", name, payload.len());

        offset = block.start;
        found.push(block);
    }
    image.store(args.output)?;
    Ok(found)
}

/// Lists up to `count` chained blocks of a bundle without writing anything.
pub fn locate_blocks(bundle: &Path, offset: Option<usize>, count: usize) -> Result<Vec<EmbeddedBlock>> {
    let data = read_file(bundle)?;
    let mut offset = offset.unwrap_or_else(|| locator::signature_offset(&data));
    let mut blocks = Vec::new();
    for _ in 0..count {
        let block = locator::locate(&data, offset);
        report_findings(&block);
        let next = block.start;
        blocks.push(block);
        if next >= offset {
            break;
        }
        offset = next;
    }
    Ok(blocks)
}

fn report_findings(block: &EmbeddedBlock) {
    for finding in block.findings.iter().filter(|f| !f.ok) {
        warn!("Block at 0x{:x}: {}", block.start, finding);
    }
}

fn unverified(block: &EmbeddedBlock) -> FlashError {
    let findings: Vec<String> = block
        .findings
        .iter()
        .filter(|f| !f.ok)
        .map(|f| f.to_string())
        .collect();
    FlashError::UnverifiedBlock {
        start: block.start,
        findings: findings.join(", "),
    }
}

/// Writes the window behind every occurrence of `signature` to `dir`.
pub fn scan(
    input: &Path,
    name: &str,
    signature: &[u8],
    window: Window,
    dir: Option<&Path>,
) -> Result<Vec<ScanMatch>> {
    let data = read_file(input)?;
    if let Some(dir) = dir {
        create_dir(dir)?;
    }
    let mut matches = Vec::new();
    for found in scanner::find_all(&data, signature) {
        let bytes = found.window(&data, window);
        info!("{} at 0x{:x} (0x{:x} bytes)", name, found.offset, bytes.len());
        if let Some(dir) = dir {
            write_file(&dir.join(format!("{}-{:08x}.bin", name, found.offset)), bytes)?;
        }
        matches.push(found);
    }
    Ok(matches)
}

/// Where [`write_region`] places its data.
pub enum Region<'a> {
    Partition(&'a str),
    Offsets { start: usize, end: usize },
}

/// Writes a vendor file into a region of an image that may be shorter than flash.
///
/// The output keeps the length of the input image, extended up to the end of
/// the region when needed. A missing input image counts as empty.
pub fn write_region(
    table: &PartitionTable,
    image_path: &Path,
    region: Region,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let (start, end) = match region {
        Region::Partition(name) => {
            let range = table.range(table.resolve(name)?);
            (range.start, range.end)
        }
        Region::Offsets { start, end } => (start, end),
    };
    let original = if image_path.exists() {
        read_file(image_path)?
    } else {
        Vec::new()
    };
    let kept = original.len().max(end);
    let mut image = FlashImage::from_partial_bytes(table, original)?;
    let data = read_file(input)?;
    image.overwrite_region(start, end, &data)?;
    image.store_prefix(output, kept)
}

/// State of one partition of an image, as reported by [`inspect_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStatus {
    pub name: String,
    pub base_address: u32,
    pub size: u32,
    /// Payload length and whether its CRC matches; `None` without a valid trailer.
    pub payload: Option<(u32, bool)>,
}

pub fn inspect_image(table: &PartitionTable, image_path: &Path) -> Result<Vec<PartitionStatus>> {
    let image = FlashImage::load(table, image_path)?;
    let mut statuses = Vec::new();
    for spec in table.partitions() {
        let partition = image.extract_partition(spec)?;
        let payload = match (partition.trailer(), partition.payload()) {
            (Some(trailer), Some(payload)) => Some((trailer.length(), trailer.matches(payload))),
            _ => None,
        };
        statuses.push(PartitionStatus {
            name: spec.name.clone(),
            base_address: spec.base_address,
            size: spec.size,
            payload,
        });
    }
    Ok(statuses)
}
