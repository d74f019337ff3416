// Licensed under the Apache-2.0 license

use crate::error::{FlashError, Result};
use crate::io::{read_file, write_file};
use crate::partition::Partition;
use crate::table::{PartitionSpec, PartitionTable};
use flash_image::{ERASED_BYTE, VENDOR_CHECKSUM_SIZE};
use log::{debug, info};
use std::ops::Range;
use std::path::Path;

/// Whole contents of a flash chip laid out according to a [`PartitionTable`].
pub struct FlashImage<'t> {
    table: &'t PartitionTable,
    bytes: Vec<u8>,
}

impl<'t> FlashImage<'t> {
    /// Creates an erased image.
    pub fn create(table: &'t PartitionTable) -> Self {
        Self {
            table,
            bytes: vec![ERASED_BYTE; table.flash_size()],
        }
    }

    pub fn from_bytes(table: &'t PartitionTable, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != table.flash_size() {
            return Err(FlashError::UnexpectedImageSize {
                expected: table.flash_size(),
                actual: bytes.len(),
            });
        }
        Ok(Self { table, bytes })
    }

    /// Loads an image that must be exactly the flash size.
    pub fn load(table: &'t PartitionTable, path: &Path) -> Result<Self> {
        let image = Self::from_bytes(table, read_file(path)?)?;
        debug!("Loaded flash image {}", path.display());
        Ok(image)
    }

    /// Loads an image that may cover only the start of flash; the rest is erased.
    pub fn load_partial(table: &'t PartitionTable, path: &Path) -> Result<Self> {
        let image = Self::from_partial_bytes(table, read_file(path)?)?;
        debug!("Loaded partial flash image {}", path.display());
        Ok(image)
    }

    /// Pads `bytes` with erased flash up to the flash size.
    pub fn from_partial_bytes(table: &'t PartitionTable, mut bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() > table.flash_size() {
            return Err(FlashError::UnexpectedImageSize {
                expected: table.flash_size(),
                actual: bytes.len(),
            });
        }
        debug!("0x{:x} of 0x{:x} bytes present", bytes.len(), table.flash_size());
        bytes.resize(table.flash_size(), ERASED_BYTE);
        Ok(Self { table, bytes })
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        self.store_prefix(path, self.bytes.len())
    }

    /// Writes only the first `len` bytes of the image, for dumps shorter than flash.
    pub fn store_prefix(&self, path: &Path, len: usize) -> Result<()> {
        let len = len.min(self.bytes.len());
        write_file(path, &self.bytes[..len])?;
        info!("Wrote 0x{:x} bytes to flash image {}", len, path.display());
        Ok(())
    }

    pub fn table(&self) -> &'t PartitionTable {
        self.table
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.bytes.len() {
            return Err(FlashError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Copies the partition contents to its window in the image.
    pub fn apply_partition(&mut self, partition: &Partition) -> Result<()> {
        let range = partition.range();
        self.check_range(&range)?;
        self.bytes[range].copy_from_slice(partition.data());
        Ok(())
    }

    /// Copies a partition out of the image.
    pub fn extract_partition<'s>(&self, spec: &'s PartitionSpec) -> Result<Partition<'s>> {
        let range = self.table.range(spec);
        self.check_range(&range)?;
        Partition::with_data(self.table, spec, self.bytes[range].to_vec())
    }

    pub fn extract_partition_file(&self, spec: &PartitionSpec, dest: &Path) -> Result<()> {
        let partition = self.extract_partition(spec)?;
        write_file(dest, partition.data())?;
        debug!("Partition '{}' -> {}", spec.name, dest.display());
        Ok(())
    }

    /// Replaces a partition with the contents of a finished partition file.
    pub fn merge_partition_file(&mut self, spec: &PartitionSpec, src: &Path) -> Result<()> {
        let data = read_file(src)?;
        let partition = Partition::with_data(self.table, spec, data)?;
        self.apply_partition(&partition)?;
        debug!("Partition '{}' <- {}", spec.name, src.display());
        Ok(())
    }

    /// Erases `[start, end)` and writes a vendor file into it.
    ///
    /// The last [`VENDOR_CHECKSUM_SIZE`] bytes of `data` are a checksum of the
    /// vendor file and are not written. Data that does not fit into the region
    /// is rejected rather than truncated.
    pub fn overwrite_region(&mut self, start: usize, end: usize, data: &[u8]) -> Result<()> {
        let range = start..end;
        self.check_range(&range)?;
        let len = data.len().saturating_sub(VENDOR_CHECKSUM_SIZE);
        if len > range.len() {
            return Err(FlashError::PayloadTooLarge {
                name: format!("0x{start:x}..0x{end:x}"),
                limit: range.len(),
                actual: len,
            });
        }
        self.bytes[range].fill(ERASED_BYTE);
        self.bytes[start..start + len].copy_from_slice(&data[..len]);
        debug!("Wrote 0x{:x} bytes at 0x{:x}", len, start);
        Ok(())
    }
}
