// Licensed under the Apache-2.0 license

use crate::error::{FlashError, Result};
use flash_config::{FlashScheme, PartitionDef};
use log::debug;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    pub name: String,
    pub base_address: u32,
    pub size: u32,
    pub file_label: String,
}

impl PartitionSpec {
    pub fn new(name: &str, base_address: u32, size: u32, file_label: &str) -> Self {
        Self {
            name: name.to_string(),
            base_address,
            size,
            file_label: file_label.to_string(),
        }
    }

    /// Absolute end address, exclusive.
    pub fn end_address(&self) -> u64 {
        self.base_address as u64 + self.size as u64
    }
}

impl From<&PartitionDef> for PartitionSpec {
    fn from(def: &PartitionDef) -> Self {
        PartitionSpec::new(def.name, def.base_address, def.size, def.file_label)
    }
}

/// Validated partition layout of one flash device.
///
/// Partitions are kept sorted by base address and never overlap. The lowest
/// base address is the origin: it maps to offset zero of a flash image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    name: String,
    flash_size: u32,
    partitions: Vec<PartitionSpec>,
}

impl PartitionTable {
    pub fn new(name: &str, flash_size: u32, mut partitions: Vec<PartitionSpec>) -> Result<Self> {
        if partitions.is_empty() {
            return Err(FlashError::EmptyScheme(name.to_string()));
        }
        partitions.sort_by_key(|p| p.base_address);

        for pair in partitions.windows(2) {
            if pair[0].end_address() > pair[1].base_address as u64 {
                return Err(FlashError::OverlappingPartitions {
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }

        let origin = partitions[0].base_address as u64;
        let span = partitions
            .iter()
            .map(PartitionSpec::end_address)
            .max()
            .unwrap_or(origin)
            - origin;
        if span > flash_size as u64 {
            return Err(FlashError::SizeMismatch {
                name: name.to_string(),
                expected: flash_size as u64,
                actual: span,
            });
        }

        debug!(
            "Partition table '{}': {} partitions from 0x{:08x}, 0x{:x} bytes",
            name,
            partitions.len(),
            origin,
            flash_size
        );
        Ok(Self {
            name: name.to_string(),
            flash_size,
            partitions,
        })
    }

    pub fn from_scheme(scheme: &FlashScheme) -> Result<Self> {
        Self::new(
            scheme.name,
            scheme.flash_size,
            scheme.partitions.iter().map(PartitionSpec::from).collect(),
        )
    }

    /// Table of a built-in scheme, by name.
    pub fn builtin(name: &str) -> Result<Self> {
        let scheme = flash_config::find_scheme(name)
            .ok_or_else(|| FlashError::UnknownScheme(name.to_string()))?;
        Self::from_scheme(scheme)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flash_size(&self) -> usize {
        self.flash_size as usize
    }

    pub fn partitions(&self) -> &[PartitionSpec] {
        &self.partitions
    }

    pub fn origin(&self) -> u32 {
        self.partitions[0].base_address
    }

    pub fn resolve(&self, name: &str) -> Result<&PartitionSpec> {
        self.partitions
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| FlashError::UnknownPartition(name.to_string()))
    }

    /// Offset window of `spec` inside a flash image of this table.
    pub fn range(&self, spec: &PartitionSpec) -> Range<usize> {
        let start = spec.base_address.wrapping_sub(self.origin()) as usize;
        start..start + spec.size as usize
    }
}
