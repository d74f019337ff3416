// Licensed under the Apache-2.0 license

use crate::error::{FlashError, Result};
use crate::table::{PartitionSpec, PartitionTable};
use flash_image::{Trailer, ERASED_BYTE, TRAILER_SIZE};
use std::ops::Range;
use zerocopy::IntoBytes;

/// In-memory contents of one partition.
///
/// A partition is written as `payload | 0xFF padding | trailer`, the
/// trailer occupying the last [`TRAILER_SIZE`] bytes.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    spec: &'a PartitionSpec,
    range: Range<usize>,
    data: Vec<u8>,
}

impl<'a> Partition<'a> {
    /// Creates an erased partition.
    pub fn new(table: &PartitionTable, spec: &'a PartitionSpec) -> Self {
        Self {
            spec,
            range: table.range(spec),
            data: vec![ERASED_BYTE; spec.size as usize],
        }
    }

    /// Wraps existing partition contents, which must be exactly `spec.size` bytes.
    pub fn with_data(table: &PartitionTable, spec: &'a PartitionSpec, data: Vec<u8>) -> Result<Self> {
        if data.len() != spec.size as usize {
            return Err(FlashError::SizeMismatch {
                name: spec.name.clone(),
                expected: spec.size as u64,
                actual: data.len() as u64,
            });
        }
        Ok(Self {
            spec,
            range: table.range(spec),
            data,
        })
    }

    pub fn spec(&self) -> &PartitionSpec {
        self.spec
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Offset window of the partition inside a flash image.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Largest payload that still leaves room for the trailer.
    pub fn capacity(&self) -> usize {
        self.data.len().saturating_sub(TRAILER_SIZE)
    }

    pub fn erase(&mut self) {
        self.data.fill(ERASED_BYTE);
    }

    /// Replaces the partition contents with `payload` followed by its trailer.
    pub fn update(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() + TRAILER_SIZE > self.data.len() {
            return Err(FlashError::PayloadTooLarge {
                name: self.spec.name.clone(),
                limit: self.capacity(),
                actual: payload.len(),
            });
        }
        self.erase();
        self.data[..payload.len()].copy_from_slice(payload);
        let trailer_start = self.data.len() - TRAILER_SIZE;
        self.data[trailer_start..].copy_from_slice(Trailer::for_payload(payload).as_bytes());
        Ok(())
    }

    pub fn trailer(&self) -> Option<Trailer> {
        let start = self.data.len().checked_sub(TRAILER_SIZE)?;
        Trailer::parse(&self.data[start..])
    }

    /// Payload described by the trailer, if the trailer is well formed.
    pub fn payload(&self) -> Option<&[u8]> {
        let trailer = self.trailer().filter(Trailer::has_magic)?;
        let len = trailer.length() as usize;
        if len > self.capacity() {
            return None;
        }
        Some(&self.data[..len])
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
