// Licensed under the Apache-2.0 license

#![no_std]

//! Flash layouts of the supported router models.
//!
//! Each [`FlashScheme`] describes one device: the size of its flash chip and
//! the partitions it is divided into. Addresses are absolute (as seen by the
//! CPU); the lowest partition address is the start of flash.

pub mod flash;

pub use flash::{FBOX_4MB, FBOX_8MB, SCHEMES, SINUS_154, ZYXEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDef {
    pub name: &'static str,       // name of the partition
    pub base_address: u32,        // absolute start address
    pub size: u32,                // size in bytes
    pub file_label: &'static str, // file the partition is split into / merged from
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashScheme {
    pub name: &'static str,
    pub description: &'static str,
    pub flash_size: u32,
    pub partitions: &'static [PartitionDef], // sorted by base address
}

/// Looks up a scheme by its name.
pub fn find_scheme(name: &str) -> Option<&'static FlashScheme> {
    SCHEMES.iter().copied().find(|scheme| scheme.name == name)
}
