// Licensed under the Apache-2.0 license

//! User supplied flash layouts.
//!
//! A layout file describes a scheme that is not built in:
//!
//! ```toml
//! name = "custom"
//! flash_size = 0x200000
//!
//! [[partitions]]
//! name = "boot"
//! base = 0x90000000
//! size = 0x20000
//! file = "boot.bin"
//! ```

use crate::error::{FlashError, Result};
use crate::io::read_file;
use crate::table::{PartitionSpec, PartitionTable};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct LayoutFile {
    pub name: String,
    pub flash_size: u32,
    pub partitions: Vec<LayoutPartition>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutPartition {
    pub name: String,
    pub base: u32,
    pub size: u32,
    // defaults to "<name>.bin"
    pub file: Option<String>,
}

impl LayoutFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| FlashError::Layout {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn into_table(self) -> Result<PartitionTable> {
        let partitions = self
            .partitions
            .into_iter()
            .map(|p| {
                let file = p.file.unwrap_or_else(|| format!("{}.bin", p.name));
                PartitionSpec::new(&p.name, p.base, p.size, &file)
            })
            .collect();
        PartitionTable::new(&self.name, self.flash_size, partitions)
    }
}

/// Reads a TOML layout file and validates it into a partition table.
pub fn load_layout(path: &Path) -> Result<PartitionTable> {
    let data = read_file(path)?;
    let text = String::from_utf8_lossy(&data);
    LayoutFile::parse(&text, path)?.into_table()
}
