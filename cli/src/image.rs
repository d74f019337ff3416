// Licensed under the Apache-2.0 license

use anyhow::{bail, Result};
use flash_builder::workflow::{self, Region};
use flash_builder::PartitionTable;
use std::path::Path;

pub(crate) fn schemes() {
    for scheme in flash_config::SCHEMES {
        println!(
            "{:<12} 0x{:08x} bytes  {}",
            scheme.name, scheme.flash_size, scheme.description
        );
        for partition in scheme.partitions {
            println!(
                "    {:<12} 0x{:08x}  0x{:08x}  {}",
                partition.name, partition.base_address, partition.size, partition.file_label
            );
        }
    }
}

pub(crate) fn create(table: &PartitionTable, output: &Path) -> Result<()> {
    workflow::create_image(table, output)?;
    Ok(())
}

pub(crate) fn split(table: &PartitionTable, image: &Path, dir: &Path) -> Result<()> {
    for file in workflow::split_image(table, image, dir)? {
        println!("{}", file.display());
    }
    Ok(())
}

pub(crate) fn merge(table: &PartitionTable, dir: &Path, output: &Path) -> Result<()> {
    workflow::merge_image(table, dir, output)?;
    Ok(())
}

pub(crate) fn change_partition(
    table: &PartitionTable,
    image: &Path,
    partition: &str,
    input: &Path,
    output: &Path,
) -> Result<()> {
    workflow::change_partition(table, image, partition, input, output)?;
    Ok(())
}

pub(crate) fn inspect(table: &PartitionTable, image: &Path) -> Result<()> {
    println!("{} (origin 0x{:08x})", table.name(), table.origin());
    for status in workflow::inspect_image(table, image)? {
        let state = match status.payload {
            Some((len, true)) => format!("0x{:x} bytes, crc ok", len),
            Some((len, false)) => format!("0x{:x} bytes, crc BAD", len),
            None => "no trailer".to_string(),
        };
        println!(
            "{:<12} 0x{:08x}  0x{:08x}  {}",
            status.name, status.base_address, status.size, state
        );
    }
    Ok(())
}

pub(crate) fn write_region(
    table: &PartitionTable,
    image: &Path,
    partition: Option<&str>,
    offsets: Option<(usize, usize)>,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let region = match (partition, offsets) {
        (Some(name), _) => Region::Partition(name),
        (None, Some((start, end))) => Region::Offsets { start, end },
        (None, None) => bail!("Either --partition or --start/--end is required"),
    };
    workflow::write_region(table, image, region, input, output)?;
    Ok(())
}
