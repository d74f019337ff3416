// Licensed under the Apache-2.0 license

use anyhow::{anyhow, Result};
use clap_num::maybe_hex;
use flash_builder::scanner::{known_signature, Window};
use flash_builder::workflow::{self, ExtractFirmwareArgs};
use flash_builder::{EmbeddedBlock, PartitionTable};
use std::path::Path;

pub(crate) fn parse_window(s: &str) -> Result<Window, String> {
    if s == "end" {
        return Ok(Window::ToEnd);
    }
    maybe_hex::<usize>(s).map(Window::Fixed)
}

/// Resolves a signature given by name or as hex bytes, with its default window.
fn parse_signature(s: &str) -> Result<(String, Vec<u8>, Window)> {
    if let Some(known) = known_signature(s) {
        return Ok((known.name.to_string(), known.magic.to_vec(), known.window));
    }
    let hex_str = s.trim_start_matches("0x");
    let magic = hex::decode(hex_str)
        .map_err(|e| anyhow!("Invalid signature '{}': {}", s, e))?;
    if magic.is_empty() {
        return Err(anyhow!("Empty signature"));
    }
    Ok((hex_str.to_lowercase(), magic, Window::ToEnd))
}

fn print_block(index: usize, block: &EmbeddedBlock) {
    println!(
        "block {}: start 0x{:08x}  length 0x{:x}  magic 0x{:08x}  crc32 0x{:08x}",
        index, block.start, block.length, block.magic, block.crc32
    );
    for finding in &block.findings {
        println!("    {}", finding);
    }
}

pub(crate) fn extract(
    table: &PartitionTable,
    bundle: &Path,
    partitions: &[String],
    image: Option<&Path>,
    output: &Path,
    strict: bool,
) -> Result<()> {
    let blocks = workflow::extract_firmware(
        table,
        ExtractFirmwareArgs {
            bundle,
            image,
            partitions,
            output,
            strict,
        },
    )?;
    for (index, block) in blocks.iter().enumerate() {
        print_block(index, block);
    }
    Ok(())
}

pub(crate) fn locate(bundle: &Path, offset: Option<usize>, count: usize) -> Result<()> {
    for (index, block) in workflow::locate_blocks(bundle, offset, count)?
        .iter()
        .enumerate()
    {
        print_block(index, block);
    }
    Ok(())
}

pub(crate) fn scan(
    input: &Path,
    signature: &str,
    window: Option<Window>,
    dir: Option<&Path>,
) -> Result<()> {
    let (name, magic, default_window) = parse_signature(signature)?;
    let matches = workflow::scan(input, &name, &magic, window.unwrap_or(default_window), dir)?;
    for found in &matches {
        println!("0x{:08x}", found.offset);
    }
    if matches.is_empty() {
        println!("{} not found", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("end"), Ok(Window::ToEnd));
        assert_eq!(parse_window("0x100"), Ok(Window::Fixed(0x100)));
        assert_eq!(parse_window("64"), Ok(Window::Fixed(64)));
        assert!(parse_window("lots").is_err());
    }

    #[test]
    fn test_parse_signature() {
        let (name, magic, window) = parse_signature("squashfs").unwrap();
        assert_eq!(name, "squashfs");
        assert_eq!(magic, b"hsqs");
        assert_eq!(window, Window::ToEnd);

        let (name, magic, _) = parse_signature("0xDEADBEEF").unwrap();
        assert_eq!(name, "deadbeef");
        assert_eq!(magic, vec![0xde, 0xad, 0xbe, 0xef]);

        assert!(parse_signature("xyz").is_err());
        assert!(parse_signature("0x").is_err());
    }
}
