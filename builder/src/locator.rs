// Licensed under the Apache-2.0 license

//! Recovery of trailer-described blocks from vendor firmware bundles.
//!
//! A bundle ends with an opaque [`BUNDLE_SIGNATURE_SIZE`] byte signature.
//! Right before it sits the trailer of the last block, and before that the
//! block payload followed by 0xFF padding. Blocks have no start marker: the
//! start is found by walking back over the padding to the end of the payload
//! and subtracting the length from the trailer. The start of one block is the
//! end of the trailer of the block before it, so blocks are recovered right
//! to left by feeding each start back in as the next offset.

use flash_image::{
    crc32, Trailer, BUNDLE_SIGNATURE_SIZE, ERASED_BYTE, TRAILER_MAGIC, TRAILER_SIZE,
    ZIP_FLAGS_OFFSET, ZIP_LOCAL_HEADER_MAGIC, ZIP_METHOD_DEFLATE, ZIP_METHOD_OFFSET,
};
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Magic,
    Crc,
    ZipSignature,
    ZipFlags,
    ZipMethod,
}

impl Check {
    pub const ALL: [Check; 5] = [
        Check::Magic,
        Check::Crc,
        Check::ZipSignature,
        Check::ZipFlags,
        Check::ZipMethod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Check::Magic => "trailer magic",
            Check::Crc => "crc32",
            Check::ZipSignature => "zip signature",
            Check::ZipFlags => "zip flags",
            Check::ZipMethod => "zip method",
        }
    }
}

/// Outcome of a single validation check of a recovered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finding {
    pub check: Check,
    pub ok: bool,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.check.as_str(),
            if self.ok { "ok" } else { "bad" }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedBlock {
    pub start: usize,
    pub length: u32,
    pub magic: u32,
    pub crc32: u32,
    pub findings: Vec<Finding>,
}

impl EmbeddedBlock {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start.saturating_add(self.length as usize)
    }

    /// Payload bytes inside `buffer`, if the block lies within it.
    pub fn payload<'a>(&self, buffer: &'a [u8]) -> Option<&'a [u8]> {
        buffer.get(self.range())
    }

    pub fn finding(&self, check: Check) -> Option<bool> {
        self.findings
            .iter()
            .find(|finding| finding.check == check)
            .map(|finding| finding.ok)
    }

    pub fn is_valid(&self) -> bool {
        self.findings.iter().all(|finding| finding.ok)
    }

    pub fn failed_checks(&self) -> Vec<Check> {
        self.findings
            .iter()
            .filter(|finding| !finding.ok)
            .map(|finding| finding.check)
            .collect()
    }
}

/// Offset of the bundle signature, the starting point of the first [`locate`].
pub fn signature_offset(buffer: &[u8]) -> usize {
    buffer.len().saturating_sub(BUNDLE_SIGNATURE_SIZE)
}

/// Recovers the block whose trailer ends at `offset`.
///
/// Never fails: a trailer that cannot be read decodes as all zeroes and fails
/// every check. Any other check that cannot be evaluated is reported as failed.
pub fn locate(buffer: &[u8], offset: usize) -> EmbeddedBlock {
    let trailer_start = offset.saturating_sub(TRAILER_SIZE);
    let trailer = offset
        .checked_sub(TRAILER_SIZE)
        .and_then(|start| buffer.get(start..offset))
        .and_then(Trailer::parse);
    let (length, magic, crc) = trailer
        .as_ref()
        .map(|t| (t.length(), t.magic(), t.crc32()))
        .unwrap_or((0, 0, 0));

    // Walk back over the padding to the end of the payload.
    let mut end = trailer_start.min(buffer.len());
    while end > 0 && buffer[end - 1] == ERASED_BYTE {
        end -= 1;
    }
    let start = end.saturating_sub(length as usize);

    let mut block = EmbeddedBlock {
        start,
        length,
        magic,
        crc32: crc,
        findings: Vec::with_capacity(Check::ALL.len()),
    };
    let payload = if trailer.is_some() && end >= length as usize {
        block.payload(buffer)
    } else {
        None
    };
    let header = |range: Range<usize>| payload.and_then(|p| p.get(range));

    block.findings = Check::ALL
        .iter()
        .map(|&check| {
            let ok = match check {
                Check::Magic => magic == TRAILER_MAGIC,
                Check::Crc => payload.is_some_and(|p| crc32(p) == crc),
                Check::ZipSignature => header(0..4) == Some(&ZIP_LOCAL_HEADER_MAGIC[..]),
                Check::ZipFlags => header(ZIP_FLAGS_OFFSET..ZIP_FLAGS_OFFSET + 1)
                    .is_some_and(|flags| flags[0] & 1 == 0),
                Check::ZipMethod => {
                    header(ZIP_METHOD_OFFSET..ZIP_METHOD_OFFSET + 2)
                        == Some(&ZIP_METHOD_DEFLATE[..])
                }
            };
            Finding { check, ok }
        })
        .collect();
    block
}

/// Iterator over the blocks of a bundle, last block first.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl Iterator for Blocks<'_> {
    type Item = EmbeddedBlock;

    fn next(&mut self) -> Option<EmbeddedBlock> {
        if self.offset < TRAILER_SIZE {
            return None;
        }
        let block = locate(self.buffer, self.offset);
        // stop instead of revisiting the same trailer
        if block.start >= self.offset {
            self.offset = 0;
        } else {
            self.offset = block.start;
        }
        Some(block)
    }
}

/// Chains [`locate`] from the bundle signature towards the start of `buffer`.
pub fn blocks(buffer: &[u8]) -> Blocks<'_> {
    Blocks {
        buffer,
        offset: signature_offset(buffer),
    }
}
