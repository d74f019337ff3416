// Licensed under the Apache-2.0 license

//! Forward search for fixed magic numbers, such as boot loader and file
//! system headers, inside arbitrary blobs.

use std::ops::Range;

/// uImage header magic, found in front of boot loader images.
pub const BOOTLOADER_MAGIC: [u8; 4] = [0x27, 0x05, 0x19, 0x56];
/// Little endian squashfs superblock magic.
pub const SQUASHFS_MAGIC: [u8; 4] = *b"hsqs";

pub const BOOTLOADER_WINDOW: usize = 64 * 1024;

/// How many bytes following a match belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Fixed(usize),
    ToEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownSignature {
    pub name: &'static str,
    pub magic: &'static [u8],
    pub window: Window,
}

pub const KNOWN_SIGNATURES: &[KnownSignature] = &[
    KnownSignature {
        name: "bootloader",
        magic: &BOOTLOADER_MAGIC,
        window: Window::Fixed(BOOTLOADER_WINDOW),
    },
    KnownSignature {
        name: "squashfs",
        magic: &SQUASHFS_MAGIC,
        window: Window::ToEnd,
    },
];

pub fn known_signature(name: &str) -> Option<&'static KnownSignature> {
    KNOWN_SIGNATURES.iter().find(|s| s.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMatch {
    pub offset: usize,
    pub signature_length: usize,
}

impl ScanMatch {
    pub fn range(&self, buffer_len: usize, window: Window) -> Range<usize> {
        let end = match window {
            Window::Fixed(len) => self.offset.saturating_add(len).min(buffer_len),
            Window::ToEnd => buffer_len,
        };
        self.offset..end
    }

    /// Bytes from the match start, clamped to the end of `buffer`.
    pub fn window<'a>(&self, buffer: &'a [u8], window: Window) -> &'a [u8] {
        &buffer[self.range(buffer.len(), window)]
    }
}

/// Lazy iterator over the occurrences of a signature.
///
/// After a hit the search continues right behind the signature bytes, not
/// behind the window, so closely stacked headers are all reported.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    buffer: &'a [u8],
    signature: &'a [u8],
    position: usize,
}

impl Iterator for Matches<'_> {
    type Item = ScanMatch;

    fn next(&mut self) -> Option<ScanMatch> {
        if self.signature.is_empty() || self.position >= self.buffer.len() {
            return None;
        }
        let found = self.buffer[self.position..]
            .windows(self.signature.len())
            .position(|candidate| candidate == self.signature);
        match found {
            Some(relative) => {
                let offset = self.position + relative;
                self.position = offset + self.signature.len();
                Some(ScanMatch {
                    offset,
                    signature_length: self.signature.len(),
                })
            }
            None => {
                self.position = self.buffer.len();
                None
            }
        }
    }
}

pub fn find_all<'a>(buffer: &'a [u8], signature: &'a [u8]) -> Matches<'a> {
    Matches {
        buffer,
        signature,
        position: 0,
    }
}
