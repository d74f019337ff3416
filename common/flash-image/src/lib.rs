// Licensed under the Apache-2.0 license
#![no_std]

//! On-flash layout shared by every partition written by the toolkit.
//!
//! A partition holds its payload at offset zero, 0xFF padding after it, and a
//! fixed [`Trailer`] in its last bytes. Readers that only know where the
//! partition ends can recover the payload from the trailer alone.

use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const TRAILER_MAGIC: u32 = 0x1234_5678;
pub const TRAILER_SIZE: usize = core::mem::size_of::<Trailer>();

/// Value of an erased NOR flash byte.
pub const ERASED_BYTE: u8 = 0xff;

/// Length of the opaque tag terminating a vendor firmware bundle.
pub const BUNDLE_SIGNATURE_SIZE: usize = 10;

/// Vendor files carry a checksum in their last bytes which is not written to flash.
pub const VENDOR_CHECKSUM_SIZE: usize = 8;

pub const ZIP_LOCAL_HEADER_MAGIC: [u8; 4] = *b"PK\x03\x04";
pub const ZIP_METHOD_DEFLATE: [u8; 2] = [0x08, 0x00];
pub const ZIP_FLAGS_OFFSET: usize = 7;
pub const ZIP_METHOD_OFFSET: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Trailer {
    pub length: U32<LittleEndian>,
    pub magic: U32<LittleEndian>,
    pub crc32: U32<LittleEndian>,
}

impl Trailer {
    /// Builds the trailer describing `payload`.
    pub fn for_payload(payload: &[u8]) -> Self {
        Trailer {
            length: (payload.len() as u32).into(),
            magic: TRAILER_MAGIC.into(),
            crc32: crc32(payload).into(),
        }
    }

    /// Decodes a trailer from exactly [`TRAILER_SIZE`] bytes.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        Trailer::read_from_bytes(bytes).ok()
    }

    pub fn length(&self) -> u32 {
        self.length.get()
    }

    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    pub fn crc32(&self) -> u32 {
        self.crc32.get()
    }

    pub fn has_magic(&self) -> bool {
        self.magic() == TRAILER_MAGIC
    }

    pub fn matches(&self, payload: &[u8]) -> bool {
        self.length() as usize == payload.len() && self.crc32() == crc32(payload)
    }
}

/// IEEE 802.3 CRC32 over `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// True when `bytes` starts like a deflated zip entry.
pub fn looks_like_zip_entry(bytes: &[u8]) -> bool {
    bytes.len() >= ZIP_METHOD_OFFSET + 2
        && bytes[..4] == ZIP_LOCAL_HEADER_MAGIC
        && bytes[ZIP_FLAGS_OFFSET] & 1 == 0
        && bytes[ZIP_METHOD_OFFSET..ZIP_METHOD_OFFSET + 2] == ZIP_METHOD_DEFLATE
}
