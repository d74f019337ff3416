// Licensed under the Apache-2.0 license

use crate::{FlashScheme, PartitionDef};

/// Start of NOR flash in KSEG0 on AR7 boards.
pub const FLASH_BASE: u32 = 0x9000_0000;

pub const KIB: u32 = 1024;
pub const MIB: u32 = 1024 * KIB;

/// Sinus 154 DSL family: boot loader, firmware code, web interface and configuration.
pub const SINUS_154: FlashScheme = FlashScheme {
    name: "sinus-154",
    description: "Sinus 154 DSL, 2 MiB flash",
    flash_size: 2 * MIB,
    partitions: &[
        PartitionDef {
            name: "boot",
            base_address: FLASH_BASE,
            size: 0x2_0000,
            file_label: "boot.bin",
        },
        PartitionDef {
            name: "code",
            base_address: FLASH_BASE + 0x2_0000,
            size: 0x10_0000,
            file_label: "code.bin",
        },
        PartitionDef {
            name: "web",
            base_address: FLASH_BASE + 0x12_0000,
            size: 0xd_0000,
            file_label: "web.bin",
        },
        PartitionDef {
            name: "config",
            base_address: FLASH_BASE + 0x1f_0000,
            size: 0x1_0000,
            file_label: "config.bin",
        },
    ],
};

pub const FBOX_4MB: FlashScheme = FlashScheme {
    name: "fbox-4mb",
    description: "AR7 box with ADAM2 loader, 4 MiB flash",
    flash_size: 4 * MIB,
    partitions: &[
        PartitionDef {
            name: "adam2",
            base_address: FLASH_BASE,
            size: 0x1_0000,
            file_label: "adam2.bin",
        },
        PartitionDef {
            name: "kernel",
            base_address: FLASH_BASE + 0x1_0000,
            size: 0xf_0000,
            file_label: "kernel.bin",
        },
        PartitionDef {
            name: "filesystem",
            base_address: FLASH_BASE + 0x10_0000,
            size: 0x2e_0000,
            file_label: "filesystem.bin",
        },
        PartitionDef {
            name: "tffs",
            base_address: FLASH_BASE + 0x3e_0000,
            size: 0x2_0000,
            file_label: "tffs.bin",
        },
    ],
};

pub const FBOX_8MB: FlashScheme = FlashScheme {
    name: "fbox-8mb",
    description: "AR7 box with ADAM2 loader, 8 MiB flash",
    flash_size: 8 * MIB,
    partitions: &[
        PartitionDef {
            name: "adam2",
            base_address: FLASH_BASE,
            size: 0x1_0000,
            file_label: "adam2.bin",
        },
        PartitionDef {
            name: "kernel",
            base_address: FLASH_BASE + 0x1_0000,
            size: 0x1f_0000,
            file_label: "kernel.bin",
        },
        PartitionDef {
            name: "filesystem",
            base_address: FLASH_BASE + 0x20_0000,
            size: 0x5c_0000,
            file_label: "filesystem.bin",
        },
        PartitionDef {
            name: "tffs",
            base_address: FLASH_BASE + 0x7c_0000,
            size: 0x4_0000,
            file_label: "tffs.bin",
        },
    ],
};

/// Big endian ZyNOS boards: boot base, rom-0 configuration, then the ras firmware.
pub const ZYXEL: FlashScheme = FlashScheme {
    name: "zyxel",
    description: "Zyxel AR7 (ZyNOS), 2 MiB flash",
    flash_size: 2 * MIB,
    partitions: &[
        PartitionDef {
            name: "bootbase",
            base_address: FLASH_BASE,
            size: 0x1_0000,
            file_label: "bootbase.bin",
        },
        PartitionDef {
            name: "rom",
            base_address: FLASH_BASE + 0x1_0000,
            size: 0x1_0000,
            file_label: "rom-0",
        },
        PartitionDef {
            name: "ras",
            base_address: FLASH_BASE + 0x2_0000,
            size: 0x1e_0000,
            file_label: "ras.bin",
        },
    ],
};

pub const SCHEMES: &[&FlashScheme] = &[&SINUS_154, &FBOX_4MB, &FBOX_8MB, &ZYXEL];
