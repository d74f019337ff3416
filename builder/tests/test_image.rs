// Licensed under the Apache-2.0 license

mod common;

use common::*;
use flash_builder::workflow::{self, PartitionStatus, Region};
use flash_builder::{locate, FlashError, FlashImage, Partition, PartitionTable};
use flash_image::{crc32, TRAILER_MAGIC};

#[test]
fn test_web_partition_update() {
    let table = test_table();
    assert_eq!(table.origin(), 0x2_0000);
    let spec = table.resolve("web").unwrap();
    let payload = pattern(0x1_8000, 3);

    let mut partition = Partition::new(&table, spec);
    partition.update(&payload).unwrap();

    let mut expected = payload.clone();
    expected.extend(std::iter::repeat(0xff).take(0xd_0000 - 0x1_8000 - 12));
    expected.extend_from_slice(&0x1_8000u32.to_le_bytes());
    expected.extend_from_slice(&TRAILER_MAGIC.to_le_bytes());
    expected.extend_from_slice(&crc32(&payload).to_le_bytes());
    assert_eq!(partition.data(), &expected[..]);
    assert_eq!(partition.range(), 0x12_0000..0x1f_0000);
}

#[test]
fn test_updated_partition_is_locatable() {
    let table = test_table();
    let spec = table.resolve("config").unwrap();
    for len in [0, 1, 0x100, 0x1_0000 - 12] {
        let payload = pattern(len, 9);
        let mut partition = Partition::new(&table, spec);
        partition.update(&payload).unwrap();

        let mut bundle = partition.into_data();
        bundle.extend_from_slice(BUNDLE_SIGNATURE);
        let block = locate(&bundle, bundle.len() - 10);
        assert_eq!(block.length as usize, len);
        assert_eq!(block.magic, TRAILER_MAGIC);
        assert_eq!(block.crc32, crc32(&payload));
        assert_eq!(block.payload(&bundle), Some(&payload[..]));
    }
}

#[test]
fn test_split_merge_round_trip() {
    let dir = setup();
    let table = test_table();

    let mut image = FlashImage::create(&table);
    for (seed, spec) in table.partitions().iter().enumerate() {
        let mut partition = Partition::new(&table, spec);
        partition
            .update(&pattern(0x800 * (seed + 1), seed as u8))
            .unwrap();
        image.apply_partition(&partition).unwrap();
    }
    let image_path = dir.path().join("flash.bin");
    image.store(&image_path).unwrap();

    let parts = dir.path().join("parts");
    let files = workflow::split_image(&table, &image_path, &parts).unwrap();
    assert_eq!(files.len(), 4);
    assert_eq!(read(&parts.join("web.bin")).len(), 0xd_0000);

    let merged = dir.path().join("merged.bin");
    workflow::merge_image(&table, &parts, &merged).unwrap();
    assert_eq!(read(&merged), read(&image_path));
}

#[test]
fn test_split_keeps_files_written_before_a_failure() {
    let dir = setup();
    let table = test_table();
    let image_path = dir.path().join("flash.bin");
    FlashImage::create(&table).store(&image_path).unwrap();

    let parts = dir.path().join("parts");
    std::fs::create_dir_all(parts.join("web.bin")).unwrap();
    let result = workflow::split_image(&table, &image_path, &parts);
    assert!(matches!(result, Err(FlashError::Io { path, .. }) if path == parts.join("web.bin")));
    assert!(parts.join("boot.bin").exists());
    assert!(parts.join("code.bin").exists());
    assert!(!parts.join("config.bin").exists());
}

#[test]
fn test_extract_apply_identity() {
    let table = test_table();
    let mut bytes = pattern(0x20_0000, 1);
    bytes[0x1f_fff0..].fill(0xff);
    let mut image = FlashImage::from_bytes(&table, bytes.clone()).unwrap();
    for spec in table.partitions() {
        let partition = image.extract_partition(spec).unwrap();
        image.apply_partition(&partition).unwrap();
    }
    assert_eq!(image.as_bytes(), &bytes[..]);
}

#[test]
fn test_merge_missing_and_wrong_size() {
    let dir = setup();
    let table = test_table();
    let parts = dir.path().join("parts");
    std::fs::create_dir(&parts).unwrap();

    let mut code = Partition::new(&table, table.resolve("code").unwrap());
    code.update(b"code").unwrap();
    write(&parts, "code.bin", code.data());

    let merged = dir.path().join("merged.bin");
    workflow::merge_image(&table, &parts, &merged).unwrap();
    let data = read(&merged);
    assert_eq!(&data[0x2_0000..0x12_0000], code.data());
    assert!(data[..0x2_0000].iter().all(|&b| b == 0xff));

    write(&parts, "web.bin", &[0u8; 0x100]);
    let result = workflow::merge_image(&table, &parts, &merged);
    assert!(matches!(
        result,
        Err(FlashError::SizeMismatch { name, expected: 0xd_0000, actual: 0x100 }) if name == "web"
    ));
}

#[test]
fn test_load_wrong_size() {
    let dir = setup();
    let table = test_table();
    let path = write(dir.path(), "short.bin", &[0xff; 0x1000]);
    assert!(matches!(
        FlashImage::load(&table, &path),
        Err(FlashError::UnexpectedImageSize { expected: 0x20_0000, actual: 0x1000 })
    ));
    assert!(matches!(
        FlashImage::load(&table, &dir.path().join("missing.bin")),
        Err(FlashError::Io { .. })
    ));
}

#[test]
fn test_change_partition() {
    let dir = setup();
    let table = test_table();
    let image_path = dir.path().join("flash.bin");
    workflow::create_image(&table, &image_path).unwrap();

    let payload = write(dir.path(), "web-new.bin", &pattern(0x4000, 5));
    let output = dir.path().join("patched.bin");
    workflow::change_partition(&table, &image_path, "web", &payload, &output).unwrap();

    let statuses = workflow::inspect_image(&table, &output).unwrap();
    let web = statuses.iter().find(|s| s.name == "web").unwrap();
    assert_eq!(web.payload, Some((0x4000, true)));
    let boot = statuses.iter().find(|s| s.name == "boot").unwrap();
    assert_eq!(
        boot,
        &PartitionStatus {
            name: "boot".to_string(),
            base_address: 0x2_0000,
            size: 0x2_0000,
            payload: None,
        }
    );
}

#[test]
fn test_change_partition_oversize_leaves_files() {
    let dir = setup();
    let table = test_table();
    let image_path = dir.path().join("flash.bin");
    workflow::create_image(&table, &image_path).unwrap();
    let original = read(&image_path);

    let payload = write(dir.path(), "huge.bin", &pattern(0x1_0000 - 11, 1));
    let result = workflow::change_partition(&table, &image_path, "config", &payload, &image_path);
    assert!(matches!(
        result,
        Err(FlashError::PayloadTooLarge { limit: 0xfff4, actual: 0xfff5, .. })
    ));
    assert_eq!(read(&image_path), original);

    let result = workflow::change_partition(&table, &image_path, "nvram", &payload, &image_path);
    assert!(matches!(result, Err(FlashError::UnknownPartition(_))));
}

#[test]
fn test_write_region_on_partial_image() {
    let dir = setup();
    let table = PartitionTable::builtin("fbox-4mb").unwrap();
    // loader dump covering only the first 64 KiB of flash
    let image_path = write(dir.path(), "dump.bin", &[0x00; 0x1_0000]);

    let mut kernel = pattern(0x2000, 2);
    kernel.extend_from_slice(b"CHECKSUM");
    let input = write(dir.path(), "kernel.image", &kernel);
    let output = dir.path().join("flash.bin");
    workflow::write_region(
        &table,
        &image_path,
        Region::Partition("kernel"),
        &input,
        &output,
    )
    .unwrap();

    // extended up to the end of the kernel partition, not to full flash
    let data = read(&output);
    assert_eq!(data.len(), 0x10_0000);
    assert!(data[..0x1_0000].iter().all(|&b| b == 0x00));
    assert_eq!(&data[0x1_0000..0x1_2000], &kernel[..0x2000]);
    assert!(data[0x1_2000..].iter().all(|&b| b == 0xff));

    let too_big = write(dir.path(), "big.image", &vec![0u8; 0x1_0000 + 9]);
    let result = workflow::write_region(
        &table,
        &output,
        Region::Offsets {
            start: 0,
            end: 0x1_0000,
        },
        &too_big,
        &output,
    );
    assert!(matches!(result, Err(FlashError::PayloadTooLarge { .. })));
    assert_eq!(read(&output).len(), 0x10_0000);
}

#[test]
fn test_write_region_keeps_dump_length() {
    let dir = setup();
    let table = PartitionTable::builtin("fbox-4mb").unwrap();
    let dump = write(dir.path(), "dump.bin", &[0x00; 0x100]);

    let mut patch = vec![0x77; 0x40];
    patch.extend_from_slice(b"CHECKSUM");
    let input = write(dir.path(), "patch.image", &patch);
    workflow::write_region(
        &table,
        &dump,
        Region::Offsets {
            start: 0,
            end: 0x80,
        },
        &input,
        &dump,
    )
    .unwrap();

    let data = read(&dump);
    assert_eq!(data.len(), 0x100);
    assert!(data[..0x40].iter().all(|&b| b == 0x77));
    assert!(data[0x40..0x80].iter().all(|&b| b == 0xff));
    assert!(data[0x80..].iter().all(|&b| b == 0x00));

    let missing = dir.path().join("missing.bin");
    workflow::write_region(
        &table,
        &missing,
        Region::Offsets {
            start: 0x20,
            end: 0x60,
        },
        &input,
        &missing,
    )
    .unwrap();
    let data = read(&missing);
    assert_eq!(data.len(), 0x60);
    assert!(data[..0x20].iter().all(|&b| b == 0xff));
    assert!(data[0x20..0x60].iter().all(|&b| b == 0x77));
}
