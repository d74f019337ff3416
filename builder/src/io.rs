// Licensed under the Apache-2.0 license

use crate::error::{FlashError, Result};
use std::fs;
use std::path::Path;

/// Reads a whole file into memory.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| FlashError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates or truncates `path` and writes `data` to it.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|source| FlashError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| FlashError::Io {
        path: path.to_path_buf(),
        source,
    })
}
