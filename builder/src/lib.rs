// Licensed under the Apache-2.0 license

//! Assembling, splitting and patching flash images of AR7-class routers,
//! and recovering firmware blocks from vendor bundles.

pub mod error;
pub mod flash_image;
pub mod io;
pub mod layout;
pub mod locator;
pub mod partition;
pub mod scanner;
pub mod table;
pub mod workflow;

pub use error::{FlashError, Result};
pub use crate::flash_image::FlashImage;
pub use layout::load_layout;
pub use locator::{locate, Check, EmbeddedBlock, Finding};
pub use partition::Partition;
pub use scanner::{find_all, ScanMatch, Window};
pub use table::{PartitionSpec, PartitionTable};
