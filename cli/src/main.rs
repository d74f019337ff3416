// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use clap_num::maybe_hex;
use flash_builder::PartitionTable;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod firmware;
mod image;

#[derive(Parser)]
#[command(version, about = "Build, split and patch router flash images", long_about = None)]
struct Cli {
    /// Built-in flash scheme of the target device
    #[arg(long, global = true, default_value = "sinus-154")]
    scheme: String,

    /// TOML layout file, used instead of a built-in scheme
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in flash schemes
    Schemes,
    /// Create an erased flash image
    Create {
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Split a flash image into one file per partition
    Split {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Output directory for the partition files
        #[arg(short, long, value_name = "DIRECTORY", default_value = ".")]
        dir: PathBuf,
    },
    /// Merge partition files into a flash image
    Merge {
        /// Directory holding the partition files
        #[arg(short, long, value_name = "DIRECTORY", default_value = ".")]
        dir: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Replace the payload of one partition
    ChangePartition {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Name of the partition to replace
        #[arg(short, long)]
        partition: String,

        /// New partition payload
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output image; defaults to patching IMAGE in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the trailer state of every partition of an image
    Inspect {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Copy the firmware blocks of a vendor bundle into partitions
    ExtractFirmware {
        /// Vendor firmware bundle
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,

        /// Partitions receiving the blocks, starting with the last block of the bundle
        /// Example: --partition code --partition web
        #[arg(short, long, num_args = 1.., required = true)]
        partition: Vec<String>,

        /// Image to patch; a new erased image is used when omitted
        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        /// Refuse blocks which fail validation
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Locate and validate the trailer-described blocks of a bundle
    Locate {
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,

        /// Offset right behind the first trailer; defaults to the bundle signature
        #[arg(long, value_parser=maybe_hex::<usize>)]
        offset: Option<usize>,

        /// Number of chained blocks to recover
        #[arg(short, long, default_value_t = 2)]
        count: usize,
    },
    /// Find all occurrences of a signature in a file
    Scan {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Known signature name (bootloader, squashfs) or hex bytes
        #[arg(short, long)]
        signature: String,

        /// Bytes to extract per match, or "end"; defaults to the signature's own window
        #[arg(short, long, value_parser = firmware::parse_window)]
        window: Option<flash_builder::Window>,

        /// Directory receiving the extracted windows
        #[arg(short, long, value_name = "DIRECTORY")]
        dir: Option<PathBuf>,
    },
    /// Write a vendor file (with its 8 byte checksum) into a flash region
    WriteRegion {
        /// Image to patch, may be shorter than flash or missing
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Target partition
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        partition: Option<String>,

        /// Region start offset in the image
        #[arg(long, value_parser=maybe_hex::<usize>, requires = "end")]
        start: Option<usize>,

        /// Region end offset in the image, exclusive
        #[arg(long, value_parser=maybe_hex::<usize>, requires = "start")]
        end: Option<usize>,

        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output image; defaults to IMAGE
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn partition_table(cli: &Cli) -> anyhow::Result<PartitionTable> {
    let table = match &cli.layout {
        Some(path) => flash_builder::load_layout(path)?,
        None => PartitionTable::builtin(&cli.scheme)?,
    };
    Ok(table)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Schemes = cli.command {
        image::schemes();
        return Ok(());
    }
    let table = partition_table(cli)?;
    match &cli.command {
        Commands::Schemes => Ok(()),
        Commands::Create { output } => image::create(&table, output),
        Commands::Split { image, dir } => image::split(&table, image, dir),
        Commands::Merge { dir, output } => image::merge(&table, dir, output),
        Commands::ChangePartition {
            image,
            partition,
            input,
            output,
        } => image::change_partition(
            &table,
            image,
            partition,
            input,
            output.as_deref().unwrap_or(image),
        ),
        Commands::Inspect { image } => image::inspect(&table, image),
        Commands::ExtractFirmware {
            bundle,
            partition,
            image,
            output,
            strict,
        } => firmware::extract(&table, bundle, partition, image.as_deref(), output, *strict),
        Commands::Locate {
            bundle,
            offset,
            count,
        } => firmware::locate(bundle, *offset, *count),
        Commands::Scan {
            input,
            signature,
            window,
            dir,
        } => firmware::scan(input, signature, *window, dir.as_deref()),
        Commands::WriteRegion {
            image,
            partition,
            start,
            end,
            input,
            output,
        } => image::write_region(
            &table,
            image,
            partition.as_deref(),
            start.zip(*end),
            input,
            output.as_deref().unwrap_or(image),
        ),
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = SimpleLogger::new().with_level(level).init();

    run(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
}
