use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{filter::Directive, EnvFilter};

use std::{path::PathBuf, str::FromStr};

mod device;
mod path;
mod transfer;
mod tree;

use device::CameraHub;

#[derive(Parser, Debug)]
#[command(version, about = "List and download files from cameras connected over USB")]
struct Cli {
    #[arg(short, long)]
    log_level: Option<Directive>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List detected cameras
    List {
        /// Print the device list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a camera's model, driver summary and storages
    Info {
        /// Device number from `list`
        #[arg(short, long, default_value_t = 0)]
        device: usize,
    },
    /// List files and folders under a path on the camera
    ListFiles {
        /// Device number from `list`
        #[arg(short, long, default_value_t = 0)]
        device: usize,

        /// Folder on the camera, e.g. /store_00010001/DCIM
        #[arg(default_value = "/")]
        path: String,

        /// Descend into subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy a file or folder from the camera to a local directory
    Download {
        /// Device number from `list`
        #[arg(short, long, default_value_t = 0)]
        device: usize,

        /// File or folder on the camera
        source: String,

        /// Local directory the files land in
        #[arg(short = 'o', long, default_value = ".")]
        dest_dir: PathBuf,

        /// Descend into subfolders, mirroring them locally
        #[arg(short, long)]
        recursive: bool,

        /// Leave files alone that already exist locally
        #[arg(short, long)]
        skip_existing: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(
                    cli.log_level
                        .clone()
                        .unwrap_or_else(|| Directive::from_str("info").unwrap()),
                )
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("parsed CLI command: {:?}", cli);

    match cli.command {
        Command::List { json } => {
            let hub = CameraHub::new()?;
            let cameras = hub.detect()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cameras)?);
            } else {
                println!("Found devices: {}", cameras.len());
                for camera in &cameras {
                    println!("[{}]: {} / {}", camera.index, camera.model, camera.port);
                }
            }
        }
        Command::Info { device } => {
            let camera = CameraHub::new()?.open(device)?;

            println!("Model: {}", camera.model());
            println!("Port: {}", camera.port());
            println!();
            println!("{}", camera.summary()?);

            for (i, storage) in camera.storages()?.iter().enumerate() {
                println!("Storage #{i}:");
                if let Some(label) = &storage.label {
                    println!("  Label: {label}");
                }
                if let Some(dir) = &storage.base_dir {
                    println!("  Base directory: {dir}");
                }
                if let Some(description) = &storage.description {
                    println!("  Description: {description}");
                }
                if let Some(kb) = storage.capacity_kb {
                    println!("  Capacity: {kb} KB");
                }
                if let Some(kb) = storage.free_kb {
                    println!("  Free: {kb} KB");
                }
            }
        }
        Command::ListFiles {
            device,
            path,
            recursive,
            json,
        } => {
            let camera = CameraHub::new()?.open(device)?;
            let folder = path::normalize_folder(&path);

            if json {
                let listings = if recursive {
                    tree::walk(&camera, &folder)?
                } else {
                    vec![tree::list_folder(&camera, &folder)?]
                };
                println!("{}", serde_json::to_string_pretty(&listings)?);
            } else {
                tree::print_tree(&camera, &folder, recursive)?;
            }
        }
        Command::Download {
            device,
            source,
            dest_dir,
            recursive,
            skip_existing,
        } => {
            let camera = CameraHub::new()?.open(device)?;
            let outcome = transfer::download(&camera, &source, &dest_dir, recursive, skip_existing)?;

            println!(
                "{} downloaded, {} skipped, {} failed",
                outcome.downloaded, outcome.skipped, outcome.failed
            );
            if outcome.failed > 0 {
                bail!("{} file(s) failed to download", outcome.failed);
            }
        }
    }

    Ok(())
}
