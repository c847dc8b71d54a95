//! Roboflow: export and download dataset versions.
//!
//! A dataset version is addressed as `workspace/project/version`. The service
//! generates exports in a requested annotation format on demand; this crate
//! triggers those exports, waits for them to become available, downloads and
//! unpacks the archive, and points the bundled `data.yaml` at the local copy.
//!
//! # Modules
//!
//! - [`client`]: The [`Roboflow`] entry point
//! - [`project`]: Workspace and project listings
//! - [`version`]: Export and download of a single version
//! - [`format`]: Format alias resolution
//! - [`location`]: Download directory resolution
//! - [`error`]: Error types for roboflow operations

pub mod api;
pub mod archive;
pub mod client;
pub mod config;
pub mod data_yaml;
pub mod error;
pub mod format;
pub mod location;
pub mod project;
pub mod version;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use client::Roboflow;
pub use config::{ClientConfig, PollConfig};
pub use error::RoboflowError;
pub use version::{Dataset, Version, VersionId};

/// The roboflow CLI application.
#[derive(Parser)]
#[command(name = "roboflow")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// API key used for every request.
    #[arg(long, env = "ROBOFLOW_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the API.
    #[arg(long, env = config::API_URL_ENV, global = true, default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// Log progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Download a dataset version and unpack it locally.
    Download(DownloadArgs),
    /// Ask the service to generate an export without downloading it.
    Export(ExportArgs),
    /// List the format aliases understood by --format.
    Formats,
}

/// Arguments for the download subcommand.
#[derive(clap::Args)]
struct DownloadArgs {
    /// Version to download, as '<workspace>/<project>/<version>'.
    #[arg(id = "version_id", value_name = "VERSION")]
    version: String,

    /// Export format (e.g. 'coco', 'voc', 'yolov5').
    #[arg(long)]
    format: String,

    /// Target directory (defaults to $DATASET_DIRECTORY/<project>-<version>).
    #[arg(long)]
    location: Option<PathBuf>,

    /// Keep an existing, non-empty target directory instead of re-downloading.
    #[arg(long)]
    no_overwrite: bool,

    /// Output format for the result ('text' or 'json').
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Version to export, as '<workspace>/<project>/<version>'.
    #[arg(id = "version_id", value_name = "VERSION")]
    version: String,

    /// Export format (e.g. 'coco', 'voc', 'yolov5').
    #[arg(long)]
    format: String,
}

/// Run the roboflow CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RoboflowError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(Commands::Download(args)) => run_download(&cli, args),
        Some(Commands::Export(args)) => run_export(&cli, args),
        Some(Commands::Formats) => {
            for (alias, identifier) in format::aliases() {
                println!("{alias:<10} -> {identifier}");
            }
            Ok(())
        }
        None => {
            println!("roboflow {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Export and download dataset versions.");
            println!();
            println!("Run 'roboflow --help' for usage information.");
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "roboflow=debug" } else { "warn" })
    });
    // A subscriber may already be installed when embedded; keep that one.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn client_from(cli: &Cli) -> Result<Roboflow, RoboflowError> {
    let api_key = cli
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or(RoboflowError::MissingApiKey)?;
    let config = ClientConfig::default().with_api_url(&cli.api_url);
    Roboflow::with_config(api_key, &config)
}

/// Execute the download subcommand.
fn run_download(cli: &Cli, args: &DownloadArgs) -> Result<(), RoboflowError> {
    let id: VersionId = args.version.parse()?;
    let client = client_from(cli)?;
    let version = client.version(&id)?;

    let dataset = version.download(
        Some(args.format.as_str()),
        args.location.as_deref(),
        !args.no_overwrite,
    )?;

    match args.output.as_str() {
        "json" => {
            let rendered = serde_json::to_string_pretty(&dataset).map_err(std::io::Error::from)?;
            println!("{rendered}");
        }
        _ => {
            println!(
                "Downloaded {} version {} ({}) to {}",
                dataset.name,
                dataset.version,
                dataset.model_format,
                dataset.location.display()
            );
        }
    }

    Ok(())
}

/// Execute the export subcommand.
fn run_export(cli: &Cli, args: &ExportArgs) -> Result<(), RoboflowError> {
    let id: VersionId = args.version.parse()?;
    let client = client_from(cli)?;
    let version = client.version(&id)?;
    let format = version.format_identifier(Some(args.format.as_str()))?;

    version.export(Some(format.as_str()))?;
    println!("Export of {} in '{}' requested", version.id(), format);
    Ok(())
}
