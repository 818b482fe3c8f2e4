//! `viasplit` CLI - Split caption files into VIA 3 subtitle projects

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use viasplit::{Settings, SplitSize};

#[derive(Parser)]
#[command(name = "viasplit")]
#[command(about = "Convert captions into split VIA 3 subtitle annotation projects")]
#[command(version)]
struct Cli {
    /// Settings file (default: ~/.config/viasplit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a caption file into one or more VIA projects
    Convert {
        /// Video URL or path the projects point at
        video: String,

        /// Caption file (.vtt, .srt or .json)
        captions: PathBuf,

        #[command(flatten)]
        split: SplitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show how captions would be split, without building projects
    Split {
        /// Caption file (.vtt, .srt or .json)
        captions: PathBuf,

        #[command(flatten)]
        split: SplitArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: SplitFormat,
    },

    /// Remove dangling references from a VIA project file
    Sanitize {
        /// VIA project JSON
        project: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run every conversion in a TOML manifest
    Batch {
        /// Manifest with [[jobs]] entries
        manifest: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Caption grouping options
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Reference captions whose chunks decide the split points
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Captions per project
    #[arg(short = 'n', long, conflicts_with = "num_splits")]
    pub segments_per_split: Option<usize>,

    /// Number of projects to aim for
    #[arg(short = 'k', long)]
    pub num_splits: Option<usize>,
}

impl SplitArgs {
    pub fn size(&self) -> SplitSize {
        SplitSize::from_options(self.segments_per_split, self.num_splits)
    }
}

/// Where projects go
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Project store base URL; projects are uploaded when set
    #[arg(short, long)]
    pub upload_url: Option<String>,

    /// Output directory (default from settings, else ./output)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Deterministic metadata ids instead of random ones
    #[arg(long)]
    pub sequential_ids: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SplitFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            video,
            captions,
            split,
            output,
        } => {
            cmd::convert::cmd_convert(&settings, &video, captions, &split, &output).await?;
        }
        Commands::Split {
            captions,
            split,
            format,
        } => {
            cmd::split::cmd_split(&captions, &split, format)?;
        }
        Commands::Sanitize { project, output } => {
            cmd::sanitize::cmd_sanitize(&project, output.as_deref())?;
        }
        Commands::Batch { manifest, output } => {
            cmd::batch::cmd_batch(&settings, &manifest, &output).await?;
        }
    }

    Ok(())
}
