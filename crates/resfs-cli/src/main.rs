//! resfs command-line tool
//!
//! Inspect and compile static-file trees for embedding:
//! selection preview, code generation, and browsing a tree through the
//! in-memory VFS exactly as an application would see it.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resfs")]
#[command(about = "Embed static files into Rust binaries", long_about = None)]
#[command(version)]
struct Cli {
    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which files would be embedded, per directory
    Plan {
        /// Source directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Config file (defaults to <dir>/resfs.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate resources.rs and payload blobs
    Compile {
        /// Source directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Config file (defaults to <dir>/resfs.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// Regex selecting files by root-relative path
        #[arg(long = "match")]
        include: Option<String>,
        /// Regex excluding selected files
        #[arg(long)]
        exclude: Option<String>,
        /// Files under this many KiB are stored raw
        #[arg(long)]
        max_uncompressed_k: Option<u64>,
        /// Store raw when compressed/raw exceeds this ratio
        #[arg(long)]
        min_ratio: Option<f64>,
        /// Keep existing output when it is newer than every source
        #[arg(long)]
        no_overwrite: bool,
        /// Print the translation plan without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List a directory through the VFS
    Ls {
        /// Source directory
        dir: PathBuf,
        /// Path inside the tree
        #[arg(default_value = ".")]
        path: String,
        /// Entries per listing call (0 = all at once)
        #[arg(long, default_value_t = 0)]
        page: isize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Config file (defaults to <dir>/resfs.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a file through the VFS
    Cat {
        /// Source directory
        dir: PathBuf,
        /// Path inside the tree
        path: String,
        /// Config file (defaults to <dir>/resfs.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan { dir, config } => commands::plan::execute(&dir, config.as_deref()),

        Commands::Compile {
            dir,
            config,
            dest,
            include,
            exclude,
            max_uncompressed_k,
            min_ratio,
            no_overwrite,
            dry_run,
        } => {
            let options = commands::compile::CompileOptions {
                config,
                dest,
                include,
                exclude,
                max_uncompressed_k,
                min_ratio,
                no_overwrite,
                dry_run,
            };
            commands::compile::execute(&dir, options)
        }

        Commands::Ls {
            dir,
            path,
            page,
            json,
            config,
        } => commands::ls::execute(&dir, &path, page, json, config.as_deref()),

        Commands::Cat { dir, path, config } => {
            commands::cat::execute(&dir, &path, config.as_deref())
        }
    }
}
