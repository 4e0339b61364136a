//! nufx - NuFX (ShrinkIt) archive utility
//!
//! Lists, tests, and extracts Apple II `.shk`, `.sdk`, and `.bxy` archives,
//! and scans directory trees for them.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    ExtractOptions, ListOptions, cmd_extract, cmd_info, cmd_list, cmd_scan, cmd_test,
};
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::path::PathBuf;

/// Environment variable that overrides the log filter.
const LOG_ENV: &str = "NUFX_LOG";
/// Environment variable that controls colored log output.
const LOG_STYLE_ENV: &str = "NUFX_LOG_STYLE";

#[derive(Parser)]
#[command(name = "nufx")]
#[command(author, version, about = "NuFX (ShrinkIt) archive utility")]
#[command(long_about = "
nufx reads NuFX archives created by ShrinkIt and GS/ShrinkIt, including
archives wrapped in Binary II. Stored, LZW/1, and LZW/2 threads are decoded.

Examples:
  nufx list games.shk
  nufx list -v --json games.shk
  nufx info system.sdk
  nufx test games.shk
  nufx extract games.shk -o games
  nufx scan ~/apple2
")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only entries matching pattern (glob syntax: GAMES/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Extract files from an archive
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Entries to extract (all if empty)
        files: Vec<String>,

        /// Include only entries matching pattern (glob syntax)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Also write resource forks as <name>.rsrc
        #[arg(short, long)]
        resource_forks: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Decode every thread and check CRCs
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show master header information
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Scan directories for .shk/.sdk archives and dump their headers
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        directories: Vec<PathBuf>,
    },
}

fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Flags set the default level; `NUFX_LOG` overrides it.
fn init_logging(verbose: u8, quiet: bool) {
    let env = Env::new().filter(LOG_ENV).write_style(LOG_STYLE_ENV);
    Builder::new()
        .filter_level(log_level(verbose, quiet))
        .parse_env(env)
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::List {
            archive,
            verbose,
            json,
            include,
            exclude,
        } => cmd_list(
            &archive,
            &ListOptions {
                verbose,
                json,
                include: &include,
                exclude: &exclude,
            },
        ),
        Commands::Extract {
            archive,
            output,
            files,
            include,
            exclude,
            resource_forks,
            verbose,
            no_progress,
        } => cmd_extract(
            &archive,
            &output,
            &ExtractOptions {
                files: &files,
                include: &include,
                exclude: &exclude,
                resource_forks,
                verbose,
                progress: !no_progress,
            },
        ),
        Commands::Test { archive, verbose } => cmd_test(&archive, verbose),
        Commands::Info { archive } => cmd_info(&archive),
        Commands::Scan { directories } => cmd_scan(&directories),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
