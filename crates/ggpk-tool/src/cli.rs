//! Command-line configuration
//!
//! Every path can also be supplied through the environment:
//! - `GGPK_ARCHIVE`: archive to read
//! - `GGPK_OUTPUT`: archive to write
//! - `GGPK_EXTRACT_DIR`: extraction destination

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tools for GGPK packed archives
#[derive(Debug, Parser)]
#[command(name = "ggpk", about = "Inspect, verify and rebuild GGPK packed archives", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List top-level records, or the whole tree with --tree
    List {
        /// Archive to read
        #[arg(env = "GGPK_ARCHIVE")]
        archive: PathBuf,

        /// Print every file with its size and digest
        #[arg(long)]
        tree: bool,
    },

    /// Copy a file or directory out of an archive
    Extract {
        /// Archive to read
        #[arg(env = "GGPK_ARCHIVE")]
        archive: PathBuf,

        /// Virtual path to extract, e.g. /Data/ or /Data/Mods.dat
        #[arg(default_value = "/")]
        path: String,

        /// Destination directory
        #[arg(short = 'd', long, env = "GGPK_EXTRACT_DIR", default_value = ".")]
        destination: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Verify every file and directory digest
    Check {
        /// Archive to read
        #[arg(env = "GGPK_ARCHIVE")]
        archive: PathBuf,

        /// Stop at the first mismatch
        #[arg(long)]
        fail_fast: bool,
    },

    /// Write a compacted copy of an archive
    Defrag {
        /// Archive to read
        #[arg(env = "GGPK_ARCHIVE")]
        archive: PathBuf,

        /// Archive to write; may be the input itself
        #[arg(short, long, env = "GGPK_OUTPUT")]
        output: PathBuf,
    },

    /// Build a new archive from a local directory
    Pack {
        /// Directory whose contents become the archive root
        source: PathBuf,

        /// Archive to write
        #[arg(short, long, env = "GGPK_OUTPUT")]
        output: PathBuf,
    },
}
