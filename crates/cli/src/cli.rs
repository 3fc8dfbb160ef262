use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "playprep")]
#[command(author, version, about = "Normalize a media library for browser playback")]
pub struct Cli {
    /// Library root to normalize
    pub root: PathBuf,

    /// Path to config file
    #[arg(short, long, env = "PLAYPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Probe and plan every file without writing or deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}
