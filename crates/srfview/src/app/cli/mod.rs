use clap::Parser;
use std::path::PathBuf;

/// File opened when no path is given on the command line.
pub const DEFAULT_SURFACE_FILE: &str = "trench.srf_save";

#[derive(Parser, Debug)]
#[command(name = "srfview")]
#[command(about = "An interactive viewer for .srf surface evolution files", long_about = None)]
pub struct Args {
    /// Path to a .srf or .srf_save surface sequence file
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Saved surface file to overlay for comparison
    #[arg(long, value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
