use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "verify-contracts",
    about = "Verify contract goldens against canonical form, schemas, and determinism rules",
    version
)]
pub struct Cli {
    /// Path to contracts directory (default: auto-detected from the executable
    /// location, then the working directory)
    #[arg(long)]
    pub contracts_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level for stderr diagnostics (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
