//! Command-line arguments for `ctsearch`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ctsearch",
    version,
    about = "Classify legacy clinical-trial search links",
    long_about = "Decode legacy clinical-trial search links, translate their filters to \
                  the trial-search API vocabulary and bucket them by search pattern."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter (e.g. info, debug, ctsearch_engine=trace). Overrides RUST_LOG.
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Reference dataset file or directory. Falls back to CTSEARCH_CODE_MAP.
    #[arg(long = "code-map", value_name = "PATH", global = true)]
    pub code_map: Option<PathBuf>,

    /// Fail on malformed reference dataset rows instead of skipping them.
    #[arg(long = "strict-code-map", global = true)]
    pub strict_code_map: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a link collection from a link list CSV.
    GenerateLinkDb(GenerateArgs),

    /// Count links per search pattern in a link collection.
    LinkOutputStats(StatsArgs),

    /// Classify a single link and print the result.
    ClassifyUrl(ClassifyArgs),
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Link list CSV with a URL column.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the link collection.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// JSON export of the saved-search table.
    #[arg(long = "saved-searches", value_name = "PATH")]
    pub saved_searches: Option<PathBuf>,

    /// Where to write the failed links.
    #[arg(long = "failures", value_name = "PATH")]
    pub failures: Option<PathBuf>,

    /// Links processed at once. Falls back to CTSEARCH_CONCURRENCY.
    #[arg(long = "concurrency")]
    pub concurrency: Option<usize>,
}

#[derive(Parser)]
pub struct StatsArgs {
    /// Link collection written by generate-link-db.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Parser)]
pub struct ClassifyArgs {
    /// The legacy link.
    #[arg(value_name = "URL")]
    pub url: String,

    /// JSON export of the saved-search table.
    #[arg(long = "saved-searches", value_name = "PATH")]
    pub saved_searches: Option<PathBuf>,
}
