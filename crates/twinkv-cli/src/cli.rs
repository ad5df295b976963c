use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use twinkv_store::BackendKind;

#[derive(Parser)]
#[command(
    name = "twinkv",
    about = "twinkv: one key-value interface over embedded and distributed stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BackendArg {
    Embedded,
    Distributed,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Embedded => BackendKind::Embedded,
            BackendArg::Distributed => BackendKind::Distributed,
        }
    }
}

/// Backend selection. Flags override values read from `--config`.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// TOML file describing the backend
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub backend: Option<BackendArg>,
    /// Store file (embedded backend)
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,
    /// Server address (distributed backend)
    #[arg(long, global = true)]
    pub address: Option<String>,
    /// Request timeout in seconds (distributed backend)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the value stored under a key
    Get(GetArgs),
    /// Store a value under a key
    Put(PutArgs),
    /// Remove a key
    Delete(DeleteArgs),
    /// List containers, items of a container, or keys under a prefix
    List(ListArgs),
    /// Remove a container or every key under a prefix
    DeleteTree(DeleteTreeArgs),
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub key: String,
    /// Literal value; omit to read from --file
    pub value: Option<String>,
    #[arg(long, conflicts_with = "value")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(default_value = "")]
    pub arg: String,
}

#[derive(Args)]
pub struct DeleteTreeArgs {
    pub arg: String,
}
