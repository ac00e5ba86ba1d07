use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "doorscope",
    about = "DoorScope: change history and text diffs for requirements documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the change history of a document against its previous version
    History(HistoryArgs),
    /// Show the character differences between two texts
    TextDiff(TextDiffArgs),
    /// Show the cumulative change of one attribute of one object
    AttrDiff(AttrDiffArgs),
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Previous version (JSON document)
    pub previous: PathBuf,
    /// Current version (JSON document)
    pub current: PathBuf,
    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Args)]
pub struct TextDiffArgs {
    /// Old text
    pub old: String,
    /// New text
    pub new: String,
    /// Treat OLD and NEW as paths of files to compare
    #[arg(long)]
    pub files: bool,
}

#[derive(Args)]
pub struct AttrDiffArgs {
    /// Previous version (JSON document)
    pub previous: PathBuf,
    /// Current version (JSON document)
    pub current: PathBuf,
    /// Stable id of the object
    #[arg(long)]
    pub node: String,
    /// Attribute name
    #[arg(long, default_value = "Object Text")]
    pub attr: String,
    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Args)]
pub struct ConfigArg {
    /// Diff settings (TOML)
    #[arg(long = "config", value_name = "FILE")]
    pub path: Option<PathBuf>,
}
