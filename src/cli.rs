use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "pennies",
    version,
    about = "Extract pressed-penny inventories from .docx label sheets into CSV"
)]
pub struct Cli {
    /// Also append label/heading mismatch diagnostics to this file.
    #[arg(long, global = true)]
    pub labels_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Parse(ParseArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// A .docx file or a directory of .docx files.
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Keep only the location after a "Neighborhood - Location" dash.
    #[arg(long, default_value_t = false)]
    pub short_location: bool,

    /// Join multi-line names as "First - Rest" instead of with spaces.
    #[arg(long, default_value_t = false)]
    pub multi_line_dash: bool,

    /// Only write pennies not already in the dedup store.
    #[arg(long, short = 'n', default_value_t = false)]
    pub new_only: bool,

    #[arg(long, default_value = "pennies.db")]
    pub db_path: PathBuf,

    #[arg(long, value_enum, default_value_t = IfExists::Overwrite)]
    pub if_exists: IfExists,

    /// JSON file replacing the built-in jurisdictions and continuation words.
    #[arg(long)]
    pub vocabulary: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum IfExists {
    Overwrite,
    Append,
    Backup,
    Cancel,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "pennies.db")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    /// RFC 3339 timestamp, e.g. 2024-05-01T00:00:00Z.
    #[arg(long)]
    pub since: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
