use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "netcfg")]
#[command(about = "Compile, validate and diff declarative router configurations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Validate one configuration tree.
    Validate(ValidateArgs),
    /// Print the commands a configuration compiles to.
    Commands(CommandsArgs),
    /// Compare a configuration against a previous tree or snapshot.
    Diff(DiffArgs),
    /// Write deploy scripts and a new snapshot for a configuration.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Configuration directory.
    pub config: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Fail on warnings as well as errors.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct CommandsArgs {
    /// Configuration directory.
    pub config: PathBuf,
    /// Print one block per command group.
    #[arg(long)]
    pub grouped: bool,
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Current configuration directory.
    pub current: PathBuf,
    /// Previous configuration directory or snapshot file.
    pub previous: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Print counts only.
    #[arg(long)]
    pub summary: bool,
    /// Also list unchanged commands.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Current configuration directory.
    pub current: PathBuf,
    /// Previous configuration directory or snapshot file. Without it every
    /// command is treated as new.
    #[arg(long)]
    pub previous: Option<PathBuf>,
    /// Deploy options (TOML).
    #[arg(long)]
    pub deploy_config: Option<PathBuf>,
    /// Only apply added or changed commands. Overrides the deploy config.
    #[arg(long)]
    pub difference_only: bool,
    /// Directory the scripts and snapshot are written to.
    #[arg(long)]
    pub output: PathBuf,
    /// Print the batches as well.
    #[arg(long)]
    pub print: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
