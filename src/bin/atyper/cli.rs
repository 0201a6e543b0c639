use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "atyper",
    about = "Rule-based force field atom typing",
    version,
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a rule catalogue for conflicting or unordered rules
    #[command(visible_alias = "c")]
    Check(CheckArgs),

    /// Show how a rule catalogue is indexed by element and neighbor count
    #[command(visible_alias = "r")]
    Rules(RulesArgs),
}

impl Command {
    pub fn catalogue(&self) -> &CatalogueOptions {
        match self {
            Command::Check(args) => &args.catalogue,
            Command::Rules(args) => &args.catalogue,
        }
    }
}

/// Catalogue selection shared by all commands.
#[derive(Args)]
pub struct CatalogueOptions {
    /// Force field providing the built-in rules and named predicates
    #[arg(short, long, value_name = "NAME", default_value = "OPLS-AA")]
    pub forcefield: String,

    /// Custom rule catalogue (TOML) used instead of the built-in rules
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    /// Log engine activity to stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub catalogue: CatalogueOptions,

    /// Write one Graphviz file per flagged rule group into DIR
    #[arg(short, long, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Exit with failure if the analysis reports any finding
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct RulesArgs {
    #[command(flatten)]
    pub catalogue: CatalogueOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}
