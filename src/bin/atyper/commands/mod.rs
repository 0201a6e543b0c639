mod check;
mod rules;

use check::run_check;
use rules::run_rules;

use anyhow::{Context, Result};

use atom_typer::{PredicateSet, RuleCatalogue, load_catalogue};

use crate::cli::{CatalogueOptions, Command};
use crate::display::Context as DisplayContext;
use crate::io::read_rules;

pub fn dispatch(command: Command, ctx: DisplayContext) -> Result<()> {
    match command {
        Command::Check(args) => run_check(args, ctx),
        Command::Rules(args) => run_rules(args, ctx),
    }
}

fn load(options: &CatalogueOptions) -> Result<(RuleCatalogue, PredicateSet)> {
    let custom = options.rules.as_deref().map(read_rules).transpose()?;
    load_catalogue(&options.forcefield, custom.as_deref()).context("Failed to load rule catalogue")
}

fn source_description(options: &CatalogueOptions) -> String {
    match &options.rules {
        Some(path) => format!("Custom rules from {}", path.display()),
        None => format!("Built-in {} rules", options.forcefield),
    }
}
