use anyhow::Result;

use atom_typer::{Diagnostics, RuleRegistry};

use super::{load, source_description};
use crate::cli::RulesArgs;
use crate::display::{
    Context as DisplayContext, Progress, print_catalogue_summary, print_diagnostics,
    print_registry,
};

const STAGES: &[&str] = &["Loading rule catalogue", "Indexing rules"];

pub fn run_rules(args: RulesArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, STAGES);

    progress.begin();
    let (catalogue, predicates) = load(&args.catalogue)?;
    progress.done(&[source_description(&args.catalogue)]);

    progress.begin();
    let mut diagnostics = Diagnostics::new();
    let registry = RuleRegistry::build(catalogue, &mut diagnostics);
    progress.done(&[format!(
        "{} of {} rules indexed",
        registry.len(),
        registry.catalogue().len()
    )]);
    progress.finish();

    print_catalogue_summary(registry.catalogue(), &predicates);
    print_registry(&registry);
    print_diagnostics("Registry Diagnostics", &diagnostics);

    Ok(())
}
