use anyhow::{Context, Result, bail};

use atom_typer::{AnalysisOptions, Diagnostic, analyze};

use super::{load, source_description};
use crate::cli::CheckArgs;
use crate::display::{
    Context as DisplayContext, Progress, print_catalogue_summary, print_diagnostics,
    print_findings,
};

const STAGES: &[&str] = &["Loading rule catalogue", "Analyzing rule interactions"];

pub fn run_check(args: CheckArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, STAGES);

    progress.begin();
    let (catalogue, predicates) = load(&args.catalogue)?;
    progress.done(&[source_description(&args.catalogue)]);

    progress.begin();
    let options = AnalysisOptions {
        artifact_dir: args.artifacts.clone(),
    };
    let report = analyze(&catalogue, &options).context("Rule analysis failed")?;

    let mut notes = vec![
        format!("{} competing rule groups checked", report.groups_checked),
        format!("{} findings", report.diagnostics.len()),
    ];
    if let Some(dir) = &args.artifacts {
        if report.findings().next().is_some() {
            notes.push(format!("Graphs written to {}", dir.display()));
        }
    }
    progress.done(&notes);
    progress.finish();

    print_catalogue_summary(&catalogue, &predicates);
    print_findings(&report);
    print_diagnostics(
        "Rule Diagnostics",
        report
            .diagnostics
            .iter()
            .filter(|d| !matches!(d, Diagnostic::RuleGraph(_))),
    );

    if args.strict && !report.is_clean() {
        bail!(
            "Rule catalogue '{}' has {} finding(s)",
            catalogue.name(),
            report.diagnostics.len()
        );
    }

    Ok(())
}
