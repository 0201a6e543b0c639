use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

const WIDTH: usize = 62;

/// Prints `err`, its cause chain and any hints inside a box on stderr.
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔{}╗", "═".repeat(WIDTH));
    row(&mut stderr, 2, "", "✗ Error");

    let message = wrapped(&err.to_string(), 2, "");
    section(&mut stderr, "", &message);

    for cause in err.chain().skip(1) {
        section(&mut stderr, "Caused by:", &wrapped(&cause.to_string(), 4, ""));
    }

    let hints = collect_hints(err);
    if !hints.is_empty() {
        let lines: Vec<_> = hints.iter().flat_map(|h| wrapped(h, 4, "• ")).collect();
        section(&mut stderr, "Hints:", &lines);
    }

    let _ = writeln!(stderr, "   ╚{}╝", "═".repeat(WIDTH));
    let _ = writeln!(stderr);
}

/// Wraps `text` to fit the box at `indent`; the first line carries `bullet`
/// and continuation lines are aligned under its text.
fn wrapped(text: &str, indent: usize, bullet: &'static str) -> Vec<(usize, &'static str, String)> {
    let marker = bullet.chars().count();
    wrap(text, WIDTH - 1 - indent - marker)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                (indent, bullet, line)
            } else {
                (indent + marker, "", line)
            }
        })
        .collect()
}

fn section(out: &mut dyn Write, title: &str, lines: &[(usize, &str, String)]) {
    let _ = writeln!(out, "   ╟{}╢", "─".repeat(WIDTH));
    if !title.is_empty() {
        row(out, 2, "", title);
    }
    for (indent, bullet, text) in lines {
        row(out, *indent, bullet, text);
    }
}

fn row(out: &mut dyn Write, indent: usize, bullet: &str, text: &str) {
    let used = indent + bullet.chars().count();
    let width = WIDTH - 1 - used;
    let _ = writeln!(out, "   ║{}{}{:<width$} ║", " ".repeat(indent), bullet, text);
}

fn collect_hints(err: &Error) -> Vec<String> {
    if let Some(typer_err) = err.chain().find_map(|e| e.downcast_ref::<atom_typer::TyperError>()) {
        return typer_hints(typer_err);
    }
    if let Some(io_err) = err.chain().find_map(|e| e.downcast_ref::<io::Error>()) {
        return io_hints(io_err);
    }
    Vec::new()
}

fn typer_hints(err: &atom_typer::TyperError) -> Vec<String> {
    use atom_typer::TyperError;

    match err {
        TyperError::UnsupportedForceField(name) => vec![
            format!("No built-in rules exist for '{}'", name),
            "Supported force fields: OPLS-AA".to_string(),
        ],
        TyperError::RuleParse(_) => vec![
            "The rule catalogue has invalid TOML or an unknown guard form".to_string(),
            "Guards: element, neighbor_count, neighbors, whitelisted, neighbors_whitelisted, predicate".to_string(),
            "Count operators: exactly, at_least, at_most".to_string(),
        ],
        TyperError::DuplicateRuleId(id) => vec![
            format!("Rule '{}' is declared more than once", id),
            "Integer and string identifiers are equal when their text matches".to_string(),
        ],
        TyperError::RuleReference { rule, .. } => vec![
            format!("Declare rule '{}' or remove it from the referencing rule", rule),
        ],
        TyperError::UnknownPredicate { predicate, .. } => vec![
            format!("Predicate '{}' is not provided by the selected force field", predicate),
            "Select the force field whose predicates the rules use with --forcefield".to_string(),
        ],
        TyperError::InvalidBond { i, j, .. } => vec![
            format!("Check the bond between atoms {} and {}", i, j),
        ],
        TyperError::Artifact { source, .. } => io_hints(source),
    }
}

fn io_hints(source: &io::Error) -> Vec<String> {
    use std::io::ErrorKind;

    let hints: &[&str] = match source.kind() {
        ErrorKind::NotFound => &[
            "File or directory not found",
            "Check the path spelling and ensure the file exists",
        ],
        ErrorKind::PermissionDenied => &[
            "Permission denied accessing the file",
            "Check file permissions with `ls -la`",
        ],
        ErrorKind::InvalidData => &["File is not valid UTF-8 text"],
        _ => &["I/O operation failed", "Check file path, permissions, and disk space"],
    };
    hints.iter().map(|h| h.to_string()).collect()
}
