use std::io::{self, Write};

use atom_typer::{AnalysisReport, Diagnostic, PredicateSet, RuleCatalogue, RuleId, RuleRegistry};

use crate::util::text::{truncate, wrap};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_catalogue_summary(catalogue: &RuleCatalogue, predicates: &PredicateSet) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let predicate_names = predicates.names();
    let rows = vec![
        ("Catalogue", catalogue.name().to_string()),
        ("Rules", format!("{}", catalogue.len())),
        (
            "Predicates",
            if predicate_names.is_empty() {
                "none".to_string()
            } else {
                predicate_names.join(", ")
            },
        ),
    ];

    print_kv_table(&mut out, "Catalogue Summary", &rows);
}

pub fn print_registry(registry: &RuleRegistry) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let rows: Vec<[String; 3]> = registry
        .buckets()
        .map(|(element, count, rules)| [element.to_string(), count.to_string(), join(rules)])
        .collect();

    print_grid(
        &mut out,
        "Rule Index",
        ["Element", "Nbrs", "Rules"],
        [8, 5],
        &rows,
    );
}

pub fn print_findings(report: &AnalysisReport) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let findings: Vec<_> = report.findings().collect();
    if findings.is_empty() {
        let _ = writeln!(
            out,
            "{}\x1b[32m✓\x1b[0m No conflicts in {} competing rule groups",
            INDENT, report.groups_checked
        );
        let _ = writeln!(out);
        return;
    }

    let rows: Vec<[String; 3]> = findings
        .iter()
        .map(|f| {
            let group = format!("{}({})", f.element, f.pattern.concat());
            let mut rules = join(&f.rules);
            if !f.sinks.is_empty() {
                rules = format!("{} [sinks: {}]", rules, join(&f.sinks));
            }
            [f.issue.tag().to_string(), group, rules]
        })
        .collect();

    print_grid(
        &mut out,
        "Rule Graph Findings",
        ["Issue", "Group", "Rules"],
        [14, 12],
        &rows,
    );

    for finding in findings {
        if let Some(path) = &finding.artifact {
            let _ = writeln!(out, "{}  \x1b[2m·\x1b[0m {}", INDENT, path.display());
        }
    }
}

pub fn print_diagnostics<'a>(title: &str, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut diagnostics = diagnostics.into_iter().peekable();
    if diagnostics.peek().is_none() {
        return;
    }

    let _ = writeln!(out, "{}┌─ {} ─┐", INDENT, truncate(title, SAFE_TABLE_WIDTH - 6));
    for diagnostic in diagnostics {
        let wrapped = wrap(&diagnostic.to_string(), SAFE_TABLE_WIDTH - 4);
        if let Some((first, rest)) = wrapped.split_first() {
            let _ = writeln!(out, "{}  \x1b[33m!\x1b[0m {}", INDENT, first);
            for line in rest {
                let _ = writeln!(out, "{}    {}", INDENT, line);
            }
        }
    }
    let _ = writeln!(out);
}

fn join(ids: &[RuleId]) -> String {
    let parts: Vec<&str> = ids.iter().map(RuleId::as_str).collect();
    parts.join(", ")
}

/// Three-column table whose last column takes the remaining width and wraps.
fn print_grid(
    out: &mut impl Write,
    title: &str,
    headers: [&str; 3],
    widths: [usize; 2],
    rows: &[[String; 3]],
) {
    let [a_w, b_w] = widths;
    let sep_overhead = 8;
    let c_w = SAFE_TABLE_WIDTH.saturating_sub(a_w + b_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{a_line}┬{b_line}┬{c_line}┐",
        INDENT,
        a_line = "─".repeat(a_w + 2),
        b_line = "─".repeat(b_w + 2),
        c_line = "─".repeat(c_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<a_w$} │ {:<b_w$} │ {:<c_w$} │",
        INDENT,
        headers[0],
        headers[1],
        headers[2],
        a_w = a_w,
        b_w = b_w,
        c_w = c_w
    );
    let _ = writeln!(
        out,
        "{}├{a_line}┼{b_line}┼{c_line}┤",
        INDENT,
        a_line = "─".repeat(a_w + 2),
        b_line = "─".repeat(b_w + 2),
        c_line = "─".repeat(c_w + 2)
    );

    for [a, b, c] in rows {
        for (i, line) in wrap(c, c_w).iter().enumerate() {
            let (a_cell, b_cell) = if i == 0 {
                (truncate(a, a_w), truncate(b, b_w))
            } else {
                (String::new(), String::new())
            };
            let _ = writeln!(
                out,
                "{}│ {:<a_w$} │ {:<b_w$} │ {:<c_w$} │",
                INDENT,
                a_cell,
                b_cell,
                line,
                a_w = a_w,
                b_w = b_w,
                c_w = c_w
            );
        }
    }

    let _ = writeln!(
        out,
        "{}└{a_line}┴{b_line}┴{c_line}┘",
        INDENT,
        a_line = "─".repeat(a_w + 2),
        b_line = "─".repeat(b_w + 2),
        c_line = "─".repeat(c_w + 2)
    );
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}
