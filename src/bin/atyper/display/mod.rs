mod error;
mod progress;
mod tables;

pub use error::print_error;
pub use progress::Progress;
pub use tables::{print_catalogue_summary, print_diagnostics, print_findings, print_registry};

/// Whether stage spinners are drawn on stderr.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub interactive: bool,
}

impl Context {
    /// Interactive only when stderr is a terminal and `--quiet` was not given.
    pub fn for_terminal(quiet: bool) -> Self {
        Self {
            interactive: !quiet && crate::io::stderr_is_tty(),
        }
    }
}
