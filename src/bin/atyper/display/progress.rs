use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner over a fixed list of named stages, printed to stderr.
pub struct StageSpinner {
    stages: &'static [&'static str],
    current: usize,
    bar: Option<ProgressBar>,
    started: Instant,
    stage_started: Instant,
}

impl StageSpinner {
    fn new(stages: &'static [&'static str]) -> Self {
        let now = Instant::now();
        Self {
            stages,
            current: 0,
            bar: None,
            started: now,
            stage_started: now,
        }
    }

    fn label(&self) -> &'static str {
        self.stages.get(self.current).copied().unwrap_or("Working")
    }

    fn begin(&mut self) {
        self.clear();
        self.stage_started = Instant::now();

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(format!(
            "({}/{}) {}",
            self.current + 1,
            self.stages.len(),
            self.label()
        ));
        self.bar = Some(bar);
    }

    fn done(&mut self, notes: &[String]) {
        self.clear();

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>6}ms",
            self.label(),
            self.stage_started.elapsed().as_millis()
        );
        for note in notes {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", note);
        }
        self.current += 1;
    }

    fn finish(&mut self) {
        self.clear();

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[2m{} stage(s) in {:.2}s\x1b[0m",
            self.current,
            self.started.elapsed().as_secs_f64()
        );
        let _ = writeln!(stderr);
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for StageSpinner {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Stage reporting that is a no-op when stderr is not interactive.
pub struct Progress(Option<StageSpinner>);

impl Progress {
    pub fn new(interactive: bool, stages: &'static [&'static str]) -> Self {
        Self(interactive.then(|| StageSpinner::new(stages)))
    }

    pub fn begin(&mut self) {
        if let Some(spinner) = &mut self.0 {
            spinner.begin();
        }
    }

    pub fn done(&mut self, notes: &[String]) {
        if let Some(spinner) = &mut self.0 {
            spinner.done(notes);
        }
    }

    pub fn finish(mut self) {
        if let Some(spinner) = &mut self.0 {
            spinner.finish();
        }
    }
}
