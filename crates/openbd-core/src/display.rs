//! User-facing progress output in the buildpack `----->` style.
//!
//! Verbosity is an explicit value threaded through the call chain, never a
//! process-wide flag. Display granularity is the only thing it changes:
//! control flow must not depend on the selected mode.

use colored::Colorize;
use console::Term;

/// How much progress detail to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// One status line per command step.
    Terse,
    /// Per-folder and per-file progress lines.
    Verbose,
}

impl DisplayMode {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            DisplayMode::Verbose
        } else {
            DisplayMode::Terse
        }
    }

    pub fn is_verbose(self) -> bool {
        matches!(self, DisplayMode::Verbose)
    }
}

/// Prints status and in-place progress lines to stdout.
///
/// Display failures are deliberately ignored: a broken pipe on a progress
/// line must not abort a half-finished materialization.
pub struct Reporter {
    mode: DisplayMode,
    term: Term,
}

impl Reporter {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            term: Term::stdout(),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_verbose(&self) -> bool {
        self.mode.is_verbose()
    }

    /// Print a completed status line.
    pub fn status(&self, msg: impl AsRef<str>) {
        let _ = self
            .term
            .write_line(&format!("{} {}", "----->".blue(), msg.as_ref()));
    }

    /// Rewrite the current line in place (running progress).
    pub fn progress(&self, msg: impl AsRef<str>) {
        let _ = self.term.clear_line();
        let _ = self
            .term
            .write_str(&format!("{} {}", "----->".blue(), msg.as_ref()));
    }

    /// Rewrite the current line one last time and move on.
    pub fn progress_done(&self, msg: impl AsRef<str>) {
        let _ = self.term.clear_line();
        let _ = self
            .term
            .write_line(&format!("{} {}", "----->".blue(), msg.as_ref()));
    }

    /// Print a line without the arrow prefix.
    pub fn plain(&self, msg: impl AsRef<str>) {
        let _ = self.term.write_line(msg.as_ref());
    }

    pub fn v_status(&self, msg: impl AsRef<str>) {
        if self.is_verbose() {
            self.status(msg);
        }
    }

    pub fn v_progress(&self, msg: impl AsRef<str>) {
        if self.is_verbose() {
            self.progress(msg);
        }
    }

    pub fn v_progress_done(&self, msg: impl AsRef<str>) {
        if self.is_verbose() {
            self.progress_done(msg);
        }
    }
}
