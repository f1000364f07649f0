//! Run summary collection and reporting.
//!
//! Records the outcome of each image in the order it ran and decides the process exit
//! status. By default only load and transport failures fail a run; a `FAILED` exit code
//! from the core fails it only when `general.fail_on_exit_code` is set.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::soc::devices::tohost::Outcome;

/// Outcome of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    /// Image path as given on the command line.
    pub path: PathBuf,
    /// How the program on that image exited.
    pub outcome: Outcome,
}

/// Outcomes of every image in a run, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    results: Vec<ImageResult>,
}

impl RunSummary {
    /// Appends the outcome of one image.
    pub fn record(&mut self, path: &Path, outcome: Outcome) {
        self.results.push(ImageResult {
            path: path.to_path_buf(),
            outcome,
        });
    }

    /// Per-image results in run order.
    pub fn results(&self) -> &[ImageResult] {
        &self.results
    }

    /// Number of images that ran to an exit code.
    pub const fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if no image ran.
    pub const fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of images that exited with code zero.
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_pass()).count()
    }

    /// Number of images that exited with a non-zero code.
    pub fn failed(&self) -> usize {
        self.len() - self.passed()
    }

    /// Returns `true` if every image passed.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit status for a run that completed without a fatal error.
    ///
    /// `fail_on_exit_code` makes any failing image exit with status 1; otherwise the status
    /// is 0 regardless of outcomes.
    pub fn exit_status(&self, fail_on_exit_code: bool) -> i32 {
        i32::from(fail_on_exit_code && !self.all_passed())
    }

    /// Writes a short report.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn print(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "==========================================================")?;
        writeln!(out, "RUN SUMMARY")?;
        writeln!(out, "  images                 {}", self.len())?;
        writeln!(out, "  passed                 {}", self.passed())?;
        writeln!(out, "  failed                 {}", self.failed())?;
        if !self.all_passed() {
            writeln!(out, "----------------------------------------------------------")?;
            for result in self.results.iter().filter(|r| !r.outcome.is_pass()) {
                writeln!(
                    out,
                    "  {:<22} exit code {}",
                    result.path.display(),
                    result.outcome.exit_code()
                )?;
            }
        }
        writeln!(out, "==========================================================")
    }
}
