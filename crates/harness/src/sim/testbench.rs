//! Testbench: runs VMH images on a transactor-attached core, one after another.
//!
//! For each image the testbench resets the device, streams the image's memory-init records,
//! sends the start PC, and decodes the tohost stream until the core exits. Any load,
//! transport, or protocol failure aborts the whole run. The shutdown handshake is
//! performed exactly once, after the last image or at the first failure.

use std::io::Write;
use std::path::Path;

use tracing::{error, info, warn};

use crate::common::RunError;
use crate::config::Config;
use crate::sim::loader;
use crate::soc::devices::tohost::{HostDecoder, Outcome};
use crate::soc::traits::{Transactor, tohost_events};
use crate::stats::RunSummary;

/// Drives images through a transactor, writing program output to `diag`.
#[derive(Debug)]
pub struct Testbench<T, W> {
    transactor: T,
    diag: W,
    start_pc: u32,
}

impl<T: Transactor, W: Write> Testbench<T, W> {
    /// Creates a testbench over `transactor`, writing diagnostics to `diag`.
    pub const fn new(transactor: T, config: &Config, diag: W) -> Self {
        Self {
            transactor,
            diag,
            start_pc: config.general.start_pc,
        }
    }

    /// Start PC sent after each image load.
    pub const fn start_pc(&self) -> u32 {
        self.start_pc
    }

    /// Runs one image to completion.
    ///
    /// # Errors
    ///
    /// [`RunError::Load`] if the image cannot be loaded (nothing is sent to the memory-init
    /// port in that case), [`RunError::Transport`] if a host message cannot be delivered, and
    /// [`RunError::Protocol`] if the tohost stream ends or fails before an exit code.
    pub fn run_image(&mut self, path: &Path) -> Result<Outcome, RunError> {
        self.transactor.reset()?;
        writeln!(self.diag, "---- {} ----", path.display()).map_err(RunError::Diagnostic)?;

        let records = match loader::load_vmh(path) {
            Ok(records) => records,
            Err(err) => {
                error!(image = %err.path().display(), error = %err, "failed to load memory");
                writeln!(self.diag, "Failed to load memory").map_err(RunError::Diagnostic)?;
                return Err(err.into());
            }
        };
        for record in &records {
            self.transactor.send_mem_init(record)?;
        }

        info!(
            image = %path.display(),
            records = records.len() - 1,
            start_pc = format_args!("{:#x}", self.start_pc),
            "starting core"
        );
        self.transactor.start(self.start_pc)?;

        let mut out = LineTracker::new(&mut self.diag);
        let decoded = HostDecoder::new(&mut out).run(tohost_events(&mut self.transactor));
        let mid_line = out.mid_line;
        let outcome = match decoded {
            Ok(outcome) => outcome,
            Err(err) => {
                if mid_line {
                    self.note("");
                }
                return Err(err.into());
            }
        };
        writeln!(self.diag).map_err(RunError::Diagnostic)?;

        info!(image = %path.display(), %outcome, "image finished");
        Ok(outcome)
    }

    /// Runs every image in order, then shuts the device down.
    ///
    /// Stops at the first image that fails to load or to run; per-image `FAILED` outcomes
    /// are recorded in the summary and do not stop the run.
    ///
    /// # Errors
    ///
    /// The first error from [`Testbench::run_image`], or a shutdown failure after an
    /// otherwise clean run.
    pub fn run_all<I>(&mut self, images: I) -> Result<RunSummary, RunError>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut summary = RunSummary::default();
        let result: Result<(), RunError> = images.into_iter().try_for_each(|image| {
            let path = image.as_ref();
            let outcome = self.run_image(path)?;
            summary.record(path, outcome);
            Ok(())
        });

        if result.is_err() {
            self.note("shutting down...");
        }
        let shutdown = self.transactor.shutdown();
        if result.is_err() {
            self.note("finished");
        }

        match (result, shutdown) {
            (Err(err), shutdown) => {
                if let Err(shutdown_err) = shutdown {
                    warn!(error = %shutdown_err, "shutdown after failed run");
                }
                Err(err)
            }
            (Ok(()), Err(shutdown_err)) => Err(shutdown_err.into()),
            (Ok(()), Ok(())) => Ok(summary),
        }
    }

    /// Writes a diagnostic line, logging rather than returning write failures.
    fn note(&mut self, line: &str) {
        if let Err(err) = writeln!(self.diag, "{line}") {
            warn!(error = %err, "diagnostic output failed");
        }
    }

    /// Consumes the testbench, returning the transactor and diagnostic writer.
    pub fn into_parts(self) -> (T, W) {
        (self.transactor, self.diag)
    }
}

/// Writer adapter that remembers whether the last byte written ended a line.
struct LineTracker<W> {
    inner: W,
    mid_line: bool,
}

impl<W> LineTracker<W> {
    const fn new(inner: W) -> Self {
        Self {
            inner,
            mid_line: false,
        }
    }
}

impl<W: Write> Write for LineTracker<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        if let Some(&last) = buf[..n].last() {
            self.mid_line = last != b'\n';
        }
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
