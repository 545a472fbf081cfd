//! Rename executor.
//!
//! Applies computed names to the copied videos. Every rename is attempted,
//! even after a failure, and the outcome of each one is recorded in order.
//! Whether a partial result is acceptable is up to the caller.

use crate::error::{RenameFailure, RenameFailures, RenameHint};
use crate::models::video::VideoNamedTarget;
use crate::utils::fs::rename_no_clobber;
use crate::utils::path::forbidden_characters;
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of one rename.
#[derive(Debug)]
pub enum RenameOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    /// The file already had its final name.
    Unchanged { path: PathBuf },
    Failed(RenameFailure),
}

impl RenameOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RenameOutcome::Failed(_))
    }
}

/// Ordered outcomes of a rename pass.
#[derive(Debug, Default)]
pub struct RenameReport {
    pub outcomes: Vec<RenameOutcome>,
}

impl RenameReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RenameFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            RenameOutcome::Failed(f) => Some(f),
            _ => None,
        })
    }

    /// Treat any failure as fatal.
    pub fn into_result(self) -> Result<()> {
        let failures: Vec<RenameFailure> = self
            .outcomes
            .into_iter()
            .filter_map(|o| match o {
                RenameOutcome::Failed(f) => Some(f),
                _ => None,
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::Rename(RenameFailures(failures)))
        }
    }
}

fn classify(new_name: &str, error: &io::Error) -> Option<RenameHint> {
    if error.kind() == io::ErrorKind::AlreadyExists {
        Some(RenameHint::TargetExists)
    } else if error.kind() == io::ErrorKind::CrossesDevices {
        Some(RenameHint::CrossDevice)
    } else if !forbidden_characters(new_name).is_empty() {
        Some(RenameHint::ForbiddenCharacters)
    } else {
        None
    }
}

/// Rename executor.
pub struct RenameExecutor {
    destination_root: PathBuf,
    show_progress: bool,
}

impl RenameExecutor {
    /// Create an executor for videos copied into `destination_root`.
    pub fn new(destination_root: &Path) -> Self {
        Self {
            destination_root: destination_root.to_path_buf(),
            show_progress: false,
        }
    }

    /// Draw a progress bar while renaming.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Rename every target, recording each outcome.
    pub fn execute(&self, targets: &[VideoNamedTarget]) -> RenameReport {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(targets.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut report = RenameReport::default();
        for target in targets {
            pb.set_message(target.new_name.clone());
            pb.inc(1);
            report.outcomes.push(self.rename_one(target));
        }
        pb.finish_and_clear();

        tracing::info!(
            "Renamed {} video(s), {} failure(s)",
            report.success_count(),
            report.failure_count()
        );
        report
    }

    fn rename_one(&self, target: &VideoNamedTarget) -> RenameOutcome {
        let from = self.destination_root.join(&target.video.original_name);
        let to = target.path.clone();

        if from == to {
            tracing::debug!("Already named: {}", to.display());
            return RenameOutcome::Unchanged { path: to };
        }

        match rename_no_clobber(&from, &to) {
            Ok(()) => {
                tracing::debug!("Renamed: {:?} -> {:?}", from, to);
                RenameOutcome::Renamed { from, to }
            }
            Err(source) => {
                let hint = classify(&target.new_name, &source);
                tracing::error!("Rename failed: {:?} -> {:?}: {}", from, to, source);
                RenameOutcome::Failed(RenameFailure {
                    from,
                    to,
                    source,
                    hint,
                })
            }
        }
    }
}

/// Rename all targets (convenience function).
pub fn rename_all(targets: &[VideoNamedTarget], destination_root: &Path) -> RenameReport {
    RenameExecutor::new(destination_root).execute(targets)
}

/// Print a rename report.
pub fn print_report(report: &RenameReport) {
    println!("{}", "[Rename Summary]".bold().green());
    for outcome in &report.outcomes {
        match outcome {
            RenameOutcome::Renamed { to, .. } => {
                println!("  {} {}", "[OK]".green(), to.display());
            }
            RenameOutcome::Unchanged { path } => {
                println!("  {} {}", "[SKIP]".yellow(), path.display());
            }
            RenameOutcome::Failed(failure) => {
                println!("  {} {}", "[FAIL]".red(), failure);
            }
        }
    }
    println!();
}
