//! Parallel formatting of many inputs
//!
//! Each input is formatted on a `rayon` worker with nothing shared but the
//! policy. Results come back in input order regardless of completion order.

use crate::error::{Error, Result};
use crate::parser::lexer;
use crate::{check_with_limits, format_with_limits, CheckOutcome, Formatted, Limits, StylePolicy};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run-level cancellation flag shared by every worker
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One input: a name for reporting and its raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub id: String,
    pub bytes: Vec<u8>,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Format,
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Formatted(Formatted),
    Checked(CheckOutcome),
}

/// Result for one input
#[derive(Debug)]
pub struct UnitReport {
    /// Position of the input in the submitted list
    pub index: usize,
    pub id: String,
    pub result: Result<Outcome>,
}

impl UnitReport {
    /// Formatted output differs from the input
    pub fn needs_formatting(&self, original: &[u8]) -> bool {
        match &self.result {
            Ok(Outcome::Checked(outcome)) => !outcome.is_canonical,
            Ok(Outcome::Formatted(formatted)) => formatted.text.as_bytes() != original,
            Err(_) => false,
        }
    }
}

/// All results, sorted by input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    pub fn has_errors(&self) -> bool {
        self.units.iter().any(|u| u.result.is_err())
    }

    pub fn non_canonical(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|u| matches!(&u.result, Ok(Outcome::Checked(c)) if !c.is_canonical))
    }
}

/// Formats or checks many inputs on a worker pool
#[derive(Debug, Clone)]
pub struct BatchRunner {
    policy: StylePolicy,
    limits: Limits,
    jobs: Option<usize>,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(policy: StylePolicy) -> Self {
        Self {
            policy,
            limits: Limits::default(),
            jobs: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Number of worker threads; `None` uses one per CPU
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run every unit and return the reports in input order
    pub fn run(&self, units: &[SourceUnit], mode: Mode) -> Result<BatchReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .map_err(|e| Error::ConfigError {
                message: format!("cannot start worker pool: {}", e),
            })?;

        log::info!("processing {} input(s) on {} worker(s)", units.len(), pool.current_num_threads());

        let mut reports: Vec<UnitReport> = pool.install(|| {
            units
                .par_iter()
                .enumerate()
                .map(|(index, unit)| UnitReport {
                    index,
                    id: unit.id.clone(),
                    result: self.run_unit(unit, mode),
                })
                .collect()
        });
        reports.sort_by_key(|r| r.index);

        Ok(BatchReport { units: reports })
    }

    fn run_unit(&self, unit: &SourceUnit, mode: Mode) -> Result<Outcome> {
        // Queued inputs are abandoned once the run is cancelled
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let text = lexer::decode(&unit.bytes)?;
        let cancel = Some(&self.cancel);
        let outcome = match mode {
            Mode::Format => Outcome::Formatted(format_with_limits(text, &self.policy, &self.limits, cancel)?),
            Mode::Check => Outcome::Checked(check_with_limits(text, &self.policy, &self.limits, cancel)?),
        };
        log::debug!("{}: done", unit.id);
        Ok(outcome)
    }
}
