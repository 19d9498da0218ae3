//! The case runner drives batches of test vectors through the oracle.
//!
//! Every vector of every batch is evaluated; a failing vector is recorded and
//! never stops the run. An unknown zone fails each vector of its batch.

use core::fmt;

use alloc::{collections::BTreeMap, format, string::String, vec::Vec};
use zonedata_rs::{Instant, RuleTable, UtcOffsetMinutes};

use crate::{
    iso::LocalDateTime,
    oracle::{self, Direction, Mismatch, Verdict},
    timezone::TimeZone,
    OracleError,
};

/// A sink for individual verdicts.
///
/// Reporters are shared between worker threads when the runner is parallel.
pub trait Reporter: Sync {
    fn report(&self, passed: bool, description: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, passed: bool, description: &str) {
        (**self).report(passed, description);
    }
}

/// A reporter that discards every verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _: bool, _: &str) {}
}

/// A reporter that logs passes at `debug` and failures at `warn`.
#[cfg(feature = "log")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

#[cfg(feature = "log")]
impl Reporter for LogReporter {
    fn report(&self, passed: bool, description: &str) {
        if passed {
            log::debug!(target: "tz_oracle", "pass: {description}");
        } else {
            log::warn!(target: "tz_oracle", "FAIL: {description}");
        }
    }
}

/// A literal claim that `local` in some zone is the instant `utc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    pub local: LocalDateTime,
    /// The UTC fields of the claimed instant.
    pub utc: LocalDateTime,
    /// The expected base (standard) offset at the claimed instant.
    pub expected_offset: UtcOffsetMinutes,
    /// Free form metadata, never interpreted.
    pub annotations: BTreeMap<String, String>,
}

impl TestVector {
    pub fn new(
        local: LocalDateTime,
        utc: LocalDateTime,
        expected_offset: UtcOffsetMinutes,
    ) -> Self {
        Self {
            local,
            utc,
            expected_offset,
            annotations: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn utc_instant(&self) -> Instant {
        self.utc.to_instant_utc()
    }
}

/// The test vectors of a single zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCases {
    pub zone: String,
    pub vectors: Vec<TestVector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Mismatch(Mismatch),
    Error(OracleError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch(mismatch) => mismatch.fmt(f),
            Self::Error(err) => err.fmt(f),
        }
    }
}

/// A recorded failure of the vector at `index` of the `zone` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub zone: String,
    pub index: usize,
    pub reason: FailureReason,
}

impl Failure {
    /// The direction that failed, if the failure is a mismatch.
    pub fn direction(&self) -> Option<Direction> {
        match &self.reason {
            FailureReason::Mismatch(mismatch) => Some(mismatch.direction()),
            FailureReason::Error(_) => None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.zone, self.index, self.reason)
    }
}

/// The aggregated result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    AllPassed {
        total: usize,
    },
    /// At least one vector failed; `failures` is never empty.
    Failed {
        total: usize,
        passed: usize,
        failures: Vec<Failure>,
    },
}

impl RunOutcome {
    fn from_failures(total: usize, failures: Vec<Failure>) -> Self {
        if failures.is_empty() {
            Self::AllPassed { total }
        } else {
            Self::Failed {
                total,
                passed: total - failures.len(),
                failures,
            }
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::AllPassed { .. })
    }

    pub fn total(&self) -> usize {
        match self {
            Self::AllPassed { total } | Self::Failed { total, .. } => *total,
        }
    }

    pub fn passed(&self) -> usize {
        match self {
            Self::AllPassed { total } => *total,
            Self::Failed { passed, .. } => *passed,
        }
    }

    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::AllPassed { .. } => &[],
            Self::Failed { failures, .. } => failures,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vectors, {} passed, {} failed",
            self.total(),
            self.passed(),
            self.failures().len()
        )
    }
}

/// Runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Also check each vector's expected base offset.
    pub check_base_offset: bool,
    /// Evaluate batches and vectors on the rayon thread pool.
    ///
    /// Ignored unless the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            check_base_offset: true,
            parallel: false,
        }
    }
}

/// `CaseRunner` evaluates [`ZoneCases`] against a [`RuleTable`].
#[derive(Debug)]
pub struct CaseRunner<'t, R> {
    table: &'t RuleTable,
    reporter: R,
    options: RunnerOptions,
}

impl<'t, R: Reporter> CaseRunner<'t, R> {
    pub fn new(table: &'t RuleTable, reporter: R) -> Self {
        Self {
            table,
            reporter,
            options: RunnerOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RunnerOptions {
        self.options
    }

    /// Runs every vector of every batch.
    pub fn run(&self, batches: &[ZoneCases]) -> RunOutcome {
        let total = batches.iter().map(|batch| batch.vectors.len()).sum();

        #[cfg(feature = "parallel")]
        if self.options.parallel {
            return RunOutcome::from_failures(total, self.run_parallel(batches));
        }

        let mut failures = Vec::new();
        for batch in batches {
            let tz = TimeZone::try_from_table(self.table, &batch.zone);
            for (index, vector) in batch.vectors.iter().enumerate() {
                failures.extend(self.check_vector(&batch.zone, tz.as_ref(), index, vector));
            }
        }
        RunOutcome::from_failures(total, failures)
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self, batches: &[ZoneCases]) -> Vec<Failure> {
        use rayon::prelude::*;
        use std::sync::{Mutex, PoisonError};

        let collector = Mutex::new(Vec::new());
        batches.par_iter().for_each(|batch| {
            let tz = TimeZone::try_from_table(self.table, &batch.zone);
            batch
                .vectors
                .par_iter()
                .enumerate()
                .for_each(|(index, vector)| {
                    let failure = self.check_vector(&batch.zone, tz.as_ref(), index, vector);
                    if let Some(failure) = failure {
                        collector
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(failure);
                    }
                });
        });
        collector
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_vector(
        &self,
        zone: &str,
        tz: Result<&TimeZone<'t>, &OracleError>,
        index: usize,
        vector: &TestVector,
    ) -> Option<Failure> {
        let verdict = tz.map_err(OracleError::clone).and_then(|tz| {
            oracle::verify_vector_in_zone(tz, vector, self.options.check_base_offset)
        });
        let reason = match verdict {
            Ok(Verdict::Consistent) => {
                self.reporter.report(
                    true,
                    &format!(
                        "{zone}[{index}]: {} <-> {}",
                        vector.local,
                        vector.utc_instant()
                    ),
                );
                return None;
            }
            Ok(Verdict::Mismatch(mismatch)) => FailureReason::Mismatch(mismatch),
            Err(err) => FailureReason::Error(err),
        };
        let failure = Failure {
            zone: zone.into(),
            index,
            reason,
        };
        self.reporter.report(false, &format!("{failure}"));
        Some(failure)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{
        string::{String, ToString},
        vec,
        vec::Vec,
    };
    use core::sync::atomic::{AtomicUsize, Ordering};

    use zonedata_rs::{RuleTable, UtcOffsetMinutes};

    use super::{
        CaseRunner, FailureReason, NullReporter, Reporter, RunOutcome, TestVector, ZoneCases,
    };
    use crate::{error::ErrorKind, iso::LocalDateTime, oracle::Direction};

    const SOURCE: &str = "Zone Asia/Aden 2:59:54 - LMT 1949 Dec 31 21:00\n\t3:00 - +03\n";

    #[derive(Default)]
    struct CountingReporter {
        passed: AtomicUsize,
        failed: AtomicUsize,
    }

    impl Reporter for CountingReporter {
        fn report(&self, passed: bool, _: &str) {
            let counter = if passed { &self.passed } else { &self.failed };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn vector(local: (u8, u8, u8), utc: (u8, u8, u8)) -> TestVector {
        let year = |day| if day == 31 { 1949 } else { 1950 };
        let month = |day| if day == 31 { 12 } else { 1 };
        TestVector::new(
            LocalDateTime::try_new(year(local.0), month(local.0), local.0, local.1, local.2, 0)
                .unwrap(),
            LocalDateTime::try_new(year(utc.0), month(utc.0), utc.0, utc.1, utc.2, 0).unwrap(),
            UtcOffsetMinutes(180),
        )
    }

    fn aden_cases() -> ZoneCases {
        ZoneCases {
            zone: String::from("Asia/Aden"),
            vectors: vec![
                vector((31, 20, 0), (31, 17, 0)),
                vector((31, 21, 0), (31, 18, 0)),
                vector((1, 0, 0), (31, 21, 0)),
                vector((1, 3, 0), (1, 0, 0)),
            ],
        }
    }

    #[test]
    fn all_vectors_pass() {
        let table = RuleTable::from_zoneinfo_str(SOURCE).unwrap().table;
        let reporter = CountingReporter::default();
        let outcome = CaseRunner::new(&table, &reporter).run(&[aden_cases()]);
        assert_eq!(outcome, RunOutcome::AllPassed { total: 4 });
        assert_eq!(reporter.passed.load(Ordering::Relaxed), 4);
        assert_eq!(reporter.failed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn one_wrong_field_is_one_failure() {
        let table = RuleTable::from_zoneinfo_str(SOURCE).unwrap().table;
        let mut cases = aden_cases();
        cases.vectors[2] = vector((1, 0, 0), (31, 22, 0));
        let reporter = CountingReporter::default();
        let outcome = CaseRunner::new(&table, &reporter).run(&[cases]);

        assert!(!outcome.is_success());
        assert_eq!(outcome.total(), 4);
        assert_eq!(outcome.passed(), 3);
        let failures = outcome.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 2);
        assert_eq!(failures[0].zone, "Asia/Aden");
        assert_eq!(failures[0].direction(), Some(Direction::UtcToLocal));
        assert_eq!(reporter.failed.load(Ordering::Relaxed), 1);
        assert_eq!(outcome.to_string(), "4 vectors, 3 passed, 1 failed");
    }

    #[test]
    fn unknown_zone_fails_its_batch_only() {
        let table = RuleTable::from_zoneinfo_str(SOURCE).unwrap().table;
        let mut missing = aden_cases();
        missing.zone = String::from("Asia/Sanaa");
        let outcome = CaseRunner::new(&table, NullReporter).run(&[missing, aden_cases()]);

        assert_eq!(outcome.total(), 8);
        assert_eq!(outcome.passed(), 4);
        let indices = outcome
            .failures()
            .iter()
            .map(|failure| {
                assert!(matches!(
                    &failure.reason,
                    FailureReason::Error(err) if err.kind() == ErrorKind::UnknownZone
                ));
                failure.index
            })
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn base_offset_can_be_skipped() {
        let table = RuleTable::from_zoneinfo_str(SOURCE).unwrap().table;
        let mut cases = aden_cases();
        for vector in &mut cases.vectors {
            vector.expected_offset = UtcOffsetMinutes(120);
        }
        let runner = CaseRunner::new(&table, NullReporter);
        let outcome = runner.run(core::slice::from_ref(&cases));
        assert_eq!(outcome.failures().len(), 4);
        assert!(outcome
            .failures()
            .iter()
            .all(|failure| failure.direction() == Some(Direction::BaseOffset)));

        let runner = runner.with_options(super::RunnerOptions {
            check_base_offset: false,
            ..Default::default()
        });
        assert!(runner.run(&[cases]).is_success());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_run_collects_every_failure() {
        let table = RuleTable::from_zoneinfo_str(SOURCE).unwrap().table;
        let mut broken = aden_cases();
        broken.vectors[0] = vector((31, 20, 0), (31, 18, 0));
        broken.vectors[3] = vector((1, 3, 0), (1, 1, 0));
        let batches = vec![aden_cases(), broken, aden_cases()];

        let reporter = CountingReporter::default();
        let outcome = CaseRunner::new(&table, &reporter)
            .with_options(super::RunnerOptions {
                parallel: true,
                ..Default::default()
            })
            .run(&batches);

        assert_eq!(outcome.total(), 12);
        assert_eq!(outcome.passed(), 10);
        let failures = outcome.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().any(|f| f.index == 0));
        assert!(failures.iter().any(|f| f.index == 3));
        assert_eq!(reporter.passed.load(Ordering::Relaxed), 10);
    }
}
