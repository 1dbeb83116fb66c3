//! Executes harnesses path by path.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::report::{Finding, FindingKind, Location, Model, Report};
use crate::session::{self, PathOutcome, PathSignal, Session};
use crate::strategy::{RandomStrategy, ReplayStrategy, Strategy};

/// Runs harness closures under the reference engine.
///
/// Each path installs a fresh session on the current thread, runs the
/// harness to completion or until it is cut short by an assumption, an
/// assertion, an unconditional error or a panic, and folds the outcome into
/// a [`Report`].
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunConfig,
}

enum PathResult {
    Completed,
    Pruned(Location),
    Failed(Finding),
    Diverged(Error),
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(RunConfig::from_env()?))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute up to `iterations` paths of `harness`.
    pub fn run<F>(&self, name: &str, harness: F) -> Report
    where
        F: Fn(),
    {
        let seed = self
            .config
            .seed
            .unwrap_or_else(|| rand::thread_rng().next_u64());
        let span = tracing::debug_span!("harness", name, seed);
        let _guard = span.enter();

        let mut seeds = SmallRng::seed_from_u64(seed);
        let mut report = Report::new(name, seed);

        for path in 0..self.config.iterations {
            let strategy = RandomStrategy::from_seed(seeds.next_u64());
            let result = self.run_path(Box::new(strategy), &harness);
            report.paths += 1;
            match result {
                PathResult::Completed => tracing::trace!(path, "path completed"),
                PathResult::Pruned(location) => {
                    tracing::trace!(path, %location, "path pruned");
                    report.pruned += 1;
                }
                PathResult::Failed(finding) => {
                    tracing::debug!(path, %finding, "path failed");
                    report.add_finding(finding);
                    if self.config.fail_fast {
                        break;
                    }
                }
                PathResult::Diverged(err) => {
                    // Random strategies cannot diverge.
                    tracing::error!(path, error = %err, "unexpected divergence");
                }
            }
        }

        tracing::info!(
            paths = report.paths,
            pruned = report.pruned,
            findings = report.findings().len(),
            "harness finished"
        );
        report
    }

    /// Execute exactly one path of `harness`, drawing values from `model`.
    pub fn replay<F>(&self, name: &str, model: &Model, harness: F) -> Result<Report>
    where
        F: Fn(),
    {
        let span = tracing::debug_span!("replay", name, values = model.len());
        let _guard = span.enter();

        let mut report = Report::new(name, self.config.seed.unwrap_or_default());
        report.paths = 1;
        match self.run_path(Box::new(ReplayStrategy::new(model)), &harness) {
            PathResult::Completed => {}
            PathResult::Pruned(_) => report.pruned = 1,
            PathResult::Failed(finding) => report.add_finding(finding),
            PathResult::Diverged(err) => return Err(err),
        }
        Ok(report)
    }

    fn run_path<F>(&self, strategy: Box<dyn Strategy>, harness: &F) -> PathResult
    where
        F: Fn(),
    {
        session::install_panic_hook();
        let previous = session::enter(Session::new(strategy, self.config.name_binding));
        let result = panic::catch_unwind(AssertUnwindSafe(harness));
        let Some(mut session) = session::exit(previous) else {
            return PathResult::Completed;
        };
        let unconsumed = session.finish();

        let outcome = match result {
            Ok(()) => PathResult::Completed,
            Err(payload) if payload.is::<PathSignal>() => match session.take_outcome() {
                Some(PathOutcome::Pruned(location)) => PathResult::Pruned(location),
                Some(PathOutcome::Failed(finding)) => PathResult::Failed(finding),
                Some(PathOutcome::Diverged(err)) => PathResult::Diverged(err),
                None => PathResult::Completed,
            },
            Err(payload) => {
                let location = session
                    .take_panic_location()
                    .unwrap_or_else(|| Location::new("<unknown>", 0));
                let kind = FindingKind::Panic {
                    message: panic_message(payload.as_ref()),
                };
                PathResult::Failed(Finding::new(kind, location, session.into_model()))
            }
        };
        match (outcome, unconsumed) {
            (PathResult::Diverged(err), _) => PathResult::Diverged(err),
            (_, Err(err)) => PathResult::Diverged(err),
            (outcome, Ok(())) => outcome,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
