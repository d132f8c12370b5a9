//! Build orchestration logic
//!
//! Drives the units of a build plan one at a time and turns their
//! individual outcomes into a single build outcome:
//!
//! - the first Failed unit aborts the build as Failed,
//! - the first Cancelled unit aborts the build as Cancelled,
//! - when every unit is Ok, the main artifact is recorded together with
//!   the sources that triggered the build.

use std::future::Future;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::core::classify::OutcomeStatus;
use crate::core::context::IncrementalContext;
use crate::core::diagnostics::{Diagnostic, DiagnosticSink};
use crate::core::dirty::{self, Freshness};
use crate::core::plan;
use crate::core::unit::{BuildTarget, CompileUnit};
use crate::error::{StateError, UnitError};

/// Message for a unit that compiled cleanly
pub const MSG_SUCCESSFUL: &str = "Compilation successful";

/// Message for a failed main unit
pub const MSG_FAILED: &str = "Compilation failed";

/// Message for a failed secondary unit
pub const MSG_FAILED_DEPENDENT_SKIPPED: &str =
    "Compilation failed, dependent build configurations will be skipped";

/// Message for a cancelled unit
pub const MSG_CANCELLED: &str = "Compilation cancelled";

/// Compiles a single unit to a terminal state
pub trait UnitRunner: Send + Sync {
    /// Compile `unit`, forwarding its output to `sink`
    ///
    /// An `Err` means no compiler process was ever started.
    fn run_unit(
        &self,
        target: &BuildTarget,
        unit: &CompileUnit,
        sink: &dyn DiagnosticSink,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<OutcomeStatus, UnitError>> + Send;
}

/// Result of one build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing changed and every artifact exists; no compiler was started
    UpToDate,
    /// Every unit compiled
    Succeeded {
        /// Main artifact
        artifact: PathBuf,
        /// Number of units compiled
        units: usize,
    },
    /// A unit failed; later units were not compiled
    Failed {
        /// Display label of the failed unit
        unit: String,
    },
    /// The build was cancelled; later units were not compiled
    Cancelled {
        /// Display label of the unit running at cancellation
        unit: String,
    },
}

impl BuildOutcome {
    /// Whether the build left every artifact in place
    pub fn is_success(&self) -> bool {
        matches!(self, Self::UpToDate | Self::Succeeded { .. })
    }
}

/// Build orchestrator state
#[derive(Debug)]
pub struct BuildOrchestrator<R, I> {
    /// Compiles individual units
    runner: R,
    /// Tracks changed sources
    incremental: I,
    /// Compile even when everything looks up to date
    force: bool,
}

impl<R, I> BuildOrchestrator<R, I>
where
    R: UnitRunner,
    I: IncrementalContext,
{
    /// Create a new build orchestrator
    pub fn new(runner: R, incremental: I) -> Self {
        Self {
            runner,
            incremental,
            force: false,
        }
    }

    /// Skip the up-to-date check
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The unit runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build one target
    ///
    /// Everything specific to this build (plan, processes, outcome) lives
    /// in this call; several targets may be built concurrently through
    /// the same orchestrator.
    pub async fn build(
        &self,
        target: &BuildTarget,
        sink: &dyn DiagnosticSink,
        cancel: &CancellationToken,
    ) -> Result<BuildOutcome, StateError> {
        let dirty_paths = self.incremental.dirty_paths(target)?;
        let plan = plan::expand(&target.main, &target.module);

        if !self.force && dirty::check(&dirty_paths, &plan) == Freshness::UpToDate {
            tracing::info!("{} is up to date, skipping", target.id());
            return Ok(BuildOutcome::UpToDate);
        }

        tracing::info!(
            "Building {} ({} units, {} changed sources)",
            target.id(),
            plan.len(),
            dirty_paths.len()
        );

        for (index, unit) in plan.units().iter().enumerate() {
            let label = unit.display_name();
            let status = if cancel.is_cancelled() {
                OutcomeStatus::Cancelled
            } else {
                match self.runner.run_unit(target, unit, sink, cancel).await {
                    Ok(status) => status,
                    Err(e) => {
                        sink.report(Diagnostic::error(&label, e.to_string()));
                        OutcomeStatus::Failed
                    }
                }
            };
            tracing::debug!("{label}: {status:?}");

            match status {
                OutcomeStatus::Ok => {
                    sink.report(Diagnostic::info(&label, MSG_SUCCESSFUL));
                }
                OutcomeStatus::Failed => {
                    let message = if index == 0 {
                        MSG_FAILED
                    } else {
                        MSG_FAILED_DEPENDENT_SKIPPED
                    };
                    sink.report(Diagnostic::info(&label, message));
                    return Ok(BuildOutcome::Failed { unit: label });
                }
                OutcomeStatus::Cancelled => {
                    sink.report(Diagnostic::info(&label, MSG_CANCELLED));
                    return Ok(BuildOutcome::Cancelled { unit: label });
                }
            }
        }

        let artifact = plan.main().output_file_path();
        self.incremental.record(&artifact, &dirty_paths)?;

        Ok(BuildOutcome::Succeeded {
            artifact,
            units: plan.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::{CollectingSink, Level};
    use crate::core::unit::{Module, OutputKind, RlmDescriptor};
    use std::collections::{BTreeSet, VecDeque};
    use std::path::Path;
    use std::sync::Mutex;

    /// Runner returning scripted outcomes and recording invocations
    struct ScriptedRunner {
        outcomes: Mutex<VecDeque<Result<OutcomeStatus, UnitError>>>,
        invoked: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(outcomes: Vec<Result<OutcomeStatus, UnitError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                invoked: Mutex::new(Vec::new()),
            }
        }

        fn invoked(&self) -> Vec<String> {
            self.invoked.lock().unwrap().clone()
        }
    }

    impl UnitRunner for ScriptedRunner {
        fn run_unit(
            &self,
            _target: &BuildTarget,
            unit: &CompileUnit,
            _sink: &dyn DiagnosticSink,
            _cancel: &CancellationToken,
        ) -> impl Future<Output = Result<OutcomeStatus, UnitError>> + Send {
            self.invoked.lock().unwrap().push(unit.main_class.clone());
            let next = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(OutcomeStatus::Ok));
            async move { next }
        }
    }

    #[derive(Default)]
    struct FakeIncremental {
        dirty: BTreeSet<PathBuf>,
        recorded: Mutex<Vec<(PathBuf, BTreeSet<PathBuf>)>>,
    }

    impl IncrementalContext for FakeIncremental {
        fn dirty_paths(&self, _target: &BuildTarget) -> Result<BTreeSet<PathBuf>, StateError> {
            Ok(self.dirty.clone())
        }

        fn record(&self, artifact: &Path, contributing: &BTreeSet<PathBuf>) -> Result<(), StateError> {
            self.recorded
                .lock()
                .unwrap()
                .push((artifact.to_path_buf(), contributing.clone()));
            Ok(())
        }
    }

    fn target_with_rlms(count: usize) -> BuildTarget {
        let mut main = CompileUnit::new("App", "web", OutputKind::Application, "/nonexistent/out", "App.swf")
            .with_main_class("App");
        for i in 0..count {
            main = main.with_rlm(RlmDescriptor {
                main_class: format!("Module{i}"),
                output_file: format!("m/{i}.swf"),
                optimize: false,
            });
        }
        let module = Module {
            name: "web".to_string(),
            ..Default::default()
        };
        BuildTarget::new(module, main)
    }

    fn dirty() -> FakeIncremental {
        FakeIncremental {
            dirty: BTreeSet::from([PathBuf::from("/src/App.mxml")]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_all_ok_records_main_artifact_once() {
        let orchestrator = BuildOrchestrator::new(ScriptedRunner::new(vec![]), dirty());
        let sink = CollectingSink::new();

        let outcome = orchestrator
            .build(&target_with_rlms(2), &sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BuildOutcome::Succeeded {
                artifact: PathBuf::from("/nonexistent/out/App.swf"),
                units: 3
            }
        );
        assert_eq!(orchestrator.runner().invoked(), vec!["App", "Module0", "Module1"]);
        assert_eq!(sink.messages(), vec![MSG_SUCCESSFUL; 3]);

        let recorded = orchestrator.incremental.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, PathBuf::from("/nonexistent/out/App.swf"));
        assert_eq!(recorded[0].1, BTreeSet::from([PathBuf::from("/src/App.mxml")]));
    }

    #[tokio::test]
    async fn test_main_failure_stops_build() {
        let runner = ScriptedRunner::new(vec![Ok(OutcomeStatus::Failed)]);
        let orchestrator = BuildOrchestrator::new(runner, dirty());
        let sink = CollectingSink::new();

        let outcome = orchestrator
            .build(&target_with_rlms(2), &sink, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, BuildOutcome::Failed { .. }));
        assert!(!outcome.is_success());
        assert_eq!(orchestrator.runner().invoked(), vec!["App"]);
        assert_eq!(sink.messages(), vec![MSG_FAILED]);
        assert!(orchestrator.incremental.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_secondary_failure_uses_dependent_message() {
        let runner = ScriptedRunner::new(vec![Ok(OutcomeStatus::Ok), Ok(OutcomeStatus::Failed)]);
        let orchestrator = BuildOrchestrator::new(runner, dirty());
        let sink = CollectingSink::new();

        let outcome = orchestrator
            .build(&target_with_rlms(3), &sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BuildOutcome::Failed {
                unit: "[App - Module0 (module web)]".to_string()
            }
        );
        assert_eq!(orchestrator.runner().invoked(), vec!["App", "Module0"]);
        assert_eq!(sink.messages(), vec![MSG_SUCCESSFUL, MSG_FAILED_DEPENDENT_SKIPPED]);
    }

    #[tokio::test]
    async fn test_cancelled_unit_is_not_failure() {
        let runner = ScriptedRunner::new(vec![Ok(OutcomeStatus::Ok), Ok(OutcomeStatus::Cancelled)]);
        let orchestrator = BuildOrchestrator::new(runner, dirty());
        let sink = CollectingSink::new();

        let outcome = orchestrator
            .build(&target_with_rlms(3), &sink, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, BuildOutcome::Cancelled { .. }));
        assert_eq!(orchestrator.runner().invoked(), vec!["App", "Module0"]);
        assert_eq!(sink.messages(), vec![MSG_SUCCESSFUL, MSG_CANCELLED]);
        assert!(sink.diagnostics().iter().all(|d| d.level == Level::Info));
    }

    #[tokio::test]
    async fn test_pre_process_error_reports_once_then_fails() {
        let runner = ScriptedRunner::new(vec![Err(UnitError::OutputPathNotCreatable {
            path: PathBuf::from("/ro/App.swf"),
            error: "read-only".to_string(),
        })]);
        let orchestrator = BuildOrchestrator::new(runner, dirty());
        let sink = CollectingSink::new();

        let outcome = orchestrator
            .build(&target_with_rlms(1), &sink, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, BuildOutcome::Failed { .. }));
        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].level, Level::Error);
        assert!(diagnostics[0].message.contains("/ro/App.swf"));
        assert_eq!(diagnostics[1].message, MSG_FAILED);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_starts_nothing() {
        let orchestrator = BuildOrchestrator::new(ScriptedRunner::new(vec![]), dirty());
        let sink = CollectingSink::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = orchestrator
            .build(&target_with_rlms(1), &sink, &cancel)
            .await
            .unwrap();

        assert!(matches!(outcome, BuildOutcome::Cancelled { .. }));
        assert!(orchestrator.runner().invoked().is_empty());
        assert_eq!(sink.messages(), vec![MSG_CANCELLED]);
    }

    #[tokio::test]
    async fn test_force_compiles_up_to_date_target() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("App.swf"), b"swf").unwrap();
        let main = CompileUnit::new("App", "App", OutputKind::Application, dir.path(), "App.swf");
        let target = BuildTarget::new(Module::default(), main);

        let lazy = BuildOrchestrator::new(ScriptedRunner::new(vec![]), FakeIncremental::default());
        let outcome = lazy
            .build(&target, &CollectingSink::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, BuildOutcome::UpToDate);
        assert!(lazy.runner().invoked().is_empty());

        let forced = BuildOrchestrator::new(ScriptedRunner::new(vec![]), FakeIncremental::default())
            .with_force(true);
        let outcome = forced
            .build(&target, &CollectingSink::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(outcome, BuildOutcome::Succeeded { units: 1, .. }));
    }
}
