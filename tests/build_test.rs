//! Integration tests for the build orchestrator with real collaborators
//!
//! A shell script stands in for `java`, so every test runs the complete
//! path: config generation, command assembly, process handling, output
//! classification, status aggregation and incremental state.
#![cfg(unix)]

mod common;

use common::{TestProject, COMPILE_SCRIPT};
use flexbuild::core::builder::{
    BuildOrchestrator, BuildOutcome, MSG_CANCELLED, MSG_FAILED, MSG_FAILED_DEPENDENT_SKIPPED,
    MSG_SUCCESSFUL,
};
use flexbuild::core::diagnostics::{CollectingSink, Level};
use flexbuild::core::manifest::Manifest;
use flexbuild::core::unit::BuildTarget;
use flexbuild::infra::compiler::ProcessCompiler;
use flexbuild::infra::provisioner::FileConfigProvisioner;
use flexbuild::infra::sdk::SdkRegistry;
use flexbuild::infra::state::StateStore;
use flexbuild::infra::toolchain::JavaToolchain;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn setup(project: &TestProject, java: PathBuf) -> (BuildOrchestrator<ProcessCompiler, StateStore>, BuildTarget) {
    let manifest = Manifest::load(&project.path().join("flexbuild.toml")).unwrap();
    let target = manifest
        .select_targets(&project.path(), Some("web"), Some("App"))
        .unwrap()
        .remove(0);

    let compiler = ProcessCompiler::new(
        Arc::new(FileConfigProvisioner::for_project(&project.path())),
        Arc::new(SdkRegistry::new(manifest.sdks.clone())),
        JavaToolchain::new(java),
        project.path().join("work"),
    );
    let orchestrator = BuildOrchestrator::new(compiler, StateStore::for_project(&project.path()));
    (orchestrator, target)
}

#[tokio::test]
async fn test_full_build_then_up_to_date() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java(COMPILE_SCRIPT);
    let (orchestrator, target) = setup(&project, java);

    let sink = CollectingSink::new();
    let outcome = orchestrator
        .build(&target, &sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BuildOutcome::Succeeded {
            artifact: project.path().join("web/bin/App.swf"),
            units: 3
        }
    );
    assert_eq!(project.invocations(), 3);
    assert!(project.file_exists("web/bin/App.swf"));
    assert!(project.file_exists("web/bin/modules/a.swf"));
    assert!(project.file_exists("web/bin/styles/skin.swf"));
    assert!(project.file_exists(".flexbuild/state.json"));
    assert!(sink.diagnostics().iter().all(|d| d.level == Level::Info));
    assert_eq!(
        sink.messages()
            .iter()
            .filter(|m| m.as_str() == MSG_SUCCESSFUL)
            .count(),
        3
    );

    let sink = CollectingSink::new();
    let outcome = orchestrator
        .build(&target, &sink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, BuildOutcome::UpToDate);
    assert_eq!(project.invocations(), 3);
    assert!(sink.diagnostics().is_empty());
}

#[tokio::test]
async fn test_changed_source_rebuilds_every_unit() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java(COMPILE_SCRIPT);
    let (orchestrator, target) = setup(&project, java);
    let cancel = CancellationToken::new();

    orchestrator.build(&target, &CollectingSink::new(), &cancel).await.unwrap();
    project.create_file("web/src/com/shop/App.mxml", "<s:Application width=\"100\"/>");

    let outcome = orchestrator.build(&target, &CollectingSink::new(), &cancel).await.unwrap();
    assert!(matches!(outcome, BuildOutcome::Succeeded { units: 3, .. }));
    assert_eq!(project.invocations(), 6);
}

#[tokio::test]
async fn test_deleted_artifact_triggers_rebuild() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java(COMPILE_SCRIPT);
    let (orchestrator, target) = setup(&project, java);
    let cancel = CancellationToken::new();

    orchestrator.build(&target, &CollectingSink::new(), &cancel).await.unwrap();
    std::fs::remove_file(project.path().join("web/bin/styles/skin.swf")).unwrap();

    let outcome = orchestrator.build(&target, &CollectingSink::new(), &cancel).await.unwrap();
    assert!(matches!(outcome, BuildOutcome::Succeeded { .. }));
    assert_eq!(project.invocations(), 6);
}

#[tokio::test]
async fn test_main_failure_skips_secondary_units() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java(
        "echo run >> \"$(dirname \"$0\")/../invocations.log\"\necho 'App.mxml(1): col: 1 Error: Could not resolve <s:Application> to a component implementation.' 1>&2",
    );
    let (orchestrator, target) = setup(&project, java);

    let sink = CollectingSink::new();
    let outcome = orchestrator
        .build(&target, &sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BuildOutcome::Failed {
            unit: "[App (module web)]".to_string()
        }
    );
    assert_eq!(project.invocations(), 1);
    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics[0].level, Level::Error);
    assert_eq!(diagnostics.last().unwrap().message, MSG_FAILED);
    assert!(!project.file_exists(".flexbuild/state.json"));
}

#[tokio::test]
async fn test_secondary_failure_reports_dependent_skip() {
    let project = TestProject::new().with_sample();
    // Only the optimized RLM's config loads externs
    let java = project.fake_java(&format!(
        r#"cfg=$(printf '%s\n' "$@" | sed -n 's/^-load-config=//p' | head -n 1)
if grep -q '<load-externs>' "$cfg"; then
  echo 'Error: module failed'
  exit 1
fi
{COMPILE_SCRIPT}"#
    ));
    let (orchestrator, target) = setup(&project, java);

    let sink = CollectingSink::new();
    let outcome = orchestrator
        .build(&target, &sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BuildOutcome::Failed {
            unit: "[App - mod.ModuleA (module web)]".to_string()
        }
    );
    assert_eq!(project.invocations(), 1);
    assert_eq!(
        sink.messages().last().map(String::as_str),
        Some(MSG_FAILED_DEPENDENT_SKIPPED)
    );
    assert!(!project.file_exists("web/bin/styles/skin.swf"));
}

#[tokio::test]
async fn test_cancellation_stops_running_compiler() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java("echo 'Loading configuration'\nexec sleep 30");
    let (orchestrator, target) = setup(&project, java);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let sink = CollectingSink::new();
    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator.build(&target, &sink, &cancel),
    )
    .await
    .expect("cancelled build must finish promptly")
    .unwrap();

    assert!(matches!(outcome, BuildOutcome::Cancelled { .. }));
    assert_eq!(sink.messages().last().map(String::as_str), Some(MSG_CANCELLED));
    assert!(sink.diagnostics().iter().all(|d| d.level == Level::Info));
}

#[tokio::test]
async fn test_missing_sdk_fails_without_process() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java(COMPILE_SCRIPT);
    std::fs::remove_dir_all(project.path().join("sdk")).unwrap();
    let (orchestrator, target) = setup(&project, java);

    let sink = CollectingSink::new();
    let outcome = orchestrator
        .build(&target, &sink, &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, BuildOutcome::Failed { .. }));
    assert_eq!(project.invocations(), 0);
    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].level, Level::Error);
    assert!(diagnostics[0].message.contains("home directory not found"));
}
