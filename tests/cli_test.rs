//! Integration tests for the flexbuild command line
//!
//! - `plan` prints the expanded units, as text or JSON
//! - `build` fails cleanly without a manifest
//! - `clean` removes build state and generated configs

mod common;

use assert_fs::prelude::*;
use common::TestProject;
use predicates::prelude::*;
use std::process::Command;

/// Helper to run flexbuild with arguments in a directory
fn run_flexbuild(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_flexbuild"));
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute flexbuild")
}

#[test]
fn test_plan_json_lists_units_in_order() {
    let project = TestProject::new().with_sample();

    let output = run_flexbuild(&project.path(), &["--json", "plan"]);
    assert!(output.status.success());

    let planned: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let units = planned[0]["units"].as_array().unwrap();
    assert_eq!(planned[0]["target"], "web/App");
    assert_eq!(units.len(), 3);
    assert_eq!(units[0]["label"], "[App (module web)]");
    assert_eq!(units[0]["temporary"], false);
    assert_eq!(units[1]["kind"], "runtime-loaded-module");
    assert_eq!(units[2]["label"], "[App - skin.css (module web)]");
}

#[test]
fn test_plan_text_output() {
    let project = TestProject::new().with_sample();

    let output = run_flexbuild(&project.path(), &["plan", "--module", "web"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(predicate::str::contains("web/App").eval(&stdout));
    assert!(predicate::str::contains("[App - mod.ModuleA (module web)]").eval(&stdout));
    assert!(predicate::str::contains("missing.css").not().eval(&stdout));
}

#[test]
fn test_plan_unknown_configuration_fails() {
    let project = TestProject::new().with_sample();

    let output = run_flexbuild(&project.path(), &["plan", "--module", "web", "--config", "Nope"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Nope"));
}

#[test]
fn test_build_without_manifest_fails() {
    let temp = assert_fs::TempDir::new().unwrap();

    let output = run_flexbuild(temp.path(), &["build"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("flexbuild.toml"));
    temp.child(".flexbuild").assert(predicate::path::missing());
}

#[test]
fn test_clean_removes_state_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("flexbuild.toml")
        .write_str("[project]\nname = \"shop\"\n")
        .unwrap();
    temp.child(".flexbuild/state.json").write_str("{}").unwrap();
    temp.child(".flexbuild/configs/web-App-0011aabb.xml")
        .write_str("<flex-config/>")
        .unwrap();
    temp.child("web/bin/App.swf").write_str("swf").unwrap();

    let output = run_flexbuild(temp.path(), &["clean"]);

    assert!(output.status.success());
    temp.child(".flexbuild").assert(predicate::path::missing());
    temp.child("web/bin/App.swf").assert(predicate::path::exists());
}

#[test]
fn test_clean_with_nothing_to_clean() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("flexbuild.toml")
        .write_str("[project]\nname = \"shop\"\n")
        .unwrap();

    let output = run_flexbuild(temp.path(), &["clean"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Nothing to clean"));
}

#[cfg(unix)]
#[test]
fn test_build_with_stand_in_compiler() {
    let project = TestProject::new().with_sample();
    let java = project.fake_java(common::COMPILE_SCRIPT);
    let manifest = project.read_file("flexbuild.toml").replace(
        "name = \"shop\"",
        &format!("name = \"shop\"\njava = \"{}\"", java.display()),
    );
    project.create_file("flexbuild.toml", &manifest);

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_flexbuild"));
    cmd.current_dir(project.path())
        .env("FLEXBUILD_WORK_DIR", project.path().join("work"))
        .arg("build");
    let output = cmd.output().expect("Failed to execute flexbuild");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(project.file_exists("web/bin/App.swf"));
    assert_eq!(project.invocations(), 3);

    let output = run_flexbuild(&project.path(), &["--json", "build"]);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["up_to_date"], 1);
    assert_eq!(project.invocations(), 3);
}
