mod common;

use common::{CommandOutput, TestContext};
use std::fs;

fn run(ctx: &TestContext, args: &[&str]) -> CommandOutput {
    ctx.cmd()
        .args(args)
        .output()
        .expect("Failed to run gvm")
        .into()
}

#[test]
fn test_help_and_version() {
    let ctx = TestContext::new();

    run(&ctx, &["--help"])
        .assert_success()
        .assert_stdout_contains("A Go toolchain version manager")
        .assert_stdout_contains("Usage: gvm");

    run(&ctx, &["--version"])
        .assert_success()
        .assert_stdout_contains("gvm");
}

#[test]
fn test_list_with_nothing_installed() {
    let ctx = TestContext::new();
    run(&ctx, &["list"])
        .assert_success()
        .assert_stdout_contains("No Go versions installed");
}

#[test]
fn test_current_with_no_active_version() {
    let ctx = TestContext::new();
    run(&ctx, &["current"])
        .assert_success()
        .assert_stderr_contains("No Go version is currently active");
}

#[test]
fn test_use_and_current_round_trip() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    run(&ctx, &["use", "1.21.3"])
        .assert_success()
        .assert_stdout_contains("Now using Go 1.21.3");

    run(&ctx, &["current"])
        .assert_success()
        .assert_stdout_contains("Current: 1.21.3");

    run(&ctx, &["list"])
        .assert_success()
        .assert_stdout_contains("* 1.21.3 (current)");
}

#[test]
fn test_use_normalizes_prefixed_input() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    run(&ctx, &["use", "go1.21.3"]).assert_success();
    run(&ctx, &["current"])
        .assert_success()
        .assert_stdout_contains("Current: 1.21.3");
}

#[test]
fn test_use_missing_version_with_auto_install_disabled() {
    let ctx = TestContext::new();
    run(&ctx, &["config", "set", "auto_install", "false"]).assert_success();

    run(&ctx, &["use", "1.19.0"])
        .assert_failure()
        .assert_stderr_contains("not installed");
}

#[test]
fn test_uninstall_clears_current_pointer() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    run(&ctx, &["use", "1.21.3"]).assert_success();
    run(&ctx, &["uninstall", "1.21.3"])
        .assert_success()
        .assert_stdout_contains("Uninstalled Go 1.21.3");

    // No dangling pointer remains on disk
    assert!(fs::symlink_metadata(ctx.root.join("current")).is_err());
    run(&ctx, &["current"])
        .assert_success()
        .assert_stderr_contains("No Go version is currently active");
}

#[test]
fn test_install_reports_outcome_on_stdout() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    // Nothing active yet, and no --default: report without activating
    run(&ctx, &["install", "1.21.3"])
        .assert_success()
        .assert_stdout_contains("Go 1.21.3 is already installed");
    run(&ctx, &["current"])
        .assert_success()
        .assert_stderr_contains("No Go version is currently active");

    run(&ctx, &["install", "go1.21.3", "--default"])
        .assert_success()
        .assert_stdout_contains("Now using Go 1.21.3");
}

#[cfg(unix)]
#[test]
fn test_exec_runs_under_named_version() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    // 'go' maps to the version's own binary
    run(&ctx, &["exec", "1.21.3", "go", "version"]).assert_success();

    // GOROOT points inside the version directory, not at any global state
    run(&ctx, &["exec", "1.21.3", "sh", "-c", "echo GOROOT=$GOROOT"])
        .assert_success()
        .assert_stdout_contains("versions/1.21.3/go");

    // Running under a version never flips the global pointer
    run(&ctx, &["current"])
        .assert_success()
        .assert_stderr_contains("No Go version is currently active");
}

#[cfg(unix)]
#[test]
fn test_exec_propagates_exit_code_and_flags() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    let out = run(&ctx, &["exec", "1.21.3", "sh", "-c", "exit 3"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn test_exec_missing_version_fails() {
    let ctx = TestContext::new();
    run(&ctx, &["exec", "1.19.0", "go", "version"])
        .assert_failure()
        .assert_stderr_contains("not installed");
}

#[test]
fn test_uninstall_missing_version_fails() {
    let ctx = TestContext::new();
    run(&ctx, &["uninstall", "1.19.0"])
        .assert_failure()
        .assert_stderr_contains("not installed");
}

#[test]
fn test_uninstall_reports_dangling_aliases() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    run(&ctx, &["alias", "dev", "1.21.3"]).assert_success();
    run(&ctx, &["uninstall", "1.21.3"])
        .assert_success()
        .assert_stderr_contains("aliases still point at 1.21.3: dev");

    // The alias itself is left untouched
    run(&ctx, &["alias", "dev"])
        .assert_success()
        .assert_stdout_contains("dev -> 1.21.3");
}

#[test]
fn test_alias_lifecycle() {
    let ctx = TestContext::new();

    // Reserved aliases are pre-seeded with empty targets
    run(&ctx, &["alias"])
        .assert_success()
        .assert_stdout_contains("stable [builtin] -> (not set)")
        .assert_stdout_contains("latest [builtin] -> (not set)");

    run(&ctx, &["alias", "dev", "go1.22.0"])
        .assert_success()
        .assert_stdout_contains("dev -> 1.22.0");

    run(&ctx, &["alias", "dev"])
        .assert_success()
        .assert_stdout_contains("dev -> 1.22.0");

    run(&ctx, &["alias", "rm", "dev"]).assert_success();
    run(&ctx, &["alias", "dev"]).assert_failure();
}

#[test]
fn test_alias_rejects_invalid_names() {
    let ctx = TestContext::new();
    run(&ctx, &["alias", "bad/name", "1.22.0"]).assert_failure();
}

#[test]
fn test_alias_switches_like_its_target() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    run(&ctx, &["alias", "work", "1.21.3"]).assert_success();
    run(&ctx, &["use", "work"]).assert_success();
    run(&ctx, &["current"])
        .assert_success()
        .assert_stdout_contains("Current: 1.21.3");
}

#[test]
fn test_config_get_set_round_trip() {
    let ctx = TestContext::new();

    run(&ctx, &["config", "get"])
        .assert_success()
        .assert_stdout_contains("auto_install: true")
        .assert_stdout_contains("inherit_version: false");

    run(&ctx, &["config", "set", "inherit_version", "true"]).assert_success();
    run(&ctx, &["config", "get", "inherit_version"])
        .assert_success()
        .assert_stdout_contains("true");

    run(&ctx, &["config", "set", "default_version", "go1.21.0"]).assert_success();
    run(&ctx, &["config", "get", "default_version"])
        .assert_success()
        .assert_stdout_contains("1.21.0");

    run(&ctx, &["config", "set", "bogus_key", "1"]).assert_failure();
    run(&ctx, &["config", "get", "bogus_key"]).assert_failure();
}

#[test]
fn test_use_from_project_manifest() {
    let ctx = TestContext::new();
    ctx.fake_install("1.21.3");

    // A full three-component version needs no catalog round trip
    let project = ctx.project_dir("module example.com/app\n\ngo 1.21.3\n");

    let output: CommandOutput = ctx
        .cmd()
        .args(["use", "."])
        .current_dir(&project)
        .output()
        .expect("Failed to run gvm")
        .into();
    output
        .assert_success()
        .assert_stdout_contains("Now using Go 1.21.3")
        .assert_stdout_contains("go.mod");

    run(&ctx, &["current"])
        .assert_success()
        .assert_stdout_contains("Current: 1.21.3");
}

#[test]
fn test_auto_is_silent_without_manifest() {
    let ctx = TestContext::new();
    let empty = ctx._temp_dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    let out = run(
        &ctx,
        &["auto", empty.to_str().unwrap()],
    );
    out.assert_success();
    assert!(out.stdout.is_empty(), "auto should print nothing");
}

#[test]
fn test_auto_switches_to_project_version() {
    let ctx = TestContext::new();
    ctx.fake_install("1.20.5");
    ctx.fake_install("1.21.3");

    run(&ctx, &["use", "1.20.5"]).assert_success();

    let project = ctx.project_dir("module example.com/app\ngo 1.21.3\n");
    run(&ctx, &["auto", project.to_str().unwrap()]).assert_success();

    run(&ctx, &["current"])
        .assert_success()
        .assert_stdout_contains("Current: 1.21.3");
}
