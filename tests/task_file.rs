// tests/task_file.rs

use std::fs;
use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use dagrun::cli::CliArgs;
use dagrun::config::{load_and_validate, load_from_path};
use dagrun::engine::Engine;
use dagrun::errors::DagrunError;
use dagrun_test_utils::init_tracing;
use dagrun_test_utils::recording_handler::RecordingHandler;

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn cli(config: &std::path::Path, dry_run: bool) -> CliArgs {
    CliArgs {
        config: config.to_path_buf(),
        log_level: None,
        dry_run,
    }
}

#[test]
fn task_file_becomes_specs_and_commands() {
    let file = write_file(
        r#"
[config]
working_dir = "build"

[task.fetch]
cmd = "git fetch"

[task.build]
cmd = "cargo build"
wait_for = ["fetch"]

[task.docs]
wait_for = ["build"]
skip = true
"#,
    );

    let tasks = load_and_validate(file.path()).unwrap();
    let specs = tasks.specs();

    let ids: Vec<_> = specs.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["build", "docs", "fetch"]);
    assert_eq!(specs[0].wait_for, vec!["fetch"]);
    assert!(specs[1].skip);

    let commands = tasks.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands["build"], "cargo build");
    assert_eq!(
        tasks.config.working_dir.as_deref(),
        Some(std::path::Path::new("build"))
    );
}

#[test]
fn missing_command_is_a_config_error() {
    let file = write_file(
        r#"
[task.a]
wait_for = []
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagrunError::ConfigError(msg)) => assert!(msg.contains("task 'a'")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_file("[task.a\ncmd = 1");
    assert!(matches!(
        load_from_path(file.path()),
        Err(DagrunError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_from_path(dir.path().join("nope.toml")),
        Err(DagrunError::IoError(_))
    ));
}

#[test]
fn graph_errors_surface_when_building_the_engine() {
    let file = write_file(
        r#"
[task.a]
cmd = "true"

[task.b]
cmd = "true"
wait_for = ["a", "c"]
"#,
    );

    let tasks = load_and_validate(file.path()).unwrap();
    let err = Engine::new(RecordingHandler::new(), tasks.specs()).unwrap_err();
    assert!(matches!(err, DagrunError::MissingDependencies(ref ids) if ids == &["c"]));
}

#[tokio::test]
async fn dry_run_validates_without_running() {
    init_tracing();

    let dir = tempdir().unwrap();
    let config = dir.path().join("Dagrun.toml");
    fs::write(
        &config,
        r#"
[task.a]
cmd = "touch ran-a"

[task.b]
cmd = "touch ran-b"
wait_for = ["a"]
"#,
    )
    .unwrap();

    dagrun::run(cli(&config, true)).await.unwrap();
    assert!(!dir.path().join("ran-a").exists());
}

#[tokio::test]
async fn dry_run_rejects_cycles() {
    init_tracing();

    let dir = tempdir().unwrap();
    let config = dir.path().join("Dagrun.toml");
    fs::write(
        &config,
        r#"
[task.root]
cmd = "true"

[task.x]
cmd = "true"
wait_for = ["y"]

[task.y]
cmd = "true"
wait_for = ["x"]
"#,
    )
    .unwrap();

    let err = dagrun::run(cli(&config, true)).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagrunError>(),
        Some(DagrunError::DagCycle(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn shell_tasks_run_in_dependency_order() {
    init_tracing();

    let dir = tempdir().unwrap();
    let config = dir.path().join("Dagrun.toml");
    fs::write(
        &config,
        r#"
[task.first]
cmd = "echo first >> order.txt"

[task.second]
cmd = "sleep 0.05 && echo second >> order.txt"
wait_for = ["first"]

[task.third]
cmd = "echo third >> order.txt"
wait_for = ["second"]

[task.skipped]
cmd = "echo skipped >> order.txt"
skip = true
"#,
    )
    .unwrap();

    dagrun::run(cli(&config, false)).await.unwrap();

    let order = fs::read_to_string(dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "first\nsecond\nthird\n");
}

#[cfg(unix)]
#[tokio::test]
async fn failing_shell_task_fails_the_run() {
    init_tracing();

    let dir = tempdir().unwrap();
    let config = dir.path().join("Dagrun.toml");
    fs::write(
        &config,
        r#"
[task.bad]
cmd = "exit 3"

[task.after]
cmd = "touch after-ran"
wait_for = ["bad"]
"#,
    )
    .unwrap();

    let err = dagrun::run(cli(&config, false)).await.unwrap_err();
    let err = err.downcast_ref::<DagrunError>().expect("DagrunError");

    assert_eq!(err.task(), Some("bad"));
    assert!(err.to_string().contains("exited with code 3"));
    assert!(!dir.path().join("after-ran").exists());
}
