//! Tests for command dispatch: edit in place, --dry-run and --check

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tempfile::TempDir;

use socedit::cli::commands::execute_command;
use socedit::cli::Cli;
use socedit::exitcode;

const SOCIETY: &str = r#"<?xml version="1.0"?>
<society name="s">
  <host name="h">
    <node name="n">
      <vm_parameter>-Dorg.cougaar.experiment.id=42</vm_parameter>
      <agent name="a">
        <component class="org.cougaar.core.topology.TopologyReaderServlet"/>
      </agent>
    </node>
  </host>
</society>
"#;

fn create_society_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("society.xml");
    fs::write(&path, SOCIETY).expect("write society file");
    path
}

fn run(args: &[&str]) -> Result<(), socedit::cli::CliError> {
    let cli = Cli::try_parse_from(std::iter::once("socedit").chain(args.iter().copied()))
        .expect("parse args");
    execute_command(&cli)
}

#[test]
fn given_society_file_when_running_then_file_rewritten() {
    let temp = TempDir::new().unwrap();
    let path = create_society_file(&temp);

    run(&[path.to_str().unwrap()]).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("experiment.id"));
    assert!(!written.contains("TopologyReaderServlet"));
    assert!(written.contains("-Dorg.cougaar.core.node.InitializationComponent=XML"));
}

#[test]
fn given_dry_run_when_running_then_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = create_society_file(&temp);

    run(&["--dry-run", path.to_str().unwrap()]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), SOCIETY);
}

#[test]
fn given_check_when_running_then_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = create_society_file(&temp);

    run(&["--check", "--display", "localhost", path.to_str().unwrap()]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), SOCIETY);
}

#[test]
fn given_missing_file_when_running_then_noinput() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.xml");

    let err = run(&[path.to_str().unwrap()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_missing_config_file_when_running_then_config_exit_code() {
    let temp = TempDir::new().unwrap();
    let path = create_society_file(&temp);
    let config = temp.path().join("nope.toml");

    let err = run(&["--config", config.to_str().unwrap(), path.to_str().unwrap()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
    assert_eq!(fs::read_to_string(&path).unwrap(), SOCIETY);
}
