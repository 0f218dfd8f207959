use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, location: &str, content: &str) {
    let path = root.join(location.trim_start_matches('/'));
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create config directory");
    fs::write(path, content).expect("Failed to write config file");
}

fn sysctx() -> Command {
    let mut cmd = Command::cargo_bin("sysctx").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_show_config_merges_default_locations() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "test=a\n");
    write(dir.path(), "/WEB-INF/sysconfig.dev.cfg", "test=b\nxyz=1\n");

    sysctx()
        .arg("show-config")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::eq("test=a\nxyz=1\n"));
}

#[test]
fn test_show_config_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/cfg/app.cfg", "name=shop\nport=8080\n");

    let output = sysctx()
        .args(["show-config", "--json", "--param", "systemConfigLocation=/cfg/app.cfg"])
        .arg("--root")
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "shop");
    assert_eq!(value["port"], "8080");
}

#[test]
fn test_check_reports_sources_and_controller() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=v\n");

    sysctx()
        .arg("check")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration sources: 1"))
        .stdout(predicate::str::contains("Controller: sysctx_runtime::controller::default::DefaultController"))
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_check_fails_on_broken_config() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=\\u12\n");

    sysctx()
        .arg("check")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to start system context"))
        .stderr(predicate::str::contains("could not be loaded"))
        .stderr(predicate::str::contains("Syntax error on line 1"));
}

#[test]
fn test_check_fails_on_unknown_controller() {
    let dir = TempDir::new().unwrap();

    sysctx()
        .args(["check", "--param", "systemControllerClass=com.example.Missing"])
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("com.example.Missing"));
}

#[test]
fn test_get_value_and_missing_key() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "greeting=hello world\n");

    sysctx()
        .args(["get", "greeting", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout("hello world\n");

    sysctx()
        .args(["get", "missing", "--root"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Key not found: missing"));
}

#[test]
fn test_descriptor_supplies_root_and_params() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/webapp/conf/main.cfg", "source=descriptor\n");
    let descriptor = dir.path().join("host.toml");
    fs::write(
        &descriptor,
        "name = \"shop\"\ndocument-root = \"webapp\"\n\n[init-params]\nsystemConfigLocation = \"/conf/main.cfg\"\n",
    )
    .unwrap();

    sysctx()
        .args(["get", "source", "--descriptor"])
        .arg(&descriptor)
        .assert()
        .success()
        .stdout("descriptor\n");
}

#[test]
fn test_invalid_param_is_rejected() {
    sysctx()
        .args(["check", "--param", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}
