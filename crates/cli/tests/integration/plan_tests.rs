//! Plan command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_lists_queued_files() {
  let env = TestEnv::with_medium();

  env
    .setupkit_cmd("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("ntoskrnl.exe"))
    .stdout(predicate::str::contains("halacpi.dll"))
    .stdout(predicate::str::contains("3 file(s) queued"));
}

#[test]
fn plan_copies_nothing() {
  let env = TestEnv::with_medium();

  env.setupkit_cmd("plan").assert().success();

  assert!(!env.installed("system32/ntoskrnl.exe").exists());
  // directories are created while planning
  assert!(env.installed("system32/drivers").is_dir());
}

#[test]
fn plan_json_output() {
  let env = TestEnv::with_medium();

  let output = env.setupkit_cmd("plan").arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let copies = json["copies"].as_array().unwrap();
  let names: Vec<_> = copies.iter().map(|c| c["source_file_name"].as_str().unwrap()).collect();
  assert_eq!(names, ["ntoskrnl.exe", "hal.dll", "disk.sys"]);
  assert_eq!(copies[1]["destination_file_name"], "halacpi.dll");
  assert_eq!(json["report"]["overlay"]["present"], false);
}

#[test]
fn plan_from_session_file() {
  let env = TestEnv::with_medium();
  let session = env.write_session();

  TestEnv::bare_cmd()
    .arg("plan")
    .arg("--session")
    .arg(&session)
    .assert()
    .success()
    .stdout(predicate::str::contains("3 file(s) queued"));
}

#[test]
fn plan_flags_override_session_file() {
  let env = TestEnv::with_medium();
  let session = env.write_session();
  env.write_file("other/txtsetup.sif", "[Directories]\n1 = \\\n\n[SourceDisksFiles]\n");

  TestEnv::bare_cmd()
    .arg("plan")
    .arg("--session")
    .arg(&session)
    .arg("--inf")
    .arg(env.root().join("other").join("txtsetup.sif"))
    .assert()
    .success()
    .stdout(predicate::str::contains("0 file(s) queued"));
}

#[test]
fn plan_includes_overlay_files() {
  let env = TestEnv::with_medium();
  env.write_file("cd/$OEM$/$$/system32/extra.dll", "extra");
  env.write_file("cd/$OEM$/$1/boot.ini", "boot");

  env
    .setupkit_cmd("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("extra.dll"))
    .stdout(predicate::str::contains("boot.ini"))
    .stdout(predicate::str::contains("Overlay files: 2"))
    .stdout(predicate::str::contains("5 file(s) queued"));
}

#[test]
fn plan_fails_without_manifest() {
  let env = TestEnv::empty();

  env
    .setupkit_cmd("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load setup manifest"));
}

#[test]
fn plan_fails_without_source_disks_files() {
  let env = TestEnv::empty();
  env.write_file("cd/reactos/txtsetup.sif", "[Directories]\n1 = \\\n");

  env
    .setupkit_cmd("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("SourceDisksFiles"));
}

#[test]
fn plan_fails_without_destination() {
  let env = TestEnv::with_medium();

  TestEnv::bare_cmd()
    .arg("plan")
    .arg("--inf")
    .arg(env.manifest_path())
    .arg("--source-root")
    .arg(env.source_root())
    .assert()
    .failure()
    .stderr(predicate::str::contains("destination_root_path"));
}
