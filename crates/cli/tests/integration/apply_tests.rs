//! Apply command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn apply_copies_manifest_files() {
  let env = TestEnv::with_medium();

  env
    .setupkit_cmd("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Apply complete"));

  assert_eq!(env.read_file("hd/ReactOS/system32/ntoskrnl.exe"), "kernel");
  assert_eq!(env.read_file("hd/ReactOS/system32/halacpi.dll"), "hal");
  assert_eq!(env.read_file("hd/ReactOS/system32/drivers/disk.sys"), "disk");
  assert!(!env.installed("system32/hal.dll").exists());
}

#[test]
fn apply_is_repeatable() {
  let env = TestEnv::with_medium();

  env.setupkit_cmd("apply").assert().success();
  env
    .setupkit_cmd("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Copied: 3"));
}

#[test]
fn apply_overlay_replaces_manifest_file() {
  let env = TestEnv::with_medium();
  env.write_file("cd/$OEM$/$$/system32/ntoskrnl.exe", "patched");
  env.write_file("cd/$OEM$/$1/boot.ini", "boot");

  env.setupkit_cmd("apply").assert().success();

  assert_eq!(env.read_file("hd/ReactOS/system32/ntoskrnl.exe"), "patched");
  assert_eq!(env.read_file("hd/boot.ini"), "boot");
}

#[test]
fn apply_reports_missing_source_file() {
  let env = TestEnv::with_medium();
  std::fs::remove_file(env.temp.path().join("cd/reactos/disk.sys")).unwrap();

  env
    .setupkit_cmd("apply")
    .assert()
    .failure()
    .stderr(predicate::str::contains("1 of 3 file(s) failed to copy"));

  // the remaining copies still ran
  assert_eq!(env.read_file("hd/ReactOS/system32/ntoskrnl.exe"), "kernel");
}

#[test]
fn apply_json_summary() {
  let env = TestEnv::with_medium();

  let output = env.setupkit_cmd("apply").arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["summary"]["copied"], 3);
  assert_eq!(json["summary"]["failed"], 0);
  assert_eq!(json["summary"]["bytes"], 13);
  assert!(json["failures"].as_array().unwrap().is_empty());
}
