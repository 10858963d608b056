#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::Command,
};

use tempfile::TempDir;
use test_log::test;
use wasm_fixtures::{run_batch, CompilerConfig, Fixture, Manifest, ProcessInvoker};

const STEMS: [&str; 5] = ["abi_classes", "abi_types", "crypto", "ipfs_map", "store"];

/// Writes a stand-in compiler that logs each source it is given, copies it to the `-b` output,
/// and exits with 42 when asked to compile `failing`.
fn fake_compiler(dir: &Path, failing: Option<&str>) -> PathBuf {
    let failing = failing.map(|stem| format!("{stem}.ts")).unwrap_or_default();
    let script = format!(
        r#"#!/bin/sh
src="$1"
out=""
while [ $# -gt 0 ]; do
    if [ "$1" = "-b" ]; then out="$2"; fi
    shift
done
echo "$src" >> invocations.log
if [ "$src" = "{failing}" ]; then exit 42; fi
cp "$src" "$out"
"#
    );
    let path = dir.join("fake-asc");
    write_script(&path, &script);
    path
}

fn write_script(path: &Path, script: &str) {
    fs::write(path, script).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn fixture_dir(failing: Option<&str>) -> (TempDir, Manifest) {
    let dir = tempfile::tempdir().unwrap();
    for stem in STEMS {
        fs::write(dir.path().join(format!("{stem}.ts")), stem).unwrap();
    }
    let compiler = CompilerConfig { program: fake_compiler(dir.path(), failing), ..Default::default() };
    let fixtures = STEMS.iter().map(|stem| Fixture::from_stem(stem)).collect();
    (dir, Manifest { compiler, fixtures })
}

fn invocations(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("invocations.log"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn all_fixtures_produce_artifacts() {
    let (dir, manifest) = fixture_dir(None);
    let report = run_batch(&manifest, dir.path(), &mut ProcessInvoker).unwrap();

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.completed.len(), STEMS.len());
    for stem in STEMS {
        assert_eq!(fs::read_to_string(dir.path().join(format!("{stem}.wasm"))).unwrap(), stem);
    }
}

#[test]
fn failing_fixture_stops_later_invocations() {
    let (dir, manifest) = fixture_dir(Some("crypto"));
    let report = run_batch(&manifest, dir.path(), &mut ProcessInvoker).unwrap();

    assert_eq!(report.exit_code(), 42);
    assert_eq!(report.failure.as_ref().unwrap().index, 2);
    assert_eq!(invocations(dir.path()), vec!["abi_classes.ts", "abi_types.ts", "crypto.ts"]);
    assert!(dir.path().join("abi_types.wasm").exists());
    assert!(!dir.path().join("crypto.wasm").exists());
    assert!(!dir.path().join("ipfs_map.wasm").exists());
}

#[test]
fn missing_compiler_cannot_start() {
    let (dir, mut manifest) = fixture_dir(None);
    manifest.compiler.program = dir.path().join("no-such-compiler");
    let err = run_batch(&manifest, dir.path(), &mut ProcessInvoker).unwrap_err();
    assert_eq!(err.exit_code(), 127);
    assert!(invocations(dir.path()).is_empty());
}

#[test]
fn binary_exits_with_the_failing_compiler_code() {
    let (dir, manifest) = fixture_dir(Some("abi_types"));
    let manifest_path = dir.path().join("fixtures.yaml");
    fs::write(&manifest_path, serde_yaml::to_string(&manifest).unwrap()).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_build-wasm-fixtures"))
        .arg("--dir")
        .arg(dir.path())
        .arg("--manifest")
        .arg(&manifest_path)
        .env_remove("ASC_BIN")
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(42));
    assert_eq!(invocations(dir.path()), vec!["abi_classes.ts", "abi_types.ts"]);
}

#[test]
fn compiler_killed_by_signal_exits_like_a_shell() {
    let (dir, mut manifest) = fixture_dir(None);
    let program = dir.path().join("killed-asc");
    write_script(&program, "#!/bin/sh\necho \"$1\" >> invocations.log\nkill -9 $$\n");
    manifest.compiler.program = program;

    let report = run_batch(&manifest, dir.path(), &mut ProcessInvoker).unwrap();
    assert_eq!(report.exit_code(), 128 + 9);
    assert_eq!(report.failure.unwrap().index, 0);
    assert_eq!(invocations(dir.path()), vec!["abi_classes.ts"]);
}

#[test]
fn list_prints_invocations_without_running_them() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_build-wasm-fixtures"))
        .arg("--dir")
        .arg(dir.path())
        .arg("--list")
        .env("ASC_BIN", "/opt/asc/bin/asc")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 18);
    assert_eq!(
        lines[0],
        "/opt/asc/bin/asc abi_classes.ts --exportRuntime --runtime stub -b abi_classes.wasm"
    );
    assert_eq!(lines[17], "/opt/asc/bin/asc test_padding.ts --exportRuntime --runtime stub -b test_padding.wasm");
    assert!(invocations(dir.path()).is_empty());
}

#[test]
fn asc_bin_overrides_the_manifest_compiler() {
    let (dir, mut manifest) = fixture_dir(None);
    let compiler = manifest.compiler.program.clone();
    manifest.compiler.program = dir.path().join("no-such-compiler");
    let manifest_path = dir.path().join("fixtures.yaml");
    fs::write(&manifest_path, serde_yaml::to_string(&manifest).unwrap()).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_build-wasm-fixtures"))
        .arg("--dir")
        .arg(dir.path())
        .arg("--manifest")
        .arg(&manifest_path)
        .env("ASC_BIN", &compiler)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
    assert_eq!(invocations(dir.path()).len(), STEMS.len());
    assert!(dir.path().join("store.wasm").exists());
}

#[test]
fn binary_exits_127_when_the_compiler_is_missing() {
    let (dir, _) = fixture_dir(None);
    let status = Command::new(env!("CARGO_BIN_EXE_build-wasm-fixtures"))
        .arg("--dir")
        .arg(dir.path())
        .arg("--compiler")
        .arg(dir.path().join("no-such-compiler"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(127));
}
