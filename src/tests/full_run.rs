use crate::config::Config;
use crate::errors::{ErrorKind, Result};
use crate::file_utils::{file_to_string, save_to_file, PathBufWithAdded};
use crate::launcher;
use std::path::PathBuf;

fn demo_header_path() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .with_added("test_assets")
    .with_added("demo")
    .with_added("demo.h")
}

/// Runs the launcher. Returns `None` if libclang can't be loaded.
fn run_launcher(config: &Config) -> Option<Result<()>> {
  match launcher::run(config) {
    Err(err) => {
      if let ErrorKind::ClangInitFailed(ref message) = *err.kind() {
        println!("libclang is not available, skipping: {}", message);
        return None;
      }
      Some(Err(err))
    }
    Ok(()) => Some(Ok(())),
  }
}

const POINT_HEADER: &str = "typedef struct { int a; unsigned char b; } Point;
int add(int x, int y);
";

const POINT_BINDINGS: &str = "using System;
using System.Interop;

namespace Demo;

public class DemoAPI
{
\t[CLink, Import(\"demo.dll\")]
\tpublic static extern int32 Add(int32 x, int32 y);

[CRepr]
public struct Point
{
\tpublic int32 A;

\tpublic uint8 B;

\tpublic this(int32 a, uint8 b)
\t{
\t\tthis.A = a;
\t\tthis.B = b;
\t}
}

}
";

#[test]
fn point_header() {
  let dir = tempdir::TempDir::new("test_full_run").unwrap();
  let header_path = dir.path().with_added("point.h");
  save_to_file(&header_path, POINT_HEADER).unwrap();
  let output_path = dir.path().with_added("out").with_added("Demo.bf");
  let config = Config::new(&header_path, &output_path, "demo.dll", "Demo");
  match run_launcher(&config) {
    None => return,
    Some(result) => result.unwrap(),
  }
  assert_eq!(file_to_string(&output_path).unwrap(), POINT_BINDINGS);

  // a failed stage leaves no output behind
  let bad_output_path = dir.path().with_added("bad").with_added("Demo.bf");
  let bad_config = Config::new(&header_path, &bad_output_path, "demo.dll", "Not a namespace");
  let err = launcher::run(&bad_config).unwrap_err();
  match *err.kind() {
    ErrorKind::StageFailed(ref stage) => assert_eq!(stage, "usings"),
    ref kind => panic!("unexpected error: {:?}", kind),
  }
  assert!(!bad_output_path.exists());
}

#[test]
fn demo_header() {
  let dir = tempdir::TempDir::new("test_full_run").unwrap();
  let output_path = dir.path().with_added("Demo.bf");
  let mut config = Config::new(demo_header_path(), &output_path, "demo", "Vendor.Demo");
  config.type_map.push(crate::config::TypeMapEntry {
    pattern: "demo_flags".to_string(),
    replacement: "DemoFlags".to_string(),
  });
  match run_launcher(&config) {
    None => return,
    Some(result) => result.unwrap(),
  }
  let text = file_to_string(&output_path).unwrap();
  let expected_lines = [
    "namespace Vendor.Demo;",
    "public class DemoAPI",
    "\t[CLink, Import(\"demo\")]",
    "\tpublic static extern demo_status DemoOpen(demo_device** device, char8* name);",
    "\tpublic static extern void DemoClose(demo_device* device);",
    "\tpublic static extern int32 DemoAdd(int32 x, int32 y);",
    "\tpublic static extern void DemoSetLogger(demo_device* device, DemoLogFn logger);",
    "\tpublic static extern int32 DemoPrintf(char8* format, ...);",
    "\tpublic enum demo_status : c_int",
    "\t\tcase DEMO_ERROR = -1;",
    "public struct demo_point",
    "\tpublic this(int32 x, int32 y)",
    "public struct demo_device",
    "\tpublic demo_point Origin;",
    "\tpublic uint16 Flags;",
    "\tpublic OnEventFn OnEvent;",
    "\tpublic DemoLogFn Logger;",
    "\tpublic char8[16] Name;",
    "public function void DemoLogFn(int32 level, char8* message);",
    "public function void OnEventFn(int32 code, void* userData);",
  ];
  let lines: Vec<_> = text.lines().collect();
  for expected in &expected_lines {
    assert!(
      lines.contains(expected),
      "missing line {:?} in output:\n{}",
      expected,
      text
    );
  }
  assert!(!text.contains("typealias demo_point"));
  assert!(!text.contains("typealias demo_flags"));
  assert_eq!(text.matches("public struct demo_device").count(), 1);
}

#[test]
fn missing_header() {
  let dir = tempdir::TempDir::new("test_full_run").unwrap();
  let output_path = dir.path().with_added("out").with_added("Demo.bf");
  let config = Config::new(dir.path().with_added("missing.h"), &output_path, "demo.dll", "Demo");
  let err = launcher::run(&config).unwrap_err();
  match *err.kind() {
    ErrorKind::HeaderNotFound(_) => {}
    ref kind => panic!("unexpected error: {:?}", kind),
  }
  assert!(!output_path.exists());
}
