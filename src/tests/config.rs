use crate::c_parser::Language;
use crate::cli::Options;
use crate::config::{Config, PartialConfig, TypeMapEntry};
use crate::errors::ErrorKind;
use crate::file_utils::{save_to_file, PathBufWithAdded};
use clap::Parser;
use std::path::PathBuf;

const CONFIG_FILE: &str = r#"
header = "include/lib.h"
output = "/tmp/bindings/Lib.bf"
library = "lib.dll"
namespace = "Vendor.Lib"
include_dirs = ["include"]
clang_args = ["-DLIB_STATIC"]
language = "c++"
std = "c++17"

[[type_map]]
pattern = "HANDLE"
replacement = "void*"

[[type_map]]
pattern = "BOOL"
replacement = "c_int"
"#;

#[test]
fn load_file() {
  let dir = tempdir::TempDir::new("test_config").unwrap();
  let path = dir.path().with_added("bindgen.toml");
  save_to_file(&path, CONFIG_FILE).unwrap();
  let partial = PartialConfig::load(&path).unwrap();
  assert_eq!(
    partial.header,
    Some(dir.path().with_added("include").with_added("lib.h"))
  );
  assert_eq!(partial.output, Some(PathBuf::from("/tmp/bindings/Lib.bf")));
  assert_eq!(partial.include_dirs, vec![dir.path().with_added("include")]);
  assert_eq!(partial.language, Some(Language::Cpp));
  assert_eq!(partial.skip_system_headers, None);

  let config = Config::from_partial(partial).unwrap();
  assert_eq!(config.library_name, "lib.dll");
  assert_eq!(config.namespace, "Vendor.Lib");
  assert_eq!(config.standard, Some("c++17".to_string()));
  assert!(config.skip_system_headers);
  assert_eq!(
    config.type_map_rules(),
    vec![
      ("HANDLE".to_string(), "void*".to_string()),
      ("BOOL".to_string(), "c_int".to_string()),
    ]
  );
  let options = config.generator_options();
  assert_eq!(options.wrapper_class_name(), "LibAPI");
}

#[test]
fn unknown_field() {
  let dir = tempdir::TempDir::new("test_config").unwrap();
  let path = dir.path().with_added("bindgen.toml");
  save_to_file(&path, "header = \"a.h\"\nheaders = \"b.h\"\n").unwrap();
  assert!(PartialConfig::load(&path).is_err());
}

#[test]
fn merge() {
  let file = PartialConfig {
    header: Some("a.h".into()),
    namespace: Some("File".to_string()),
    include_dirs: vec!["include".into()],
    type_map: vec![TypeMapEntry {
      pattern: "HANDLE".to_string(),
      replacement: "void*".to_string(),
    }],
    ..PartialConfig::default()
  };
  let command_line = PartialConfig {
    namespace: Some("CommandLine".to_string()),
    output: Some("out.bf".into()),
    include_dirs: vec!["extra".into()],
    ..PartialConfig::default()
  };
  let merged = file.merge(command_line);
  assert_eq!(merged.header, Some(PathBuf::from("a.h")));
  assert_eq!(merged.output, Some(PathBuf::from("out.bf")));
  assert_eq!(merged.namespace, Some("CommandLine".to_string()));
  assert_eq!(
    merged.include_dirs,
    vec![PathBuf::from("include"), PathBuf::from("extra")]
  );
  assert_eq!(merged.type_map.len(), 1);
}

#[test]
fn missing_values() {
  let partial = PartialConfig {
    header: Some("a.h".into()),
    output: Some("out.bf".into()),
    library: Some("a.dll".to_string()),
    ..PartialConfig::default()
  };
  let err = Config::from_partial(partial).unwrap_err();
  match *err.kind() {
    ErrorKind::InvalidConfig(ref message) => assert!(message.contains("namespace")),
    ref kind => panic!("unexpected error: {:?}", kind),
  }
}

#[test]
fn command_line() {
  let options = Options::try_parse_from(&[
    "beef_bindgen",
    "--header",
    "lib.h",
    "-o",
    "out/Lib.bf",
    "--library",
    "lib.dll",
    "--namespace",
    "Lib",
    "-I",
    "include",
    "--clang-arg",
    "-DLIB_STATIC",
    "--language",
    "c++",
  ])
  .unwrap();
  let config = options.config().unwrap();
  assert_eq!(config.header_path, PathBuf::from("lib.h"));
  assert_eq!(config.output_path, PathBuf::from("out/Lib.bf"));
  assert_eq!(config.library_name, "lib.dll");
  assert_eq!(config.namespace, "Lib");
  assert_eq!(config.include_dirs, vec![PathBuf::from("include")]);
  assert_eq!(config.clang_arguments, vec!["-DLIB_STATIC".to_string()]);
  assert_eq!(config.language, Language::Cpp);
  assert_eq!(config.standard, None);

  let incomplete = Options::try_parse_from(&["beef_bindgen", "--header", "lib.h"]).unwrap();
  assert!(incomplete.config().is_err());
}
