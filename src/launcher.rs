//! Complete generation run: parse, collect, emit, write.

use crate::beef_code_generator;
use crate::c_parser;
use crate::config::Config;
use crate::errors::Result;
use crate::file_utils::save_to_file;
use crate::naming::TypeMap;
use log::info;

/// Runs the generator with `config`. The output file is written only
/// if every step succeeds.
pub fn run(config: &Config) -> Result<()> {
  info!("Header: {}", config.header_path.display());
  info!("Output: {}", config.output_path.display());
  let type_map = TypeMap::with_extra_rules(&config.type_map_rules())?;
  let ast = c_parser::parse(&config.parser_config())?;
  let options = config.generator_options();
  let text = beef_code_generator::generate(&ast, &options, &type_map)?;
  save_to_file(&config.output_path, &text)?;
  info!(
    "{} enums, {} structs, {} functions, {} type aliases",
    ast.enums().count(),
    ast.structs().count(),
    ast.functions().count(),
    ast.type_aliases().count()
  );
  info!("Completed successfully!");
  Ok(())
}
