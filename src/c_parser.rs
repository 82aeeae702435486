//! C header front-end based on libclang.
//!
//! The header is parsed once. Declarations are grouped into translation
//! units by the file they were written in, and all types are interned in
//! the `TypeArena` of the resulting `Ast`.

use crate::c_ast::{
  Ast, BuiltinType, CType, Declaration, Diagnostic, EnumDecl, EnumItem, FunctionDecl,
  FunctionSignature, Parameter, Severity, StructDecl, StructField, TagKind, TranslationUnit,
  TypeAliasDecl, TypeArena, TypeId,
};
use crate::errors::{Error, ErrorKind, Result, ResultExt};
use crate::file_utils::path_to_str;
use clang::diagnostic::Severity as ClangSeverity;
use clang::{Clang, Entity, EntityKind, Index, Type, TypeKind};
use indexmap::IndexMap;
use log::{debug, info, trace};
use serde_derive::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Source language the header is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum Language {
  #[serde(rename = "c")]
  #[value(name = "c")]
  C,
  #[serde(rename = "c++")]
  #[value(name = "c++")]
  Cpp,
}

impl Default for Language {
  fn default() -> Self {
    Language::C
  }
}

impl Language {
  fn clang_name(self) -> &'static str {
    match self {
      Language::C => "c",
      Language::Cpp => "c++",
    }
  }

  fn default_standard(self) -> &'static str {
    match self {
      Language::C => "gnu11",
      Language::Cpp => "gnu++20",
    }
  }
}

/// Input of the front-end.
#[derive(Debug, Clone)]
pub struct ParserConfig {
  /// Header to parse
  pub header_path: PathBuf,
  /// Directories passed to clang via `-I`
  pub include_dirs: Vec<PathBuf>,
  pub language: Language,
  /// Language standard. Defaults to `gnu11` for C and `gnu++20` for C++.
  pub standard: Option<String>,
  /// Extra arguments passed to clang after all others
  pub arguments: Vec<String>,
  /// Ignore declarations coming from system headers
  pub skip_system_headers: bool,
}

impl ParserConfig {
  pub fn new<P: Into<PathBuf>>(header_path: P) -> Self {
    ParserConfig {
      header_path: header_path.into(),
      include_dirs: Vec::new(),
      language: Language::default(),
      standard: None,
      arguments: Vec::new(),
      skip_system_headers: true,
    }
  }

  /// Builds the command line arguments for clang.
  pub fn clang_arguments(&self) -> Result<Vec<String>> {
    let standard = self
      .standard
      .as_ref()
      .map(|s| s.as_str())
      .unwrap_or_else(|| self.language.default_standard());
    let mut args = vec![
      "-x".to_string(),
      self.language.clang_name().to_string(),
      format!("-std={}", standard),
    ];
    for dir in &self.include_dirs {
      args.push("-I".to_string());
      args.push(path_to_str(dir)?.to_string());
    }
    args.extend(self.arguments.iter().cloned());
    Ok(args)
  }
}

#[cfg(test)]
/// Creates a `Clang` context. Tests may run in parallel and only one
/// context can exist at a time, so this waits for the other one to go away.
fn init_clang() -> Result<Clang> {
  for _ in 0..600 {
    match Clang::new() {
      Ok(clang) => return Ok(clang),
      Err(err) => {
        if !err.contains("already exists") {
          return Err(ErrorKind::ClangInitFailed(err).into());
        }
      }
    }
    std::thread::sleep(std::time::Duration::from_millis(100));
  }
  Clang::new().map_err(|err| Error::from(ErrorKind::ClangInitFailed(err)))
}

#[cfg(not(test))]
/// Creates a `Clang` context.
fn init_clang() -> Result<Clang> {
  Clang::new().map_err(|err| Error::from(ErrorKind::ClangInitFailed(err)))
}

fn convert_diagnostic(diagnostic: &clang::diagnostic::Diagnostic) -> Diagnostic {
  let (file_name, line, column) = diagnostic.get_location().get_presumed_location();
  let severity = match diagnostic.get_severity() {
    ClangSeverity::Ignored => Severity::Ignored,
    ClangSeverity::Note => Severity::Note,
    ClangSeverity::Warning => Severity::Warning,
    ClangSeverity::Error => Severity::Error,
    ClangSeverity::Fatal => Severity::Fatal,
  };
  Diagnostic {
    file_name,
    line,
    column,
    severity,
    message: diagnostic.get_text(),
  }
}

/// Parses the header described by `config`.
///
/// Fails with `HeaderNotFound` before clang is started if the header
/// doesn't exist, and with `ParseFailed` if clang reports any error.
pub fn parse(config: &ParserConfig) -> Result<Ast> {
  if !config.header_path.is_file() {
    return Err(ErrorKind::HeaderNotFound(config.header_path.display().to_string()).into());
  }
  let args = config.clang_arguments()?;
  debug!("clang arguments: {:?}", args);
  info!("Parsing header: {}", config.header_path.display());
  let clang = init_clang()?;
  let index = Index::new(&clang, false, false);
  let tu = index
    .parser(&config.header_path)
    .arguments(&args)
    .skip_function_bodies(true)
    .parse()
    .chain_err(|| format!("clang parse failed: {}", config.header_path.display()))?;

  let diagnostics: Vec<Diagnostic> = tu
    .get_diagnostics()
    .iter()
    .map(convert_diagnostic)
    .collect();
  // errors are reported along with the returned error
  for diagnostic in diagnostics.iter().filter(|d| !d.severity.is_error()) {
    crate::log::diagnostic(diagnostic);
  }
  if diagnostics.iter().any(|d| d.severity.is_error()) {
    return Err(
      ErrorKind::ParseFailed(config.header_path.display().to_string(), diagnostics).into(),
    );
  }

  let mut parser = CParser::new(config.skip_system_headers);
  parser.parse_translation_unit(tu.get_entity());
  let ast = parser.into_ast();
  info!(
    "Parsed {} declarations in {} files ({} types)",
    ast.declarations().count(),
    ast.units.len(),
    ast.types.len()
  );
  Ok(ast)
}

/// Presumed location of a declaration: file, line and column.
type LocationKey = (String, u32, u32);

fn location_key(entity: Entity) -> Option<LocationKey> {
  entity.get_location().map(|l| l.get_presumed_location())
}

/// Name of the entity, or `None` for anonymous structs and enums.
fn entity_name(entity: Entity) -> Option<String> {
  entity
    .get_name()
    .filter(|name| !name.is_empty() && !name.contains("(unnamed") && !name.contains("(anonymous"))
}

fn strip_elaborated(mut clang_type: Type) -> Type {
  while clang_type.get_kind() == TypeKind::Elaborated {
    match clang_type.get_elaborated_type() {
      Some(inner) => clang_type = inner,
      None => break,
    }
  }
  clang_type
}

/// Declaration of the struct, union or enum `clang_type` refers to.
fn tag_declaration(clang_type: Type) -> Option<Entity> {
  let clang_type = strip_elaborated(clang_type);
  match clang_type.get_kind() {
    TypeKind::Record | TypeKind::Enum => clang_type.get_declaration(),
    _ => None,
  }
}

/// Names of the parameters declared inside a function pointer
/// declaration, in order.
fn parameter_names(entity: Entity) -> Vec<String> {
  entity
    .get_children()
    .into_iter()
    .filter(|c| c.get_kind() == EntityKind::ParmDecl)
    .map(|c| c.get_name().unwrap_or_default())
    .collect()
}

/// Returns true for C++ operator functions like `operator+`.
fn is_operator_name(name: &str) -> bool {
  match name.strip_prefix("operator") {
    Some(rest) => match rest.chars().next() {
      Some(c) => !(c.is_alphanumeric() || c == '_'),
      None => false,
    },
    None => false,
  }
}

fn builtin_type(kind: TypeKind) -> Option<BuiltinType> {
  Some(match kind {
    TypeKind::Void => BuiltinType::Void,
    TypeKind::Bool => BuiltinType::Bool,
    TypeKind::CharS | TypeKind::CharU => BuiltinType::Char,
    TypeKind::SChar => BuiltinType::SChar,
    TypeKind::UChar => BuiltinType::UChar,
    TypeKind::WChar => BuiltinType::WChar,
    TypeKind::Char16 => BuiltinType::Char16,
    TypeKind::Char32 => BuiltinType::Char32,
    TypeKind::Short => BuiltinType::Short,
    TypeKind::UShort => BuiltinType::UShort,
    TypeKind::Int => BuiltinType::Int,
    TypeKind::UInt => BuiltinType::UInt,
    TypeKind::Long => BuiltinType::Long,
    TypeKind::ULong => BuiltinType::ULong,
    TypeKind::LongLong => BuiltinType::LongLong,
    TypeKind::ULongLong => BuiltinType::ULongLong,
    TypeKind::Float => BuiltinType::Float,
    TypeKind::Double => BuiltinType::Double,
    TypeKind::LongDouble => BuiltinType::LongDouble,
    _ => return None,
  })
}

/// Walks the clang entity tree and builds the `Ast`.
struct CParser {
  skip_system_headers: bool,
  types: TypeArena,
  units: IndexMap<String, TranslationUnit>,
  /// Typedef nodes by typedef name. A node is registered before its
  /// target is converted, so self-referencing typedefs terminate.
  typedefs: HashMap<String, TypeId>,
  /// Names given to anonymous structs and enums by a typedef,
  /// keyed by the location of the anonymous declaration.
  typedef_names: HashMap<LocationKey, String>,
  seen_functions: HashSet<String>,
}

impl CParser {
  fn new(skip_system_headers: bool) -> Self {
    CParser {
      skip_system_headers,
      types: TypeArena::new(),
      units: IndexMap::new(),
      typedefs: HashMap::new(),
      typedef_names: HashMap::new(),
      seen_functions: HashSet::new(),
    }
  }

  fn into_ast(self) -> Ast {
    Ast {
      types: self.types,
      units: self.units.into_iter().map(|(_, unit)| unit).collect(),
    }
  }

  fn parse_translation_unit(&mut self, root: Entity) {
    self.find_typedef_names(root);
    self.parse_entities(root);
  }

  /// Collects names of `typedef struct { ... } Name;` constructs.
  fn find_typedef_names(&mut self, entity: Entity) {
    for child in entity.get_children() {
      match child.get_kind() {
        EntityKind::TypedefDecl => {
          let declaration = match child.get_typedef_underlying_type().and_then(tag_declaration) {
            Some(declaration) => declaration,
            None => continue,
          };
          if entity_name(declaration).is_some() {
            continue;
          }
          if let (Some(key), Some(name)) = (location_key(declaration), child.get_name()) {
            self.typedef_names.entry(key).or_insert(name);
          }
        }
        EntityKind::LinkageSpec | EntityKind::UnexposedDecl => self.find_typedef_names(child),
        _ => {}
      }
    }
  }

  /// Name of a struct, union or enum declaration, taking typedef names
  /// of anonymous declarations into account.
  fn tag_name(&self, declaration: Entity) -> Option<String> {
    entity_name(declaration).or_else(|| {
      location_key(declaration).and_then(|key| self.typedef_names.get(&key).cloned())
    })
  }

  fn push_declaration(&mut self, entity: Entity, declaration: Declaration) {
    let file_name = location_key(entity).map(|key| key.0).unwrap_or_default();
    self
      .units
      .entry(file_name.clone())
      .or_insert_with(|| TranslationUnit::new(file_name))
      .declarations
      .push(declaration);
  }

  fn parse_entities(&mut self, entity: Entity) {
    for child in entity.get_children() {
      if self.skip_system_headers && child.is_in_system_header() {
        continue;
      }
      match child.get_kind() {
        EntityKind::EnumDecl => self.parse_enum(child),
        EntityKind::StructDecl => self.parse_struct(child, TagKind::Struct),
        EntityKind::UnionDecl => self.parse_struct(child, TagKind::Union),
        EntityKind::TypedefDecl => self.parse_typedef(child),
        EntityKind::FunctionDecl => self.parse_function(child),
        EntityKind::LinkageSpec | EntityKind::UnexposedDecl => self.parse_entities(child),
        kind => trace!("skipping entity: {:?} {:?}", kind, child.get_name()),
      }
    }
  }

  fn parse_enum(&mut self, entity: Entity) {
    if !entity.is_definition() {
      return;
    }
    // anonymous enums keep an empty name and are written as constants
    let name = self.tag_name(entity).unwrap_or_default();
    let items = entity
      .get_children()
      .into_iter()
      .filter(|c| c.get_kind() == EntityKind::EnumConstantDecl)
      .filter_map(|c| {
        Some(EnumItem {
          name: c.get_name()?,
          value: c.get_enum_constant_value()?.0,
          comment: c.get_comment(),
        })
      })
      .collect();
    let comment = entity.get_comment();
    self.push_declaration(
      entity,
      Declaration::Enum(EnumDecl {
        name,
        items,
        comment,
      }),
    );
  }

  fn parse_struct(&mut self, entity: Entity, kind: TagKind) {
    let name = match self.tag_name(entity) {
      Some(name) => name,
      None => {
        trace!("skipping anonymous record at {:?}", location_key(entity));
        return;
      }
    };
    let mut fields = Vec::new();
    if entity.is_definition() {
      for child in entity.get_children() {
        match child.get_kind() {
          EntityKind::FieldDecl => {
            if let Some(field) = self.parse_field(child) {
              fields.push(field);
            }
          }
          EntityKind::StructDecl => self.parse_struct(child, TagKind::Struct),
          EntityKind::UnionDecl => self.parse_struct(child, TagKind::Union),
          EntityKind::EnumDecl => self.parse_enum(child),
          _ => {}
        }
      }
    }
    let comment = entity.get_comment();
    self.push_declaration(
      entity,
      Declaration::Struct(StructDecl {
        name,
        kind,
        fields,
        is_definition: entity.is_definition(),
        comment,
      }),
    );
  }

  fn parse_field(&mut self, entity: Entity) -> Option<StructField> {
    let name = entity.get_name()?;
    let clang_type = entity.get_type()?;
    let names = parameter_names(entity);
    let field_type = self.convert_type(clang_type, Some(&names));
    Some(StructField {
      name,
      field_type,
      comment: entity.get_comment(),
    })
  }

  fn parse_typedef(&mut self, entity: Entity) {
    let name = match entity.get_name() {
      Some(name) => name,
      None => return,
    };
    let id = self.typedef_type(entity);
    let aliased_type = match *self.types.get(id) {
      CType::Typedef {
        aliased: Some(aliased),
        ..
      } => aliased,
      _ => {
        debug!("typedef without underlying type: {}", name);
        return;
      }
    };
    self.push_declaration(
      entity,
      Declaration::TypeAlias(TypeAliasDecl { name, aliased_type }),
    );
  }

  /// Returns the typedef node for `declaration`, converting its
  /// underlying type on first use.
  fn typedef_type(&mut self, declaration: Entity) -> TypeId {
    let name = declaration.get_name().unwrap_or_default();
    if let Some(&id) = self.typedefs.get(&name) {
      return id;
    }
    let id = self.types.typedef(name.clone(), None);
    self.typedefs.insert(name, id);
    if let Some(underlying) = declaration.get_typedef_underlying_type() {
      let names = parameter_names(declaration);
      let target = self.convert_type(underlying, Some(&names));
      self.types.bind_typedef(id, target);
    }
    id
  }

  fn parse_function(&mut self, entity: Entity) {
    let name = match entity.get_name() {
      Some(name) => name,
      None => return,
    };
    if !self.seen_functions.insert(name.clone()) {
      trace!("function already declared: {}", name);
      return;
    }
    let return_type = match entity.get_result_type() {
      Some(clang_type) => self.convert_type(clang_type, None),
      None => self.types.builtin(BuiltinType::Void),
    };
    let mut parameters = Vec::new();
    for argument in entity.get_arguments().unwrap_or_default() {
      let parameter_type = match argument.get_type() {
        Some(clang_type) => {
          let names = parameter_names(argument);
          self.convert_type(clang_type, Some(&names))
        }
        None => self.types.add(CType::Unresolved {
          spelling: String::new(),
        }),
      };
      parameters.push(Parameter::new(
        argument.get_name().unwrap_or_default(),
        parameter_type,
      ));
    }
    let is_operator = is_operator_name(&name);
    let comment = entity.get_comment();
    self.push_declaration(
      entity,
      Declaration::Function(FunctionDecl {
        name,
        return_type,
        parameters,
        is_inline: entity.is_inline_function(),
        is_operator,
        is_variadic: entity.is_variadic(),
        comment,
      }),
    );
  }

  fn unresolved(&mut self, clang_type: Type) -> TypeId {
    let spelling = clang_type.get_display_name();
    trace!("unresolved type: {}", spelling);
    self.types.add(CType::Unresolved { spelling })
  }

  /// Converts `clang_type` to a node of the arena. `names` are the
  /// parameter names declared with the type, used when it contains a
  /// function signature.
  fn convert_type(&mut self, clang_type: Type, names: Option<&[String]>) -> TypeId {
    let kind = clang_type.get_kind();
    if let Some(builtin) = builtin_type(kind) {
      return self.types.builtin(builtin);
    }
    match kind {
      TypeKind::Pointer | TypeKind::LValueReference | TypeKind::RValueReference => {
        match clang_type.get_pointee_type() {
          Some(pointee) => {
            let is_const = pointee.is_const_qualified();
            let pointee = self.convert_type(pointee, names);
            self.types.add(CType::Pointer { pointee, is_const })
          }
          None => self.unresolved(clang_type),
        }
      }
      TypeKind::ConstantArray | TypeKind::IncompleteArray | TypeKind::VariableArray => {
        match clang_type.get_element_type() {
          Some(element) => {
            let element = self.convert_type(element, names);
            let size = if kind == TypeKind::ConstantArray {
              clang_type.get_size()
            } else {
              None
            };
            self.types.array(element, size)
          }
          None => self.unresolved(clang_type),
        }
      }
      TypeKind::Typedef => match clang_type.get_declaration() {
        Some(declaration) => self.typedef_type(declaration),
        None => self.unresolved(clang_type),
      },
      TypeKind::Elaborated => match clang_type.get_elaborated_type() {
        Some(inner) => self.convert_type(inner, names),
        None => self.unresolved(clang_type),
      },
      TypeKind::Record | TypeKind::Enum => {
        let declaration = clang_type.get_declaration();
        let tag_kind = if kind == TypeKind::Enum {
          TagKind::Enum
        } else if declaration.map(|d| d.get_kind()) == Some(EntityKind::UnionDecl) {
          TagKind::Union
        } else {
          TagKind::Struct
        };
        let name = declaration
          .and_then(|d| self.tag_name(d))
          .unwrap_or_default();
        self.types.tagged(tag_kind, name)
      }
      TypeKind::FunctionPrototype | TypeKind::FunctionNoPrototype => {
        let return_type = match clang_type.get_result_type() {
          Some(result) => self.convert_type(result, None),
          None => self.types.builtin(BuiltinType::Void),
        };
        let argument_types = clang_type.get_argument_types().unwrap_or_default();
        let mut parameters = Vec::new();
        for (index, argument_type) in argument_types.into_iter().enumerate() {
          let name = names
            .filter(|names| names.len() > index)
            .map(|names| names[index].clone())
            .unwrap_or_default();
          let parameter_type = self.convert_type(argument_type, None);
          parameters.push(Parameter::new(name, parameter_type));
        }
        self.types.add(CType::Function(FunctionSignature {
          return_type,
          parameters,
          is_variadic: clang_type.is_variadic(),
        }))
      }
      _ => {
        // attributed and other sugar types
        let canonical = clang_type.get_canonical_type();
        let canonical_kind = canonical.get_kind();
        if canonical_kind != kind && canonical_kind != TypeKind::Unexposed {
          self.convert_type(canonical, names)
        } else {
          self.unresolved(clang_type)
        }
      }
    }
  }
}
