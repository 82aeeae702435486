//! Read-only model of a parsed C header.
//!
//! Types live in a `TypeArena` and are addressed by `TypeId`. Two occurrences
//! refer to the same type exactly when they hold the same id, so the id is
//! the identity used for caching and alias lookup.

use ansi_term::Colour;
use std::fmt;

/// Identity of a type node inside a `TypeArena`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct TypeId(usize);

/// Built-in C types. All of them have a corresponding `clang::TypeKind`
/// (except for `CharS` and `CharU` which both map to `Char`).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BuiltinType {
  Void,
  Bool,
  Char,
  SChar,
  UChar,
  WChar,
  Char16,
  Char32,
  Short,
  UShort,
  Int,
  UInt,
  Long,
  ULong,
  LongLong,
  ULongLong,
  Float,
  Double,
  LongDouble,
}

impl BuiltinType {
  /// C spelling of the type, used as input of the type conversion table.
  pub fn c_name(self) -> &'static str {
    match self {
      BuiltinType::Void => "void",
      BuiltinType::Bool => "_Bool",
      BuiltinType::Char => "char",
      BuiltinType::SChar => "signed char",
      BuiltinType::UChar => "unsigned char",
      BuiltinType::WChar => "wchar_t",
      BuiltinType::Char16 => "char16_t",
      BuiltinType::Char32 => "char32_t",
      BuiltinType::Short => "short",
      BuiltinType::UShort => "unsigned short",
      BuiltinType::Int => "int",
      BuiltinType::UInt => "unsigned int",
      BuiltinType::Long => "long",
      BuiltinType::ULong => "unsigned long",
      BuiltinType::LongLong => "long long",
      BuiltinType::ULongLong => "unsigned long long",
      BuiltinType::Float => "float",
      BuiltinType::Double => "double",
      BuiltinType::LongDouble => "long double",
    }
  }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TagKind {
  Struct,
  Union,
  Enum,
}

/// A named, typed parameter of a function or a function signature.
/// `name` is empty when the declaration doesn't name it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Parameter {
  pub name: String,
  pub parameter_type: TypeId,
}

impl Parameter {
  pub fn new<S: Into<String>>(name: S, parameter_type: TypeId) -> Self {
    Parameter {
      name: name.into(),
      parameter_type,
    }
  }
}

/// Structural description of a function type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FunctionSignature {
  pub return_type: TypeId,
  pub parameters: Vec<Parameter>,
  pub is_variadic: bool,
}

/// One layer of a C type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CType {
  Builtin(BuiltinType),
  /// Use of a typedef. `aliased` is `None` until the typedef is bound
  /// (or forever, if the front-end couldn't see the definition).
  Typedef { name: String, aliased: Option<TypeId> },
  Pointer { pointee: TypeId, is_const: bool },
  Array { element: TypeId, size: Option<usize> },
  /// Reference to a struct, union or enum declaration by name.
  Tagged { kind: TagKind, name: String },
  Function(FunctionSignature),
  /// A type the front-end could not describe.
  Unresolved { spelling: String },
}

/// Owner of all type nodes of one parsed header.
#[derive(Debug, Default, Clone)]
pub struct TypeArena {
  types: Vec<CType>,
}

impl TypeArena {
  pub fn new() -> Self {
    TypeArena::default()
  }

  pub fn add(&mut self, c_type: CType) -> TypeId {
    self.types.push(c_type);
    TypeId(self.types.len() - 1)
  }

  pub fn get(&self, id: TypeId) -> &CType {
    &self.types[id.0]
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  pub fn builtin(&mut self, builtin: BuiltinType) -> TypeId {
    self.add(CType::Builtin(builtin))
  }

  pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
    self.add(CType::Pointer {
      pointee,
      is_const: false,
    })
  }

  pub fn array(&mut self, element: TypeId, size: Option<usize>) -> TypeId {
    self.add(CType::Array { element, size })
  }

  pub fn tagged<S: Into<String>>(&mut self, kind: TagKind, name: S) -> TypeId {
    self.add(CType::Tagged {
      kind,
      name: name.into(),
    })
  }

  pub fn function(&mut self, return_type: TypeId, parameters: Vec<Parameter>) -> TypeId {
    self.add(CType::Function(FunctionSignature {
      return_type,
      parameters,
      is_variadic: false,
    }))
  }

  /// Adds a typedef use. Pass `None` to bind the target later
  /// with `bind_typedef`.
  pub fn typedef<S: Into<String>>(&mut self, name: S, aliased: Option<TypeId>) -> TypeId {
    self.add(CType::Typedef {
      name: name.into(),
      aliased,
    })
  }

  /// Sets the aliased type of a typedef node. Returns false if `id`
  /// is not a typedef.
  pub fn bind_typedef(&mut self, id: TypeId, target: TypeId) -> bool {
    match self.types[id.0] {
      CType::Typedef {
        ref mut aliased, ..
      } => {
        *aliased = Some(target);
        true
      }
      _ => false,
    }
  }

  /// Removes one layer of derivation: typedef to aliased type,
  /// pointer to pointee, array to element type.
  pub fn desugar(&self, id: TypeId) -> Option<TypeId> {
    match *self.get(id) {
      CType::Typedef { aliased, .. } => aliased,
      CType::Pointer { pointee, .. } => Some(pointee),
      CType::Array { element, .. } => Some(element),
      CType::Builtin(_) | CType::Tagged { .. } | CType::Function(_) | CType::Unresolved { .. } => {
        None
      }
    }
  }

  /// Human readable C-like rendering, for logs.
  pub fn display_name(&self, id: TypeId) -> String {
    match *self.get(id) {
      CType::Builtin(builtin) => builtin.c_name().to_string(),
      CType::Typedef { ref name, .. } => name.clone(),
      CType::Pointer { pointee, is_const } => {
        let prefix = if is_const { "const " } else { "" };
        format!("{}{}*", prefix, self.display_name(pointee))
      }
      CType::Array { element, size } => match size {
        Some(size) => format!("{}[{}]", self.display_name(element), size),
        None => format!("{}[]", self.display_name(element)),
      },
      CType::Tagged { kind, ref name } => {
        let keyword = match kind {
          TagKind::Struct => "struct",
          TagKind::Union => "union",
          TagKind::Enum => "enum",
        };
        format!("{} {}", keyword, name)
      }
      CType::Function(ref signature) => {
        let args: Vec<_> = signature
          .parameters
          .iter()
          .map(|p| self.display_name(p.parameter_type))
          .collect();
        format!("{} (*)({})", self.display_name(signature.return_type), args.join(", "))
      }
      CType::Unresolved { ref spelling } => spelling.clone(),
    }
  }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EnumItem {
  pub name: String,
  pub value: i64,
  pub comment: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EnumDecl {
  pub name: String,
  pub items: Vec<EnumItem>,
  pub comment: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StructField {
  pub name: String,
  pub field_type: TypeId,
  pub comment: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StructDecl {
  pub name: String,
  /// `TagKind::Struct` or `TagKind::Union`
  pub kind: TagKind,
  pub fields: Vec<StructField>,
  /// False for forward declarations like `struct Foo;`
  pub is_definition: bool,
  pub comment: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TypeAliasDecl {
  pub name: String,
  pub aliased_type: TypeId,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FunctionDecl {
  pub name: String,
  pub return_type: TypeId,
  pub parameters: Vec<Parameter>,
  pub is_inline: bool,
  pub is_operator: bool,
  pub is_variadic: bool,
  pub comment: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Declaration {
  Enum(EnumDecl),
  Struct(StructDecl),
  TypeAlias(TypeAliasDecl),
  Function(FunctionDecl),
}

/// Declarations coming from one source file, in source order.
#[derive(Debug, Default, Clone)]
pub struct TranslationUnit {
  pub file_name: String,
  pub declarations: Vec<Declaration>,
}

impl TranslationUnit {
  pub fn new<S: Into<String>>(file_name: S) -> Self {
    TranslationUnit {
      file_name: file_name.into(),
      declarations: Vec::new(),
    }
  }

  pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
    self.declarations.iter().filter_map(|d| match d {
      Declaration::Enum(e) => Some(e),
      _ => None,
    })
  }

  pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
    self.declarations.iter().filter_map(|d| match d {
      Declaration::Struct(s) => Some(s),
      _ => None,
    })
  }

  pub fn type_aliases(&self) -> impl Iterator<Item = &TypeAliasDecl> {
    self.declarations.iter().filter_map(|d| match d {
      Declaration::TypeAlias(t) => Some(t),
      _ => None,
    })
  }

  pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
    self.declarations.iter().filter_map(|d| match d {
      Declaration::Function(f) => Some(f),
      _ => None,
    })
  }
}

/// Result of parsing a header: the type graph and the translation units
/// that reference it.
#[derive(Debug, Default, Clone)]
pub struct Ast {
  pub types: TypeArena,
  pub units: Vec<TranslationUnit>,
}

impl Ast {
  pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
    self.units.iter().flat_map(|u| u.declarations.iter())
  }

  pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
    self.units.iter().flat_map(|u| u.enums())
  }

  pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
    self.units.iter().flat_map(|u| u.structs())
  }

  pub fn type_aliases(&self) -> impl Iterator<Item = &TypeAliasDecl> {
    self.units.iter().flat_map(|u| u.type_aliases())
  }

  pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
    self.units.iter().flat_map(|u| u.functions())
  }

  /// Returns the declaration that owns the field list of the struct
  /// `decl` refers to: the first definition with the same name and kind,
  /// or `decl` itself when the struct is only forward-declared.
  pub fn original_struct<'a>(&'a self, decl: &'a StructDecl) -> &'a StructDecl {
    if decl.is_definition {
      return decl;
    }
    self
      .structs()
      .find(|s| s.is_definition && s.kind == decl.kind && s.name == decl.name)
      .unwrap_or(decl)
  }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Severity {
  Ignored,
  Note,
  Warning,
  Error,
  Fatal,
}

impl Severity {
  pub fn is_error(self) -> bool {
    self >= Severity::Error
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let text = match *self {
      Severity::Ignored => "Ignored",
      Severity::Note => "Note",
      Severity::Warning => "Warning",
      Severity::Error => "Error",
      Severity::Fatal => "Fatal",
    };
    f.write_str(text)
  }
}

/// A message reported by the front-end.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Diagnostic {
  pub file_name: String,
  pub line: u32,
  pub column: u32,
  pub severity: Severity,
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let colour = match self.severity {
      Severity::Ignored | Severity::Note => Colour::Green,
      Severity::Warning => Colour::Purple,
      Severity::Error | Severity::Fatal => Colour::Red,
    };
    write!(
      f,
      "{}:({}, {}) {}:\n{}",
      self.file_name,
      self.line,
      self.column,
      colour.paint(self.severity.to_string()),
      self.message
    )
  }
}
