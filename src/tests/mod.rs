mod alias_table;
mod config;
mod full_run;

use crate::c_ast::{
  Ast, Declaration, FunctionDecl, Parameter, StructDecl, StructField, TagKind, TranslationUnit,
  TypeAliasDecl, TypeArena, TypeId,
};

// Helpers for building ASTs by hand.

fn single_unit_ast(types: TypeArena, declarations: Vec<Declaration>) -> Ast {
  Ast {
    types,
    units: vec![TranslationUnit {
      file_name: "test.h".to_string(),
      declarations,
    }],
  }
}

fn function(name: &str, return_type: TypeId, parameters: &[(&str, TypeId)]) -> FunctionDecl {
  FunctionDecl {
    name: name.to_string(),
    return_type,
    parameters: parameters
      .iter()
      .map(|&(name, t)| Parameter::new(name, t))
      .collect(),
    is_inline: false,
    is_operator: false,
    is_variadic: false,
    comment: None,
  }
}

fn structure(name: &str, fields: &[(&str, TypeId)]) -> StructDecl {
  StructDecl {
    name: name.to_string(),
    kind: TagKind::Struct,
    fields: fields
      .iter()
      .map(|&(name, field_type)| StructField {
        name: name.to_string(),
        field_type,
        comment: None,
      })
      .collect(),
    is_definition: true,
    comment: None,
  }
}

fn type_alias(name: &str, aliased_type: TypeId) -> Declaration {
  Declaration::TypeAlias(TypeAliasDecl {
    name: name.to_string(),
    aliased_type,
  })
}
