//! Generator of Beef bindings for C headers.
//!
//! The header is parsed with libclang into a `c_ast::Ast`, function
//! pointer aliases are collected, and the binding file is emitted by
//! `beef_code_generator`.

#![deny(unused_must_use)]

#[macro_use]
extern crate error_chain;

pub mod alias_table;
pub mod beef_code_generator;
pub mod binding_context;
pub mod c_ast;
pub mod c_parser;
pub mod cli;
pub mod config;
pub mod errors;
pub mod file_utils;
pub mod launcher;
pub mod log;
pub mod naming;
pub mod type_resolver;

#[cfg(test)]
mod tests;
