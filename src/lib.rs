//! # cfront — lexer, parser, and constant folder for a C-like systems language
//!
//! This crate turns source text into a validated, constant-folded abstract syntax tree. It is a
//! front end only: there is no type checker beyond operand-kind checks, no codegen, and no
//! linker. The three pipeline stages are pure functions over their inputs:
//!
//! ```
//! let (tokens, lex_diags) = cfront::lex("int x = 1 + 2;");
//! let (ast, parse_diags) = cfront::parse(tokens);
//! let (ast, validate_diags) = cfront::validate(ast, false);
//! assert!(lex_diags.is_empty() && parse_diags.is_empty() && validate_diags.is_empty());
//! assert_eq!(ast.kind, cfront::ast::AstKind::Program);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod symbol;
pub mod token;
pub mod validate;

pub use ast::{AstKind, AstNode};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use driver::{run_pipeline, CompilerDriver};
pub use lexer::lex;
pub use parser::parse;
pub use symbol::{SymbolTable, Type};
pub use token::{Keyword, Position, Token, TokenKind, TokenValue};
pub use validate::{validate, Validator};
