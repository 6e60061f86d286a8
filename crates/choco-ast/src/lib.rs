//! The shared AST vocabulary: the node types produced by the parser,
//! mutated in place by the checker, and read by the driver's AST dump.
//!
//! This crate owns [`ValueType`] because it is part of the node
//! contract every other crate agrees on, not a checker-internal detail.

pub mod ast;
pub mod cursor;
pub mod lexer;
pub mod parser;

pub use ast::{
    BinaryOp, ClassDef, Declaration, ErrorEntry, Expr, ExprKind, FuncDef, GlobalDecl, Ident,
    NonLocalDecl, Program, Stmt, StmtKind, TypeAnnotation, TypedVar, UnaryOp, ValueType, VarDef,
};
pub use cursor::{Cursor, CursorSnapshot};
pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::{parse_program, ParseError, Parser};
