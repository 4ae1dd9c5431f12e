//! Gobs: a bytecode compiler for the Gobstones educational block language.
//!
//! The compiler consumes an abstract syntax tree that has already been
//! parsed and linted, and emits a flat, labelled instruction stream for a
//! stack-based virtual machine. Parser, linter, and VM live elsewhere; the
//! compiler queries three read-only services passed in by the host:
//!
//! - a [`SymbolTable`] of user-declared callables, constructors, and fields;
//! - a [`Primitives`] catalog naming the runtime's built-in procedures and
//!   functions;
//! - a [`Messages`] catalog for the few localizable names baked into
//!   emitted code.
//!
//! # Quick start
//!
//! ```
//! use gobs::ast::{Def, Expr, Ident, Program, Stmt};
//! use gobs::{Compiler, Messages, Op, Primitives, Span, SymbolTable};
//!
//! let sp = Span::new(0, 0);
//! // program { x := 42 }
//! let program = Program {
//!     definitions: vec![Def::Program {
//!         body: Stmt::Block {
//!             statements: vec![Stmt::AssignVariable {
//!                 variable: Ident::new("x", sp),
//!                 value: Expr::ConstantNumber {
//!                     value: "42".to_string(),
//!                     span: sp,
//!                 },
//!                 span: sp,
//!             }],
//!             span: sp,
//!         },
//!         span: sp,
//!     }],
//!     span: sp,
//! };
//!
//! let symbols = SymbolTable::new();
//! let primitives = Primitives::core();
//! let messages = Messages::new();
//! let code = Compiler::new(&symbols, &primitives, &messages)
//!     .compile(&program)
//!     .unwrap();
//!
//! assert_eq!(code.len(), 3); // PushInteger, SetVariable, Return
//! assert!(matches!(code.instructions[2], Op::Return));
//! ```
//!
//! # What the compiler does
//!
//! - Lowers structured control flow (`if`, `while`, `repeat`, `foreach`,
//!   `switch`) into labelled jumps. Labels (`_l0`, `_l1`, ...) and
//!   synthetic variables (`_v0`, `_v1`, ...) draw on the underscore
//!   namespace the parser reserves, so they never collide with user names.
//! - Lowers patterns (wildcard, constructor, tuple, timeout) into
//!   check / bind / unbind sequences that never disturb the match subject.
//! - Dispatches named calls between runtime primitives, user-defined
//!   callables, and record field accessors.
//!
//! # What it does not do
//!
//! No optimisation, no type inference (types are asserted dynamically via
//! `TypeCheck` instructions), and no error recovery: a malformed or
//! unlinted tree is a programming error, reported as [`Error`], never a
//! user-facing diagnostic.

pub mod ast;
mod bytecode;
mod compiler;
mod error;
mod messages;
mod primitives;
mod span;
mod symbols;

pub use bytecode::{Code, Op, Type};
pub use compiler::Compiler;
pub use error::{Error, Result};
pub use messages::Messages;
pub use primitives::Primitives;
pub use span::Span;
pub use symbols::SymbolTable;
