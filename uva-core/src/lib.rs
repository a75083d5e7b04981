//! Front end of the Uva language toolchain.
//!
//! The pipeline is roughly:
//!
//!   source .uva
//!     -> lexer        (tokens tagged with their origin file)
//!     -> preprocessor (`#include` expansion, may splice other files' tokens)
//!     -> parser       (AST)
//!
//! Every stage is fault tolerant: it returns a [`Recovered`] holding the
//! artifact it managed to build plus the faults it hit. Tools (the analyzer,
//! the compiler driver) decide what to do with partial artifacts.

// ---------------------------------------------------------------------
// Error handling and positions
// ---------------------------------------------------------------------

pub mod error;
pub mod span;

// ---------------------------------------------------------------------
// Front-end: lexing, preprocessing and parsing
// ---------------------------------------------------------------------

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod preprocessor;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use ast::{AstNode, NodeKind};
pub use error::{CoreError, Recovered};
pub use lexer::{Token, TokenCategory, TokenKind, tokenize};
pub use parser::parse_all;
pub use preprocessor::preprocess;
pub use span::SourcePosition;
