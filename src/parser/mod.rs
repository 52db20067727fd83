//! Parser for component template markup

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse_element, parse_loop_clause};
