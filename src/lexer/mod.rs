//! Lexical analysis
//!
//! Converts source text into a stream of tokens and registers every
//! identifier it sees in the symbol table.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenCategory, TokenKind};
