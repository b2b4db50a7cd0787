//! Debug utilities
//!
//! Text dumps of the intermediate artifacts of a compilation.

use super::ir::IrProgram;
use crate::lexer::Token;
use crate::parser::{Grammar, ParseEvent};
use crate::symtab::SymbolTable;

/// One token per line, `(kind, text)` for identifiers and literals
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&format!("{}\n", token));
    }
    out
}

/// Numbered IR listing
pub fn format_ir(program: &IrProgram) -> String {
    let mut out = String::new();
    for (i, instr) in program.instructions.iter().enumerate() {
        out.push_str(&format!("{:04}: {}\n", i, instr));
    }
    out
}

/// Symbol table as `(name, type)` lines
pub fn format_symbols(symbols: &SymbolTable) -> String {
    let mut out = String::new();
    for entry in symbols.iter() {
        let ty = match entry.ty {
            Some(ty) => ty.to_string(),
            None => "null".to_string(),
        };
        out.push_str(&format!("({}, {})\n", entry.name, ty));
    }
    out
}

/// Reduced productions, one per line
pub fn format_reductions(events: &[ParseEvent], grammar: &Grammar) -> String {
    let mut out = String::new();
    for event in events {
        if let ParseEvent::Reduce { index, .. } = event {
            let line = match grammar.production(*index) {
                Some(production) => production.to_string(),
                None => event.to_string(),
            };
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}
