//! # Type Propagation
//!
//! Parse observer that records declared types in the symbol table and
//! carries source types up through reductions. It emits no IR.
//!
//! Undeclared or unknown identifiers are diagnostics: they are logged,
//! collected, and propagation continues with an untyped value. Only an
//! unrecognized production stops the run.

use crate::error::{Error, Result};
use crate::lexer::Token;
use crate::parser::{prod, ActionObserver, Production, SemanticValue, StateId, ValueStack};
use crate::symtab::{SourceType, SymbolTableRef};
use tracing::{debug, warn};

/// Type propagator with a private stack of optional types
#[derive(Debug, Default)]
pub struct TypePropagator {
    stack: ValueStack<SourceType>,
    symbols: Option<SymbolTableRef>,
    /// Non-fatal problems found so far
    diagnostics: Vec<Error>,
}

impl TypePropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get diagnostics generated during propagation
    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Error> {
        self.diagnostics
    }

    /// Values currently on the propagator's stack
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    fn symbols(&self) -> Result<&SymbolTableRef> {
        self.symbols
            .as_ref()
            .ok_or_else(|| Error::invariant("type propagator has no symbol table bound"))
    }

    fn report(&mut self, diagnostic: Error) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn identifier(value: &SemanticValue<SourceType>) -> Result<Token> {
        value
            .as_token()
            .cloned()
            .ok_or_else(|| Error::invariant(format!("expected identifier, found {:?}", value.symbol)))
    }

    /// Current type of a referenced identifier
    fn lookup(&mut self, id: &Token) -> Result<Option<SourceType>> {
        let ty = self.symbols()?.borrow().type_of(&id.lexeme);
        if ty.is_none() {
            self.report(Error::UndeclaredIdentifier {
                name: id.lexeme.clone(),
                line: id.line,
                column: id.column,
            });
        }
        Ok(ty)
    }

    fn declare(&mut self, id: &Token, ty: Option<SourceType>) -> Result<()> {
        let name = id.lexeme.as_str();
        let found = {
            let symbols = self.symbols()?;
            let mut table = symbols.borrow_mut();
            match table.get_mut(name) {
                Some(entry) => {
                    entry.ty = ty;
                    true
                }
                None => false,
            }
        };
        if found {
            debug!(name, ty = ?ty, "declared");
        } else {
            self.report(Error::UnknownIdentifier {
                name: name.to_string(),
                line: id.line,
                column: id.column,
            });
        }
        Ok(())
    }

    /// Keep the first body value's type, drop the rest
    fn pass_first(&mut self, production: &Production) -> Result<Option<SourceType>> {
        if production.is_empty() {
            return Ok(None);
        }
        self.stack.discard(production.len() - 1)?;
        Ok(self.stack.pop()?.payload)
    }
}

impl ActionObserver for TypePropagator {
    fn bind_symbol_table(&mut self, table: SymbolTableRef) {
        self.symbols = Some(table);
    }

    fn on_shift(&mut self, _state: StateId, token: &Token) -> Result<()> {
        self.stack.push(SemanticValue::token(token.clone(), None));
        Ok(())
    }

    fn on_reduce(&mut self, _state: StateId, production: &Production) -> Result<()> {
        let ty = match production.index {
            prod::DECLARE => {
                let id = self.stack.pop()?;
                let declared = self.stack.pop()?.payload;
                let id = Self::identifier(&id)?;
                self.declare(&id, declared)?;
                declared
            }
            prod::INT_TYPE | prod::FACTOR_INT => {
                self.stack.discard(production.len())?;
                Some(SourceType::Int)
            }
            prod::ASSIGN | prod::FACTOR_ID => {
                self.stack.discard(production.len().saturating_sub(1))?;
                let id = self.stack.pop()?;
                let id = Self::identifier(&id)?;
                self.lookup(&id)?
            }
            prod::RETURN => {
                let value = self.stack.pop()?;
                self.stack.discard(1)?;
                value.payload
            }
            prod::PAREN => {
                self.stack.discard(1)?;
                let value = self.stack.pop()?;
                self.stack.discard(1)?;
                value.payload
            }
            prod::PROGRAM
            | prod::LIST_MORE
            | prod::LIST_LAST
            | prod::ADD
            | prod::SUB
            | prod::EXPR_TERM
            | prod::MUL
            | prod::TERM_FACTOR => self.pass_first(production)?,
            index => return Err(Error::UnknownProduction { index }),
        };
        self.stack
            .push(SemanticValue::non_terminal(production.head, ty));
        Ok(())
    }

    fn on_accept(&mut self, _state: StateId) -> Result<()> {
        self.stack.clear();
        Ok(())
    }
}
