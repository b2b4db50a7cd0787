//! # Shift/Reduce Parse Driver
//!
//! Runs the LR automaton over a token stream and broadcasts every action to
//! the registered observers. The driver keeps only structural state (state
//! stack and symbol stack); all translation happens in observers, each with
//! its own value stack kept in step with the driver's.

use super::grammar::{NonTerminal, Production};
use super::table::{Action, GrammarTable, StateId};
use super::value::StackSymbol;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};
use crate::symtab::SymbolTableRef;
use tracing::trace;

/// Callbacks fired by [`ParseDriver`]
///
/// Every observer sees the same event sequence, in registration order,
/// before the driver advances. An error from any callback aborts the parse.
pub trait ActionObserver {
    /// Receive the symbol table handle at registration
    fn bind_symbol_table(&mut self, _table: SymbolTableRef) {}

    /// `token` is about to be shifted out of `state`
    fn on_shift(&mut self, state: StateId, token: &Token) -> Result<()>;

    /// `production` was reduced; `state` is the goto target now on top
    fn on_reduce(&mut self, state: StateId, production: &Production) -> Result<()>;

    /// Input accepted in `state`
    fn on_accept(&mut self, state: StateId) -> Result<()>;
}

/// LR driver with a list of observers
pub struct ParseDriver<'a> {
    symbol_table: SymbolTableRef,
    observers: Vec<&'a mut dyn ActionObserver>,
}

impl<'a> ParseDriver<'a> {
    /// Driver sharing `symbol_table` with its observers
    pub fn new(symbol_table: SymbolTableRef) -> Self {
        Self {
            symbol_table,
            observers: Vec::new(),
        }
    }

    /// Attach an observer; notification order is registration order
    pub fn register_observer(&mut self, observer: &'a mut dyn ActionObserver) {
        observer.bind_symbol_table(self.symbol_table.clone());
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn symbol_table(&self) -> &SymbolTableRef {
        &self.symbol_table
    }

    /// Parse `tokens` with `table`, notifying observers along the way
    pub fn run<I, T>(&mut self, tokens: I, table: &T) -> Result<()>
    where
        I: IntoIterator<Item = Token>,
        T: GrammarTable + ?Sized,
    {
        let mut tokens = tokens.into_iter().peekable();
        let mut states: Vec<StateId> = vec![table.initial_state()];
        let mut symbols = vec![StackSymbol::Token(Token::eof())];

        loop {
            let state = *states
                .last()
                .ok_or_else(|| Error::invariant("parser state stack is empty"))?;
            let lookahead = tokens
                .peek()
                .map(|token| token.kind)
                .ok_or(Error::UnexpectedEof)?;

            match table.action(state, lookahead) {
                Action::Shift(next) => {
                    let token = tokens.next().ok_or(Error::UnexpectedEof)?;
                    trace!(state, next, token = %token, "shift");
                    for observer in self.observers.iter_mut() {
                        observer.on_shift(state, &token)?;
                    }
                    states.push(next);
                    symbols.push(StackSymbol::Token(token));
                }
                Action::Reduce(production) => {
                    let len = production.len();
                    if len >= states.len() {
                        return Err(Error::invariant(format!(
                            "reduce by {} pops {} symbols from a stack of {}",
                            production,
                            len,
                            states.len() - 1
                        )));
                    }
                    states.truncate(states.len() - len);
                    symbols.truncate(symbols.len() - len);

                    let uncovered = *states
                        .last()
                        .ok_or_else(|| Error::invariant("parser state stack is empty"))?;
                    let next = goto_or_fail(table, uncovered, production.head)?;
                    symbols.push(StackSymbol::NonTerminal(production.head));
                    states.push(next);

                    trace!(state = uncovered, next, production = %production, "reduce");
                    for observer in self.observers.iter_mut() {
                        observer.on_reduce(next, production)?;
                    }
                }
                Action::Accept => {
                    trace!(state, "accept");
                    for observer in self.observers.iter_mut() {
                        observer.on_accept(state)?;
                    }
                    return Ok(());
                }
                Action::Error => {
                    let token = tokens.peek().cloned().unwrap_or_else(Token::eof);
                    return Err(unexpected_token(state, &token));
                }
            }
        }
    }
}

fn goto_or_fail<T: GrammarTable + ?Sized>(
    table: &T,
    state: StateId,
    non_terminal: NonTerminal,
) -> Result<StateId> {
    table.goto(state, non_terminal).ok_or(Error::MissingGoto {
        state,
        non_terminal,
    })
}

fn unexpected_token(state: StateId, token: &Token) -> Error {
    let lexeme = if token.kind == TokenKind::Eof {
        "$".to_string()
    } else {
        token.lexeme.clone()
    };
    Error::UnexpectedToken {
        state,
        kind: token.kind,
        lexeme,
        line: token.line,
        column: token.column,
    }
}
