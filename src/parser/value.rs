//! Parser values carried on subscriber stacks

use super::grammar::NonTerminal;
use crate::error::{Error, Result};
use crate::lexer::Token;

/// Grammar symbol instance sitting on a parser stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackSymbol {
    /// Shifted terminal
    Token(Token),
    /// Head of a reduced production
    NonTerminal(NonTerminal),
}

/// One stack entry: the symbol plus a subscriber-specific payload
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticValue<P> {
    /// Symbol this value stands for
    pub symbol: StackSymbol,
    /// Attribute computed by the subscriber, if any
    pub payload: Option<P>,
}

impl<P> SemanticValue<P> {
    /// Value for a shifted token
    pub fn token(token: Token, payload: Option<P>) -> Self {
        Self {
            symbol: StackSymbol::Token(token),
            payload,
        }
    }

    /// Value for a reduced non-terminal
    pub fn non_terminal(head: NonTerminal, payload: Option<P>) -> Self {
        Self {
            symbol: StackSymbol::NonTerminal(head),
            payload,
        }
    }

    /// Shifted token, if this value came from a shift
    pub fn as_token(&self) -> Option<&Token> {
        match &self.symbol {
            StackSymbol::Token(token) => Some(token),
            StackSymbol::NonTerminal(_) => None,
        }
    }

    /// Token text, if this value came from a shift
    pub fn lexeme(&self) -> Option<&str> {
        self.as_token().map(|token| token.lexeme.as_str())
    }
}

/// Private value stack of one subscriber
#[derive(Debug, Clone)]
pub struct ValueStack<P> {
    values: Vec<SemanticValue<P>>,
}

impl<P> Default for ValueStack<P> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<P> ValueStack<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: SemanticValue<P>) {
        self.values.push(value);
    }

    /// Pop one value; an empty stack means the subscriber fell out of step
    /// with the driver
    pub fn pop(&mut self) -> Result<SemanticValue<P>> {
        self.values
            .pop()
            .ok_or_else(|| Error::invariant("value stack underflow"))
    }

    /// Pop and discard `count` values
    pub fn discard(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.pop()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop everything left after accept
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
