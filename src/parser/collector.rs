//! Observer that records parser events

use super::driver::ActionObserver;
use super::grammar::{NonTerminal, Production};
use super::table::StateId;
use crate::error::Result;
use crate::lexer::{Token, TokenKind};
use std::fmt;

/// One notification as seen by an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseEvent {
    Shift {
        state: StateId,
        kind: TokenKind,
    },
    Reduce {
        state: StateId,
        index: usize,
        head: NonTerminal,
    },
    Accept {
        state: StateId,
    },
}

impl fmt::Display for ParseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseEvent::Shift { state, kind } => write!(f, "shift {} in {}", kind.name(), state),
            ParseEvent::Reduce { state, index, head } => {
                write!(f, "reduce {} ({}) -> {}", index, head.name(), state)
            }
            ParseEvent::Accept { state } => write!(f, "accept in {}", state),
        }
    }
}

/// Records the event sequence of a parse
#[derive(Debug, Clone, Default)]
pub struct ProductionCollector {
    events: Vec<ParseEvent>,
}

impl ProductionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event in notification order
    pub fn events(&self) -> &[ParseEvent] {
        &self.events
    }

    /// Indices of the reduced productions, in reduction order
    pub fn reductions(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ParseEvent::Reduce { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub fn accepted(&self) -> bool {
        matches!(self.events.last(), Some(ParseEvent::Accept { .. }))
    }
}

impl ActionObserver for ProductionCollector {
    fn on_shift(&mut self, state: StateId, token: &Token) -> Result<()> {
        self.events.push(ParseEvent::Shift {
            state,
            kind: token.kind,
        });
        Ok(())
    }

    fn on_reduce(&mut self, state: StateId, production: &Production) -> Result<()> {
        self.events.push(ParseEvent::Reduce {
            state,
            index: production.index,
            head: production.head,
        });
        Ok(())
    }

    fn on_accept(&mut self, state: StateId) -> Result<()> {
        self.events.push(ParseEvent::Accept { state });
        Ok(())
    }
}
