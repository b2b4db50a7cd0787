//! Parser Module
//!
//! Table-driven LR parsing. The grammar and its SLR(1) table live here,
//! together with the driver that runs the automaton and the observer
//! protocol translation passes plug into.

mod collector;
mod driver;
mod grammar;
mod table;
mod value;

pub use collector::{ParseEvent, ProductionCollector};
pub use driver::{ActionObserver, ParseDriver};
pub use grammar::{prod, Grammar, GrammarSymbol, NonTerminal, Production};
pub use table::{Action, GrammarTable, LrTable, StateId, TableEntry};
pub use value::{SemanticValue, StackSymbol, ValueStack};
