//! Grammar symbols and productions

use crate::lexer::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-terminal symbols of the reference grammar
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum NonTerminal {
    /// Augmented start symbol `P'`
    Start,
    /// Whole program `P`
    Program,
    /// Statement list `S_list`
    StatementList,
    /// Statement `S`
    Statement,
    /// Type specifier `D`
    Declarator,
    /// Additive expression `E`
    Expr,
    /// Multiplicative expression `A`
    Term,
    /// Primary expression `B`
    Factor,
}

impl NonTerminal {
    /// Short name used in listings
    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Start => "P'",
            NonTerminal::Program => "P",
            NonTerminal::StatementList => "S_list",
            NonTerminal::Statement => "S",
            NonTerminal::Declarator => "D",
            NonTerminal::Expr => "E",
            NonTerminal::Term => "A",
            NonTerminal::Factor => "B",
        }
    }
}

/// Terminal or non-terminal occurring in a production body
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GrammarSymbol {
    /// Token kind
    Terminal(TokenKind),
    /// Non-terminal
    NonTerminal(NonTerminal),
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSymbol::Terminal(kind) => write!(f, "{}", kind.name()),
            GrammarSymbol::NonTerminal(nt) => write!(f, "{}", nt.name()),
        }
    }
}

/// A rule `head -> body` with a stable index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    /// Position in the grammar, used to select translation rules
    pub index: usize,
    /// Left-hand side
    pub head: NonTerminal,
    /// Right-hand side
    pub body: Vec<GrammarSymbol>,
}

impl Production {
    /// Length of the right-hand side
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// True for epsilon productions
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.head.name())?;
        for symbol in &self.body {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Indices of the reference grammar's productions
pub mod prod {
    /// `P' -> P`
    pub const START: usize = 0;
    /// `P -> S_list`
    pub const PROGRAM: usize = 1;
    /// `S_list -> S ; S_list`
    pub const LIST_MORE: usize = 2;
    /// `S_list -> S ;`
    pub const LIST_LAST: usize = 3;
    /// `S -> D id`
    pub const DECLARE: usize = 4;
    /// `D -> int`
    pub const INT_TYPE: usize = 5;
    /// `S -> id = E`
    pub const ASSIGN: usize = 6;
    /// `S -> return E`
    pub const RETURN: usize = 7;
    /// `E -> E + A`
    pub const ADD: usize = 8;
    /// `E -> E - A`
    pub const SUB: usize = 9;
    /// `E -> A`
    pub const EXPR_TERM: usize = 10;
    /// `A -> A * B`
    pub const MUL: usize = 11;
    /// `A -> B`
    pub const TERM_FACTOR: usize = 12;
    /// `B -> ( E )`
    pub const PAREN: usize = 13;
    /// `B -> id`
    pub const FACTOR_ID: usize = 14;
    /// `B -> IntConst`
    pub const FACTOR_INT: usize = 15;
}

/// Ordered production list; production 0 is the augmented start rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    productions: Vec<Production>,
}

impl Grammar {
    /// Build a grammar from `(head, body)` rules, indexed by position.
    /// The first rule must be the augmented start rule `S' -> S`.
    pub fn new(rules: Vec<(NonTerminal, Vec<GrammarSymbol>)>) -> Self {
        let productions = rules
            .into_iter()
            .enumerate()
            .map(|(index, (head, body))| Production { index, head, body })
            .collect();
        Self { productions }
    }

    /// The statement language grammar
    pub fn reference() -> Self {
        use GrammarSymbol::{NonTerminal as N, Terminal as T};
        use NonTerminal::*;

        Self::new(vec![
            (Start, vec![N(Program)]),
            (Program, vec![N(StatementList)]),
            (
                StatementList,
                vec![N(Statement), T(TokenKind::Semicolon), N(StatementList)],
            ),
            (StatementList, vec![N(Statement), T(TokenKind::Semicolon)]),
            (Statement, vec![N(Declarator), T(TokenKind::Identifier)]),
            (Declarator, vec![T(TokenKind::Int)]),
            (
                Statement,
                vec![T(TokenKind::Identifier), T(TokenKind::Assign), N(Expr)],
            ),
            (Statement, vec![T(TokenKind::Return), N(Expr)]),
            (Expr, vec![N(Expr), T(TokenKind::Plus), N(Term)]),
            (Expr, vec![N(Expr), T(TokenKind::Minus), N(Term)]),
            (Expr, vec![N(Term)]),
            (Term, vec![N(Term), T(TokenKind::Star), N(Factor)]),
            (Term, vec![N(Factor)]),
            (
                Factor,
                vec![T(TokenKind::LeftParen), N(Expr), T(TokenKind::RightParen)],
            ),
            (Factor, vec![T(TokenKind::Identifier)]),
            (Factor, vec![T(TokenKind::IntConst)]),
        ])
    }

    /// All productions in index order
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Production by index
    pub fn production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    /// The augmented start rule
    pub fn start(&self) -> Option<&Production> {
        self.productions.first()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{:>2} {}", production.index, production)?;
        }
        Ok(())
    }
}
