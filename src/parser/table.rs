//! # LR Action/Goto Tables
//!
//! The parse driver only talks to [`GrammarTable`]. [`LrTable`] is the
//! in-crate implementation: it can be built from a [`Grammar`] with the
//! SLR(1) construction or loaded from a precomputed JSON dump.
//!
//! ## Construction
//!
//! 1. Canonical collection of LR(0) item sets (closure + goto)
//! 2. FIRST / FOLLOW sets by fixpoint iteration
//! 3. Shift on terminal transitions, reduce on FOLLOW(head),
//!    accept on the completed start item
//!
//! Two different actions for one cell are reported as
//! [`Error::GrammarConflict`].

use super::grammar::{Grammar, GrammarSymbol, NonTerminal, Production};
use crate::error::{Error, Result};
use crate::lexer::TokenKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Parser automaton state
pub type StateId = usize;

/// What the driver does for a (state, lookahead) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'g> {
    /// Consume the lookahead and enter the state
    Shift(StateId),
    /// Reduce by the production
    Reduce(&'g Production),
    /// Input recognized
    Accept,
    /// No entry: syntax error
    Error,
}

/// Lookup interface the parse driver runs against
pub trait GrammarTable {
    /// State the automaton starts in
    fn initial_state(&self) -> StateId;

    /// Action for `state` with lookahead `terminal`
    fn action(&self, state: StateId, terminal: TokenKind) -> Action<'_>;

    /// Successor of `state` after reducing to `non_terminal`
    fn goto(&self, state: StateId, non_terminal: NonTerminal) -> Option<StateId>;
}

/// Serialized form of a non-error action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableEntry {
    /// Shift to state
    Shift(StateId),
    /// Reduce by production index
    Reduce(usize),
    /// Accept
    Accept,
}

/// Action/goto table for a grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LrTable {
    grammar: Grammar,
    initial: StateId,
    #[serde(skip)]
    actions: HashMap<(StateId, TokenKind), TableEntry>,
    #[serde(skip)]
    gotos: HashMap<(StateId, NonTerminal), StateId>,
    rows: Vec<SerializedRow>,
}

/// One state's entries as stored in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SerializedRow {
    actions: Vec<(TokenKind, TableEntry)>,
    gotos: Vec<(NonTerminal, StateId)>,
}

/// LR(0) item: production index and dot position
type Item = (usize, usize);

impl LrTable {
    /// Build the SLR(1) table for `grammar`
    pub fn build(grammar: Grammar) -> Result<Self> {
        let start = grammar
            .start()
            .ok_or_else(|| Error::config("grammar has no productions"))?;
        if start.len() != 1 {
            return Err(Error::config(
                "production 0 must be the augmented start rule with a single body symbol",
            ));
        }

        let builder = SlrBuilder::new(&grammar);
        let (states, transitions) = builder.canonical_collection();
        let follow = builder.follow_sets();

        let mut actions: HashMap<(StateId, TokenKind), TableEntry> = HashMap::new();
        let mut gotos = HashMap::new();

        for (state, items) in states.iter().enumerate() {
            for &(prod_idx, dot) in items {
                let production = &grammar.productions()[prod_idx];
                match production.body.get(dot) {
                    Some(GrammarSymbol::Terminal(terminal)) => {
                        let target = transitions
                            .get(&(state, GrammarSymbol::Terminal(*terminal)))
                            .copied()
                            .ok_or_else(|| {
                                Error::config(format!("state {} has no transition on {:?}", state, terminal))
                            })?;
                        insert_action(&mut actions, state, *terminal, TableEntry::Shift(target))?;
                    }
                    Some(GrammarSymbol::NonTerminal(_)) => {}
                    None if prod_idx == 0 => {
                        insert_action(&mut actions, state, TokenKind::Eof, TableEntry::Accept)?;
                    }
                    None => {
                        if let Some(lookaheads) = follow.get(&production.head) {
                            for &terminal in lookaheads {
                                insert_action(
                                    &mut actions,
                                    state,
                                    terminal,
                                    TableEntry::Reduce(prod_idx),
                                )?;
                            }
                        }
                    }
                }
            }
        }

        for (&(state, symbol), &target) in &transitions {
            if let GrammarSymbol::NonTerminal(nt) = symbol {
                gotos.insert((state, nt), target);
            }
        }

        tracing::debug!(
            states = states.len(),
            actions = actions.len(),
            gotos = gotos.len(),
            "built SLR(1) table"
        );

        let mut table = Self {
            grammar,
            initial: 0,
            actions,
            gotos,
            rows: Vec::new(),
        };
        table.rows = table.serialized_rows(states.len());
        Ok(table)
    }

    /// Table for [`Grammar::reference`]
    pub fn reference() -> Result<Self> {
        Self::build(Grammar::reference())
    }

    /// Grammar the table was built for
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Number of automaton states
    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw entry for a cell, `None` meaning error
    pub fn entry(&self, state: StateId, terminal: TokenKind) -> Option<TableEntry> {
        self.actions.get(&(state, terminal)).copied()
    }

    /// Serialize as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a precomputed table, checking that every entry refers to an
    /// existing state or production and that production indices match
    /// their positions
    pub fn from_json(json: &str) -> Result<Self> {
        let mut table: LrTable = serde_json::from_str(json)?;
        let state_count = table.rows.len();
        let production_count = table.grammar.productions().len();
        for (position, production) in table.grammar.productions().iter().enumerate() {
            if production.index != position {
                return Err(Error::config(format!(
                    "production {} is stored at position {}",
                    production.index, position
                )));
            }
        }
        if table.initial >= state_count {
            return Err(Error::config(format!(
                "initial state {} out of range ({} states)",
                table.initial, state_count
            )));
        }

        for (state, row) in table.rows.iter().enumerate() {
            for &(terminal, entry) in &row.actions {
                let valid = match entry {
                    TableEntry::Shift(target) => target < state_count,
                    TableEntry::Reduce(index) => index < production_count,
                    TableEntry::Accept => true,
                };
                if !valid {
                    return Err(Error::config(format!(
                        "state {} on {:?}: dangling entry {:?}",
                        state, terminal, entry
                    )));
                }
                table.actions.insert((state, terminal), entry);
            }
            for &(nt, target) in &row.gotos {
                if target >= state_count {
                    return Err(Error::config(format!(
                        "state {} goto {:?}: dangling state {}",
                        state, nt, target
                    )));
                }
                table.gotos.insert((state, nt), target);
            }
        }
        Ok(table)
    }

    fn serialized_rows(&self, state_count: usize) -> Vec<SerializedRow> {
        let mut rows: Vec<SerializedRow> = (0..state_count)
            .map(|_| SerializedRow {
                actions: Vec::new(),
                gotos: Vec::new(),
            })
            .collect();
        for (&(state, terminal), &entry) in &self.actions {
            rows[state].actions.push((terminal, entry));
        }
        for (&(state, nt), &target) in &self.gotos {
            rows[state].gotos.push((nt, target));
        }
        for row in &mut rows {
            row.actions.sort_by_key(|(terminal, _)| *terminal);
            row.gotos.sort_by_key(|(nt, _)| *nt);
        }
        rows
    }
}

impl GrammarTable for LrTable {
    fn initial_state(&self) -> StateId {
        self.initial
    }

    fn action(&self, state: StateId, terminal: TokenKind) -> Action<'_> {
        match self.actions.get(&(state, terminal)) {
            Some(TableEntry::Shift(target)) => Action::Shift(*target),
            Some(TableEntry::Reduce(index)) => match self.grammar.production(*index) {
                Some(production) => Action::Reduce(production),
                None => Action::Error,
            },
            Some(TableEntry::Accept) => Action::Accept,
            None => Action::Error,
        }
    }

    fn goto(&self, state: StateId, non_terminal: NonTerminal) -> Option<StateId> {
        self.gotos.get(&(state, non_terminal)).copied()
    }
}

fn insert_action(
    actions: &mut HashMap<(StateId, TokenKind), TableEntry>,
    state: StateId,
    terminal: TokenKind,
    entry: TableEntry,
) -> Result<()> {
    match actions.get(&(state, terminal)) {
        Some(existing) if *existing != entry => Err(Error::GrammarConflict {
            state,
            terminal,
            existing: format!("{:?}", existing),
            incoming: format!("{:?}", entry),
        }),
        Some(_) => Ok(()),
        None => {
            actions.insert((state, terminal), entry);
            Ok(())
        }
    }
}

/// Item-set and lookahead computations over one grammar
struct SlrBuilder<'g> {
    grammar: &'g Grammar,
}

impl<'g> SlrBuilder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    fn closure(&self, kernel: BTreeSet<Item>) -> BTreeSet<Item> {
        let mut items = kernel;
        let mut worklist: Vec<Item> = items.iter().copied().collect();

        while let Some((prod_idx, dot)) = worklist.pop() {
            let production = &self.grammar.productions()[prod_idx];
            if let Some(GrammarSymbol::NonTerminal(nt)) = production.body.get(dot) {
                for candidate in self.grammar.productions() {
                    if candidate.head == *nt && items.insert((candidate.index, 0)) {
                        worklist.push((candidate.index, 0));
                    }
                }
            }
        }
        items
    }

    fn advance(&self, items: &BTreeSet<Item>, symbol: GrammarSymbol) -> BTreeSet<Item> {
        let kernel = items
            .iter()
            .filter(|(prod_idx, dot)| {
                self.grammar.productions()[*prod_idx].body.get(*dot) == Some(&symbol)
            })
            .map(|&(prod_idx, dot)| (prod_idx, dot + 1))
            .collect();
        self.closure(kernel)
    }

    /// Item sets in discovery order plus the transition map between them
    fn canonical_collection(
        &self,
    ) -> (
        Vec<BTreeSet<Item>>,
        HashMap<(StateId, GrammarSymbol), StateId>,
    ) {
        let initial = self.closure(BTreeSet::from([(0, 0)]));
        let mut states = vec![initial.clone()];
        let mut index: HashMap<BTreeSet<Item>, StateId> = HashMap::from([(initial, 0)]);
        let mut transitions = HashMap::new();
        let mut queue = VecDeque::from([0]);

        while let Some(state) = queue.pop_front() {
            let symbols: BTreeSet<GrammarSymbol> = states[state]
                .iter()
                .filter_map(|&(prod_idx, dot)| {
                    self.grammar.productions()[prod_idx].body.get(dot).copied()
                })
                .collect();

            for symbol in symbols {
                let target_items = self.advance(&states[state], symbol);
                let target = match index.get(&target_items) {
                    Some(&existing) => existing,
                    None => {
                        let id = states.len();
                        states.push(target_items.clone());
                        index.insert(target_items, id);
                        queue.push_back(id);
                        id
                    }
                };
                transitions.insert((state, symbol), target);
            }
        }

        (states, transitions)
    }

    fn nullable(&self) -> HashSet<NonTerminal> {
        let mut nullable = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.grammar.productions() {
                if nullable.contains(&production.head) {
                    continue;
                }
                let all_nullable = production.body.iter().all(|symbol| match symbol {
                    GrammarSymbol::NonTerminal(nt) => nullable.contains(nt),
                    GrammarSymbol::Terminal(_) => false,
                });
                if all_nullable {
                    nullable.insert(production.head);
                    changed = true;
                }
            }
        }
        nullable
    }

    fn first_sets(&self, nullable: &HashSet<NonTerminal>) -> HashMap<NonTerminal, BTreeSet<TokenKind>> {
        let mut first: HashMap<NonTerminal, BTreeSet<TokenKind>> = HashMap::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.grammar.productions() {
                let additions = sequence_first(&production.body, &first, nullable).0;
                let entry = first.entry(production.head).or_default();
                let before = entry.len();
                entry.extend(additions);
                changed |= entry.len() != before;
            }
        }
        first
    }

    fn follow_sets(&self) -> HashMap<NonTerminal, BTreeSet<TokenKind>> {
        let nullable = self.nullable();
        let first = self.first_sets(&nullable);
        let mut follow: HashMap<NonTerminal, BTreeSet<TokenKind>> = HashMap::new();

        if let Some(start) = self.grammar.start() {
            follow.entry(start.head).or_default().insert(TokenKind::Eof);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for production in self.grammar.productions() {
                for (pos, symbol) in production.body.iter().enumerate() {
                    let GrammarSymbol::NonTerminal(nt) = symbol else {
                        continue;
                    };
                    let (mut additions, rest_nullable) =
                        sequence_first(&production.body[pos + 1..], &first, &nullable);
                    if rest_nullable {
                        if let Some(head_follow) = follow.get(&production.head) {
                            additions.extend(head_follow.iter().copied());
                        }
                    }
                    let entry = follow.entry(*nt).or_default();
                    let before = entry.len();
                    entry.extend(additions);
                    changed |= entry.len() != before;
                }
            }
        }
        follow
    }
}

/// FIRST of a symbol sequence and whether the whole sequence is nullable
fn sequence_first(
    symbols: &[GrammarSymbol],
    first: &HashMap<NonTerminal, BTreeSet<TokenKind>>,
    nullable: &HashSet<NonTerminal>,
) -> (BTreeSet<TokenKind>, bool) {
    let mut result = BTreeSet::new();
    for symbol in symbols {
        match symbol {
            GrammarSymbol::Terminal(terminal) => {
                result.insert(*terminal);
                return (result, false);
            }
            GrammarSymbol::NonTerminal(nt) => {
                if let Some(set) = first.get(nt) {
                    result.extend(set.iter().copied());
                }
                if !nullable.contains(nt) {
                    return (result, false);
                }
            }
        }
    }
    (result, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::prod;

    #[test]
    fn test_reference_grammar_is_slr() {
        let table = LrTable::reference().unwrap();
        assert!(table.state_count() > 10);
        let initial = table.initial_state();
        assert!(matches!(
            table.action(initial, TokenKind::Int),
            Action::Shift(_)
        ));
        assert!(matches!(
            table.action(initial, TokenKind::IntConst),
            Action::Error
        ));
        assert!(table.goto(initial, NonTerminal::Program).is_some());
    }

    #[test]
    fn test_accept_after_program() {
        let table = LrTable::reference().unwrap();
        let after_program = table
            .goto(table.initial_state(), NonTerminal::Program)
            .unwrap();
        assert_eq!(
            table.action(after_program, TokenKind::Eof),
            Action::Accept
        );
    }

    #[test]
    fn test_reduce_uses_follow_sets() {
        let table = LrTable::reference().unwrap();
        let initial = table.initial_state();
        let Action::Shift(after_int) = table.action(initial, TokenKind::Int) else {
            panic!("expected shift on int");
        };
        match table.action(after_int, TokenKind::Identifier) {
            Action::Reduce(production) => assert_eq!(production.index, prod::INT_TYPE),
            other => panic!("expected reduce by D -> int, got {:?}", other),
        }
        assert_eq!(table.action(after_int, TokenKind::Semicolon), Action::Error);
    }

    #[test]
    fn test_ambiguous_grammar_reports_conflict() {
        use GrammarSymbol::{NonTerminal as N, Terminal as T};
        // E -> E + E | IntConst
        let grammar = Grammar::new(vec![
            (NonTerminal::Start, vec![N(NonTerminal::Expr)]),
            (
                NonTerminal::Expr,
                vec![N(NonTerminal::Expr), T(TokenKind::Plus), N(NonTerminal::Expr)],
            ),
            (NonTerminal::Expr, vec![T(TokenKind::IntConst)]),
        ]);
        let err = LrTable::build(grammar).unwrap_err();
        assert!(matches!(
            err,
            Error::GrammarConflict {
                terminal: TokenKind::Plus,
                ..
            }
        ));
    }

    #[test]
    fn test_epsilon_production() {
        use GrammarSymbol::{NonTerminal as N, Terminal as T};
        // P -> S_list ; S_list -> S_list int | <empty>
        let grammar = Grammar::new(vec![
            (NonTerminal::Start, vec![N(NonTerminal::StatementList)]),
            (
                NonTerminal::StatementList,
                vec![N(NonTerminal::StatementList), T(TokenKind::Int)],
            ),
            (NonTerminal::StatementList, vec![]),
        ]);
        let table = LrTable::build(grammar).unwrap();
        match table.action(table.initial_state(), TokenKind::Eof) {
            Action::Reduce(production) => assert!(production.is_empty()),
            other => panic!("expected epsilon reduce, got {:?}", other),
        }
    }

    #[test]
    fn test_json_round_trip_preserves_lookups() {
        let table = LrTable::reference().unwrap();
        let json = table.to_json().unwrap();
        let loaded = LrTable::from_json(&json).unwrap();
        assert_eq!(loaded.state_count(), table.state_count());
        for state in 0..table.state_count() {
            assert_eq!(
                loaded.entry(state, TokenKind::Semicolon),
                table.entry(state, TokenKind::Semicolon)
            );
            assert_eq!(
                loaded.goto(state, NonTerminal::Expr),
                table.goto(state, NonTerminal::Expr)
            );
        }
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            LrTable::from_json("{\"not\": \"a table\"}"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_renumbered_production() {
        let json = LrTable::reference().unwrap().to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["grammar"]["productions"][prod::FACTOR_INT]["index"] = serde_json::json!(prod::RETURN);
        let err = LrTable::from_json(&value.to_string()).unwrap_err();
        assert_eq!(
            err,
            Error::config("production 7 is stored at position 15")
        );
    }
}
