//! Tests for the LR driver and its observer protocol

use std::cell::RefCell;
use std::rc::Rc;

use tacc::compiler::{IrBuilder, TypePropagator};
use tacc::error::Result;
use tacc::lexer::{Token, TokenKind};
use tacc::parser::{
    prod, Action, ActionObserver, Grammar, GrammarSymbol, GrammarTable, LrTable, NonTerminal,
    ParseDriver, ParseEvent, Production, ProductionCollector, StateId,
};
use tacc::{CompileOptions, Compiler, Error, Scanner, SymbolTable, SymbolTableRef};

/// `P' -> P`, `P -> IntConst` with hand-written states 0..=2
struct LiteralTable {
    grammar: Grammar,
    with_goto: bool,
}

impl LiteralTable {
    fn new(with_goto: bool) -> Self {
        let grammar = Grammar::new(vec![
            (
                NonTerminal::Start,
                vec![GrammarSymbol::NonTerminal(NonTerminal::Program)],
            ),
            (
                NonTerminal::Program,
                vec![GrammarSymbol::Terminal(TokenKind::IntConst)],
            ),
        ]);
        Self { grammar, with_goto }
    }
}

impl GrammarTable for LiteralTable {
    fn initial_state(&self) -> StateId {
        0
    }

    fn action(&self, state: StateId, terminal: TokenKind) -> Action<'_> {
        match (state, terminal) {
            (0, TokenKind::IntConst) => Action::Shift(1),
            (1, TokenKind::Eof) => match self.grammar.production(1) {
                Some(production) => Action::Reduce(production),
                None => Action::Error,
            },
            (2, TokenKind::Eof) => Action::Accept,
            _ => Action::Error,
        }
    }

    fn goto(&self, state: StateId, non_terminal: NonTerminal) -> Option<StateId> {
        match (state, non_terminal) {
            (0, NonTerminal::Program) if self.with_goto => Some(2),
            _ => None,
        }
    }
}

/// Accepts the empty input immediately
struct AcceptEmpty;

impl GrammarTable for AcceptEmpty {
    fn initial_state(&self) -> StateId {
        0
    }

    fn action(&self, _state: StateId, terminal: TokenKind) -> Action<'_> {
        if terminal == TokenKind::Eof {
            Action::Accept
        } else {
            Action::Error
        }
    }

    fn goto(&self, _state: StateId, _non_terminal: NonTerminal) -> Option<StateId> {
        None
    }
}

/// Appends `name:event` to a shared log
struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    fail_on_reduce: bool,
    bound: Option<SymbolTableRef>,
}

impl Recorder {
    fn new(name: &'static str, log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            name,
            log,
            fail_on_reduce: false,
            bound: None,
        }
    }
}

impl ActionObserver for Recorder {
    fn bind_symbol_table(&mut self, table: SymbolTableRef) {
        self.bound = Some(table);
    }

    fn on_shift(&mut self, _state: StateId, token: &Token) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("{}:shift {}", self.name, token.kind.name()));
        Ok(())
    }

    fn on_reduce(&mut self, _state: StateId, production: &Production) -> Result<()> {
        if self.fail_on_reduce {
            return Err(Error::invariant("observer refused reduction"));
        }
        self.log
            .borrow_mut()
            .push(format!("{}:reduce {}", self.name, production.index));
        Ok(())
    }

    fn on_accept(&mut self, _state: StateId) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:accept", self.name));
        Ok(())
    }
}

fn literal_tokens() -> Vec<Token> {
    vec![Token::simple(TokenKind::IntConst, "7"), Token::eof()]
}

fn shared_symbols() -> SymbolTableRef {
    SymbolTable::new().into_shared()
}

// ====================
// Event protocol
// ====================

#[test]
fn test_shift_reports_state_before_and_reduce_reports_goto_target() {
    let table = LiteralTable::new(true);
    let mut collector = ProductionCollector::new();
    {
        let mut driver = ParseDriver::new(shared_symbols());
        driver.register_observer(&mut collector);
        driver.run(literal_tokens(), &table).unwrap();
    }
    assert_eq!(
        collector.events(),
        &[
            ParseEvent::Shift {
                state: 0,
                kind: TokenKind::IntConst
            },
            ParseEvent::Reduce {
                state: 2,
                index: 1,
                head: NonTerminal::Program
            },
            ParseEvent::Accept { state: 2 },
        ]
    );
    assert!(collector.accepted());
}

#[test]
fn test_observers_notified_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut first = Recorder::new("first", log.clone());
    let mut second = Recorder::new("second", log.clone());
    {
        let mut driver = ParseDriver::new(shared_symbols());
        driver.register_observer(&mut first);
        driver.register_observer(&mut second);
        assert_eq!(driver.observer_count(), 2);
        driver.run(literal_tokens(), &LiteralTable::new(true)).unwrap();
    }
    assert_eq!(
        *log.borrow(),
        vec![
            "first:shift IntConst",
            "second:shift IntConst",
            "first:reduce 1",
            "second:reduce 1",
            "first:accept",
            "second:accept",
        ]
    );
}

#[test]
fn test_registration_binds_shared_symbol_table() {
    let symbols = shared_symbols();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut recorder = Recorder::new("r", log);
    {
        let mut driver = ParseDriver::new(symbols.clone());
        driver.register_observer(&mut recorder);
    }
    let bound = recorder.bound.expect("symbol table bound at registration");
    assert!(Rc::ptr_eq(&bound, &symbols));
}

#[test]
fn test_observer_error_aborts_run() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut failing = Recorder::new("failing", log.clone());
    failing.fail_on_reduce = true;
    let mut after = Recorder::new("after", log.clone());
    let err = {
        let mut driver = ParseDriver::new(shared_symbols());
        driver.register_observer(&mut failing);
        driver.register_observer(&mut after);
        driver
            .run(literal_tokens(), &LiteralTable::new(true))
            .unwrap_err()
    };
    assert!(matches!(err, Error::IrInvariant(_)));
    assert_eq!(
        *log.borrow(),
        vec!["failing:shift IntConst", "after:shift IntConst"]
    );
}

// ====================
// Failures
// ====================

#[test]
fn test_missing_goto() {
    let mut driver = ParseDriver::new(shared_symbols());
    let err = driver
        .run(literal_tokens(), &LiteralTable::new(false))
        .unwrap_err();
    assert_eq!(
        err,
        Error::MissingGoto {
            state: 0,
            non_terminal: NonTerminal::Program
        }
    );
}

#[test]
fn test_input_without_end_marker() {
    let mut driver = ParseDriver::new(shared_symbols());
    let err = driver
        .run(
            vec![Token::simple(TokenKind::IntConst, "7")],
            &LiteralTable::new(true),
        )
        .unwrap_err();
    assert_eq!(err, Error::UnexpectedEof);
}

#[test]
fn test_error_action_reports_state_and_token() {
    let mut driver = ParseDriver::new(shared_symbols());
    let err = driver
        .run(
            vec![Token::new(TokenKind::Plus, "+", 3, 9), Token::eof()],
            &LiteralTable::new(true),
        )
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnexpectedToken {
            state: 0,
            kind: TokenKind::Plus,
            lexeme: "+".to_string(),
            line: 3,
            column: 9
        }
    );
}

// ====================
// Reference grammar
// ====================

#[test]
fn test_reference_reductions_for_return() {
    let table = LrTable::reference().unwrap();
    let mut symbols = SymbolTable::new();
    let tokens = Scanner::new("return 7;").scan_tokens(&mut symbols).unwrap();
    let mut collector = ProductionCollector::new();
    {
        let mut driver = ParseDriver::new(symbols.into_shared());
        driver.register_observer(&mut collector);
        driver.run(tokens, &table).unwrap();
    }
    assert_eq!(
        collector.reductions(),
        vec![
            prod::FACTOR_INT,
            prod::TERM_FACTOR,
            prod::EXPR_TERM,
            prod::RETURN,
            prod::LIST_LAST,
            prod::PROGRAM,
        ]
    );
}

#[test]
fn test_subscriber_stacks_drained_on_accept() {
    let table = LrTable::reference().unwrap();
    let mut symbols = SymbolTable::new();
    let tokens = Scanner::new("int a; a = (1 + a) * 2; return a;")
        .scan_tokens(&mut symbols)
        .unwrap();
    let mut propagator = TypePropagator::new();
    let mut builder = IrBuilder::new();
    {
        let mut driver = ParseDriver::new(symbols.into_shared());
        driver.register_observer(&mut propagator);
        driver.register_observer(&mut builder);
        driver.run(tokens, &table).unwrap();
    }
    assert_eq!(propagator.stack_depth(), 0);
    assert_eq!(builder.stack_depth(), 0);
    assert_eq!(builder.instructions().len(), 4);
}

#[test]
fn test_loaded_table_parses_like_built_table() {
    let built = LrTable::reference().unwrap();
    let loaded = LrTable::from_json(&built.to_json().unwrap()).unwrap();
    let source = "int b; b = 3 - 1; return b * b;";

    let with_built = Compiler::with_table(CompileOptions::default(), built)
        .unwrap()
        .compile(source)
        .unwrap();
    let with_loaded = Compiler::with_table(CompileOptions::default(), loaded)
        .unwrap()
        .compile(source)
        .unwrap();
    assert_eq!(with_built.events, with_loaded.events);
    assert_eq!(with_built.assembly, with_loaded.assembly);
}

#[test]
fn test_empty_program_with_accepting_table() {
    let compiler = Compiler::new(CompileOptions::default()).unwrap();
    let result = compiler
        .compile_tokens(vec![Token::eof()], SymbolTable::new(), &AcceptEmpty)
        .unwrap();
    assert!(result.ir.is_empty());
    assert!(result.normalized.is_empty());
    assert!(result.assembly.is_empty());
    assert_eq!(result.events, vec![ParseEvent::Accept { state: 0 }]);
}
