//! # tacc - an LR-driven three-address code compiler
//!
//! Compiles a tiny statement language (integer declarations, assignments,
//! `+ - *` expressions and `return`) to RISC-V style assembly.
//!
//! ## Pipeline
//!
//! ```text
//! Scanner → ParseDriver ─┬─ TypePropagator   (symbol table types)
//!                        ├─ IrBuilder        (three-address IR)
//!                        └─ ProductionCollector
//!         → Normalizer → RegisterAllocator + AsmCodegen → assembly
//! ```
//!
//! The parse driver is table-driven and knows nothing about translation;
//! translation passes subscribe to its shift/reduce/accept events through
//! [`parser::ActionObserver`] and keep their own value stacks.
//!
//! ## Quick Start
//!
//! ```rust
//! use tacc::{CompileOptions, Compiler};
//!
//! # fn main() -> tacc::Result<()> {
//! let compiler = Compiler::new(CompileOptions::default())?;
//! let result = compiler.compile("int a; a = 1 + 2 * 3; return a;")?;
//!
//! assert_eq!(
//!     result.assembly.texts(),
//!     vec!["li t0, 6", "addi t1, t0, 1", "mv t2, t1", "mv a0, t2"]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-level use
//!
//! The stages can be driven separately, for instance to run the parser
//! with a custom observer:
//!
//! ```rust
//! use tacc::{LrTable, ParseDriver, ProductionCollector, Scanner, SymbolTable};
//!
//! # fn main() -> tacc::Result<()> {
//! let table = LrTable::reference()?;
//! let mut symbols = SymbolTable::new();
//! let tokens = Scanner::new("return 7;").scan_tokens(&mut symbols)?;
//!
//! let mut collector = ProductionCollector::new();
//! let mut driver = ParseDriver::new(symbols.into_shared());
//! driver.register_observer(&mut collector);
//! driver.run(tokens, &table)?;
//! drop(driver);
//!
//! assert!(collector.accepted());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod logger;
pub mod parser;
pub mod symtab;

pub use compiler::{CompileOptions, CompileResult, Compiler};
pub use error::{Error, ErrorSeverity, Result};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::{
    ActionObserver, Grammar, GrammarTable, LrTable, ParseDriver, ProductionCollector,
};
pub use symtab::{SourceType, SymbolTable, SymbolTableRef};
