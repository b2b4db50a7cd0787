//! # Compiler - statements to RISC-V style assembly
//!
//! ## Architecture
//!
//! ```text
//! Source → Tokens → LR parse ─┬─ TypePropagator → typed symbol table
//!                             └─ IrBuilder → IR → Normalize → Allocate/Emit → Assembly
//! ```
//!
//! ## Usage
//!
//! ```
//! use tacc::compiler::{CompileOptions, Compiler};
//!
//! let compiler = Compiler::new(CompileOptions::default())?;
//! let result = compiler.compile("int a; a = 1 + 2 * 3; return a;")?;
//! assert_eq!(result.assembly.texts().last().unwrap(), "mv a0, t2");
//! # Ok::<(), tacc::Error>(())
//! ```

pub mod asm_codegen;
pub mod debug;
pub mod ir;
pub mod normalize;
pub mod regalloc;
pub mod types;

pub use asm_codegen::{AsmCodegen, AsmLine, AssemblyProgram};
pub use debug::{format_ir, format_reductions, format_symbols, format_tokens};
pub use ir::{BinaryOp, Instruction, IrBuilder, IrProgram, IrValue, IrVariable};
pub use normalize::{normalize, Normalizer, ADDI_IMMEDIATE_RANGE};
pub use regalloc::{usage_counts, RegisterAllocator, UsageCounts};
pub use types::TypePropagator;

use crate::error::{Error, Result};
use crate::lexer::{Scanner, Token};
use crate::parser::{GrammarTable, LrTable, ParseDriver, ParseEvent, ProductionCollector};
use crate::symtab::SymbolTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Compilation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Allocatable registers in preference order
    pub registers: Vec<String>,
    /// Register receiving the returned value
    pub return_register: String,
    /// Append `# <ir>` to each assembly line
    pub emit_comments: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            registers: (0..7).map(|i| format!("t{}", i)).collect(),
            return_register: "a0".to_string(),
            emit_comments: true,
        }
    }
}

impl CompileOptions {
    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: CompileOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.registers.is_empty() {
            return Err(Error::config("at least one register is required"));
        }
        if self.return_register.is_empty() {
            return Err(Error::config("return register must be named"));
        }
        if self.registers.contains(&self.return_register) {
            return Err(Error::config(format!(
                "return register {} is also allocatable",
                self.return_register
            )));
        }
        Ok(())
    }
}

/// Compilation result with intermediate artifacts
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Scanned tokens, ending with end-of-input
    pub tokens: Vec<Token>,
    /// Symbol table after type propagation
    pub symbols: SymbolTable,
    /// Parser events in notification order
    pub events: Vec<ParseEvent>,
    /// IR as built during the parse
    pub ir: IrProgram,
    /// IR after normalization
    pub normalized: IrProgram,
    /// Generated assembly
    pub assembly: AssemblyProgram,
    /// Non-fatal diagnostics from type propagation
    pub diagnostics: Vec<Error>,
}

impl CompileResult {
    /// Diagnostics as display strings
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    /// Machine-readable dump of every artifact except parser events
    pub fn to_json(&self) -> Result<String> {
        let report = CompileReport {
            tokens: &self.tokens,
            symbols: &self.symbols,
            ir: &self.ir,
            normalized: &self.normalized,
            assembly: &self.assembly,
            warnings: self.warnings(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[derive(Serialize)]
struct CompileReport<'a> {
    tokens: &'a [Token],
    symbols: &'a SymbolTable,
    ir: &'a IrProgram,
    normalized: &'a IrProgram,
    assembly: &'a AssemblyProgram,
    warnings: Vec<String>,
}

/// Statement-language compiler
pub struct Compiler {
    options: CompileOptions,
    table: LrTable,
}

impl Compiler {
    /// Create a compiler for the built-in grammar
    pub fn new(options: CompileOptions) -> Result<Self> {
        Self::with_table(options, LrTable::reference()?)
    }

    /// Create a compiler over a prebuilt or loaded table
    pub fn with_table(options: CompileOptions, table: LrTable) -> Result<Self> {
        options.validate()?;
        Ok(Self { options, table })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn table(&self) -> &LrTable {
        &self.table
    }

    /// Compile source text to assembly
    pub fn compile(&self, source: &str) -> Result<CompileResult> {
        // Phase 1: Scan
        let mut symbols = SymbolTable::new();
        let tokens = Scanner::new(source).scan_tokens(&mut symbols)?;
        debug!(tokens = tokens.len(), identifiers = symbols.len(), "scanned");

        self.compile_tokens(tokens, symbols, &self.table)
    }

    /// Compile an already scanned token stream against any grammar table
    pub fn compile_tokens<T: GrammarTable + ?Sized>(
        &self,
        tokens: Vec<Token>,
        symbols: SymbolTable,
        table: &T,
    ) -> Result<CompileResult> {
        // Phase 2: Parse with type propagation and IR construction
        let shared = symbols.into_shared();
        let mut propagator = TypePropagator::new();
        let mut builder = IrBuilder::new();
        let mut collector = ProductionCollector::new();
        {
            let mut driver = ParseDriver::new(shared.clone());
            driver.register_observer(&mut propagator);
            driver.register_observer(&mut builder);
            driver.register_observer(&mut collector);
            driver.run(tokens.iter().cloned(), table)?;
        }
        let diagnostics = propagator.into_diagnostics();
        if !diagnostics.is_empty() {
            warn!(count = diagnostics.len(), "type propagation reported diagnostics");
        }
        let ir = builder.into_program();
        debug!(instructions = ir.len(), "built IR");

        // Phase 3: Normalize
        let normalized = Normalizer::new().normalize(&ir);

        // Phase 4: Allocate registers and emit
        let allocator = RegisterAllocator::for_instructions(
            self.options.registers.clone(),
            &normalized.instructions,
        )?;
        let codegen = AsmCodegen::new(
            self.options.return_register.clone(),
            self.options.emit_comments,
        );
        let assembly = codegen.generate(&normalized.instructions, allocator)?;

        let symbols = shared.borrow().clone();
        Ok(CompileResult {
            tokens,
            symbols,
            events: collector.events().to_vec(),
            ir,
            normalized,
            assembly,
            diagnostics,
        })
    }
}
