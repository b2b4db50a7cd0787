//! Implements the command line behavior.

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::compiler::{
    format_ir, format_reductions, format_symbols, format_tokens, CompileOptions, CompileResult,
    Compiler,
};
use crate::parser::LrTable;

/// Inputs of the `compile` subcommand
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    pub file: PathBuf,
    /// Listing destination; `None` writes to `out`
    pub output: Option<PathBuf>,
    /// Compile options as JSON
    pub config: Option<PathBuf>,
    /// Precomputed parse table as JSON
    pub table: Option<PathBuf>,
    pub emit_tokens: bool,
    pub emit_ir: bool,
    pub emit_symbols: bool,
    pub emit_json: bool,
    pub no_comments: bool,
}

// Compiles one file. Dumps and the listing go to `out`, warnings to stderr.
pub fn compile(request: &CompileRequest, out: &mut dyn Write) -> Result<CompileResult> {
    let mut options = match &request.config {
        Some(path) => CompileOptions::load(path)?,
        None => CompileOptions::default(),
    };
    if request.no_comments {
        options.emit_comments = false;
    }

    let compiler = match &request.table {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading table {}", path.display()))?;
            Compiler::with_table(options, LrTable::from_json(&json)?)?
        }
        None => Compiler::new(options)?,
    };

    let file = &request.file;
    let source =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let result = compiler
        .compile(&source)
        .with_context(|| format!("compiling {}", file.display()))?;

    if request.emit_tokens {
        write!(out, "{}", format_tokens(&result.tokens))?;
    }
    if request.emit_symbols {
        write!(out, "{}", format_symbols(&result.symbols))?;
        write!(
            out,
            "{}",
            format_reductions(&result.events, compiler.table().grammar())
        )?;
    }
    if request.emit_ir {
        writeln!(out, "; IR")?;
        write!(out, "{}", format_ir(&result.ir))?;
        writeln!(out, "; normalized")?;
        write!(out, "{}", format_ir(&result.normalized))?;
    }
    if request.emit_json {
        writeln!(out, "{}", result.to_json()?)?;
    }
    for warning in result.warnings() {
        eprintln!("warning: {}", warning);
    }

    let listing = result.assembly.render();
    match &request.output {
        Some(path) => {
            fs::write(path, listing).with_context(|| format!("writing {}", path.display()))?
        }
        None => write!(out, "{}", listing)?,
    }
    Ok(result)
}

// Prints the reference grammar and writes its parse table as JSON.
pub fn table(output: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let table = LrTable::reference()?;
    write!(out, "{}", table.grammar())?;
    let json = table.to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}
