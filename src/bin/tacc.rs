use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tacc::cli::{self, CompileRequest};
use tacc::logger;

#[derive(Parser, Debug)]
#[command(name = "tacc", about = "Three-address code compiler emitting RISC-V assembly")]
struct Args {
    /// Turn on verbose logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Compile a source file to assembly
    Compile {
        file: PathBuf,
        /// Write the assembly listing here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Compile options as JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Precomputed parse table as JSON
        #[arg(long)]
        table: Option<PathBuf>,
        /// Print the token stream
        #[arg(long)]
        emit_tokens: bool,
        /// Print the IR before and after normalization
        #[arg(long)]
        emit_ir: bool,
        /// Print the symbol table and reduced productions
        #[arg(long)]
        emit_symbols: bool,
        /// Print every artifact as one JSON document
        #[arg(long)]
        emit_json: bool,
        /// Omit the IR comment on each assembly line
        #[arg(long)]
        no_comments: bool,
    },
    /// Print the grammar and write its parse table as JSON
    Table {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    logger::configure(args.verbose).map_err(anyhow::Error::msg)?;

    let mut stdout = io::stdout().lock();
    match args.action {
        Action::Compile {
            file,
            output,
            config,
            table,
            emit_tokens,
            emit_ir,
            emit_symbols,
            emit_json,
            no_comments,
        } => {
            let request = CompileRequest {
                file,
                output,
                config,
                table,
                emit_tokens,
                emit_ir,
                emit_symbols,
                emit_json,
                no_comments,
            };
            cli::compile(&request, &mut stdout).map(|_| ())
        }
        Action::Table { output } => cli::table(output.as_deref(), &mut stdout),
    }
}
