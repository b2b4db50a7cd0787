//! Error types for the tacc pipeline

use crate::lexer::TokenKind;
use crate::parser::NonTerminal;
use thiserror::Error;

/// Errors raised while scanning, parsing, translating or generating code
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Lexical errors
    /// Character that does not start any token
    ///
    /// **Triggered by:** characters outside the language alphabet
    /// **Example:** `a = 1 # 2;`
    #[error("Unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter {
        /// Offending character
        ch: char,
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
    },

    /// Integer literal that does not fit the IR integer width
    #[error("Invalid integer literal '{text}' at line {line}")]
    InvalidInteger {
        /// Literal text
        text: String,
        /// Line number (1-indexed)
        line: usize,
    },

    // Parse errors
    /// The action table has no entry for the current state and lookahead
    ///
    /// **Triggered by:** syntactically invalid input
    /// **Example:** `int = 3;`
    #[error("Parse error in state {state}: unexpected {kind:?} '{lexeme}' at line {line}, column {column}")]
    UnexpectedToken {
        /// Parser state at the time of the error
        state: usize,
        /// Kind of the lookahead token
        kind: TokenKind,
        /// Text of the lookahead token
        lexeme: String,
        /// Line of the lookahead token
        line: usize,
        /// Column of the lookahead token
        column: usize,
    },

    /// The token stream ended without an end-of-input token
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// The goto table has no entry for a reduced non-terminal
    #[error("No goto entry for {non_terminal:?} in state {state}")]
    MissingGoto {
        /// State uncovered by the reduction
        state: usize,
        /// Head of the reduced production
        non_terminal: NonTerminal,
    },

    // Semantic diagnostics (non-fatal)
    /// Identifier referenced before it was declared
    #[error("Undeclared identifier '{name}' at line {line}, column {column}")]
    UndeclaredIdentifier {
        /// Identifier name
        name: String,
        /// Line of the reference
        line: usize,
        /// Column of the reference
        column: usize,
    },

    /// Identifier missing from the symbol table
    ///
    /// **Triggered by:** a token stream that was not produced by the scanner
    /// feeding the same symbol table
    #[error("No such identifier in symbol table: '{name}' at line {line}, column {column}")]
    UnknownIdentifier {
        /// Identifier name
        name: String,
        /// Line of the declaration
        line: usize,
        /// Column of the declaration
        column: usize,
    },

    // Internal invariant violations
    /// A translation action saw a value shape the grammar should never produce
    #[error("IR invariant violated: {0}")]
    IrInvariant(String),

    /// A subscriber was notified about a production it has no rule for
    #[error("No translation rule for production {index}")]
    UnknownProduction {
        /// Production index
        index: usize,
    },

    // Code generation
    /// Every register holds a variable that is still needed
    ///
    /// **Triggered by:** more simultaneously live values than registers
    /// **Recovery:** none, the backend does not spill
    #[error("Register pressure exceeds capacity: no register available for {variable} ({capacity} registers, all live)")]
    RegisterExhausted {
        /// Variable that could not be placed
        variable: String,
        /// Number of physical registers
        capacity: usize,
    },

    // Configuration
    /// The grammar is not SLR(1)
    #[error("Grammar conflict in state {state} on {terminal:?}: {existing} vs {incoming}")]
    GrammarConflict {
        /// State with two actions for one terminal
        state: usize,
        /// Terminal with conflicting actions
        terminal: TokenKind,
        /// Action already in the table
        existing: String,
        /// Action that collided with it
        incoming: String,
    },

    /// Invalid compile options or table data
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Aborts the pipeline run
    Fatal,
    /// Reported and collected, translation continues
    Warning,
}

impl Error {
    /// Create an IR invariant error with a message
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::IrInvariant(msg.into())
    }

    /// Create a configuration error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::UndeclaredIdentifier { .. } | Error::UnknownIdentifier { .. } => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Fatal,
        }
    }

    /// True for parse-stage failures (lexical or syntactic)
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedCharacter { .. }
                | Error::InvalidInteger { .. }
                | Error::UnexpectedToken { .. }
                | Error::UnexpectedEof
                | Error::MissingGoto { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for tacc operations
pub type Result<T> = std::result::Result<T, Error>;
