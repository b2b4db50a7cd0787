use super::token::{Token, TokenKind};
use crate::error::{Error, Result};
use crate::symtab::SymbolTable;

/// Scanner for the statement language
///
/// Identifiers are `[A-Za-z][A-Za-z0-9]*`, literals are decimal digits,
/// and `int` / `return` are reserved.
pub struct Scanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Column where the current token starts
    start_column: usize,
}

impl Scanner {
    /// Creates a new scanner from source code
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_column: 1,
        }
    }

    /// Scans all tokens, registering identifiers in `symbols`
    pub fn scan_tokens(&mut self, symbols: &mut SymbolTable) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_column = self.column;
            self.scan_token(symbols)?;
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.line, self.column));

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self, symbols: &mut SymbolTable) -> Result<()> {
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' => {}
            '\n' => {
                self.line += 1;
                self.column = 1;
            }

            '=' => self.add_token(TokenKind::Assign),
            ',' => self.add_token(TokenKind::Comma),
            ';' => self.add_token(TokenKind::Semicolon),
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '/' => self.add_token(TokenKind::Slash),
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),

            c if c.is_ascii_digit() => self.scan_number()?,
            c if c.is_ascii_alphabetic() => self.scan_identifier_or_keyword(symbols),

            _ => {
                return Err(Error::UnexpectedCharacter {
                    ch: c,
                    line: self.line,
                    column: self.start_column,
                });
            }
        }

        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let text = self.lexeme();
        if text.parse::<i64>().is_err() {
            return Err(Error::InvalidInteger {
                text,
                line: self.line,
            });
        }
        self.add_token(TokenKind::IntConst);
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self, symbols: &mut SymbolTable) {
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        let text = self.lexeme();
        match TokenKind::keyword(&text) {
            Some(kind) => self.add_token(kind),
            None => {
                symbols.add(&text);
                self.add_token(TokenKind::Identifier);
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.lexeme();
        self.tokens
            .push(Token::new(kind, lexeme, self.line, self.start_column));
    }
}
