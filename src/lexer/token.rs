use serde::{Deserialize, Serialize};
use std::fmt;

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// Token without a source position, for hand-built token streams
    pub fn simple(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Token::new(kind, lexeme, 0, 0)
    }

    /// The end-of-input marker
    pub fn eof() -> Self {
        Token::simple(TokenKind::Eof, "")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::IntConst => {
                write!(f, "({}, {})", self.kind.name(), self.lexeme)
            }
            _ => write!(f, "({},)", self.kind.name()),
        }
    }
}

/// Terminal symbols of the language
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TokenKind {
    // Literals
    /// Identifier
    Identifier,
    /// Integer literal
    IntConst,

    // Keywords
    /// `int`
    Int,
    /// `return`
    Return,

    // Punctuation
    /// `=`
    Assign,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,

    /// End of input
    Eof,
}

/// Coarse classification of a token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// User-chosen name
    Identifier,
    /// Integer constant
    IntegerLiteral,
    /// Reserved word
    Keyword,
    /// Operator or delimiter
    Punctuation,
    /// End-of-input sentinel
    EndOfInput,
}

impl TokenKind {
    /// Classify this kind
    pub fn category(self) -> TokenCategory {
        match self {
            TokenKind::Identifier => TokenCategory::Identifier,
            TokenKind::IntConst => TokenCategory::IntegerLiteral,
            TokenKind::Int | TokenKind::Return => TokenCategory::Keyword,
            TokenKind::Eof => TokenCategory::EndOfInput,
            _ => TokenCategory::Punctuation,
        }
    }

    /// Look up a reserved word
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "int" => Some(TokenKind::Int),
            "return" => Some(TokenKind::Return),
            _ => None,
        }
    }

    /// Name used in grammar listings and token dumps
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "id",
            TokenKind::IntConst => "IntConst",
            TokenKind::Int => "int",
            TokenKind::Return => "return",
            TokenKind::Assign => "=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Eof => "$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_token_dump_format() {
        assert_eq!(Token::simple(TokenKind::Identifier, "a").to_string(), "(id, a)");
        assert_eq!(Token::simple(TokenKind::IntConst, "12").to_string(), "(IntConst, 12)");
        assert_eq!(Token::simple(TokenKind::Semicolon, ";").to_string(), "(Semicolon,)");
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::Return.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::Star.category(), TokenCategory::Punctuation);
        assert_eq!(TokenKind::keyword("int"), Some(TokenKind::Int));
        assert_eq!(TokenKind::keyword("integer"), None);
    }
}
