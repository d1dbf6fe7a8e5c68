use std::fmt;

use phf::phf_map;
use serde::Serialize;

/// Reserved words, consulted only after a whole identifier has been matched.
pub(super) static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "if" => TokenKind::If,
    "for" => TokenKind::For,
    "int" => TokenKind::Int,
    "string" => TokenKind::String,
    "char" => TokenKind::Char,
};

pub(super) static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '(' => TokenKind::LeftParen,
    ')' => TokenKind::RightParen,
    '=' => TokenKind::Equal,
    ';' => TokenKind::SemiColon,
    ',' => TokenKind::Comma,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum TokenKind {
    Ident(String),
    Num(i64),
    CharLiteral(String),

    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Equal,
    SemiColon,
    Comma,

    If,
    For,
    Int,
    String,
    Char,
}

impl TokenKind {
    /// Upper-case class name used by the token listing.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "IDENTIFIER",
            TokenKind::Num(_) => "NUMBER",
            TokenKind::CharLiteral(_) => "CHAR_LITERAL",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::Equal => "EQUALS",
            TokenKind::SemiColon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::If => "IF",
            TokenKind::For => "FOR",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Char => "CHAR",
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::For | TokenKind::Int | TokenKind::String | TokenKind::Char
        )
    }
}

/// Location of a token or diagnostic in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }
}

/// `<KIND, value>`, numbers shown by value and everything else by its text.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            TokenKind::Num(value) => write!(f, "<{}, {}>", self.kind.name(), value),
            kind => write!(f, "<{}, {}>", kind.name(), self.lexeme),
        }
    }
}
