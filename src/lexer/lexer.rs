use log::{debug, trace};
use thiserror::Error;

use super::{
    token::{KEYWORDS, ONE_SYMBOL_TOKENS},
    Position, Token, TokenKind,
};

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    #[error("unrecognized character '{ch}' at {pos}")]
    UnrecognizedChar { ch: char, pos: Position },

    #[error("number '{literal}' at {pos} does not fit in a 64-bit integer")]
    NumberOutOfRange { literal: String, pos: Position },
}

impl LexError {
    pub fn pos(&self) -> Position {
        match self {
            LexError::UnrecognizedChar { pos, .. } | LexError::NumberOutOfRange { pos, .. } => *pos,
        }
    }
}

/// Lazily splits source text into tokens.
///
/// Each call to `next` skips whitespace and yields either one token or one
/// recoverable error; after an error the lexer has already moved past the
/// offending input, so iteration can simply continue. The iterator is
/// exhausted once the input is and cannot be rewound.
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    pos: Position,
}

impl Lexer {
    pub fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
            index: 0,
            pos: Position::start(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            s.push(c);
            self.advance();
        }
        s
    }

    fn skip_whitespace(&mut self) {
        self.take_while(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
    }

    fn parse_number(&mut self, pos: Position) -> Result<Token, LexError> {
        let s = self.take_while(|c| c.is_ascii_digit());
        match s.parse() {
            Ok(value) => Ok(Token::new(TokenKind::Num(value), s, pos)),
            Err(_) => Err(LexError::NumberOutOfRange { literal: s, pos }),
        }
    }

    /// Matches the whole word first so that `integer` never splits into `int` + `eger`.
    fn parse_identifier(&mut self, pos: Position) -> Token {
        let s = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');

        if let Some(kind) = KEYWORDS.get(s.as_str()) {
            Token::new(kind.clone(), s, pos)
        } else {
            Token::new(TokenKind::Ident(s.clone()), s, pos)
        }
    }

    /// `'...'` with no quote inside. The lexeme keeps both quotes, the kind
    /// carries only the enclosed text.
    fn parse_char_literal(&mut self, pos: Position) -> Result<Token, LexError> {
        let closing = self.chars[self.index + 1..]
            .iter()
            .position(|&c| c == '\'');

        let Some(len) = closing else {
            self.advance();
            return Err(LexError::UnrecognizedChar { ch: '\'', pos });
        };

        let mut lexeme = String::with_capacity(len + 2);
        for _ in 0..len + 2 {
            if let Some(c) = self.advance() {
                lexeme.push(c);
            }
        }
        let inner = lexeme[1..lexeme.len() - 1].to_string();
        Ok(Token::new(TokenKind::CharLiteral(inner), lexeme, pos))
    }

    /// Collects every token and every lexical error of `s`.
    pub fn tokenize(s: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = vec![];
        let mut errors = vec![];

        for item in Lexer::new(s) {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }

        debug!(
            "lexed {} tokens with {} errors",
            tokens.len(),
            errors.len()
        );
        (tokens, errors)
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let c = self.peek()?;
        let pos = self.pos;

        let item = if c.is_ascii_digit() {
            self.parse_number(pos)
        } else if c.is_ascii_alphabetic() || c == '_' {
            Ok(self.parse_identifier(pos))
        } else if c == '\'' {
            self.parse_char_literal(pos)
        } else if let Some(kind) = ONE_SYMBOL_TOKENS.get(&c) {
            self.advance();
            Ok(Token::new(kind.clone(), c.to_string(), pos))
        } else {
            self.advance();
            Err(LexError::UnrecognizedChar { ch: c, pos })
        };

        match &item {
            Ok(token) => trace!("{} at {}", token, token.pos),
            Err(e) => debug!("{}", e),
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::tokenize(s);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_take_priority_only_on_exact_words() {
        assert_eq!(kinds("int"), vec![TokenKind::Int]);
        assert!(kinds("int string").iter().all(TokenKind::is_keyword));
        assert_eq!(kinds("integer"), vec![TokenKind::Ident("integer".into())]);
        assert_eq!(
            kinds("if for string char iffy format strings chars _int"),
            vec![
                TokenKind::If,
                TokenKind::For,
                TokenKind::String,
                TokenKind::Char,
                TokenKind::Ident("iffy".into()),
                TokenKind::Ident("format".into()),
                TokenKind::Ident("strings".into()),
                TokenKind::Ident("chars".into()),
                TokenKind::Ident("_int".into()),
            ]
        );
    }

    #[test]
    fn declaration() {
        assert_eq!(
            kinds("int x1 = 42 * (y - 7) / 2;,"),
            vec![
                TokenKind::Int,
                TokenKind::Ident("x1".into()),
                TokenKind::Equal,
                TokenKind::Num(42),
                TokenKind::Star,
                TokenKind::LeftParen,
                TokenKind::Ident("y".into()),
                TokenKind::Minus,
                TokenKind::Num(7),
                TokenKind::RightParen,
                TokenKind::Slash,
                TokenKind::Num(2),
                TokenKind::SemiColon,
                TokenKind::Comma,
            ]
        );
    }

    #[test]
    fn digits_then_letters_split() {
        assert_eq!(
            kinds("12ab"),
            vec![TokenKind::Num(12), TokenKind::Ident("ab".into())]
        );
    }

    #[test]
    fn char_literal_keeps_quotes_in_lexeme() {
        let (tokens, errors) = Lexer::tokenize("'a' 'hello world' ''");
        assert!(errors.is_empty());
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["'a'", "'hello world'", "''"]);
        assert_eq!(tokens[0].kind, TokenKind::CharLiteral("a".into()));
        assert_eq!(tokens[2].kind, TokenKind::CharLiteral("".into()));
    }

    #[test]
    fn unterminated_char_literal_skips_the_quote() {
        let (tokens, errors) = Lexer::tokenize("'ab");
        assert_eq!(
            errors,
            vec![LexError::UnrecognizedChar {
                ch: '\'',
                pos: Position::new(1, 1, 0)
            }]
        );
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Ident("ab".into()));
    }

    #[test]
    fn unrecognized_characters_are_skipped_one_at_a_time() {
        let (tokens, errors) = Lexer::tokenize("int $x = 1 @@;");
        assert_eq!(
            errors,
            vec![
                LexError::UnrecognizedChar {
                    ch: '$',
                    pos: Position::new(1, 5, 4)
                },
                LexError::UnrecognizedChar {
                    ch: '@',
                    pos: Position::new(1, 12, 11)
                },
                LexError::UnrecognizedChar {
                    ch: '@',
                    pos: Position::new(1, 13, 12)
                },
            ]
        );
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Ident("x".into()),
                TokenKind::Equal,
                TokenKind::Num(1),
                TokenKind::SemiColon,
            ]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let (tokens, _) = Lexer::tokenize("int a = 1;\n\tchar b = 2;");
        let b = &tokens[6];
        assert_eq!(b.kind, TokenKind::Ident("b".into()));
        assert_eq!(b.pos, Position::new(2, 7, 17));
    }

    #[test]
    fn number_overflow_is_reported() {
        let (tokens, errors) = Lexer::tokenize("99999999999999999999 1");
        assert_eq!(
            errors,
            vec![LexError::NumberOutOfRange {
                literal: "99999999999999999999".into(),
                pos: Position::start(),
            }]
        );
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Num(1));
    }

    #[test]
    fn listing_format() {
        let (tokens, _) = Lexer::tokenize("char c = 'z';");
        let listing: Vec<_> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            listing,
            vec![
                "<CHAR, char>",
                "<IDENTIFIER, c>",
                "<EQUALS, =>",
                "<CHAR_LITERAL, 'z'>",
                "<SEMICOLON, ;>",
            ]
        );
    }

    #[test]
    fn lexer_is_lazy() {
        let mut lexer = Lexer::new("int ~");
        assert_eq!(lexer.next().map(|r| r.map(|t| t.kind)), Some(Ok(TokenKind::Int)));
        assert!(matches!(lexer.next(), Some(Err(LexError::UnrecognizedChar { ch: '~', .. }))));
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next(), None);
    }
}
