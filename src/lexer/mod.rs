mod lexer;
mod token;
mod transitions;

pub use lexer::*;
pub use token::{Position, Token, TokenKind};
pub use transitions::*;
