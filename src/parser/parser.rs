use log::{debug, trace};
use thiserror::Error;

use crate::lexer::{Position, Token, TokenKind};

use super::{
    Assignment, BinOpKind, Declaration, Expr, ExprId, ExprKind, Identifier, TranslationUnit,
    TypeSpecifier,
};

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("syntax error near '{found}' at {pos}: expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        pos: Position,
    },

    #[error("syntax error: unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

impl SyntaxError {
    pub fn pos(&self) -> Option<Position> {
        match self {
            SyntaxError::UnexpectedToken { pos, .. } => Some(*pos),
            SyntaxError::UnexpectedEof { .. } => None,
        }
    }
}

const EXPECT_TYPE: &str = "a type (int, string or char)";
const EXPECT_IDENT: &str = "an identifier";
const EXPECT_EQUAL: &str = "'='";
const EXPECT_OPERAND: &str = "a number or an identifier";
const EXPECT_END: &str = "an operator, ',' or ';'";

/// Syntax-only parser. It never touches a symbol table; the first mismatch
/// aborts the whole parse.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn parse(&mut self) -> Result<TranslationUnit, SyntaxError> {
        let unit = self.parse_program()?;
        debug!("parsed {} declarations", unit.0.len());
        Ok(unit)
    }

    fn is_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn error(&self, expected: &'static str) -> SyntaxError {
        match self.peek() {
            Some(t) => SyntaxError::UnexpectedToken {
                found: t.lexeme.clone(),
                expected,
                pos: t.pos,
            },
            None => SyntaxError::UnexpectedEof { expected },
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        match self.peek() {
            Some(t) if &t.kind == kind => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), SyntaxError> {
        if self.consume(kind) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_ident(&mut self) -> Result<Identifier, SyntaxError> {
        if let Some(Token {
            kind: TokenKind::Ident(name),
            pos,
            ..
        }) = self.peek()
        {
            let ident = Identifier {
                name: name.clone(),
                pos: *pos,
            };
            self.index += 1;
            return Ok(ident);
        }
        Err(self.error(EXPECT_IDENT))
    }

    /// program = declaration*
    fn parse_program(&mut self) -> Result<TranslationUnit, SyntaxError> {
        let mut declarations = vec![];

        while !self.is_eof() {
            declarations.push(self.parse_declaration()?);
        }

        Ok(TranslationUnit(declarations))
    }

    /// declaration = assignment ("," assignment)* ";"
    fn parse_declaration(&mut self) -> Result<Declaration, SyntaxError> {
        let mut assignments = vec![self.parse_assignment()?];

        while !self.consume(&TokenKind::SemiColon) {
            self.expect(&TokenKind::Comma, EXPECT_END)?;
            assignments.push(self.parse_assignment()?);
        }

        Ok(Declaration(assignments))
    }

    /// assignment = type ident "=" expr
    fn parse_assignment(&mut self) -> Result<Assignment, SyntaxError> {
        let ty = self.parse_type_specifier()?;
        let ident = self.expect_ident()?;
        self.expect(&TokenKind::Equal, EXPECT_EQUAL)?;
        let expr = self.parse_expr()?;
        trace!("assignment {} {} ({} nodes)", ty, ident.name, expr.len());

        Ok(Assignment { ty, ident, expr })
    }

    /// type = "int" | "string" | "char"
    fn parse_type_specifier(&mut self) -> Result<TypeSpecifier, SyntaxError> {
        if self.consume(&TokenKind::Int) {
            Ok(TypeSpecifier::Int)
        } else if self.consume(&TokenKind::String) {
            Ok(TypeSpecifier::String)
        } else if self.consume(&TokenKind::Char) {
            Ok(TypeSpecifier::Char)
        } else {
            Err(self.error(EXPECT_TYPE))
        }
    }

    fn parse_bin_op(&mut self) -> Option<BinOpKind> {
        if self.consume(&TokenKind::Plus) {
            Some(BinOpKind::Add)
        } else if self.consume(&TokenKind::Minus) {
            Some(BinOpKind::Sub)
        } else if self.consume(&TokenKind::Star) {
            Some(BinOpKind::Mul)
        } else if self.consume(&TokenKind::Slash) {
            Some(BinOpKind::Div)
        } else {
            None
        }
    }

    /// expr = operand (("+" | "-" | "*" | "/") operand)*
    ///
    /// Shift-reduce over an operand stack and an operator stack. Before an
    /// operator is shifted, every stacked operator binding at least as
    /// tightly is reduced, which makes all four operators left-associative
    /// with `*` and `/` above `+` and `-`.
    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = Expr::leaf(self.parse_operand()?);
        let mut operands = vec![expr.root()];
        let mut operators: Vec<BinOpKind> = vec![];

        while let Some(kind) = self.parse_bin_op() {
            while operators
                .last()
                .is_some_and(|top| top.precedence() >= kind.precedence())
            {
                reduce(&mut expr, &mut operands, &mut operators);
            }
            operators.push(kind);
            let operand = self.parse_operand()?;
            operands.push(expr.push(operand));
        }

        while !operators.is_empty() {
            reduce(&mut expr, &mut operands, &mut operators);
        }

        let root = operands.pop().ok_or_else(|| self.error(EXPECT_OPERAND))?;
        debug_assert_eq!(root, expr.root());
        Ok(expr)
    }

    /// operand = num | ident
    fn parse_operand(&mut self) -> Result<ExprKind, SyntaxError> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Num(num)) => {
                let num = *num;
                self.index += 1;
                Ok(ExprKind::Number(num))
            }
            Some(TokenKind::Ident(_)) => Ok(ExprKind::Ident(self.expect_ident()?)),
            _ => Err(self.error(EXPECT_OPERAND)),
        }
    }
}

/// Pops the top operator with its two operands and pushes the combined node.
/// Nodes enter the arena in reduction order, so children always precede parents.
fn reduce(expr: &mut Expr, operands: &mut Vec<ExprId>, operators: &mut Vec<BinOpKind>) {
    if let (Some(kind), Some(right), Some(left)) = (operators.pop(), operands.pop(), operands.pop())
    {
        operands.push(expr.push(ExprKind::Binary(kind, left, right)));
    }
}
