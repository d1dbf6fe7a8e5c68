use std::fmt;

use serde::Serialize;

use crate::lexer::Position;

use super::Expr;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TranslationUnit(pub Vec<Declaration>);

/// `assignment ("," assignment)* ";"`
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration(pub Vec<Assignment>);

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub ty: TypeSpecifier,
    pub ident: Identifier,
    pub expr: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSpecifier {
    Int,
    String,
    Char,
}

impl fmt::Display for TypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            TypeSpecifier::Int => "int",
            TypeSpecifier::String => "string",
            TypeSpecifier::Char => "char",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub pos: Position,
}

impl TranslationUnit {
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.0.iter().flat_map(|d| d.0.iter())
    }
}
