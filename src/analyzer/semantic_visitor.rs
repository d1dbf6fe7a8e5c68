use log::debug;
use thiserror::Error;

use crate::lexer::Position;
use crate::parser::{Assignment, Declaration, Expr, ExprKind, Identifier, TranslationUnit};

use super::symbol_table::{SymbolError, SymbolTable};

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SemanticError {
    #[error("variable '{name}' at {pos} is already declared (first declaration at {first})")]
    Redeclared {
        name: String,
        pos: Position,
        first: Position,
    },

    #[error("undeclared variable '{name}' at {pos}")]
    Undeclared { name: String, pos: Position },
}

impl SemanticError {
    pub fn pos(&self) -> Position {
        match self {
            SemanticError::Redeclared { pos, .. } | SemanticError::Undeclared { pos, .. } => *pos,
        }
    }
}

/// Builds the symbol table and reports declaration errors.
///
/// Nodes are visited in the order a bottom-up parser reduces them: an
/// assignment's expression before the assignment itself, so `int x = x;`
/// uses `x` before declaring it.
pub struct SemanticVisitor<'a> {
    symbol_table: &'a mut SymbolTable,
    errors: Vec<SemanticError>,
}

impl<'a> SemanticVisitor<'a> {
    pub fn new(symbol_table: &'a mut SymbolTable) -> Self {
        Self {
            symbol_table,
            errors: vec![],
        }
    }

    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }

    pub fn visit_translation_unit(&mut self, translation_unit: &TranslationUnit) {
        for declaration in translation_unit.0.iter() {
            self.visit_declaration(declaration);
        }
        debug!(
            "{} symbols declared, {} semantic errors",
            self.symbol_table.len(),
            self.errors.len()
        );
    }

    fn visit_declaration(&mut self, declaration: &Declaration) {
        for assignment in declaration.0.iter() {
            self.visit_assignment(assignment);
        }
    }

    fn visit_assignment(&mut self, assignment: &Assignment) {
        self.visit_expr(&assignment.expr);

        let Identifier { name, pos } = &assignment.ident;
        if let Err(SymbolError::AlreadyDeclared { first, .. }) =
            self.symbol_table.declare(name, assignment.ty, *pos)
        {
            self.errors.push(SemanticError::Redeclared {
                name: name.clone(),
                pos: *pos,
                first,
            });
        }
    }

    /// Leaves come out of the arena in source order, which is the order the
    /// references are checked in.
    fn visit_expr(&mut self, expr: &Expr) {
        for (_, kind) in expr.iter() {
            if let ExprKind::Ident(ident) = kind {
                self.visit_ident(ident);
            }
        }
    }

    fn visit_ident(&mut self, ident: &Identifier) {
        if self.symbol_table.lookup(&ident.name).is_none() {
            self.errors.push(SemanticError::Undeclared {
                name: ident.name.clone(),
                pos: ident.pos,
            });
        }
    }
}
