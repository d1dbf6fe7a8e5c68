pub mod analyzer;
pub mod codegen;
pub mod lexer;
pub mod parser;

use log::debug;
use thiserror::Error;

use analyzer::{SemanticError, SemanticVisitor, SymbolTable};
use codegen::{Codegen, Tac};
use lexer::{LexError, Lexer, Position, Token};
use parser::{Parser, SyntaxError, SyntaxTree, TranslationUnit};

/// Everything one compile mutates: the symbol table, the TAC buffer and its
/// temp counter. Each compile starts from a new one.
#[derive(Clone, Debug, Default)]
pub struct CompilationContext {
    pub symbol_table: SymbolTable,
    pub tac: Tac,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all three stores together.
    pub fn reset(&mut self) {
        self.symbol_table.reset();
        self.tac.reset();
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("lexical error: {0}")]
    Lexical(#[from] LexError),

    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
}

impl Diagnostic {
    pub fn pos(&self) -> Option<Position> {
        match self {
            Diagnostic::Lexical(e) => Some(e.pos()),
            Diagnostic::Syntax(e) => e.pos(),
            Diagnostic::Semantic(e) => Some(e.pos()),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Diagnostic::Syntax(_))
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Diagnostic::Lexical(_))
    }
}

/// Result of one compile: every artifact that could be produced plus every
/// diagnostic. After a syntax error `ast` is `None` and the context is empty.
#[derive(Debug)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub ast: Option<TranslationUnit>,
    pub context: CompilationContext,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.context.symbol_table
    }

    pub fn tac(&self) -> &Tac {
        &self.context.tac
    }

    pub fn syntax_tree(&self) -> Option<SyntaxTree> {
        self.ast.as_ref().map(SyntaxTree::from)
    }
}

/// Runs only the lexer. Its diagnostics are all lexical, so a later syntax
/// or semantic error never affects a token-level tool.
pub fn tokenize(user_input: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let (tokens, lex_errors) = Lexer::tokenize(user_input);
    (tokens, lex_errors.into_iter().map(Diagnostic::from).collect())
}

pub fn compile(user_input: &str) -> Compilation {
    let (tokens, lex_errors) = Lexer::tokenize(user_input);
    let mut diagnostics: Vec<Diagnostic> = lex_errors.into_iter().map(Diagnostic::from).collect();
    let mut context = CompilationContext::new();

    let mut parser = Parser::new(tokens.clone());
    let translation_unit = match parser.parse() {
        Ok(unit) => unit,
        Err(e) => {
            debug!("parse aborted: {}", e);
            diagnostics.push(e.into());
            return Compilation {
                tokens,
                ast: None,
                context,
                diagnostics,
            };
        }
    };

    let mut visitor = SemanticVisitor::new(&mut context.symbol_table);
    visitor.visit_translation_unit(&translation_unit);
    diagnostics.extend(visitor.into_errors().into_iter().map(Diagnostic::from));

    let mut codegen = Codegen::new(&mut context);
    codegen.generate(&translation_unit);

    Compilation {
        tokens,
        ast: Some(translation_unit),
        context,
        diagnostics,
    }
}
