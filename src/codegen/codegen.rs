use log::debug;

use crate::{
    parser::{Assignment, Declaration, Expr, ExprKind, TranslationUnit},
    CompilationContext,
};

use super::{Operand, Rhs};

/// Lowers an analyzed translation unit to three-address code.
///
/// Expressions are lowered in post order, left operand first, so temps are
/// numbered in the order a bottom-up parser would reduce the nodes. Each
/// assignment binds its resolved value in the symbol table before the next
/// assignment is lowered, which is what later references read.
pub struct Codegen<'a> {
    context: &'a mut CompilationContext,
}

impl<'a> Codegen<'a> {
    pub fn new(context: &'a mut CompilationContext) -> Self {
        Self { context }
    }

    pub fn generate(&mut self, translation_unit: &TranslationUnit) {
        for declaration in translation_unit.0.iter() {
            self.gen_declaration(declaration);
        }
        debug!("emitted {} instructions", self.context.tac.len());
    }

    fn gen_declaration(&mut self, declaration: &Declaration) {
        for assignment in declaration.0.iter() {
            self.gen_assignment(assignment);
        }
    }

    fn gen_assignment(&mut self, assignment: &Assignment) {
        let value = self.gen_expr(&assignment.expr);
        self.context
            .symbol_table
            .bind(&assignment.ident.name, value.clone());
        self.context.tac.emit(Rhs::Copy(value));
    }

    /// One forward pass over the arena; `values[i]` holds the operand of node `i`.
    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        let mut values: Vec<Operand> = Vec::with_capacity(expr.len());

        for (_, kind) in expr.iter() {
            let value = match kind {
                ExprKind::Binary(op, left, right) => {
                    let rhs = Rhs::Binary(
                        values[left.index()].clone(),
                        *op,
                        values[right.index()].clone(),
                    );
                    Operand::Temp(self.context.tac.emit(rhs))
                }
                ExprKind::Number(n) => Operand::Const(*n),
                ExprKind::Ident(ident) => self
                    .context
                    .symbol_table
                    .value_of(&ident.name)
                    .cloned()
                    .unwrap_or_else(|| Operand::Undefined(ident.name.clone())),
            };
            values.push(value);
        }

        values.swap_remove(expr.root().index())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{analyzer::SemanticVisitor, codegen::Temp, lexer::Lexer, parser::Parser};

    fn lower(s: &str) -> CompilationContext {
        let (tokens, _) = Lexer::tokenize(s);
        let unit = Parser::new(tokens).parse().unwrap();
        let mut context = CompilationContext::new();
        SemanticVisitor::new(&mut context.symbol_table).visit_translation_unit(&unit);
        Codegen::new(&mut context).generate(&unit);
        context
    }

    #[test]
    fn nested_expressions_lower_innermost_first() {
        let context = lower("int r = 1 + 2 * 3 - 4;");
        assert_eq!(
            context.tac.lines(),
            vec!["t0 = 2 * 3", "t1 = 1 + t0", "t2 = t1 - 4", "t3 = t2"]
        );
        assert_eq!(context.symbol_table.value_of("r"), Some(&Operand::Temp(Temp(2))));
    }

    #[test]
    fn references_read_the_stored_value() {
        let context = lower("int a = 6 / 2; int b = a * a, int c = b;");
        assert_eq!(
            context.tac.lines(),
            vec!["t0 = 6 / 2", "t1 = t0", "t2 = t0 * t0", "t3 = t2", "t4 = t2"]
        );
        let values: Vec<_> = context
            .symbol_table
            .iter()
            .map(|e| e.value.as_ref().map(|v| v.to_string()))
            .collect();
        assert_eq!(
            values,
            vec![Some("t0".into()), Some("t2".into()), Some("t2".into())]
        );
    }

    #[test]
    fn redeclared_name_keeps_first_value_but_still_emits() {
        let context = lower("int x = 1, int x = 2;");
        assert_eq!(context.tac.lines(), vec!["t0 = 1", "t1 = 2"]);
        assert_eq!(context.symbol_table.value_of("x"), Some(&Operand::Const(1)));
    }

    #[test]
    fn undeclared_reference_lowers_to_placeholder() {
        let context = lower("int y = z + 1, int z = 2, int w = z;");
        assert_eq!(
            context.tac.lines(),
            vec!["t0 = undefined + 1", "t1 = t0", "t2 = 2", "t3 = 2"]
        );
        assert!(context.tac.instrs()[0].uses_undefined());
        assert!(!context.tac.instrs()[1].uses_undefined());
    }

    #[test]
    fn bare_undeclared_value_is_stored_as_placeholder() {
        let context = lower("int a = b;");
        assert_eq!(context.tac.lines(), vec!["t0 = undefined"]);
        assert_eq!(
            context.symbol_table.value_of("a"),
            Some(&Operand::Undefined("b".into()))
        );
    }

    #[test]
    fn long_chain_lowers_one_temp_per_operator() {
        let context = lower(&format!("int s = 0{};", " + 1".repeat(100_000)));
        assert_eq!(context.tac.len(), 100_001);
        assert_eq!(context.tac.instrs()[0].to_string(), "t0 = 0 + 1");
        assert_eq!(context.tac.instrs()[1].to_string(), "t1 = t0 + 1");
        assert_eq!(context.tac.instrs()[100_000].to_string(), "t100000 = t99999");
        assert_eq!(
            context.symbol_table.value_of("s"),
            Some(&Operand::Temp(Temp(99_999)))
        );
    }
}
