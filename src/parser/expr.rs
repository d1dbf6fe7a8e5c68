use std::fmt;

use serde::Serialize;

use super::Identifier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOpKind {
    /// Higher binds tighter. Every operator is left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinOpKind::Add | BinOpKind::Sub => 1,
            BinOpKind::Mul | BinOpKind::Div => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
        }
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Index of a node inside its [`Expr`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Binary(BinOpKind, ExprId, ExprId),
    Number(i64),
    Ident(Identifier),
}

/// One expression tree stored as a flat arena.
///
/// Nodes sit in the order a bottom-up parser reduces them: both children of
/// a binary node come before it, leaves keep their source order and the
/// root is the last node. Every pass is therefore a single forward loop, and
/// a chain of any length never nests deeper than one level on the stack.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    nodes: Vec<ExprKind>,
}

impl Expr {
    /// A one-node expression. Further nodes are added with [`Expr::push`].
    pub fn leaf(kind: ExprKind) -> Self {
        debug_assert!(!matches!(kind, ExprKind::Binary(..)));
        Self { nodes: vec![kind] }
    }

    pub fn number(n: i64) -> Self {
        Self::leaf(ExprKind::Number(n))
    }

    pub fn ident(ident: Identifier) -> Self {
        Self::leaf(ExprKind::Ident(ident))
    }

    /// Appends a node whose children, if any, are already in the arena.
    pub fn push(&mut self, kind: ExprKind) -> ExprId {
        if let ExprKind::Binary(_, l, r) = &kind {
            debug_assert!(l.0 < self.nodes.len() && r.0 < self.nodes.len());
        }
        self.nodes.push(kind);
        ExprId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> ExprId {
        ExprId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: ExprId) -> &ExprKind {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in reduction order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ExprKind)> {
        self.nodes.iter().enumerate().map(|(i, kind)| (ExprId(i), kind))
    }

    /// Number of binary nodes, i.e. how many temps lowering this expression takes.
    pub fn count_binary(&self) -> usize {
        self.nodes
            .iter()
            .filter(|kind| matches!(kind, ExprKind::Binary(..)))
            .count()
    }
}

enum Piece {
    Node(ExprId),
    Op(BinOpKind),
    Close,
}

/// Fully parenthesized form, handy for checking how operators grouped.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut pending = vec![Piece::Node(self.root())];

        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Node(id) => match self.get(id) {
                    ExprKind::Binary(kind, l, r) => {
                        f.write_str("(")?;
                        pending.extend([
                            Piece::Close,
                            Piece::Node(*r),
                            Piece::Op(*kind),
                            Piece::Node(*l),
                        ]);
                    }
                    ExprKind::Number(n) => write!(f, "{}", n)?,
                    ExprKind::Ident(ident) => f.write_str(&ident.name)?,
                },
                Piece::Op(kind) => write!(f, " {} ", kind)?,
                Piece::Close => f.write_str(")")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer::Position;

    #[test]
    fn children_precede_parents() {
        let mut expr = Expr::number(1);
        let two = expr.push(ExprKind::Number(2));
        let x = expr.push(ExprKind::Ident(Identifier {
            name: "x".into(),
            pos: Position::start(),
        }));
        let mul = expr.push(ExprKind::Binary(BinOpKind::Mul, two, x));
        let add = expr.push(ExprKind::Binary(BinOpKind::Add, ExprId(0), mul));

        assert_eq!(expr.root(), add);
        assert_eq!(expr.len(), 5);
        assert_eq!(expr.count_binary(), 2);
        assert_eq!(expr.to_string(), "(1 + (2 * x))");
    }

    #[test]
    fn long_chain_renders_without_recursion() {
        let mut expr = Expr::number(0);
        for n in 1..=100_000 {
            let left = expr.root();
            let right = expr.push(ExprKind::Number(n));
            expr.push(ExprKind::Binary(BinOpKind::Sub, left, right));
        }
        assert_eq!(expr.count_binary(), 100_000);

        let text = expr.to_string();
        assert!(text.starts_with("((((0 - 1) - 2)"));
        assert!(text.ends_with(" - 100000)"));
        assert_eq!(text.matches('(').count(), 100_000);
    }
}
