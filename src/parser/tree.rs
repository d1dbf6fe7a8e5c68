use std::fmt;

use serde::Serialize;

use super::{Assignment, ExprKind, TranslationUnit};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
}

/// Labeled view of an AST for tree-drawing tools: one node per AST node,
/// children in source order, literals and names as leaves.
///
/// Nodes live in one vector and refer to their children by index; node 0 is
/// the root. Walks use an explicit stack, so depth is bounded by memory
/// rather than by the call stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    nodes: Vec<TreeNode>,
}

impl SyntaxTree {
    fn with_root(label: impl Into<String>) -> Self {
        Self {
            nodes: vec![TreeNode {
                label: label.into(),
                children: vec![],
            }],
        }
    }

    fn add(&mut self, parent: Option<usize>, label: impl Into<String>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            label: label.into(),
            children: vec![],
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn node(&self, id: usize) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn is_leaf(&self) -> bool {
        self.nodes[self.root()].children.is_empty()
    }

    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids with their depth, parents before children, siblings in order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![(self.root(), 0)],
        }
    }

    /// Graphviz rendering. Nodes are numbered in pre-order as `n0`, `n1`, ...
    pub fn dot(&self) -> Dot<'_> {
        Dot(self)
    }

    pub fn to_dot(&self) -> String {
        self.dot().to_string()
    }

    fn push_assignment(&mut self, parent: usize, assignment: &Assignment) {
        let node = self.add(Some(parent), "assignment");
        self.add(Some(node), assignment.ty.to_string());
        self.add(Some(node), assignment.ident.name.clone());

        // Expression nodes arrive children first; map each to its tree id and
        // attach the root once everything below it exists.
        let mut ids = Vec::with_capacity(assignment.expr.len());
        for (_, kind) in assignment.expr.iter() {
            let id = match kind {
                ExprKind::Binary(op, l, r) => {
                    let id = self.add(None, op.symbol());
                    let children = vec![ids[l.index()], ids[r.index()]];
                    self.nodes[id].children = children;
                    id
                }
                ExprKind::Number(n) => self.add(None, n.to_string()),
                ExprKind::Ident(ident) => self.add(None, ident.name.clone()),
            };
            ids.push(id);
        }
        let root = ids[assignment.expr.root().index()];
        self.nodes[node].children.push(root);
    }
}

pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<(usize, usize)>,
}

impl Iterator for Preorder<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let children = &self.tree.nodes[id].children;
        self.stack
            .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        Some((id, depth))
    }
}

pub struct Dot<'a>(&'a SyntaxTree);

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tree = self.0;
        // pre-order number of each node's parent, set when the parent is written
        let mut parents = vec![None; tree.nodes.len()];

        writeln!(f, "digraph ast {{")?;
        for (n, (id, _)) in tree.preorder().enumerate() {
            for &child in &tree.nodes[id].children {
                parents[child] = Some(n);
            }

            let label = tree.nodes[id].label.replace('\\', "\\\\").replace('"', "\\\"");
            writeln!(f, "  n{} [label=\"{}\"];", n, label)?;
            if let Some(parent) = parents[id] {
                writeln!(f, "  n{} -> n{};", parent, n)?;
            }
        }
        writeln!(f, "}}")
    }
}

/// Indented outline, two spaces per level.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, depth) in self.preorder() {
            writeln!(f, "{:indent$}{}", "", self.nodes[id].label, indent = depth * 2)?;
        }
        Ok(())
    }
}

impl From<&TranslationUnit> for SyntaxTree {
    fn from(unit: &TranslationUnit) -> Self {
        let mut tree = SyntaxTree::with_root("program");
        for declaration in unit.0.iter() {
            let node = tree.add(Some(tree.root()), "declaration");
            for assignment in declaration.0.iter() {
                tree.push_assignment(node, assignment);
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer::Lexer, parser::Parser};

    fn tree(s: &str) -> SyntaxTree {
        let (tokens, _) = Lexer::tokenize(s);
        let unit = Parser::new(tokens).parse().unwrap();
        SyntaxTree::from(&unit)
    }

    #[test]
    fn outline() {
        let t = tree("int x = 1 + y * 2, char c = 3;");
        assert_eq!(
            t.to_string(),
            "\
program
  declaration
    assignment
      int
      x
      +
        1
        *
          y
          2
    assignment
      char
      c
      3
"
        );
        assert_eq!(t.count_nodes(), 14);
    }

    #[test]
    fn dot_has_one_edge_per_child() {
        let t = tree("int x = 1 + 2;");
        let dot = t.to_dot();
        assert_eq!(
            dot,
            "digraph ast {
  n0 [label=\"program\"];
  n1 [label=\"declaration\"];
  n0 -> n1;
  n2 [label=\"assignment\"];
  n1 -> n2;
  n3 [label=\"int\"];
  n2 -> n3;
  n4 [label=\"x\"];
  n2 -> n4;
  n5 [label=\"+\"];
  n2 -> n5;
  n6 [label=\"1\"];
  n5 -> n6;
  n7 [label=\"2\"];
  n5 -> n7;
}
"
        );
        assert_eq!(dot.matches("->").count(), t.count_nodes() - 1);
    }

    #[test]
    fn empty_program_is_a_single_leaf() {
        let t = tree("");
        assert!(t.is_leaf());
        assert_eq!(t.to_string(), "program\n");
    }

    #[test]
    fn deep_left_chain_renders_as_dot() {
        let t = tree(&format!("int x = 0{};", " - 1".repeat(100_000)));
        // program, declaration, assignment, type, name, then the expression
        assert_eq!(t.count_nodes(), 5 + 200_001);

        let depths: Vec<_> = t.preorder().map(|(_, depth)| depth).collect();
        assert_eq!(depths.iter().max(), Some(&(3 + 100_000)));

        let dot = t.to_dot();
        assert_eq!(dot.matches("->").count(), t.count_nodes() - 1);
        assert!(dot.ends_with("}\n"));
    }
}
