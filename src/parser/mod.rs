mod ast;
mod expr;
mod parser;
mod tree;

pub use ast::*;
pub use expr::*;
pub use parser::*;
pub use tree::*;
