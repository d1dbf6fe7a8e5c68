use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::codegen::Operand;
use crate::lexer::Position;
use crate::parser::TypeSpecifier;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SymbolEntry {
    pub name: String,
    pub ty: TypeSpecifier,
    /// Filled in when the declaring assignment is lowered; never re-evaluated.
    pub value: Option<Operand>,
    pub pos: Position,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SymbolError {
    #[error("'{name}' is already declared at {first}")]
    AlreadyDeclared { name: String, first: Position },
}

/// Flat, append-only table for one compilation unit, iterated in
/// declaration order.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Registers `name`. A second declaration is refused and the first
    /// entry stays as it was.
    pub fn declare(
        &mut self,
        name: &str,
        ty: TypeSpecifier,
        pos: Position,
    ) -> Result<(), SymbolError> {
        if let Some(entry) = self.lookup(name) {
            return Err(SymbolError::AlreadyDeclared {
                name: name.to_string(),
                first: entry.pos,
            });
        }

        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            ty,
            value: None,
            pos,
        });
        Ok(())
    }

    /// Records the resolved value of `name` unless one is already bound.
    /// Returns whether the value was stored.
    pub fn bind(&mut self, name: &str, value: Operand) -> bool {
        let Some(&i) = self.index.get(name) else {
            return false;
        };
        let entry = &mut self.entries[i];
        if entry.value.is_some() {
            return false;
        }
        entry.value = Some(value);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn value_of(&self, name: &str) -> Option<&Operand> {
        self.lookup(name).and_then(|e| e.value.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "symbol table is empty");
        }

        let width = self
            .iter()
            .map(|e| e.name.len())
            .max()
            .unwrap_or(0)
            .max("ID".len())
            + 2;
        writeln!(f, "{:<width$}{:<8}Value", "ID", "Type", width = width)?;
        for entry in self.iter() {
            let value = entry
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<width$}{:<8}{}",
                entry.name,
                entry.ty.to_string(),
                value,
                width = width
            )?;
        }
        Ok(())
    }
}
