use std::fmt;

use log::trace;
use serde::{Serialize, Serializer};

use crate::parser::BinOpKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temp(pub usize);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Operand of a TAC instruction and the resolved value of an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Const(i64),
    Temp(Temp),
    /// A variable that was not declared when it was read. Carried through
    /// lowering instead of aborting it.
    Undefined(String),
}

pub const UNDEFINED: &str = "undefined";

impl Operand {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Operand::Undefined(_))
    }

    /// Name of the variable behind an undefined placeholder.
    pub fn undefined_name(&self) -> Option<&str> {
        match self {
            Operand::Undefined(name) => Some(name),
            Operand::Const(_) | Operand::Temp(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Const(n) => write!(f, "{}", n),
            Operand::Temp(t) => write!(f, "{}", t),
            Operand::Undefined(_) => f.write_str(UNDEFINED),
        }
    }
}

impl Serialize for Operand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rhs {
    Copy(Operand),
    Binary(Operand, BinOpKind, Operand),
}

/// `dest = rhs`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instr {
    pub dest: Temp,
    pub rhs: Rhs,
}

impl Instr {
    pub fn uses_undefined(&self) -> bool {
        match &self.rhs {
            Rhs::Copy(v) => v.is_undefined(),
            Rhs::Binary(l, _, r) => l.is_undefined() || r.is_undefined(),
        }
    }

    /// Names behind the undefined operands, left to right.
    pub fn undefined_names(&self) -> Vec<&str> {
        match &self.rhs {
            Rhs::Copy(v) => v.undefined_name().into_iter().collect(),
            Rhs::Binary(l, _, r) => l
                .undefined_name()
                .into_iter()
                .chain(r.undefined_name())
                .collect(),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.rhs {
            Rhs::Copy(v) => write!(f, "{} = {}", self.dest, v),
            Rhs::Binary(l, kind, r) => write!(f, "{} = {} {} {}", self.dest, l, kind, r),
        }
    }
}

/// Append-only instruction buffer with the temp counter of one compilation
/// unit. Temps are handed out `t0, t1, ...` without gaps, one per
/// instruction, and the counter only goes back to zero on `reset`.
#[derive(Clone, Debug, Default)]
pub struct Tac {
    instrs: Vec<Instr>,
    next_temp: usize,
}

impl Tac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.instrs.clear();
        self.next_temp = 0;
    }

    pub fn emit(&mut self, rhs: Rhs) -> Temp {
        let dest = Temp(self.next_temp);
        self.next_temp += 1;

        let instr = Instr { dest, rhs };
        trace!("emit {}", instr);
        self.instrs.push(instr);
        dest
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.instrs.iter().map(|i| i.to_string()).collect()
    }
}

/// One instruction per line, in emission order.
impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, instr) in self.instrs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", instr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn temps_are_sequential_until_reset() {
        let mut tac = Tac::new();
        let t0 = tac.emit(Rhs::Binary(Operand::Const(2), BinOpKind::Add, Operand::Const(3)));
        let t1 = tac.emit(Rhs::Copy(Operand::Temp(t0)));
        assert_eq!((t0, t1), (Temp(0), Temp(1)));
        assert_eq!(tac.to_string(), "t0 = 2 + 3\nt1 = t0");

        tac.reset();
        assert!(tac.is_empty());
        assert_eq!(tac.emit(Rhs::Copy(Operand::Const(9))), Temp(0));
    }

    #[test]
    fn undefined_operands_are_flagged() {
        let mut tac = Tac::new();
        tac.emit(Rhs::Binary(
            Operand::Undefined("z".into()),
            BinOpKind::Mul,
            Operand::Const(4),
        ));
        tac.emit(Rhs::Copy(Operand::Const(1)));

        assert_eq!(tac.lines(), vec!["t0 = undefined * 4", "t1 = 1"]);
        let flags: Vec<_> = tac.instrs().iter().map(Instr::uses_undefined).collect();
        assert_eq!(flags, vec![true, false]);
        assert_eq!(tac.instrs()[0].undefined_names(), vec!["z"]);
        assert!(tac.instrs()[1].undefined_names().is_empty());
    }

    #[test]
    fn placeholder_keeps_the_variable_name() {
        let instr = Instr {
            dest: Temp(3),
            rhs: Rhs::Binary(
                Operand::Undefined("a".into()),
                BinOpKind::Sub,
                Operand::Undefined("b".into()),
            ),
        };
        assert_eq!(instr.to_string(), "t3 = undefined - undefined");
        assert_eq!(instr.undefined_names(), vec!["a", "b"]);
        assert_eq!(Operand::Temp(Temp(0)).undefined_name(), None);
    }

    #[test]
    fn empty_buffer_renders_as_empty_text() {
        assert_eq!(Tac::new().to_string(), "");
    }
}
