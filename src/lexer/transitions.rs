use std::collections::BTreeMap;
use std::fmt;

use super::Token;

/// State of the token-chain automaton, `q0` being the start state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct State(pub usize);

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// `(state, symbol) -> state` map of the automaton accepting exactly one
/// token stream: the i-th token moves `q{i}` to `q{i+1}`.
///
/// Only diagramming tools read this; compilation never does.
#[derive(Debug, Default)]
pub struct TransitionMap {
    transitions: BTreeMap<(State, String), State>,
}

impl TransitionMap {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let transitions = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| ((State(i), t.kind.name().to_string()), State(i + 1)))
            .collect();
        Self { transitions }
    }

    pub fn get(&self, state: State, symbol: &str) -> Option<State> {
        self.transitions.get(&(state, symbol.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (State, &str, State)> {
        self.transitions
            .iter()
            .map(|((from, symbol), to)| (*from, symbol.as_str(), *to))
    }

    /// Graphviz rendering, left to right, with an unlabeled entry arrow into `q0`.
    pub fn dot(&self) -> DfaDot<'_> {
        DfaDot(self)
    }

    pub fn to_dot(&self) -> String {
        self.dot().to_string()
    }
}

pub struct DfaDot<'a>(&'a TransitionMap);

impl fmt::Display for DfaDot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut states: Vec<State> = self.0.iter().flat_map(|(from, _, to)| [from, to]).collect();
        states.sort();
        states.dedup();

        writeln!(f, "digraph dfa {{")?;
        writeln!(f, "  rankdir=LR;")?;
        for state in &states {
            writeln!(f, "  {} [shape=circle];", state)?;
        }
        writeln!(f, "  start [shape=none, label=\"\"];")?;
        writeln!(f, "  start -> q0;")?;
        for (from, symbol, to) in self.0.iter() {
            writeln!(f, "  {} -> {} [label=\"{}\"];", from, to, symbol)?;
        }
        writeln!(f, "}}")
    }
}
