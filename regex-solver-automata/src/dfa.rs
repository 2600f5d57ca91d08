/*!
Deterministic automata over symbolic range transitions.

A [`DFA`] is partial: a code point with no outgoing transition leads to an
implicit dead state. Every state's transitions are sorted by range and never
overlap, so stepping is a binary search.
*/

use std::collections::VecDeque;

use crate::{
    charset::{self, CodeRange},
    determinize::determinize,
    matcher::code_points,
    minimize::minimize,
    nfa::NFA,
    options::SolverOptions,
    state::StateId,
    CompileResult,
};

/// A transition consuming any code point in `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub range: CodeRange,
    pub target: StateId,
}

/// A DFA state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    accepting: bool,
    transitions: Vec<Transition>,
}

impl State {
    pub(crate) fn new(accepting: bool) -> State {
        State { accepting, transitions: vec![] }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Outgoing transitions, sorted by range
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Append a transition, merging it into the previous one when the
    /// ranges touch and the targets agree. Ranges must arrive in order.
    pub(crate) fn push_transition(&mut self, range: CodeRange, target: StateId) {
        if let Some(last) = self.transitions.last_mut() {
            if last.target == target
                && last.range.end.checked_add(1) == Some(range.start)
            {
                last.range.end = range.end;
                return;
            }
        }
        self.transitions.push(Transition { range, target });
    }

    pub(crate) fn next(&self, cp: u32) -> Option<StateId> {
        self.transitions
            .binary_search_by(|t| {
                if t.range.end < cp {
                    core::cmp::Ordering::Less
                } else if t.range.start > cp {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|i| self.transitions[i].target)
    }
}

/// A deterministic finite automaton with range-labelled transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DFA {
    states: Vec<State>,
    start: StateId,
    alphabet_ranges: Vec<CodeRange>,
    min_code_point: u32,
    max_code_point: u32,
}

impl DFA {
    /// Assemble a DFA, deriving its alphabet partition from the transitions.
    pub(crate) fn new(
        states: Vec<State>,
        start: StateId,
        bounds: (u32, u32),
    ) -> DFA {
        let alphabet_ranges = charset::partition_ranges(
            states
                .iter()
                .flat_map(|s| s.transitions.iter().map(|t| t.range)),
        );
        DFA {
            states,
            start,
            alphabet_ranges,
            min_code_point: bounds.0,
            max_code_point: bounds.1,
        }
    }

    /// The number of states. Always at least one.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.states[id].accepting
    }

    /// The state reached from `id` on `cp`, or `None` for the dead state.
    pub fn next(&self, id: StateId, cp: u32) -> Option<StateId> {
        self.states[id].next(cp)
    }

    /// The coarsest disjoint ranges such that every transition's range is a
    /// union of some of them. Code points outside all of them lead nowhere.
    pub fn alphabet_ranges(&self) -> &[CodeRange] {
        &self.alphabet_ranges
    }

    /// The inclusive code-point bounds of the alphabet
    pub fn bounds(&self) -> (u32, u32) {
        (self.min_code_point, self.max_code_point)
    }

    pub fn min_code_point(&self) -> u32 {
        self.min_code_point
    }

    pub fn max_code_point(&self) -> u32 {
        self.max_code_point
    }

    /// Check if the entire input is accepted, reading it in this
    /// automaton's alphabet.
    pub fn accepts(&self, input: &str) -> bool {
        self.accepts_code_points(&code_points(input, self.max_code_point))
    }

    /// Check if the entire sequence of code points is accepted.
    pub fn accepts_code_points(&self, input: &[u32]) -> bool {
        let mut id = self.start;
        for &cp in input {
            match self.next(id, cp) {
                Some(next) => id = next,
                None => return false,
            }
        }
        self.is_accepting(id)
    }

    /// True when the automaton accepts no string at all.
    pub fn is_empty(&self) -> bool {
        let mut seen = vec![false; self.states.len()];
        let mut queue = VecDeque::from([self.start]);
        seen[self.start] = true;
        while let Some(id) = queue.pop_front() {
            if self.states[id].accepting {
                return false;
            }
            for t in self.states[id].transitions.iter() {
                if !seen[t.target] {
                    seen[t.target] = true;
                    queue.push_back(t.target);
                }
            }
        }
        true
    }
}

/// Builds DFAs from NFAs under a fixed configuration.
#[derive(Debug, Clone)]
pub struct Builder {
    options: SolverOptions,
}

impl Builder {
    pub fn new(options: SolverOptions) -> Builder {
        Builder { options }
    }

    /// Determinize `nfa` and, if configured, minimize the result.
    pub fn build(&self, nfa: &NFA) -> CompileResult<DFA> {
        let dfa = determinize(nfa, &self.options)?;
        if !self.options.get_minimize() {
            return Ok(dfa);
        }
        minimize(&dfa, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u8, end: u8) -> CodeRange {
        CodeRange::new(u32::from(start), u32::from(end))
    }

    /// Accepts `[a-c]x*`.
    fn sample() -> DFA {
        let mut s0 = State::new(false);
        s0.push_transition(range(b'a', b'a'), 1);
        s0.push_transition(range(b'b', b'c'), 1);
        let mut s1 = State::new(true);
        s1.push_transition(range(b'x', b'x'), 1);
        DFA::new(vec![s0, s1], 0, (0, 0xFF))
    }

    #[test]
    fn test_adjacent_transitions_merge() {
        let dfa = sample();
        assert_eq!(dfa.state(0).transitions().len(), 1);
        assert_eq!(dfa.state(0).transitions()[0].range, range(b'a', b'c'));
    }

    #[test]
    fn test_alphabet_ranges() {
        let dfa = sample();
        assert_eq!(
            dfa.alphabet_ranges(),
            &[range(b'a', b'c'), range(b'x', b'x')]
        );
    }

    #[test]
    fn test_accepts() {
        let dfa = sample();
        assert!(dfa.accepts("b"));
        assert!(dfa.accepts("cxxx"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("xa"));
        assert_eq!(dfa.next(0, u32::from(b'z')), None);
        assert!(!dfa.is_empty());
    }

    #[test]
    fn test_is_empty() {
        let dfa = DFA::new(vec![State::new(false)], 0, (0, 0xFF));
        assert!(dfa.is_empty());
        assert!(dfa.alphabet_ranges().is_empty());
    }
}
