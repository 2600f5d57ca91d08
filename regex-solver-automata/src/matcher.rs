use crate::{nfa::NFA, state::StateSet};

/// A matcher that simulates a Thompson NFA against whole inputs.
///
/// Used to cross-check determinized automata and to verify witnesses
/// against the NFA they were derived from.
#[derive(Debug)]
pub struct Matcher<'a> {
    nfa: &'a NFA,
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given NFA
    pub fn new(nfa: &'a NFA) -> Self {
        Self { nfa }
    }

    /// Check if the entire input matches, reading it in the automaton's
    /// alphabet
    pub fn is_match(&self, input: &str) -> bool {
        self.is_match_code_points(&code_points(input, self.nfa.bounds().1))
    }

    /// Check if the entire sequence of code points matches
    pub fn is_match_code_points(&self, input: &[u32]) -> bool {
        let mut start = self.nfa.state_set();
        start.insert(self.nfa.start());
        let mut current = self.nfa.epsilon_closure(&start);

        for &cp in input {
            if current.is_empty() {
                return false;
            }
            current = self.nfa.epsilon_closure(&self.nfa.step(&current, cp));
        }

        self.is_accepting(&current)
    }

    fn is_accepting(&self, states: &StateSet) -> bool {
        states.intersects(self.nfa.accepts())
    }
}

/// Translate a string into an alphabet bounded by `max_code_point`: code
/// points when the alphabet covers Unicode, UTF-8 bytes when it covers
/// bytes only.
pub fn code_points(input: &str, max_code_point: u32) -> Vec<u32> {
    if max_code_point <= 0xFF {
        input.bytes().map(u32::from).collect()
    } else {
        input.chars().map(u32::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_points() {
        assert_eq!(code_points("aé", 0xFF), vec![0x61, 0xC3, 0xA9]);
        assert_eq!(code_points("aé", 0x10FFFF), vec![0x61, 0xE9]);
    }
}
