//! DFA minimization.
//!
//! Hopcroft and Moore refine a partition of a completed transition table:
//! the reachable states plus an explicit sink, with one column per alphabet
//! range. Brzozowski needs no table; it reverses and determinizes twice.
//!
//! All three produce the same trimmed automaton up to state numbering. States
//! are renumbered breadth-first from the start so the output is canonical.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    charset::{CharSet, CodeRange},
    determinize::determinize,
    dfa::{self, DFA},
    nfa,
    options::{Minimization, SolverOptions},
    state::StateId,
    CompileResult,
};

/// Minimize a DFA with the configured algorithm.
pub fn minimize(dfa: &DFA, options: &SolverOptions) -> CompileResult<DFA> {
    let minimized = match options.get_minimization() {
        Minimization::Hopcroft => {
            let table = Table::new(dfa);
            table.rebuild(&hopcroft(&table))
        }
        Minimization::Moore => {
            let table = Table::new(dfa);
            table.rebuild(&moore(&table))
        }
        Minimization::Brzozowski => brzozowski(dfa, options)?,
    };
    debug!(
        "minimized DFA from {} to {} states ({:?})",
        dfa.len(),
        minimized.len(),
        options.get_minimization()
    );
    Ok(minimized)
}

/// A complete transition table over the reachable states of a DFA.
struct Table {
    classes: Vec<CodeRange>,
    /// Rows, one per reachable state followed by the sink
    delta: Vec<usize>,
    accepting: Vec<bool>,
    start: usize,
    bounds: (u32, u32),
}

impl Table {
    fn new(dfa: &DFA) -> Table {
        let classes = dfa.alphabet_ranges().to_vec();

        // Dense indices for reachable states, in BFS order.
        let mut index: FxHashMap<StateId, usize> = FxHashMap::default();
        let mut order = vec![dfa.start()];
        index.insert(dfa.start(), 0);
        let mut i = 0;
        while i < order.len() {
            for t in dfa.state(order[i]).transitions() {
                if !index.contains_key(&t.target) {
                    index.insert(t.target, order.len());
                    order.push(t.target);
                }
            }
            i += 1;
        }

        let sink = order.len();
        let k = classes.len();
        let mut delta = vec![sink; (sink + 1) * k];
        for (row, &id) in order.iter().enumerate() {
            for (c, class) in classes.iter().enumerate() {
                if let Some(target) = dfa.next(id, class.start) {
                    delta[row * k + c] = index[&target];
                }
            }
        }
        let mut accepting: Vec<bool> =
            order.iter().map(|&id| dfa.is_accepting(id)).collect();
        accepting.push(false);

        Table { classes, delta, accepting, start: 0, bounds: dfa.bounds() }
    }

    fn len(&self) -> usize {
        self.accepting.len()
    }

    fn sink(&self) -> usize {
        self.len() - 1
    }

    fn next(&self, row: usize, class: usize) -> usize {
        self.delta[row * self.classes.len() + class]
    }

    /// Build the quotient automaton, dropping the block that holds the
    /// sink. Every state in that block can never reach acceptance.
    fn rebuild(&self, block_of: &[usize]) -> DFA {
        let dead = block_of[self.sink()];
        let start_block = block_of[self.start];
        if start_block == dead {
            return DFA::new(vec![dfa::State::new(false)], 0, self.bounds);
        }

        let mut representative: FxHashMap<usize, usize> = FxHashMap::default();
        for row in 0..self.len() {
            representative.entry(block_of[row]).or_insert(row);
        }

        let mut ids: FxHashMap<usize, StateId> = FxHashMap::default();
        let mut order = vec![start_block];
        ids.insert(start_block, 0);
        let mut states = vec![];
        let mut i = 0;
        while i < order.len() {
            let row = representative[&order[i]];
            let mut state = dfa::State::new(self.accepting[row]);
            for c in 0..self.classes.len() {
                let block = block_of[self.next(row, c)];
                if block == dead {
                    continue;
                }
                let target = match ids.get(&block) {
                    Some(&id) => id,
                    None => {
                        let id = order.len();
                        ids.insert(block, id);
                        order.push(block);
                        id
                    }
                };
                state.push_transition(self.classes[c], target);
            }
            states.push(state);
            i += 1;
        }
        DFA::new(states, 0, self.bounds)
    }
}

/// Hopcroft's partition refinement. Returns the block of every table row.
fn hopcroft(table: &Table) -> Vec<usize> {
    let n = table.len();
    let k = table.classes.len();

    // inverse[c * n + q] lists the rows p with next(p, c) == q.
    let mut inverse: Vec<Vec<usize>> = vec![vec![]; n * k];
    for p in 0..n {
        for c in 0..k {
            inverse[c * n + table.next(p, c)].push(p);
        }
    }

    let (finals, others): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&row| table.accepting[row]);
    let mut blocks: Vec<Vec<usize>> = vec![];
    let mut block_of = vec![0; n];
    for part in [finals, others] {
        if part.is_empty() {
            continue;
        }
        let id = blocks.len();
        for &row in part.iter() {
            block_of[row] = id;
        }
        blocks.push(part);
    }

    let mut worklist: VecDeque<(usize, usize)> = VecDeque::new();
    let mut pending: FxHashSet<(usize, usize)> = FxHashSet::default();
    for b in 0..blocks.len() {
        for c in 0..k {
            worklist.push_back((b, c));
            pending.insert((b, c));
        }
    }

    while let Some((splitter, c)) = worklist.pop_front() {
        pending.remove(&(splitter, c));

        // Group the predecessors of the splitter by their current block.
        let mut touched: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for &q in blocks[splitter].iter() {
            for &p in inverse[c * n + q].iter() {
                touched.entry(block_of[p]).or_default().push(p);
            }
        }
        let mut touched: Vec<(usize, Vec<usize>)> = touched.into_iter().collect();
        touched.sort_unstable_by_key(|&(block, _)| block);

        for (block, members) in touched {
            if members.len() == blocks[block].len() {
                continue;
            }
            let new_block = blocks.len();
            for &row in members.iter() {
                block_of[row] = new_block;
            }
            blocks[block].retain(|&row| block_of[row] == block);
            blocks.push(members);

            for d in 0..k {
                if pending.contains(&(block, d)) {
                    worklist.push_back((new_block, d));
                    pending.insert((new_block, d));
                } else {
                    let smaller = if blocks[new_block].len() < blocks[block].len()
                    {
                        new_block
                    } else {
                        block
                    };
                    worklist.push_back((smaller, d));
                    pending.insert((smaller, d));
                }
            }
        }
    }
    block_of
}

/// Moore's algorithm: refine by transition signatures until stable.
fn moore(table: &Table) -> Vec<usize> {
    let n = table.len();
    let k = table.classes.len();
    let mut block_of: Vec<usize> =
        (0..n).map(|row| usize::from(table.accepting[row])).collect();
    let mut count = block_of.iter().copied().collect::<FxHashSet<_>>().len();

    loop {
        let mut signatures: FxHashMap<Vec<usize>, usize> = FxHashMap::default();
        let mut next = Vec::with_capacity(n);
        for row in 0..n {
            let mut signature = Vec::with_capacity(k + 1);
            signature.push(block_of[row]);
            for c in 0..k {
                signature.push(block_of[table.next(row, c)]);
            }
            let fresh = signatures.len();
            next.push(*signatures.entry(signature).or_insert(fresh));
        }
        block_of = next;
        if signatures.len() == count {
            return block_of;
        }
        count = signatures.len();
    }
}

/// Brzozowski's algorithm: determinizing the reversal of a deterministic,
/// accessible automaton yields a minimal one.
fn brzozowski(dfa: &DFA, options: &SolverOptions) -> CompileResult<DFA> {
    let once = determinize(&reverse(dfa)?, options)?;
    determinize(&reverse(&once)?, options)
}

/// The reversal of a DFA as an NFA. DFA state `i` becomes NFA state `i`; a
/// fresh start state has epsilon edges to every former accepting state.
fn reverse(dfa: &DFA) -> CompileResult<nfa::NFA> {
    // Linear in the DFA, so only the determinization ceilings apply.
    let mut builder = nfa::Builder::new(usize::MAX, dfa.bounds());
    for _ in 0..dfa.len() {
        builder.add_state()?;
    }
    let start = builder.add_state()?;
    for (id, state) in dfa.states().iter().enumerate() {
        for t in state.transitions() {
            let set = CharSet::range(t.range.start, t.range.end);
            builder.add_transition(t.target, set, id)?;
        }
        if state.is_accepting() {
            builder.add_epsilon(start, id)?;
        }
    }
    Ok(builder.build(start, &[dfa.start()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;

    fn build(pattern: &str, options: &SolverOptions) -> DFA {
        let node = regex_solver_syntax::parse(pattern).unwrap();
        let nfa = Compiler::new(options, pattern).compile(&node).unwrap();
        determinize(&nfa, options).unwrap()
    }

    fn all_algorithms() -> [SolverOptions; 3] {
        [
            SolverOptions::new().minimization(Minimization::Hopcroft),
            SolverOptions::new().minimization(Minimization::Moore),
            SolverOptions::new().minimization(Minimization::Brzozowski),
        ]
    }

    #[test]
    fn test_minimal_state_counts() {
        for (pattern, expected) in [
            ("(a|b)*abb", 4),
            ("a*", 1),
            ("(ab|ab)", 3),
            ("a+|aa+", 2),
            ("[a-c]|[b-d]", 2),
        ] {
            for options in all_algorithms() {
                let dfa = build(pattern, &options);
                let min = minimize(&dfa, &options).unwrap();
                assert_eq!(
                    min.len(),
                    expected,
                    "{} with {:?}",
                    pattern,
                    options.get_minimization()
                );
            }
        }
    }

    #[test]
    fn test_algorithms_agree() {
        for pattern in ["(a|b)*a(a|b)", "x(yz)*|xy(zy)*z?", "[0-9]+(\\.[0-9]+)?"] {
            let results: Vec<DFA> = all_algorithms()
                .iter()
                .map(|options| minimize(&build(pattern, options), options).unwrap())
                .collect();
            assert_eq!(results[0], results[1], "{}", pattern);
            assert_eq!(results[0], results[2], "{}", pattern);
        }
    }

    #[test]
    fn test_language_is_preserved() {
        let options = SolverOptions::new();
        let dfa = build("(ab|a)(bc|c)", &options);
        let min = minimize(&dfa, &options).unwrap();
        for input in ["abc", "abbc", "ac", "abcc", "a", ""] {
            assert_eq!(min.accepts(input), dfa.accepts(input), "{}", input);
        }
    }

    #[test]
    fn test_empty_language_minimizes_to_one_state() {
        for options in all_algorithms() {
            let min = minimize(&build("[^\\x00-\\xFF]a", &options), &options)
                .unwrap();
            assert_eq!(min.len(), 1);
            assert!(min.is_empty());
        }
    }
}
