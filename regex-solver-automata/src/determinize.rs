//! Subset construction over symbolic transitions.
//!
//! Instead of iterating an explicit alphabet, each subset's outgoing guards
//! are split into disjoint ranges and every range is followed once.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::{
    charset::{self, CharSet},
    dfa::{self, DFA},
    error::{ComplexityError, Limit},
    nfa::NFA,
    options::{Determinization, SolverOptions},
    state::{StateId, StateSet},
    CompileResult,
};

/// Convert an NFA to a DFA using the powerset construction.
///
/// Only subsets reachable from the start closure are materialized. The empty
/// subset is never created: a missing transition already means rejection.
/// Fails as soon as the DFA state or transition ceiling is crossed.
pub fn determinize(nfa: &NFA, options: &SolverOptions) -> CompileResult<DFA> {
    let closures = match options.get_determinization() {
        Determinization::PrecomputedClosures => Some(nfa.epsilon_closures()),
        Determinization::OnDemandClosures => None,
    };
    let closure = |set: &StateSet| -> StateSet {
        match closures {
            Some(ref closures) => {
                let mut out = nfa.state_set();
                for id in set.iter() {
                    out.union_with(&closures[id]);
                }
                out
            }
            None => nfa.epsilon_closure(set),
        }
    };
    let max_states = options.get_max_dfa_states();
    let max_transitions = options.get_max_transitions();

    // Each DFA state corresponds to a set of NFA states; its ID is its
    // insertion index.
    let mut subsets: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut states: Vec<dfa::State> = vec![];
    let mut worklist: VecDeque<StateId> = VecDeque::new();
    let mut processed = 0usize;

    let mut start = nfa.state_set();
    start.insert(nfa.start());
    let start = closure(&start);
    if max_states == 0 {
        return Err(ComplexityError::limit_exceeded(
            Limit::DfaStates,
            1,
            max_states,
        ));
    }
    states.push(dfa::State::new(start.intersects(nfa.accepts())));
    subsets.insert(start, 0);
    worklist.push_back(0);

    while let Some(id) = worklist.pop_front() {
        let subset = match subsets.get_index(id) {
            Some((subset, _)) => subset.clone(),
            None => continue,
        };
        let guards: Vec<(&CharSet, StateId)> = subset
            .iter()
            .flat_map(|s| nfa.state(s).transitions())
            .map(|t| (&t.set, t.target))
            .collect();
        let ranges = charset::partition(guards.iter().map(|&(set, _)| set));

        let mut state = dfa::State::new(states[id].is_accepting());
        for range in ranges {
            processed += 1;
            if let Some(limit) = max_transitions {
                if processed > limit {
                    debug!("transition ceiling of {} reached", limit);
                    return Err(ComplexityError::limit_exceeded(
                        Limit::Transitions,
                        processed,
                        limit,
                    ));
                }
            }

            let mut moved = nfa.state_set();
            for &(set, target) in guards.iter() {
                if set.contains(range.start) {
                    moved.insert(target);
                }
            }
            let next = closure(&moved);
            let next_id = match subsets.get(&next) {
                Some(&existing) => existing,
                None => {
                    let new_id = states.len();
                    if new_id >= max_states {
                        debug!("DFA state ceiling of {} reached", max_states);
                        return Err(ComplexityError::limit_exceeded(
                            Limit::DfaStates,
                            new_id + 1,
                            max_states,
                        ));
                    }
                    states.push(dfa::State::new(next.intersects(nfa.accepts())));
                    subsets.insert(next, new_id);
                    worklist.push_back(new_id);
                    new_id
                }
            };
            state.push_transition(range, next_id);
        }
        trace!(
            "DFA state {} <- NFA states {:?} ({} transitions)",
            id,
            subset,
            state.transitions().len()
        );
        states[id] = state;
    }

    debug!(
        "determinized {} NFA states into {} DFA states ({} transitions)",
        nfa.len(),
        states.len(),
        processed
    );
    Ok(DFA::new(states, 0, nfa.bounds()))
}
