/*!
Breadth-first search over the product of two DFAs.

Both automata are partial, so a side with no transition on a code point moves
to an implicit dead state, written `None`. A pair where both sides are dead
can never satisfy any goal and is pruned. BFS order guarantees that the
first pair satisfying the goal is reached by a shortest string.
*/

use std::collections::VecDeque;

use regex_solver_automata::{
    charset::{self, CharSet},
    StateId, DFA,
};
use rustc_hash::FxHashMap;

use crate::witness::Witness;

type Pair = (Option<StateId>, Option<StateId>);

/// Search for a shortest string driving `left` and `right` into a pair of
/// states whose acceptance satisfies `goal`.
pub(crate) fn search<F>(left: &DFA, right: &DFA, goal: F) -> Option<Witness>
where
    F: Fn(bool, bool) -> bool,
{
    let accepting = |(l, r): Pair| {
        goal(
            l.map_or(false, |id| left.is_accepting(id)),
            r.map_or(false, |id| right.is_accepting(id)),
        )
    };

    // One representative code point per range of the common refinement of
    // both alphabets. Within a range, both automata behave uniformly.
    let symbols: Vec<u32> = charset::partition_ranges(
        left.alphabet_ranges()
            .iter()
            .chain(right.alphabet_ranges().iter())
            .copied(),
    )
    .into_iter()
    .filter_map(|r| CharSet::range(r.start, r.end).sample())
    .collect();

    let unicode = left.max_code_point() > 0xFF;
    let start: Pair = (Some(left.start()), Some(right.start()));
    if accepting(start) {
        return Some(Witness::new(vec![], unicode));
    }

    // Each visited pair maps to the pair it was reached from and the code
    // point consumed on the way. The start pair has no parent.
    let mut parents: FxHashMap<Pair, Option<(Pair, u32)>> = FxHashMap::default();
    parents.insert(start, None);
    let mut queue = VecDeque::from([start]);

    while let Some(pair) = queue.pop_front() {
        for &cp in symbols.iter() {
            let next: Pair = (
                pair.0.and_then(|id| left.next(id, cp)),
                pair.1.and_then(|id| right.next(id, cp)),
            );
            if next == (None, None) || parents.contains_key(&next) {
                continue;
            }
            parents.insert(next, Some((pair, cp)));
            if accepting(next) {
                debug!(
                    "product search found a witness after visiting {} pairs",
                    parents.len()
                );
                return Some(reconstruct(&parents, next, unicode));
            }
            queue.push_back(next);
        }
    }
    debug!("product search exhausted {} pairs", parents.len());
    None
}

fn reconstruct(
    parents: &FxHashMap<Pair, Option<(Pair, u32)>>,
    mut pair: Pair,
    unicode: bool,
) -> Witness {
    let mut code_points = vec![];
    while let Some(&Some((parent, cp))) = parents.get(&pair) {
        code_points.push(cp);
        pair = parent;
    }
    code_points.reverse();
    Witness::new(code_points, unicode)
}
