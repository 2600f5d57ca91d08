use crate::{
    charset::CharSet,
    error::{ComplexityError, Limit},
    state::{StateId, StateSet},
    CompileResult,
};

/// A transition guarded by a set of code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The code points this transition consumes
    pub set: CharSet,
    /// The state reached after consuming one of them
    pub target: StateId,
}

/// A Thompson NFA state.
///
/// A state may carry any number of epsilon edges and guarded transitions.
/// Acceptance is a property of the automaton, not of the state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    epsilons: Vec<StateId>,
    transitions: Vec<Transition>,
}

impl State {
    /// Targets reachable without consuming input
    pub fn epsilons(&self) -> &[StateId] {
        &self.epsilons
    }

    /// Guarded transitions out of this state
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// A partially built NFA with one entry and any number of exits.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub start: StateId,
    pub accepts: Vec<StateId>,
}

/// A Thompson NFA over a bounded code-point alphabet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFA {
    states: Vec<State>,
    start: StateId,
    accepts: StateSet,
    min_code_point: u32,
    max_code_point: u32,
}

impl NFA {
    /// The number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
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

    pub fn accepts(&self) -> &StateSet {
        &self.accepts
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.accepts.contains(id)
    }

    /// The inclusive code-point bounds of the alphabet
    pub fn bounds(&self) -> (u32, u32) {
        (self.min_code_point, self.max_code_point)
    }

    /// An empty state set sized for this automaton
    pub fn state_set(&self) -> StateSet {
        StateSet::with_capacity(self.states.len())
    }

    /// Get the epsilon closure of a set of states
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(id) = stack.pop() {
            for &next in self.states[id].epsilons.iter() {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }

        closure
    }

    /// Get the epsilon closure of every state, indexed by state
    pub fn epsilon_closures(&self) -> Vec<StateSet> {
        (0..self.states.len())
            .map(|id| {
                let mut set = self.state_set();
                set.insert(id);
                self.epsilon_closure(&set)
            })
            .collect()
    }

    /// The states reached from `states` by consuming `cp`, before closure
    pub fn step(&self, states: &StateSet, cp: u32) -> StateSet {
        let mut next = self.state_set();
        for id in states.iter() {
            for t in self.states[id].transitions.iter() {
                if t.set.contains(cp) {
                    next.insert(t.target);
                }
            }
        }
        next
    }
}

/// Allocates NFA states and edges in an arena.
///
/// Every state, epsilon edge and guarded transition counts as one
/// allocation against the ceiling.
#[derive(Debug)]
pub struct Builder {
    states: Vec<State>,
    allocations: usize,
    max_allocations: usize,
    min_code_point: u32,
    max_code_point: u32,
}

impl Builder {
    /// Create a builder that makes at most `max_allocations` allocations
    /// over the alphabet `bounds`
    pub fn new(max_allocations: usize, bounds: (u32, u32)) -> Self {
        Self {
            states: Vec::new(),
            allocations: 0,
            max_allocations,
            min_code_point: bounds.0,
            max_code_point: bounds.1,
        }
    }

    /// The number of states allocated so far
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The number of states and edges allocated so far
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.min_code_point, self.max_code_point)
    }

    fn allocate(&mut self) -> CompileResult<()> {
        if self.allocations >= self.max_allocations {
            debug!(
                "NFA ceiling of {} reached during construction",
                self.max_allocations
            );
            return Err(ComplexityError::limit_exceeded(
                Limit::NfaStates,
                self.allocations + 1,
                self.max_allocations,
            ));
        }
        self.allocations += 1;
        Ok(())
    }

    /// Add a new state and return its ID
    pub fn add_state(&mut self) -> CompileResult<StateId> {
        self.allocate()?;
        let id = self.states.len();
        self.states.push(State::default());
        Ok(id)
    }

    /// Connect two states with an epsilon transition
    pub fn add_epsilon(
        &mut self,
        from: StateId,
        to: StateId,
    ) -> CompileResult<()> {
        self.allocate()?;
        self.states[from].epsilons.push(to);
        Ok(())
    }

    /// Connect two states with a transition guarded by `set`. Empty sets
    /// never fire and are dropped without counting.
    pub fn add_transition(
        &mut self,
        from: StateId,
        set: CharSet,
        to: StateId,
    ) -> CompileResult<()> {
        if set.is_empty() {
            return Ok(());
        }
        self.allocate()?;
        self.states[from].transitions.push(Transition { set, target: to });
        Ok(())
    }

    /// Finish the automaton
    pub fn build(self, start: StateId, accepts: &[StateId]) -> NFA {
        let mut set = StateSet::with_capacity(self.states.len());
        for &id in accepts {
            set.insert(id);
        }
        NFA {
            states: self.states,
            start,
            accepts: set,
            min_code_point: self.min_code_point,
            max_code_point: self.max_code_point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ceiling() {
        let mut builder = Builder::new(2, (0, 0xFF));
        builder.add_state().unwrap();
        builder.add_state().unwrap();
        let err = builder.add_state().unwrap_err();
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.limit, Limit::NfaStates);
        assert_eq!((diag.observed, diag.configured), (3, 2));
    }

    #[test]
    fn test_edges_count_against_ceiling() {
        let mut builder = Builder::new(3, (0, 0xFF));
        let s0 = builder.add_state().unwrap();
        let s1 = builder.add_state().unwrap();
        builder.add_epsilon(s0, s1).unwrap();
        let err = builder
            .add_transition(s1, CharSet::single(b'a' as u32), s0)
            .unwrap_err();
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.limit, Limit::NfaStates);
        assert_eq!((diag.observed, diag.configured), (4, 3));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_epsilon_closure() {
        let mut builder = Builder::new(10, (0, 0xFF));
        let s0 = builder.add_state().unwrap();
        let s1 = builder.add_state().unwrap();
        let s2 = builder.add_state().unwrap();
        let s3 = builder.add_state().unwrap();
        builder.add_epsilon(s0, s1).unwrap();
        builder.add_epsilon(s1, s2).unwrap();
        builder.add_epsilon(s2, s0).unwrap();
        builder.add_transition(s2, CharSet::single(b'a' as u32), s3).unwrap();
        let nfa = builder.build(s0, &[s3]);

        let mut start = nfa.state_set();
        start.insert(s0);
        let closure = nfa.epsilon_closure(&start);
        assert_eq!(closure.iter().collect::<Vec<_>>(), vec![s0, s1, s2]);
        assert_eq!(nfa.epsilon_closures()[s1], closure);

        let next = nfa.step(&closure, b'a' as u32);
        assert!(nfa.accepts().intersects(&next));
        assert!(nfa.step(&closure, b'b' as u32).is_empty());
    }

    #[test]
    fn test_empty_transitions_are_dropped() {
        let mut builder = Builder::new(10, (0, 0xFF));
        let s0 = builder.add_state().unwrap();
        builder.add_transition(s0, CharSet::empty(), s0).unwrap();
        assert_eq!(builder.allocations(), 1);
        let nfa = builder.build(s0, &[]);
        assert!(nfa.state(s0).transitions().is_empty());
    }
}
