use regex_solver::{Limit, Solver, SolverOptions};

fn limit_of(options: SolverOptions, pattern: &str) -> (Limit, usize, usize) {
    crate::init();
    let err = Solver::new(options).compile(pattern).unwrap_err();
    let err = err.complexity().expect("complexity error");
    let diag = err.diagnostic().expect("diagnostic");
    (diag.limit, diag.observed, diag.configured)
}

#[test]
fn nested_bounded_repeats_hit_nfa_ceiling() {
    let options = SolverOptions::new().max_nfa_states(100);
    let (limit, observed, configured) = limit_of(options, "(a{1,50}){1,50}");
    assert_eq!(limit, Limit::NfaStates);
    assert_eq!(configured, 100);
    assert_eq!(observed, 101);
}

#[test]
fn edges_count_against_nfa_ceiling() {
    // Eight states but twenty-two allocations in total.
    let options = SolverOptions::new().max_nfa_states(15);
    let (limit, observed, configured) = limit_of(options, "a|b|c|d");
    assert_eq!(limit, Limit::NfaStates);
    assert_eq!((observed, configured), (16, 15));

    let solver = Solver::new(SolverOptions::new().max_nfa_states(22));
    assert!(solver.compile("a|b|c|d").is_ok());
    let solver = Solver::new(SolverOptions::new().max_nfa_states(21));
    assert!(solver.compile("a|b|c|d").is_err());
}

#[test]
fn large_declared_bound_is_rejected_up_front() {
    let options = SolverOptions::new().max_nfa_states(1_000);
    let (limit, observed, _) = limit_of(options, "x{5000}");
    assert_eq!(limit, Limit::NfaStates);
    assert_eq!(observed, 5000);
}

#[test]
fn exponential_determinization_hits_dfa_ceiling() {
    let options = SolverOptions::new().max_dfa_states(64);
    let (limit, observed, configured) =
        limit_of(options, "[ab]*a[ab]{10}");
    assert_eq!(limit, Limit::DfaStates);
    assert_eq!((observed, configured), (65, 64));
}

#[test]
fn transition_ceiling() {
    let options = SolverOptions::new().max_transitions(Some(10));
    let (limit, _, configured) = limit_of(options, "abcdefghijklmnop");
    assert_eq!(limit, Limit::Transitions);
    assert_eq!(configured, 10);
}

#[test]
fn relaxed_limits_succeed() -> anyhow::Result<()> {
    crate::init();
    let solver = Solver::new(SolverOptions::new().max_dfa_states(5_000));
    let dfa = solver.compile("[ab]*a[ab]{10}")?;
    assert_eq!(dfa.len(), 1 << 11);
    Ok(())
}

#[test]
fn limit_error_message() {
    crate::init();
    let solver = Solver::new(SolverOptions::new().max_dfa_states(3));
    let err = solver.compile("abcd").unwrap_err();
    assert_eq!(err.to_string(), "dfa_states limit exceeded: 4 > 3");
}
