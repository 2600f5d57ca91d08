use regex_solver::{Error, MatchMode, Solver, SolverOptions};

use crate::solver;

#[test]
fn alternation_equals_class() -> anyhow::Result<()> {
    let result = solver().equivalent("a|b", "[ab]")?;
    assert!(result.holds);
    assert_eq!(result.left_only, None);
    assert_eq!(result.right_only, None);
    Ok(())
}

#[test]
fn unbounded_digits_not_subset_of_bounded() -> anyhow::Result<()> {
    let solver = solver();
    let result = solver.subset_of("[0-9]+", "[0-9]{1,3}")?;
    assert!(!result.holds);
    let counterexample = result.counterexample.expect("counterexample");
    assert_eq!(counterexample.len(), 4);
    assert!(counterexample.to_string().chars().all(|c| c.is_ascii_digit()));

    let left = solver.compile("[0-9]+")?;
    let right = solver.compile("[0-9]{1,3}")?;
    assert!(left.accepts_code_points(counterexample.code_points()));
    assert!(!right.accepts_code_points(counterexample.code_points()));

    assert!(solver.subset_of("[0-9]{1,3}", "[0-9]+")?.holds);
    Ok(())
}

#[test]
fn disjoint_repetitions() -> anyhow::Result<()> {
    let result = solver().intersection("a+", "b+")?;
    assert!(result.disjoint);
    assert_eq!(result.witness, None);
    Ok(())
}

#[test]
fn partial_mode_rejects_mid_pattern_anchor() {
    crate::init();
    let solver = Solver::new(SolverOptions::new().match_mode(MatchMode::Partial));
    let err = solver.compile("(a+)^(a+)").unwrap_err();
    match err {
        Error::Complexity(ref err) => {
            assert_eq!(err.position(), Some(4));
            assert_eq!(err.pattern(), Some("(a+)^(a+)"));
        }
        ref other => panic!("expected a complexity error, got {:?}", other),
    }
    assert!(solver.compile("(a+)+").is_ok());
    assert!(solver.compile("^(a+)+$").is_ok());
}
