use regex_solver::{
    Determinization, Minimization, Solver, SolverOptions, Witness,
};

fn configurations() -> Vec<SolverOptions> {
    vec![
        SolverOptions::new(),
        SolverOptions::new().minimize(false),
        SolverOptions::new().minimization(Minimization::Moore),
        SolverOptions::new().minimization(Minimization::Brzozowski),
        SolverOptions::new().determinization(Determinization::OnDemandClosures),
    ]
}

fn text(witness: &Option<Witness>) -> Option<String> {
    witness.as_ref().map(|w| w.to_string())
}

#[test]
fn minimum_length_counterexamples() -> anyhow::Result<()> {
    crate::init();
    let cases = [
        ("a*", "a{0,5}", 6),
        ("(ab)*", "(ab){0,2}|(ab){4,}", 6),
        ("[a-z]+", "[a-y]*|[a-z]*z[a-z]*z[a-z]*", 1),
        ("x(y|z)*", "xy*|xz*", 3),
    ];
    for options in configurations() {
        let solver = Solver::new(options.clone());
        for (left, right, len) in cases {
            let result = solver.subset_of(left, right)?;
            assert!(!result.holds, "{} <= {} with {:?}", left, right, options);
            let witness = result.counterexample.expect("counterexample");
            assert_eq!(witness.len(), len, "{} <= {} with {:?}", left, right, options);
            assert!(solver.compile(left)?.accepts_code_points(witness.code_points()));
            assert!(!solver.compile(right)?.accepts_code_points(witness.code_points()));
        }
    }
    Ok(())
}

#[test]
fn equivalence_reports_both_directions() -> anyhow::Result<()> {
    let solver = crate::solver();
    let result = solver.equivalent("ab|c", "ab|d")?;
    assert!(!result.holds);
    assert_eq!(text(&result.left_only), Some("c".to_string()));
    assert_eq!(text(&result.right_only), Some("d".to_string()));

    let result = solver.equivalent("a+", "a*")?;
    assert!(!result.holds);
    assert_eq!(result.left_only, None);
    assert_eq!(text(&result.right_only), Some(String::new()));
    Ok(())
}

#[test]
fn intersection_witness_is_shortest() -> anyhow::Result<()> {
    let solver = crate::solver();
    let result = solver.intersection("(aa)+", "(aaa)+")?;
    assert!(!result.disjoint);
    assert_eq!(text(&result.witness), Some("aaaaaa".to_string()));

    let result = solver.intersection("[0-9]+x", "[5-7]{2}.")?;
    assert_eq!(result.witness.map(|w| w.len()), Some(3));
    Ok(())
}

#[test]
fn empty_languages() -> anyhow::Result<()> {
    let solver = crate::solver();
    // Nothing is in the empty language, so it is a subset of everything.
    assert!(solver.subset_of("[^\\x00-\\xFF]", "a")?.holds);
    assert!(solver.intersection("[^\\x00-\\xFF]", "a*")?.disjoint);
    assert!(solver.compile("a[^\\x00-\\xFF]")?.is_empty());
    Ok(())
}
