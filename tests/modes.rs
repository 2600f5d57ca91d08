use regex_solver::{MatchMode, Solver, SolverOptions};

fn partial() -> Solver {
    crate::init();
    Solver::new(SolverOptions::new().match_mode(MatchMode::Partial))
}

fn with_flags(flags: &str) -> Solver {
    crate::init();
    Solver::new(SolverOptions::new().flags(flags))
}

#[test]
fn partial_mode_is_substring_matching() -> anyhow::Result<()> {
    let solver = partial();
    let dfa = solver.compile("foo")?;
    assert!(dfa.accepts("xfooy"));
    assert!(!dfa.accepts("fo"));

    // Any string containing "ab" contains "b".
    assert!(solver.subset_of("ab", "b")?.holds);
    assert!(!solver.subset_of("b", "ab")?.holds);
    assert!(solver.equivalent("a", "a+")?.holds);
    Ok(())
}

#[test]
fn partial_mode_anchors() -> anyhow::Result<()> {
    let solver = partial();
    assert!(solver.subset_of("^abc", "abc")?.holds);
    assert!(!solver.subset_of("abc", "^abc")?.holds);
    assert!(solver.equivalent("^a$|^b$", "^[ab]$")?.holds);

    let result = solver.intersection("^a", "b$")?;
    assert!(!result.disjoint);
    assert_eq!(result.witness.map(|w| w.to_string()), Some("ab".to_string()));
    Ok(())
}

#[test]
fn full_mode_ignores_anchors() -> anyhow::Result<()> {
    let solver = crate::solver();
    assert!(solver.equivalent("^abc$", "abc")?.holds);
    assert!(solver.equivalent("^a|b$", "a|b")?.holds);
    Ok(())
}

#[test]
fn full_mode_rejects_anchors_inside_the_pattern() {
    let solver = crate::solver();
    let err = solver.compile("a^b").unwrap_err();
    let err = err.complexity().expect("complexity error");
    assert_eq!(err.position(), Some(1));
    assert!(solver.equivalent("a$b", "ab").is_err());
}

#[test]
fn case_insensitive_flag() -> anyhow::Result<()> {
    let solver = with_flags("i");
    assert!(solver.equivalent("abc", "[aA][bB][cC]")?.holds);
    assert!(solver.equivalent("ABC", "abc")?.holds);
    assert!(solver.subset_of("[^a]", "[^A]")?.holds);
    Ok(())
}

#[test]
fn dot_all_flag() -> anyhow::Result<()> {
    let result = crate::solver().equivalent(".", "[^\\n]")?;
    assert!(result.holds);

    let result = with_flags("s").equivalent(".", "[^\\n]")?;
    assert!(!result.holds);
    let left_only = result.left_only.expect("newline");
    assert_eq!(left_only.code_points(), &[u32::from(b'\n')]);
    assert_eq!(result.right_only, None);
    Ok(())
}

#[test]
fn byte_mode_reads_utf8() -> anyhow::Result<()> {
    let solver = crate::solver();
    // Two bytes, not one code point.
    assert!(solver.equivalent("é", "\\xC3\\xA9")?.holds);
    assert!(solver.intersection("é", "\\xE9")?.disjoint);
    let dfa = solver.compile(".")?;
    assert!(dfa.accepts_code_points(&[0xFF]));
    assert!(!dfa.accepts("é"));
    Ok(())
}

#[test]
fn byte_witnesses_render_as_utf8() -> anyhow::Result<()> {
    let solver = crate::solver();
    let witness = solver.intersection("é", "é")?.witness.expect("witness");
    assert_eq!(witness.code_points(), &[0xC3, 0xA9]);
    assert_eq!(witness.to_bytes(), "é".as_bytes());
    assert_eq!(witness.to_string(), "é");
    assert!(solver.compile("é")?.accepts(&witness.to_string()));

    let witness = with_flags("u").intersection("é", "é")?.witness.expect("witness");
    assert_eq!(witness.code_points(), &[0xE9]);
    assert!(with_flags("u").compile("é")?.accepts(&witness.to_string()));
    Ok(())
}

#[test]
fn unicode_flag_reads_code_points() -> anyhow::Result<()> {
    let solver = with_flags("u");
    assert!(solver.equivalent("é", "\\x{E9}")?.holds);
    assert!(solver.compile("\\x{1F600}")?.accepts("😀"));
    let dfa = solver.compile(".")?;
    assert!(dfa.accepts("é"));
    assert!(dfa.accepts_code_points(&[0x10FFFF]));

    let result = solver.subset_of("[^a]", "[\\x00-\\x{FFFF}]")?;
    assert!(!result.holds);
    let counterexample = result.counterexample.expect("astral code point");
    assert_eq!(counterexample.code_points(), &[0x10000]);
    Ok(())
}
