use quickcheck::{Arbitrary, Gen, QuickCheck};
use regex_solver::{Minimization, Solver, SolverOptions};
use regex_solver_automata::{Compiler, Matcher};

/// A small pattern over a three-letter alphabet, built only from constructs
/// the solver supports.
#[derive(Clone, Debug)]
struct Pattern(String);

impl Arbitrary for Pattern {
    fn arbitrary(g: &mut Gen) -> Pattern {
        Pattern(generate(g, 3))
    }
}

fn generate(g: &mut Gen, depth: u32) -> String {
    const ATOMS: &[&str] = &["a", "b", "c", "[ab]", "[^a]", "[a-c]", ".", ""];
    let choice = if depth == 0 { 0 } else { u8::arbitrary(g) % 7 };
    match choice {
        0 => g.choose(ATOMS).copied().unwrap_or("a").to_string(),
        1 | 2 => format!("{}{}", generate(g, depth - 1), generate(g, depth - 1)),
        3 => format!("(?:{}|{})", generate(g, depth - 1), generate(g, depth - 1)),
        4 => format!("(?:{})*", generate(g, depth - 1)),
        5 => format!("(?:{})?", generate(g, depth - 1)),
        _ => {
            let min = u8::arbitrary(g) % 3;
            let max = min + u8::arbitrary(g) % 3;
            format!("(?:{}){{{},{}}}", generate(g, depth - 1), min, max)
        }
    }
}

fn qc() -> QuickCheck {
    crate::init();
    QuickCheck::new().tests(200)
}

/// Run a witness through the Thompson NFA as well as the DFA, so a bug in
/// determinization cannot vouch for itself.
fn nfa_accepts(solver: &Solver, pattern: &str, input: &[u32]) -> bool {
    let node = regex_solver_syntax::parse(pattern).unwrap();
    let nfa = Compiler::new(solver.options(), pattern).compile(&node).unwrap();
    Matcher::new(&nfa).is_match_code_points(input)
}

#[test]
fn equivalence_is_reflexive() {
    fn prop(p: Pattern) -> bool {
        let result = Solver::default().equivalent(&p.0, &p.0).unwrap();
        result.holds && result.left_only.is_none() && result.right_only.is_none()
    }
    qc().quickcheck(prop as fn(Pattern) -> bool);
}

#[test]
fn mutual_inclusion_is_equivalence() {
    fn prop(a: Pattern, b: Pattern) -> bool {
        let solver = Solver::default();
        let forward = solver.subset_of(&a.0, &b.0).unwrap().holds;
        let backward = solver.subset_of(&b.0, &a.0).unwrap().holds;
        (forward && backward) == solver.equivalent(&a.0, &b.0).unwrap().holds
    }
    qc().quickcheck(prop as fn(Pattern, Pattern) -> bool);
}

#[test]
fn witnesses_are_valid() {
    fn prop(a: Pattern, b: Pattern) -> bool {
        let solver = Solver::default();
        let intersection = solver.intersection(&a.0, &b.0).unwrap();
        let shared = match intersection.witness {
            None => intersection.disjoint,
            Some(ref w) => {
                !intersection.disjoint
                    && nfa_accepts(&solver, &a.0, w.code_points())
                    && nfa_accepts(&solver, &b.0, w.code_points())
            }
        };
        let subset = solver.subset_of(&a.0, &b.0).unwrap();
        let counter = match subset.counterexample {
            None => subset.holds,
            Some(ref w) => {
                !subset.holds
                    && nfa_accepts(&solver, &a.0, w.code_points())
                    && !nfa_accepts(&solver, &b.0, w.code_points())
            }
        };
        shared && counter
    }
    qc().quickcheck(prop as fn(Pattern, Pattern) -> bool);
}

#[test]
fn minimizers_agree() {
    fn prop(p: Pattern) -> bool {
        let build = |algo| {
            Solver::new(SolverOptions::new().minimization(algo))
                .compile(&p.0)
                .unwrap()
        };
        let hopcroft = build(Minimization::Hopcroft);
        hopcroft == build(Minimization::Moore)
            && hopcroft == build(Minimization::Brzozowski)
    }
    qc().quickcheck(prop as fn(Pattern) -> bool);
}

#[test]
fn minimization_preserves_language() {
    fn prop(p: Pattern) -> bool {
        let minimized = Solver::default().compile(&p.0).unwrap();
        let raw = Solver::new(SolverOptions::new().minimize(false))
            .compile(&p.0)
            .unwrap();
        minimized.len() <= raw.len()
            && ["", "a", "ab", "ba", "abc", "cc", "aaab", "\n", "bcab"]
                .iter()
                .all(|s| minimized.accepts(s) == raw.accepts(s))
    }
    qc().quickcheck(prop as fn(Pattern) -> bool);
}
