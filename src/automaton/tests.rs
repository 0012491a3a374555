use super::*;
use crate::config::Config;
use crate::regexp::{AttributedTree, SyntaxTree};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The three automata for one expression.
struct Built {
    nfa: Nfa,
    subset: Dfa,
    direct: Dfa,
}

fn build(regex: &str) -> Built {
    init();
    let config = Config::default();
    let tree = SyntaxTree::parse(&config, regex).unwrap();
    let nfa = Nfa::from_tree(&tree).unwrap();
    let subset = Dfa::from_nfa(&nfa).unwrap();
    let augmented = SyntaxTree::parse_augmented(&config, regex).unwrap();
    let direct = Dfa::from_attributed_tree(&AttributedTree::new(augmented).unwrap()).unwrap();
    Built { nfa, subset, direct }
}

impl Built {
    fn verdicts(&self, input: &str) -> [Verdict; 3] {
        [
            self.nfa.run(input),
            self.subset.run(input),
            self.direct.run(input),
        ]
    }

    fn assert_accepts(&self, input: &str) {
        for (method, verdict) in ["nfa", "subset", "direct"].iter().zip(self.verdicts(input)) {
            assert_eq!(verdict, Verdict::Accepted, "{} on {:?}", method, input);
        }
    }

    fn assert_rejects(&self, input: &str) {
        for (method, verdict) in ["nfa", "subset", "direct"].iter().zip(self.verdicts(input)) {
            assert!(verdict.is_rejected(), "{} on {:?}: {}", method, input, verdict);
        }
    }
}

/// Every string over `alphabet` up to `max_len` symbols.
fn strings(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut grown = Vec::new();
        for s in &frontier {
            for &c in alphabet {
                let mut t = s.clone();
                t.push(c);
                grown.push(t);
            }
        }
        out.extend(grown.iter().cloned());
        frontier = grown;
    }
    out
}

#[test]
fn test_abb_suffix() {
    let built = build("(a|b)*abb");
    for s in ["ababb", "abb", "aabb", "bbabb"] {
        built.assert_accepts(s);
    }
    for s in ["ab", "aab", "aba", "", "abba"] {
        built.assert_rejects(s);
    }
}

#[test]
fn test_binary_sample() {
    let built = build("(0|1)1*(0|1)");
    for s in ["010", "11", "00", "0111110"] {
        built.assert_accepts(s);
    }
    for s in ["0", "1", "", "0100"] {
        built.assert_rejects(s);
    }
}

#[test]
fn test_unknown_symbol_is_reported_by_every_method() {
    let built = build("(a|b)*abb");
    let expected = Verdict::UnknownSymbol {
        symbol: 'x',
        index: 1,
    };
    assert_eq!(built.verdicts("ax"), [expected; 3]);
}

#[test]
fn test_stuck_is_not_accepted() {
    // 'b' has no move from the start, even though the rest would match
    let built = build("ab");
    let verdicts = built.verdicts("bab");
    assert_eq!(verdicts, [Verdict::Stuck { index: 0 }; 3]);
}

#[test]
fn test_methods_agree_on_all_short_strings() {
    for regex in [
        "(a|b)*abb",
        "a(b|c)*",
        "(aa|b)+",
        "a?b+",
        "((a|b)(a|b))*",
        "(a|ε)b*",
        "a*b*a*",
    ] {
        let built = build(regex);
        for input in strings(&['a', 'b', 'c'], 5) {
            let [nfa, subset, direct] = built.verdicts(&input);
            assert_eq!(nfa, subset, "{} on {:?}", regex, input);
            assert_eq!(nfa, direct, "{} on {:?}", regex, input);
        }
    }
}

#[test]
fn test_plus_matches_concat_star() {
    let plus = build("a+");
    let star = build("aa*");
    for input in strings(&['a'], 6) {
        assert_eq!(plus.verdicts(&input), star.verdicts(&input), "{:?}", input);
    }
    plus.assert_rejects("");
}

#[test]
fn test_optional_matches_union_with_epsilon() {
    let optional = build("ba?");
    let union = build("b(a|ε)");
    for input in strings(&['a', 'b'], 4) {
        assert_eq!(
            optional.verdicts(&input),
            union.verdicts(&input),
            "{:?}",
            input
        );
    }
}

#[test]
fn test_dfas_are_deterministic() {
    let built = build("(a|b)*a(a|b)");
    for dfa in [&built.subset, &built.direct] {
        let mut seen = BTreeSet::new();
        for edge in dfa.edges() {
            assert!(matches!(edge.label, Label::Symbol(_)));
            assert!(seen.insert((edge.from, edge.label)), "duplicate {}", edge);
        }
    }
}

#[test]
fn test_alphabet_is_shared() {
    let built = build("(x|y)*z");
    let expected = BTreeSet::from(['x', 'y', 'z']);
    assert_eq!(built.nfa.alphabet(), &expected);
    assert_eq!(built.subset.alphabet(), &expected);
    assert_eq!(built.direct.alphabet(), &expected);
}

#[test]
fn test_direct_is_no_larger_than_subset() {
    let built = build("(a|b)*abb");
    assert_eq!(built.subset.states().len(), 5);
    assert_eq!(built.direct.states().len(), 4);
}

#[test]
fn test_edges_and_relabel() {
    let built = build("ab");
    let edges = built.subset.edges();
    assert_eq!(edges.len(), 2);
    assert!(edges.windows(2).all(|w| w[0] <= w[1]));

    let names = built.subset.relabel();
    assert_eq!(names.len(), 3);
    assert_eq!(names[&built.subset.initial()], "q0");
    let second = built.subset.step(built.subset.initial(), 'a').unwrap();
    assert_eq!(names[&second], "q1");
}

#[test]
fn test_relabel_covers_every_nfa_state() {
    let built = build("(a|b)*");
    let names = built.nfa.relabel();
    assert_eq!(names.len(), built.nfa.states().len());
    let distinct: BTreeSet<&String> = names.values().collect();
    assert_eq!(distinct.len(), names.len());
}

#[test]
fn test_simulate_reports_verdict() {
    let built = build("a*");
    let simulation = built.direct.simulate("aaa");
    assert_eq!(simulation.verdict, Verdict::Accepted);
    assert!(!built.direct.simulate("b").verdict.is_accepted());
}

#[test]
fn test_label_and_edge_display() {
    let mut ids = StateIds::new();
    let (from, to) = (ids.fresh(), ids.fresh());
    let edge = Edge {
        from,
        label: Label::Epsilon,
        to,
    };
    assert_eq!(edge.to_string(), "s0 -ε-> s1");
    assert_eq!(Label::Symbol('a').to_string(), "a");
}
