use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::RankTrie;

/// Naive model: every stored term with its weight, queried by scanning.
#[derive(Default, Clone)]
struct Model {
    map: BTreeMap<String, i64>,
}

impl Model {
    fn insert(&mut self, term: &str, weight: i64) {
        // First weight wins, matching the trie's duplicate no-op.
        self.map.entry(term.to_string()).or_insert(weight);
    }

    fn suggest(&self, prefix: &str, cap: usize) -> Vec<String> {
        let mut hits: Vec<(&String, &i64)> = self
            .map
            .iter()
            .filter(|(term, _)| term.starts_with(prefix))
            .collect();
        hits.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        hits.into_iter()
            .take(cap)
            .map(|(term, _)| term.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Actions to test against both implementations
#[derive(Arbitrary, Debug, Clone)]
enum Action {
    Insert(TermWeight),
    Query(Term),
}

/// Wrapper for term generation with custom strategies
#[derive(Debug, Clone)]
struct Term(String);

/// Wrapper for a term-weight pair
#[derive(Debug, Clone)]
struct TermWeight {
    term: Term,
    weight: i64,
}

impl Arbitrary for Term {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            // Tiny alphabet: forces shared runs, forks and push-downs
            "[ab]{1,6}".prop_map(Term),
            "[a-d]{1,10}".prop_map(Term),
            // Word-shaped terms around a common stem
            "(app|appl|apple|apricot|banana)[a-c]{0,3}".prop_map(Term),
            // Multi-byte code points: navigation is per code point while
            // ordering stays byte-wise
            "[aé日λ]{1,5}".prop_map(Term),
        ]
        .boxed()
    }
}

impl Arbitrary for TermWeight {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        // Narrow weight range so ties are common.
        (any::<Term>(), -8i64..8)
            .prop_map(|(term, weight)| TermWeight { term, weight })
            .boxed()
    }
}

/// Test harness that executes actions on both RankTrie and Model
struct Test {
    trie: RankTrie,
    model: Model,
    cap: usize,
}

impl Test {
    fn new(cap: usize) -> Self {
        Self {
            trie: RankTrie::new(cap),
            model: Model::default(),
            cap,
        }
    }

    fn execute(&mut self, action: Action) {
        match action {
            Action::Insert(tw) => {
                self.trie.insert(&tw.term.0, tw.weight);
                self.model.insert(&tw.term.0, tw.weight);
            }
            Action::Query(prefix) => {
                let got = self.trie.suggest(&prefix.0);
                let expected = self.model.suggest(&prefix.0, self.cap);
                assert_eq!(
                    got, expected,
                    "suggest mismatch: prefix={:?}, cap={}",
                    prefix.0, self.cap
                );
            }
        }
        // Always verify the counters
        assert_eq!(
            self.trie.len(),
            self.model.len(),
            "length mismatch: trie={}, model={}",
            self.trie.len(),
            self.model.len()
        );
        assert_eq!(self.trie.is_empty(), self.model.len() == 0);
    }

    /// Check the ranking at every prefix of every stored term, plus the
    /// global ranking via the empty prefix.
    fn check_all_prefixes(&self) {
        for term in self.model.map.keys() {
            let mut ends: Vec<usize> = term.char_indices().map(|(at, _)| at).collect();
            ends.push(term.len());
            for &end in &ends {
                let prefix = &term[..end];
                assert_eq!(
                    self.trie.suggest(prefix),
                    self.model.suggest(prefix, self.cap),
                    "ranking mismatch at prefix {:?}, cap={}",
                    prefix,
                    self.cap
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn proptest_vs_model(
        cap in 1usize..=4,
        actions in prop::collection::vec(any::<Action>(), 1..64),
    ) {
        let mut test = Test::new(cap);
        for action in actions {
            test.execute(action);
        }
        test.check_all_prefixes();
    }

    #[test]
    fn proptest_exact_lookup(
        cap in 1usize..=4,
        inserts in prop::collection::vec(any::<TermWeight>(), 1..32),
    ) {
        let mut trie = RankTrie::new(cap);
        let mut model = Model::default();
        for tw in &inserts {
            trie.insert(&tw.term.0, tw.weight);
            model.insert(&tw.term.0, tw.weight);
        }

        for (term, weight) in &model.map {
            let kw = trie.get(term).expect("stored term must be found");
            prop_assert_eq!(kw.term(), term.as_str());
            prop_assert_eq!(kw.weight(), *weight);
        }
        prop_assert!(trie.get("☃missing").is_none());
        prop_assert!(!trie.contains("☃missing"));
    }
}
