//! # rank-trie
//!
//! A weighted prefix index: stores Unicode strings with signed weights and
//! answers prefix queries with the top-k stored terms, best first, in time
//! proportional to the prefix length alone.
//!
//! Every node of a path-compressed trie keeps a bounded, pre-ranked set of
//! the best keywords in its subtree, maintained incrementally during
//! insertion. A query is a single descent over the prefix's code points
//! followed by a copy of the node's ranked set; nothing is scanned or
//! sorted at query time.
//!
//! ## Example
//!
//! ```rust
//! use rank_trie::RankTrie;
//!
//! let mut trie = RankTrie::new(3);
//! trie.insert("apple", 5);
//! trie.insert("app", 3);
//! trie.insert("apricot", 4);
//! trie.insert("banana", 10);
//!
//! assert_eq!(trie.suggest("ap"), ["apple", "apricot", "app"]);
//! assert_eq!(trie.suggest(""), ["banana", "apple", "apricot"]);
//! ```

#![warn(clippy::all)]

use std::cmp::Ordering;
use std::collections::HashMap;

/// Handle into the keyword arena.
type KeywordId = u32;

/// Handle into the node arena.
type NodeId = u32;

/// The root lives at slot 0 of the node arena and never stores a keyword.
const ROOT: NodeId = 0;

// =============================================================================
// Keyword and ranking order
// =============================================================================

/// A stored string together with its weight.
///
/// Immutable once inserted. The decoded code points are kept alongside the
/// original string because the tree navigates one code point per edge while
/// ordering and output use the original byte form.
#[derive(Debug, Clone)]
pub struct Keyword {
    term: String,
    weight: i64,
    chars: Vec<char>,
}

impl Keyword {
    /// The original string.
    #[inline]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The weight supplied at insertion.
    #[inline]
    pub fn weight(&self) -> i64 {
        self.weight
    }

    #[inline]
    fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// Ranking order: weight descending, then term ascending (byte-wise).
///
/// Two keywords with the same term compare equal regardless of weight. The
/// index never stores two entries with the same term, so within any one
/// ranked set this only triggers for self-comparison.
fn rank_cmp(a: &Keyword, b: &Keyword) -> Ordering {
    if a.term == b.term {
        return Ordering::Equal;
    }
    match b.weight.cmp(&a.weight) {
        Ordering::Equal => a.term.cmp(&b.term),
        ord => ord,
    }
}

// =============================================================================
// Bounded ranked set
// =============================================================================

/// The best keywords of one subtree, pre-sorted under `rank_cmp`.
///
/// Holds at most `cap` arena handles, so a keyword costs one `u32` per
/// ancestor node rather than a copy. The backing vec is kept sorted; `cap`
/// is small and fixed, so an insert is a binary search plus a bounded
/// shift.
#[derive(Debug, Clone, Default)]
struct TopSet {
    ids: Vec<KeywordId>,
}

impl TopSet {
    fn seeded(id: KeywordId) -> Self {
        Self { ids: vec![id] }
    }

    /// Insert `id` keeping rank order. No-op when an equal entry (same term)
    /// is present; evicts the worst entry when the set grows past `cap`.
    fn insert(&mut self, id: KeywordId, arena: &[Keyword], cap: usize) {
        let kw = &arena[id as usize];
        match self
            .ids
            .binary_search_by(|&other| rank_cmp(&arena[other as usize], kw))
        {
            Ok(_) => {}
            Err(at) => {
                self.ids.insert(at, id);
                if self.ids.len() > cap {
                    self.ids.pop();
                }
            }
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    fn iter(&self) -> impl Iterator<Item = KeywordId> + '_ {
        self.ids.iter().copied()
    }
}

// =============================================================================
// Tree nodes
// =============================================================================

/// One trie node.
///
/// `key` is present when a stored keyword terminates here, or when this node
/// is a path-compressed leaf holding the only keyword of its subtree. Leaves
/// always hold a key; the root never does.
#[derive(Debug, Clone)]
struct Node {
    key: Option<KeywordId>,
    children: HashMap<char, NodeId>,
    top: TopSet,
}

impl Node {
    fn new(key: Option<KeywordId>) -> Self {
        Self {
            key,
            children: HashMap::new(),
            top: key.map_or_else(TopSet::default, TopSet::seeded),
        }
    }
}

// =============================================================================
// RankTrie
// =============================================================================

/// A path-compressed trie whose nodes carry pre-ranked top-k sets.
///
/// Features:
/// - `insert` is one descent with structural repair; every node on the
///   insertion path absorbs the new keyword into its ranked set
/// - `suggest` walks the prefix once and returns already-ranked results
/// - arena storage: nodes and keywords live in flat vecs, referenced by
///   `u32` handles
#[derive(Debug, Clone)]
pub struct RankTrie {
    keywords: Vec<Keyword>,
    nodes: Vec<Node>,
    /// Fixed bound on every node's ranked set.
    cap: usize,
    /// Count of distinct stored strings.
    len: usize,
}

impl RankTrie {
    /// Create an empty index whose per-node ranked sets keep at most `cap`
    /// keywords.
    ///
    /// # Panics
    ///
    /// Panics when `cap` is zero.
    pub fn new(cap: usize) -> Self {
        assert!(cap >= 1, "ranked-set capacity must be at least 1");
        Self {
            keywords: Vec::new(),
            nodes: vec![Node::new(None)],
            cap,
            len: 0,
        }
    }

    /// Number of distinct stored strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The fixed per-node ranked-set bound.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Number of allocated tree nodes, root included. Non-decreasing.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    #[inline]
    fn keyword(&self, id: KeywordId) -> &Keyword {
        &self.keywords[id as usize]
    }

    fn alloc_node(&mut self, key: Option<KeywordId>) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(key));
        id
    }

    fn alloc_keyword(&mut self, term: &str, weight: i64, chars: Vec<char>) -> KeywordId {
        let id = self.keywords.len() as KeywordId;
        self.keywords.push(Keyword {
            term: term.to_string(),
            weight,
            chars,
        });
        id
    }

    fn rank_insert(&mut self, node: NodeId, key: KeywordId) {
        let Self {
            keywords,
            nodes,
            cap,
            ..
        } = self;
        let top = &mut nodes[node as usize].top;
        top.insert(key, keywords, *cap);
        debug_assert!(top.len() <= *cap);
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Store `term` with `weight`.
    ///
    /// Inserting a term that is already stored is a no-op: the original
    /// weight is kept, whatever `weight` says.
    ///
    /// # Panics
    ///
    /// Panics when `term` is empty.
    pub fn insert(&mut self, term: &str, weight: i64) {
        assert!(!term.is_empty(), "cannot insert an empty term");
        let chars: Vec<char> = term.chars().collect();
        debug_assert!(!chars.is_empty());

        // Duplicate fast-path: a descent over the full term lands on the node
        // that would hold it; only an exact string match is a duplicate.
        if let Some(found) = self.descend(&chars) {
            if let Some(key) = self.node(found).key {
                if self.keyword(key).term == term {
                    return;
                }
            }
        }

        let key = self.alloc_keyword(term, weight, chars);
        self.insert_new(key);
        self.len += 1;
    }

    /// Update walk for a keyword known to be absent: structural repair plus
    /// ranked-set maintenance on every node along the path.
    fn insert_new(&mut self, key: KeywordId) {
        let s = self.keyword(key).chars.clone();
        let n = s.len();

        let mut now = match self.node(ROOT).children.get(&s[0]).copied() {
            Some(child) => child,
            None => {
                let leaf = self.alloc_node(Some(key));
                self.node_mut(ROOT).children.insert(s[0], leaf);
                self.rank_insert(ROOT, key);
                return;
            }
        };
        self.rank_insert(ROOT, key);

        let mut pos = 0;
        loop {
            pos += 1;

            // The term is exhausted: it terminates at `now`. A resident
            // keyword must be longer (exact duplicates were filtered out),
            // so it moves one level down before `now` takes the new one.
            if pos == n {
                if let Some(resident) = self.node(now).key {
                    let rc = self.keyword(resident).chars();
                    debug_assert!(rc.len() > n);
                    let down = rc[pos];
                    let child = self.alloc_node(Some(resident));
                    self.node_mut(now).children.insert(down, child);
                }
                self.node_mut(now).key = Some(key);
                self.rank_insert(now, key);
                return;
            }

            // `now` is a path-compressed leaf: materialize the shared run,
            // one node per matching code point, then split where the two
            // keywords diverge. Every chain node covers both keywords, so
            // both go into its ranked set.
            if self.node(now).children.is_empty() {
                let other = self.node(now).key.expect("leaf node without a keyword");
                let o = self.keyword(other).chars.clone();

                while pos < n && pos < o.len() && s[pos] == o[pos] {
                    let link = self.alloc_node(None);
                    self.node_mut(now).children.insert(s[pos], link);
                    self.rank_insert(now, key);
                    self.rank_insert(now, other);
                    self.node_mut(now).key = None;
                    now = link;
                    pos += 1;
                }

                if pos == n {
                    // The new term ends at the split point.
                    self.node_mut(now).key = Some(key);
                    self.rank_insert(now, key);
                    let child = self.alloc_node(Some(other));
                    self.node_mut(now).children.insert(o[pos], child);
                    self.rank_insert(now, other);
                } else if pos == o.len() {
                    // The resident term ends at the split point.
                    self.node_mut(now).key = Some(other);
                    self.rank_insert(now, other);
                    let child = self.alloc_node(Some(key));
                    self.node_mut(now).children.insert(s[pos], child);
                    self.rank_insert(now, key);
                } else {
                    // Proper fork: neither term ends here.
                    self.node_mut(now).key = None;
                    self.rank_insert(now, key);
                    self.rank_insert(now, other);
                    let a = self.alloc_node(Some(key));
                    self.node_mut(now).children.insert(s[pos], a);
                    let b = self.alloc_node(Some(other));
                    self.node_mut(now).children.insert(o[pos], b);
                }
                return;
            }

            // Plain internal step: branch off or descend.
            match self.node(now).children.get(&s[pos]).copied() {
                None => {
                    let leaf = self.alloc_node(Some(key));
                    self.node_mut(now).children.insert(s[pos], leaf);
                    self.rank_insert(now, key);
                    return;
                }
                Some(next) => {
                    self.rank_insert(now, key);
                    now = next;
                }
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The best stored terms sharing `prefix`: weight-descending, then
    /// lexicographic, at most [`capacity`](Self::capacity) of them. An empty
    /// prefix yields the global ranking; an absent prefix yields nothing.
    ///
    /// The returned strings are copies, independent of later insertions.
    pub fn suggest(&self, prefix: &str) -> Vec<String> {
        self.ranked_node(prefix)
            .map(|found| {
                self.node(found)
                    .top
                    .iter()
                    .map(|id| self.keyword(id).term.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Like [`suggest`](Self::suggest), but yields borrowed keyword views
    /// carrying weights.
    pub fn suggest_entries(&self, prefix: &str) -> Vec<&Keyword> {
        self.ranked_node(prefix)
            .map(|found| {
                self.node(found)
                    .top
                    .iter()
                    .map(|id| self.keyword(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn ranked_node(&self, prefix: &str) -> Option<NodeId> {
        if prefix.is_empty() {
            return Some(ROOT);
        }
        let query: Vec<char> = prefix.chars().collect();
        self.descend(&query)
    }

    /// Exact-match lookup.
    pub fn get(&self, term: &str) -> Option<&Keyword> {
        if term.is_empty() {
            return None;
        }
        let query: Vec<char> = term.chars().collect();
        let found = self.descend(&query)?;
        let key = self.node(found).key?;
        let kw = self.keyword(key);
        (kw.term == term).then_some(kw)
    }

    /// Whether `term` is stored.
    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    /// Walk the tree over `query`. Returns the node covering that prefix,
    /// or `None` when no stored keyword starts with it.
    fn descend(&self, query: &[char]) -> Option<NodeId> {
        let mut now = ROOT;
        let mut pos = 0;
        while pos < query.len() {
            let node = self.node(now);
            if node.children.is_empty() {
                // Path-compressed leaf: the resident keyword must cover the
                // rest of the query.
                let key = node.key?;
                let kc = self.keyword(key).chars();
                if kc.len() < query.len() || kc[pos..query.len()] != query[pos..] {
                    return None;
                }
                break;
            }
            now = node.children.get(&query[pos]).copied()?;
            pos += 1;
        }

        // A resident keyword must itself start with the query; the edges
        // only vouch for the consumed portion.
        if let Some(key) = self.node(now).key {
            let kc = self.keyword(key).chars();
            if kc.len() < query.len() || kc[..query.len()] != query[..] {
                return None;
            }
        }
        Some(now)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// All stored keywords, in insertion order.
    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    /// Approximate heap usage in bytes.
    pub fn memory_usage(&self) -> usize {
        let mut total = self.keywords.capacity() * std::mem::size_of::<Keyword>()
            + self.nodes.capacity() * std::mem::size_of::<Node>();
        for kw in &self.keywords {
            total += kw.term.capacity() + kw.chars.capacity() * std::mem::size_of::<char>();
        }
        for node in &self.nodes {
            // HashMap internals are opaque; 16 bytes per slot is close enough.
            total += node.children.capacity() * 16
                + node.top.ids.capacity() * std::mem::size_of::<KeywordId>();
        }
        total
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod proptests;
