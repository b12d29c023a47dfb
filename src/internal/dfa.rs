//! This module contains the lazy DFA.
//!
//! A DFA state stands for the set of NFA nodes the scanner could occupy at once.
//! States are built on demand: `step` first consults the state's 256-slot
//! transition cache and only on a miss computes the follow set of the state for
//! the byte, interns the resulting signature, and fills the slot. Signatures are
//! the sorted node list plus the match flag; interning keeps exactly one state
//! per signature, so re-running the same input hits the cache throughout. States
//! and cache slots are never evicted.

use log::trace;
use rustc_hash::FxHashMap;

use super::{Arena, Nfa, NodeID, NodeKind};

/// Sentinel input value signaling start of input to the anchor logic. Outside
/// the byte range; the hot path never produces it.
const CBEGIN: u32 = 0x10000;

/// The ID type for DFA states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StateID(u32);

impl StateID {
    #[inline]
    pub(crate) fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StateID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One DFA state.
#[derive(Debug)]
pub(crate) struct DfaState {
    /// The canonical signature: the NFA nodes of the state, sorted by id.
    /// Immutable once the state exists.
    pub(crate) nodes: Box<[NodeID]>,
    /// True iff an End anchor fired during the closure that built this state.
    pub(crate) matched: bool,
    /// The transition cache, one slot per byte value. A slot, once set, never
    /// changes.
    pub(crate) next: Box<[Option<StateID>; 256]>,
}

/// The lazily constructed DFA over one NFA.
///
/// Owns the state arena, the signature interning map, and the follow scratch
/// buffer. All operations take the NFA as well because graph walks stamp its
/// generation marks.
#[derive(Debug)]
pub(crate) struct LazyDfa {
    states: Arena<DfaState>,
    intern: FxHashMap<(Box<[NodeID]>, bool), StateID>,
    // Scratch for the follow set under construction, reused across steps.
    follow: Vec<NodeID>,
    matched: bool,
    // One slot per allocated NFA node is a safe ceiling for any follow set.
    max_follow: usize,
}

impl LazyDfa {
    pub(crate) fn new() -> Self {
        Self {
            states: Arena::new(),
            intern: FxHashMap::default(),
            follow: Vec::new(),
            matched: false,
            max_follow: 0,
        }
    }

    pub(crate) fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The states in creation order, i.e. by ascending [StateID].
    #[cfg(feature = "dot_writer")]
    pub(crate) fn states(&self) -> impl Iterator<Item = &DfaState> {
        self.states.iter()
    }

    #[inline]
    pub(crate) fn state(&self, s: StateID) -> &DfaState {
        &self.states[s.0]
    }

    /// True iff a line ending in the step that produced `s` is a match.
    #[inline]
    pub(crate) fn matched(&self, s: StateID) -> bool {
        self.states[s.0].matched
    }

    /// Produces the initial DFA state: the follow closure of the root on the
    /// line start sentinel, plus the root itself.
    pub(crate) fn seed(&mut self, nfa: &mut Nfa, root: NodeID) -> StateID {
        self.max_follow = nfa.node_count();
        self.follow = Vec::with_capacity(self.max_follow);
        self.matched = false;
        nfa.next_gen();
        self.follow_node(nfa, root, CBEGIN);
        self.follow.push(root);
        let seed = self.intern_follow_set();
        trace!("seed state {} holds {} nfa nodes", seed, self.state(seed).nodes.len());
        seed
    }

    /// The DFA transition for one byte. Total: every (state, byte) yields a
    /// state, constructing it on the first miss.
    #[inline]
    pub(crate) fn step(&mut self, nfa: &mut Nfa, s: StateID, byte: u8) -> StateID {
        match self.states[s.0].next[byte as usize] {
            Some(t) => t,
            None => self.increment(nfa, s, byte),
        }
    }

    /// The miss path: computes the follow set of `s` for `byte`, interns the
    /// signature, and fills the cache slot.
    fn increment(&mut self, nfa: &mut Nfa, s: StateID, byte: u8) -> StateID {
        self.follow.clear();
        self.matched = false;
        nfa.next_gen();
        for i in 0..self.states[s.0].nodes.len() {
            let node = self.states[s.0].nodes[i];
            self.follow_node(nfa, node, byte as u32);
        }
        let t = self.intern_follow_set();
        self.states[s.0].next[byte as usize] = Some(t);
        t
    }

    /// Canonicalizes the follow scratch and returns the one state carrying that
    /// signature, allocating it on first sight.
    fn intern_follow_set(&mut self) -> StateID {
        self.follow.sort_unstable();
        self.follow.dedup();
        let key = (self.follow.clone().into_boxed_slice(), self.matched);
        if let Some(&t) = self.intern.get(&key) {
            return t;
        }
        let id = StateID(self.states.alloc(DfaState {
            nodes: key.0.clone(),
            matched: self.matched,
            next: Box::new([None; 256]),
        }));
        trace!(
            "dfa state {}: {} nfa nodes, matched: {}",
            id,
            key.0.len(),
            self.matched
        );
        self.intern.insert(key, id);
        id
    }

    /// The per-variant epsilon closure of one node on input `c`, appending every
    /// reached node to the follow scratch. Byte-consuming nodes contribute their
    /// continuation when `c` matches; forks recurse; Begin admits its
    /// continuation at a line start; End raises the match flag at a newline.
    fn follow_node(&mut self, nfa: &mut Nfa, mut id: NodeID, c: u32) {
        enum Action {
            Class(u8, u8),
            Dispatch(Option<NodeID>),
            Fork(NodeID),
            Begin,
            End,
        }

        loop {
            if !nfa.visit(id) {
                return;
            }
            if self.follow.len() >= self.max_follow {
                panic!("internal error: follow set overflow");
            }
            let next = nfa.node(id).next;
            let action = match &nfa.node(id).kind {
                NodeKind::Class { lo, hi } => Action::Class(*lo, *hi),
                NodeKind::Dispatch { cases } => {
                    Action::Dispatch(if c < 256 { cases[c as usize] } else { None })
                }
                NodeKind::Alt { alt } | NodeKind::Or { alt } => Action::Fork(*alt),
                NodeKind::Begin => Action::Begin,
                NodeKind::End => Action::End,
            };
            match action {
                Action::Class(lo, hi) => {
                    if lo as u32 <= c && c <= hi as u32 {
                        self.push_next(next);
                    }
                    return;
                }
                Action::Dispatch(target) => {
                    if let Some(t) = target {
                        self.follow.push(t);
                    }
                    match next {
                        Some(n) => id = n,
                        None => return,
                    }
                }
                Action::Fork(alt) => {
                    self.follow_node(nfa, alt, c);
                    match next {
                        Some(n) => id = n,
                        None => return,
                    }
                }
                Action::Begin => {
                    if c == u32::from(b'\n') || c == CBEGIN {
                        self.push_next(next);
                    }
                    return;
                }
                Action::End => {
                    if c == u32::from(b'\n') {
                        self.matched = true;
                    }
                    return;
                }
            }
        }
    }

    #[inline]
    fn push_next(&mut self, next: Option<NodeID>) {
        match next {
            Some(n) => self.follow.push(n),
            None => panic!("internal error: follow on a dangling edge"),
        }
    }
}
