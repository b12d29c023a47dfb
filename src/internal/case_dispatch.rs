//! This module rewrites large alternations into 256-way dispatch nodes.
//!
//! An alternation over many single-byte classes compiles to a long Or chain, and
//! the DFA's follow pass would walk the whole chain for every byte. When at least
//! [CASE_LIMIT] distinct byte values flow through such a chain it is collapsed
//! into one [super::NodeKind::Dispatch] node whose 256-entry table jumps straight
//! to the continuation for a byte. Chain children that do not consume a byte move
//! onto the dispatch node's `next` edge and are followed the ordinary way.

use super::{Nfa, NodeID, NodeKind};

/// An Or chain is rewritten once at least this many byte values pass through it.
pub(crate) const CASE_LIMIT: usize = 7;

/// Rewrites every large alternation reachable from `root` and returns the
/// possibly replaced root. Invoked once per NFA root before the DFA is seeded.
pub(crate) fn apply(nfa: &mut Nfa, root: NodeID) -> NodeID {
    nfa.next_gen();
    rewrite(nfa, root)
}

enum Shape {
    Or,
    Alt(NodeID),
    Leaf,
    Dispatch,
}

fn shape_of(nfa: &Nfa, id: NodeID) -> Shape {
    match &nfa.node(id).kind {
        NodeKind::Or { .. } => Shape::Or,
        NodeKind::Alt { alt } => Shape::Alt(*alt),
        NodeKind::Begin | NodeKind::End | NodeKind::Class { .. } => Shape::Leaf,
        NodeKind::Dispatch { .. } => Shape::Dispatch,
    }
}

fn rewrite(nfa: &mut Nfa, id: NodeID) -> NodeID {
    if !nfa.visit(id) {
        return id;
    }
    match shape_of(nfa, id) {
        Shape::Or => {
            let n = count_or(nfa, id);
            if n < CASE_LIMIT {
                return id;
            }
            let dispatch = nfa.alloc(
                NodeKind::Dispatch {
                    cases: Box::new([None; 256]),
                },
                None,
            );
            fill_dispatch(nfa, dispatch, id);
            // Collapse a cell's own alternations once they have shrunk below the
            // count of the chain just rewritten; otherwise the recursion could
            // revisit the same chain forever.
            for b in 0..256usize {
                let Some(target) = dispatch_cell(nfa, dispatch, b) else {
                    continue;
                };
                if count_or(nfa, target) < n {
                    let rewritten = rewrite(nfa, target);
                    if rewritten != target {
                        set_dispatch_cell(nfa, dispatch, b, rewritten);
                    }
                }
            }
            dispatch
        }
        Shape::Alt(alt) => {
            if let Some(next) = nfa.node(id).next {
                let next = rewrite(nfa, next);
                nfa.node_mut(id).next = Some(next);
            }
            let alt = rewrite(nfa, alt);
            match &mut nfa.node_mut(id).kind {
                NodeKind::Alt { alt: a } => *a = alt,
                _ => unreachable!(),
            }
            id
        }
        Shape::Leaf => id,
        Shape::Dispatch => {
            panic!("internal error: dispatch node reached while rewriting alternations")
        }
    }
}

/// The number of byte values that flow through the Or spine rooted at `id`.
fn count_or(nfa: &Nfa, mut id: NodeID) -> usize {
    let mut n = 0;
    loop {
        match &nfa.node(id).kind {
            NodeKind::Or { alt } => {
                n += count_or(nfa, *alt);
                match nfa.node(id).next {
                    Some(next) => id = next,
                    None => return n,
                }
            }
            NodeKind::Class { lo, hi } => return n + (*hi as usize - *lo as usize + 1),
            _ => return n,
        }
    }
}

/// Distributes the Or spine rooted at `id` over the dispatch table: every class
/// leaf enters its continuation into the cells of its byte range, everything
/// else is chained onto the dispatch node's `next`.
fn fill_dispatch(nfa: &mut Nfa, dispatch: NodeID, mut id: NodeID) {
    loop {
        match shape_of(nfa, id) {
            Shape::Or => {
                let alt = match &nfa.node(id).kind {
                    NodeKind::Or { alt } => *alt,
                    _ => unreachable!(),
                };
                fill_dispatch(nfa, dispatch, alt);
                match nfa.node(id).next {
                    Some(next) => id = next,
                    None => return,
                }
            }
            Shape::Leaf if matches!(nfa.node(id).kind, NodeKind::Class { .. }) => {
                let (lo, hi) = match &nfa.node(id).kind {
                    NodeKind::Class { lo, hi } => (*lo, *hi),
                    _ => unreachable!(),
                };
                let cont = nfa
                    .node(id)
                    .next
                    .expect("internal error: dangling class edge in alternation rewrite");
                for b in lo as usize..=hi as usize {
                    let chain = dispatch_cell(nfa, dispatch, b);
                    let merged = fork_alloc(nfa, true, cont, chain);
                    set_dispatch_cell(nfa, dispatch, b, merged);
                }
                return;
            }
            _ => {
                // Does not consume a byte here; follow it the ordinary way.
                let chain = nfa.node(dispatch).next;
                let merged = fork_alloc(nfa, false, id, chain);
                nfa.node_mut(dispatch).next = Some(merged);
                return;
            }
        }
    }
}

/// Prepends `target` onto a fork chain. With no chain yet the target stands by
/// itself; otherwise a fresh Or (or Alt) fork carries it.
fn fork_alloc(nfa: &mut Nfa, or: bool, target: NodeID, chain: Option<NodeID>) -> NodeID {
    match chain {
        None => target,
        Some(chain) => {
            let kind = if or {
                NodeKind::Or { alt: target }
            } else {
                NodeKind::Alt { alt: target }
            };
            nfa.alloc(kind, Some(chain))
        }
    }
}

fn dispatch_cell(nfa: &Nfa, dispatch: NodeID, b: usize) -> Option<NodeID> {
    match &nfa.node(dispatch).kind {
        NodeKind::Dispatch { cases } => cases[b],
        _ => unreachable!(),
    }
}

fn set_dispatch_cell(nfa: &mut Nfa, dispatch: NodeID, b: usize, target: NodeID) {
    match &mut nfa.node_mut(dispatch).kind {
        NodeKind::Dispatch { cases } => cases[b] = Some(target),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::Frag;

    // An alternation of single-byte classes, terminated so that no class edge
    // dangles.
    fn byte_alternation(nfa: &mut Nfa, bytes: &[u8]) -> (Frag, NodeID) {
        let mut frag: Option<Frag> = None;
        for &b in bytes {
            let c = nfa.class(b, b);
            frag = Some(match frag {
                None => c,
                Some(f) => nfa.alt(f, c),
            });
        }
        let stop = nfa.end();
        let frag = nfa.concat(frag.unwrap(), stop);
        (frag, stop.begin)
    }

    #[test]
    fn test_below_the_limit_stays_an_or_chain() {
        let mut nfa = Nfa::new();
        let (frag, _) = byte_alternation(&mut nfa, b"abcdef");
        let root = apply(&mut nfa, frag.begin);
        assert_eq!(root, frag.begin);
        assert!(matches!(nfa.node(root).kind, NodeKind::Or { .. }));
    }

    #[test]
    fn test_seven_alternatives_collapse_into_a_dispatch() {
        let mut nfa = Nfa::new();
        let (frag, stop) = byte_alternation(&mut nfa, b"abcdefg");
        let root = apply(&mut nfa, frag.begin);
        assert_ne!(root, frag.begin);
        for b in b'a'..=b'g' {
            assert_eq!(dispatch_cell(&nfa, root, b as usize), Some(stop));
        }
        assert_eq!(dispatch_cell(&nfa, root, b'x' as usize), None);
        assert!(nfa.node(root).next.is_none());
    }

    #[test]
    fn test_overlapping_classes_chain_in_their_cell() {
        let mut nfa = Nfa::new();
        let c1 = nfa.class(b'a', b'd');
        let s1 = nfa.end();
        let f1 = nfa.concat(c1, s1);
        let c2 = nfa.class(b'd', b'f');
        let s2 = nfa.end();
        let f2 = nfa.concat(c2, s2);
        let or = nfa.alt(f1, f2);
        let root = apply(&mut nfa, or.begin);
        // 4 + 3 distinct traversals reach the limit.
        assert!(matches!(nfa.node(root).kind, NodeKind::Dispatch { .. }));
        // Byte 'd' is covered by both classes, so its cell keeps both
        // continuations through a fork.
        let cell = dispatch_cell(&nfa, root, b'd' as usize).unwrap();
        let NodeKind::Or { alt } = nfa.node(cell).kind else {
            panic!("shared byte must keep both continuations");
        };
        assert_eq!(alt, s1.begin);
        assert_eq!(nfa.node(cell).next, Some(s2.begin));
        // Unshared bytes jump straight to their continuation.
        assert_eq!(dispatch_cell(&nfa, root, b'a' as usize), Some(s1.begin));
        assert_eq!(dispatch_cell(&nfa, root, b'f' as usize), Some(s2.begin));
    }

    #[test]
    fn test_non_class_children_move_onto_next() {
        let mut nfa = Nfa::new();
        let (classes, _) = byte_alternation(&mut nfa, b"abcdefg");
        let anchor = nfa.begin();
        let or = nfa.alt(classes, anchor);
        let root = apply(&mut nfa, or.begin);
        assert!(matches!(nfa.node(root).kind, NodeKind::Dispatch { .. }));
        assert_eq!(nfa.node(root).next, Some(anchor.begin));
    }
}
