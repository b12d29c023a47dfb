//! The `dot` module contains the conversion of the NFA and the DFA to graphviz
//! dot format. The functions in this module are used for testing and debugging
//! purposes.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};
use rustc_hash::FxHashMap;

use super::{LazyDfa, Nfa, NodeID, NodeKind, StateID};

/// Render the NFA reachable from `root` to graphviz dot format.
pub(crate) fn nfa_render<W: Write>(nfa: &Nfa, root: NodeID, label: &str, output: &mut W) {
    // Collect the reachable nodes in a stable discovery order; the n-th created
    // dot node is auto-named node_n, which edges reference by position.
    let mut order: Vec<NodeID> = Vec::new();
    let mut index: FxHashMap<NodeID, usize> = FxHashMap::default();
    let mut work = vec![root];
    while let Some(id) = work.pop() {
        if index.contains_key(&id) {
            continue;
        }
        index.insert(id, order.len());
        order.push(id);
        let node = nfa.node(id);
        if let Some(next) = node.next {
            work.push(next);
        }
        match &node.kind {
            NodeKind::Alt { alt } | NodeKind::Or { alt } => work.push(*alt),
            NodeKind::Dispatch { cases } => {
                for target in cases.iter().flatten() {
                    work.push(*target);
                }
            }
            _ => {}
        }
    }

    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    for &id in &order {
        let node = nfa.node(id);
        let source_id = {
            let mut source_node = digraph.node_auto();
            source_node.set_label(&format!("{} {}", id, node_label(&node.kind)));
            if id == root {
                source_node
                    .set_shape(dot_writer::Shape::Circle)
                    .set_color(dot_writer::Color::Blue)
                    .set_pen_width(3.0);
            }
            source_node.id()
        };
        if let Some(next) = node.next {
            digraph
                .edge(source_id.clone(), &format!("node_{}", index[&next]))
                .attributes()
                .set_label("next");
        }
        match &node.kind {
            NodeKind::Alt { alt } | NodeKind::Or { alt } => {
                digraph
                    .edge(source_id.clone(), &format!("node_{}", index[alt]))
                    .attributes()
                    .set_label("alt");
            }
            NodeKind::Dispatch { cases } => {
                // Equal adjacent cells collapse into one ranged edge.
                let mut b = 0usize;
                while b < 256 {
                    let Some(target) = cases[b] else {
                        b += 1;
                        continue;
                    };
                    let mut hi = b;
                    while hi + 1 < 256 && cases[hi + 1] == Some(target) {
                        hi += 1;
                    }
                    digraph
                        .edge(source_id.clone(), &format!("node_{}", index[&target]))
                        .attributes()
                        .set_label(&format!("[{:02x}-{:02x}]", b, hi));
                    b = hi + 1;
                }
            }
            _ => {}
        }
    }
}

fn node_label(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Alt { .. } => "Alt".to_string(),
        NodeKind::Or { .. } => "Or".to_string(),
        NodeKind::Class { lo, hi } => format!("[{:02x}-{:02x}]", lo, hi),
        NodeKind::Begin => "^".to_string(),
        NodeKind::End => "$".to_string(),
        NodeKind::Dispatch { .. } => "Dispatch".to_string(),
    }
}

/// Render the DFA states materialized so far to graphviz dot format.
pub(crate) fn dfa_render<W: Write>(dfa: &LazyDfa, seed: StateID, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    // States are created in arena order, so state s becomes dot node node_s.
    for (s, state) in dfa.states().enumerate() {
        let mut source_node = digraph.node_auto();
        source_node.set_label(&format!("{}\n{} nodes", s, state.nodes.len()));
        if s == seed.as_usize() {
            source_node
                .set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
        if state.matched {
            source_node
                .set_color(dot_writer::Color::Red)
                .set_pen_width(3.0);
        }
    }
    for (s, state) in dfa.states().enumerate() {
        let mut b = 0usize;
        while b < 256 {
            let Some(target) = state.next[b] else {
                b += 1;
                continue;
            };
            let mut hi = b;
            while hi + 1 < 256 && state.next[hi + 1] == Some(target) {
                hi += 1;
            }
            digraph
                .edge(&format!("node_{}", s), &format!("node_{}", target.as_usize()))
                .attributes()
                .set_label(&format!("[{:02x}-{:02x}]", b, hi));
            b = hi + 1;
        }
    }
}
