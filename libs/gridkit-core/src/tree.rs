//! Flat row list → nested forest assembly for self-referencing entities.

use std::collections::HashMap;

/// Implemented by DTOs that form parent/child hierarchies.
pub trait TreeNode {
    fn node_id(&self) -> i64;
    /// `None` marks a root; a stored `0` is normalized to root by the
    /// assembler.
    fn parent_node_id(&self) -> Option<i64>;
    fn add_child(&mut self, child: Self);
}

/// Assemble a flat list into a forest, preserving the two-pass semantics
/// the callers rely on:
///
/// 1. every node whose parent is unset/0 becomes a root, in input order;
/// 2. every remaining node, in input order, attaches to its parent if that
///    parent is already part of the forest — otherwise it surfaces as an
///    orphaned top-level entry (out-of-order input stays visible instead of
///    being dropped).
///
/// Sibling order is input order, so callers pre-sort by a stable secondary
/// key when they need deterministic siblings. Every input node appears in
/// the output exactly once.
pub fn assemble_forest<T: TreeNode>(nodes: Vec<T>) -> Vec<T> {
    let mut slots: Vec<Option<T>> = nodes.into_iter().map(Some).collect();

    let mut slot_by_id: HashMap<i64, usize> = HashMap::with_capacity(slots.len());
    for (i, slot) in slots.iter().enumerate() {
        if let Some(node) = slot {
            slot_by_id.entry(node.node_id()).or_insert(i);
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut placed = vec![false; slots.len()];

    for i in 0..slots.len() {
        if parent_of(&slots, i).is_none() {
            roots.push(i);
            placed[i] = true;
        }
    }

    for i in 0..slots.len() {
        if placed[i] {
            continue;
        }
        let attached = parent_of(&slots, i)
            .and_then(|pid| slot_by_id.get(&pid).copied())
            .filter(|&p| placed[p]);
        match attached {
            Some(p) => children_of.entry(p).or_default().push(i),
            None => roots.push(i),
        }
        placed[i] = true;
    }

    roots
        .into_iter()
        .filter_map(|r| materialize(r, &mut slots, &mut children_of))
        .collect()
}

fn parent_of<T: TreeNode>(slots: &[Option<T>], i: usize) -> Option<i64> {
    slots[i]
        .as_ref()
        .and_then(|n| n.parent_node_id())
        .filter(|&p| p != 0)
}

fn materialize<T: TreeNode>(
    slot: usize,
    slots: &mut [Option<T>],
    children_of: &mut HashMap<usize, Vec<usize>>,
) -> Option<T> {
    let mut node = slots[slot].take()?;
    if let Some(kids) = children_of.remove(&slot) {
        for child_slot in kids {
            if let Some(child) = materialize(child_slot, slots, children_of) {
                node.add_child(child);
            }
        }
    }
    Some(node)
}
