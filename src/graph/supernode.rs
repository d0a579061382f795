//! Read-only supernode traversal: walk a maximal chain of k-mers joined by a
//! unique outgoing edge at the current node and a unique incoming edge at the
//! neighbor, until a branch, dead end, self-loop, or length cap is hit.
//!
//! This is the traversal primitive only — no contig assembly, no FASTA
//! emission. Those remain the calling driver's job.

use crate::graph::store::GraphStore;
use crate::hash_table::{HashTable, SlotIndex};
use crate::kmer::Orientation;

/// Why a supernode walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The current node has no outgoing edge for any tracked color.
    DeadEnd,
    /// The current node has more than one outgoing edge, or the neighbor has
    /// more than one edge leading back.
    Branch,
    /// The walk returned to its own starting `(slot, orientation)`.
    SelfLoop,
    /// The walk reached the caller-supplied step cap before terminating.
    MaxLenReached,
}

/// The result of [`walk_supernode`]: the sequence of nodes visited (including
/// the start) and why the walk stopped.
#[derive(Debug, Clone)]
pub struct SupernodeWalk {
    /// `(slot, orientation)` at each step, starting with the walk's origin.
    pub steps: Vec<(SlotIndex, Orientation)>,
    /// Why the walk stopped.
    pub termination: TerminationReason,
}

fn edge_options(store: &GraphStore, slot: SlotIndex, colours: &[usize], orient: Orientation) -> Vec<u8> {
    let base = match orient {
        Orientation::Forward => 0,
        Orientation::Reverse => 4,
    };
    (0..4u8)
        .filter(|nuc| colours.iter().any(|&c| store.edges(slot, c) & (1 << (base + nuc)) != 0))
        .collect()
}

/// Walk the supernode containing `(start_slot, start_orient)`, considering
/// only edges present in at least one of `colours`, for at most `max_len`
/// steps (including the start).
pub fn walk_supernode(
    table: &HashTable,
    store: &GraphStore,
    start_slot: SlotIndex,
    start_orient: Orientation,
    colours: &[usize],
    max_len: usize,
) -> SupernodeWalk {
    let mut steps = vec![(start_slot, start_orient)];
    let mut slot = start_slot;
    let mut orient = start_orient;

    loop {
        if steps.len() >= max_len {
            return SupernodeWalk {
                steps,
                termination: TerminationReason::MaxLenReached,
            };
        }
        let bkey = match table.bkey_at(slot) {
            Some(b) => b,
            None => {
                return SupernodeWalk {
                    steps,
                    termination: TerminationReason::DeadEnd,
                }
            }
        };
        let forward_options = edge_options(store, slot, colours, orient);
        if forward_options.is_empty() {
            return SupernodeWalk {
                steps,
                termination: TerminationReason::DeadEnd,
            };
        }
        if forward_options.len() > 1 {
            return SupernodeWalk {
                steps,
                termination: TerminationReason::Branch,
            };
        }
        let nuc = forward_options[0];
        let (next_slot, next_orient) = match store.next_node(table, &bkey, nuc, orient) {
            Some(n) => n,
            None => {
                return SupernodeWalk {
                    steps,
                    termination: TerminationReason::DeadEnd,
                }
            }
        };
        let back_options = edge_options(store, next_slot, colours, next_orient.flip());
        if back_options.len() > 1 {
            return SupernodeWalk {
                steps,
                termination: TerminationReason::Branch,
            };
        }
        if next_slot == start_slot && next_orient == start_orient {
            steps.push((next_slot, next_orient));
            return SupernodeWalk {
                steps,
                termination: TerminationReason::SelfLoop,
            };
        }
        steps.push((next_slot, next_orient));
        slot = next_slot;
        orient = next_orient;
    }
}
