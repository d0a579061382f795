//! Edge-consistency health checking: for every edge bit set in a color, the
//! neighbor it names must exist and carry that color.

use crate::graph::store::GraphStore;
use crate::hash_table::{HashTable, SlotIndex};
use crate::kmer::{edge_to_nuc_orient, Orientation};

/// A single edge-consistency failure found by [`health_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `slot`'s edge mask in `colour` names a neighbor that is not in the table.
    DanglingEdge {
        /// Slot whose edge bit is inconsistent.
        slot: SlotIndex,
        /// Color the edge bit belongs to.
        colour: usize,
        /// Nucleotide the edge bit names.
        nuc: u8,
        /// Orientation side the edge bit is on.
        orient: Orientation,
    },
    /// The neighbor exists but is not marked present in `colour`.
    NeighbourMissingColour {
        /// Slot whose edge bit pointed at the neighbor.
        slot: SlotIndex,
        /// Color the edge bit belongs to.
        colour: usize,
        /// The neighbor slot that lacks the color bit.
        neighbour: SlotIndex,
    },
}

/// Outcome of [`health_check`].
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    /// Occupied slots examined.
    pub slots_checked: usize,
    /// Every edge-consistency failure found, in slot-then-color order.
    pub violations: Vec<Violation>,
}

impl HealthReport {
    /// Whether no violations were found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Walk every occupied slot and, if `check_edges`, every set edge bit in
/// every color, verifying the named neighbor exists and carries that color.
pub fn health_check(table: &HashTable, store: &GraphStore, check_edges: bool) -> HealthReport {
    let mut report = HealthReport::default();
    table.iterate(|slot, bkey| {
        report.slots_checked += 1;
        if !check_edges {
            return;
        }
        for colour in 0..store.ncols_covg() {
            let mask = store.edges(slot, colour);
            for bit_index in 0..8u8 {
                if mask & (1 << bit_index) == 0 {
                    continue;
                }
                let (nuc, orient) = edge_to_nuc_orient(bit_index);
                match store.next_node(table, &bkey, nuc, orient) {
                    None => report.violations.push(Violation::DanglingEdge {
                        slot,
                        colour,
                        nuc,
                        orient,
                    }),
                    Some((neighbour, _)) => {
                        if !store.in_colour(neighbour, colour) {
                            report.violations.push(Violation::NeighbourMissingColour {
                                slot,
                                colour,
                                neighbour,
                            });
                        }
                    }
                }
            }
        }
    });
    report
}
