//! Recompute missing per-color edge bits from neighbor presence, either
//! restoring every edge absent from the cross-color intersection (`All`) or
//! only the ones that differ between colors (`PopUnion`).

use crate::graph::store::GraphStore;
use crate::hash_table::HashTable;
use crate::kmer::edge_to_nuc_orient;

/// Which edge bits a slot is a candidate for re-deriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Every bit absent from the intersection of all colors' edge masks.
    All,
    /// Only bits that are present in some colors' masks but not all
    /// (`union \ intersection`).
    PopUnion,
}

/// Re-derive missing edge bits across colors. Returns the number of slots
/// whose edge mask changed. With a single merged edge mask (`ncols_edges ==
/// 1`), `edges_intersection`/`edges_union` both collapse to that one mask,
/// so every color still gets checked against it rather than the mask being
/// treated as already complete.
pub fn infer_edges(table: &HashTable, store: &GraphStore, policy: Policy) -> usize {
    let mut modified_slots = 0usize;
    table.iterate(|slot, bkey| {
        let intersection = store.edges_intersection(slot);
        let union = store.edges_union(slot);
        let candidates = match policy {
            Policy::All => !intersection,
            Policy::PopUnion => union & !intersection,
        };
        if candidates == 0 {
            return;
        }
        let mut slot_changed = false;
        for bit_index in 0..8u8 {
            let bit = 1u8 << bit_index;
            if candidates & bit == 0 {
                continue;
            }
            let (nuc, orient) = edge_to_nuc_orient(bit_index);
            for colour in 0..store.ncols_covg() {
                if store.covg(slot, colour) == 0 {
                    continue;
                }
                if store.edges(slot, colour) & bit != 0 {
                    continue;
                }
                if let Some((neighbour, _)) = store.next_node(table, &bkey, nuc, orient) {
                    if store.in_colour(neighbour, colour) {
                        store.set_edge_bit(slot, colour, bit);
                        slot_changed = true;
                    }
                }
            }
        }
        if slot_changed {
            modified_slots += 1;
        }
    });
    modified_slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::GraphStore;
    use crate::hash_table::HashTable;
    use crate::kmer::BinaryKmer;

    #[test]
    fn infer_edges_is_idempotent() {
        let k = 5;
        let table = HashTable::new(k, 4, 8);
        let store = GraphStore::new(k, 2, 2, table.capacity());

        let a = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        let b = a.left_shift_add(k, 1).canonical(k); // AAAAC

        let slot_a = match table.find_or_insert(&a).unwrap() {
            crate::hash_table::InsertResult::Inserted(s) => s,
            crate::hash_table::InsertResult::Found(s) => s,
        };
        let slot_b = match table.find_or_insert(&b).unwrap() {
            crate::hash_table::InsertResult::Inserted(s) => s,
            crate::hash_table::InsertResult::Found(s) => s,
        };
        store.add_covg(slot_a, 0, 3);
        store.add_covg(slot_b, 0, 3);
        store.set_in_colour(slot_a, 0);
        store.set_in_colour(slot_b, 0);
        // Edge AAAAA --C--> AAAAC deliberately left unset in color 0.

        let modified_first = infer_edges(&table, &store, Policy::All);
        assert_eq!(modified_first, 1);
        assert_ne!(store.edges(slot_a, 0), 0);

        let modified_second = infer_edges(&table, &store, Policy::All);
        assert_eq!(modified_second, 0);
    }

    #[test]
    fn infer_edges_restores_single_colour_merged_edge_mask() {
        let k = 5;
        let table = HashTable::new(k, 4, 8);
        // ncols_edges == 1: one merged edge byte shared by the single colour.
        let store = GraphStore::new(k, 1, 1, table.capacity());

        let a = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        let b = a.left_shift_add(k, 1).canonical(k); // AAAAC

        let slot_a = match table.find_or_insert(&a).unwrap() {
            crate::hash_table::InsertResult::Inserted(s) => s,
            crate::hash_table::InsertResult::Found(s) => s,
        };
        table.find_or_insert(&b).unwrap();
        store.add_covg(slot_a, 0, 3);
        store.set_in_colour(slot_a, 0);
        // AAAAA --C--> AAAAC left unset; AAAAC exists with covg 0 so far.
        let slot_b = match table.find(&b) {
            crate::hash_table::FindResult::Found(s) => s,
            crate::hash_table::FindResult::NotFound => panic!("just inserted"),
        };
        store.add_covg(slot_b, 0, 1);
        store.set_in_colour(slot_b, 0);

        let modified = infer_edges(&table, &store, Policy::All);
        assert_eq!(modified, 1);
        assert_ne!(store.edges(slot_a, 0), 0);
    }
}
