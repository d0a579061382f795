//! Coverage, edge, and color-membership arrays overlaid on a [`HashTable`]'s
//! slots.
//!
//! `GraphStore` never owns a `HashTable`; traversal operations ([`GraphStore::next_node`],
//! health checking, edge inference) take one by reference instead. A driver
//! allocates a `HashTable` with a chosen capacity and attaches `GraphStore`/
//! `PathStore` arrays of matching dimension alongside it.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::hash_table::{FindResult, HashTable, SlotIndex};
use crate::kmer::{BinaryKmer, Orientation};

/// Coverage, edges, and color membership for every occupied hash table slot.
pub struct GraphStore {
    k: usize,
    ncols_covg: usize,
    ncols_edges: usize,
    capacity: usize,
    covg: Vec<AtomicU32>,
    edges: Vec<AtomicU8>,
    membership: Vec<AtomicU8>,
}

impl GraphStore {
    /// Allocate arrays sized for `capacity` slots. `ncols_edges` is either
    /// `ncols_covg` (per-color edge masks) or `1` (a single merged edges byte
    /// per slot, for configurations that do not need per-color edges).
    pub fn new(k: usize, ncols_covg: usize, ncols_edges: usize, capacity: usize) -> Self {
        let membership_bits = capacity * ncols_covg;
        Self {
            k,
            ncols_covg,
            ncols_edges,
            capacity,
            covg: (0..capacity * ncols_covg).map(|_| AtomicU32::new(0)).collect(),
            edges: (0..capacity * ncols_edges).map(|_| AtomicU8::new(0)).collect(),
            membership: (0..(membership_bits + 7) / 8).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// Whether this store carries a distinct edge mask per color (vs. one
    /// merged mask shared by every color).
    pub fn per_color_edges(&self) -> bool {
        self.ncols_edges > 1
    }

    fn covg_index(&self, slot: SlotIndex, colour: usize) -> usize {
        slot as usize * self.ncols_covg + colour
    }

    fn edges_index(&self, slot: SlotIndex, colour: usize) -> usize {
        if self.per_color_edges() {
            slot as usize * self.ncols_edges + colour
        } else {
            slot as usize
        }
    }

    /// Saturating add to `(slot, colour)`'s coverage counter.
    pub fn add_covg(&self, slot: SlotIndex, colour: usize, delta: u32) {
        let idx = self.covg_index(slot, colour);
        let cell = &self.covg[idx];
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_add(delta);
            match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Read `(slot, colour)`'s coverage counter.
    pub fn covg(&self, slot: SlotIndex, colour: usize) -> u32 {
        self.covg[self.covg_index(slot, colour)].load(Ordering::Acquire)
    }

    /// Set a bit in `(slot, colour)`'s edge mask.
    pub fn set_edge_bit(&self, slot: SlotIndex, colour: usize, bit: u8) {
        self.edges[self.edges_index(slot, colour)].fetch_or(bit, Ordering::AcqRel);
    }

    /// Clear a bit in `(slot, colour)`'s edge mask.
    pub fn clear_edge_bit(&self, slot: SlotIndex, colour: usize, bit: u8) {
        self.edges[self.edges_index(slot, colour)].fetch_and(!bit, Ordering::AcqRel);
    }

    /// Read `(slot, colour)`'s edge mask (or the merged mask, if this store
    /// does not carry per-color edges).
    pub fn edges(&self, slot: SlotIndex, colour: usize) -> u8 {
        self.edges[self.edges_index(slot, colour)].load(Ordering::Acquire)
    }

    /// Bitwise OR of `slot`'s edge mask across every color.
    pub fn edges_union(&self, slot: SlotIndex) -> u8 {
        if !self.per_color_edges() {
            return self.edges[slot as usize].load(Ordering::Acquire);
        }
        let mut union = 0u8;
        for c in 0..self.ncols_edges {
            union |= self.edges(slot, c);
        }
        union
    }

    /// Bitwise intersection of `slot`'s edge mask across every color.
    pub fn edges_intersection(&self, slot: SlotIndex) -> u8 {
        if !self.per_color_edges() {
            return self.edges[slot as usize].load(Ordering::Acquire);
        }
        let mut intersection = 0xFFu8;
        for c in 0..self.ncols_edges {
            intersection &= self.edges(slot, c);
        }
        intersection
    }

    fn membership_bit(&self, slot: SlotIndex, colour: usize) -> (usize, u8) {
        let bit_pos = slot as usize * self.ncols_covg + colour;
        (bit_pos / 8, 1u8 << (bit_pos % 8))
    }

    /// Mark `(slot, colour)` as present.
    pub fn set_in_colour(&self, slot: SlotIndex, colour: usize) {
        let (byte, mask) = self.membership_bit(slot, colour);
        self.membership[byte].fetch_or(mask, Ordering::AcqRel);
    }

    /// Whether `(slot, colour)` is marked present.
    pub fn in_colour(&self, slot: SlotIndex, colour: usize) -> bool {
        let (byte, mask) = self.membership_bit(slot, colour);
        self.membership[byte].load(Ordering::Acquire) & mask != 0
    }

    /// Number of colors this store tracks coverage/membership for.
    pub fn ncols_covg(&self) -> usize {
        self.ncols_covg
    }

    /// Capacity this store was allocated for (must match its `HashTable`'s).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Compute the neighbor reached from `bkey` (the canonical key stored at
    /// some slot) by appending `nuc` on the side named by `orient`, look it up
    /// in `table`, and report the slot plus the orientation the neighbor was
    /// found in (`Forward` if the shifted k-mer is already canonical).
    pub fn next_node(
        &self,
        table: &HashTable,
        bkey: &BinaryKmer,
        nuc: u8,
        orient: Orientation,
    ) -> Option<(SlotIndex, Orientation)> {
        let as_read = match orient {
            Orientation::Forward => *bkey,
            Orientation::Reverse => bkey.reverse_complement(self.k),
        };
        let shifted = as_read.left_shift_add(self.k, nuc);
        let canon = shifted.canonical(self.k);
        let result_orient = if canon == shifted {
            Orientation::Forward
        } else {
            Orientation::Reverse
        };
        match table.find(&canon) {
            FindResult::Found(slot) => Some((slot, result_orient)),
            FindResult::NotFound => None,
        }
    }
}
