//! Secondary hash table deduplicating paths: `(bkey, plen, packed sequence)`
//! to an arena [`PathIndex`].
//!
//! Probing mirrors [`crate::hash_table::HashTable`] exactly (same bucketed
//! layout, same reseed-on-full-bucket rule), keyed on the bkey's leading word
//! plus `plen` and the sequence's first packed byte for a cheap initial
//! filter. Paths longer than 4 nucleotides need a full byte comparison, which
//! requires the arena offset — so insertion is two-step: a slot is claimed
//! and its `bkey`/`plen`/`seq_byte` fields committed immediately, but
//! `pindex` is left as [`PATH_HASH_PENDING`] until the caller has actually
//! appended the path to a [`PathStore`] and calls [`PathHash::set_pindex`].

use std::sync::atomic::{AtomicU16, AtomicU64, AtomicU8, Ordering};

use crossbeam::utils::CachePadded;

use crate::constants::{MAX_BKMER_WORDS, PATH_HASH_PENDING, REHASH_LIMIT, UNSET_BKMER_WORD};
use crate::core::error::{CortexError, Result};
use crate::hash_table::seeded_hash;
use crate::kmer::{num_bitfields, BinaryKmer};
use crate::paths::store::{PathIndex, PathStore};

const CLAIMED_BKMER_WORD: u64 = UNSET_BKMER_WORD - 1;

/// A slot index into a [`PathHash`]. Distinct from [`crate::hash_table::SlotIndex`]
/// only in name — the two tables are never indexed interchangeably.
pub type PathHashSlot = u64;

/// Outcome of [`PathHash::find_or_insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathInsertResult {
    /// Not previously present; claimed at this slot with a pending `pindex`.
    Inserted(PathHashSlot),
    /// Already present, with a (possibly still pending) `pindex` at this slot.
    Found(PathHashSlot),
}

struct Entry {
    plen: AtomicU16,
    seq_byte: AtomicU8,
    pindex: AtomicU64,
}

/// Deduplicating path hash, keyed by `(bkey, plen, packed sequence)`.
pub struct PathHash {
    k: usize,
    w: usize,
    num_buckets: usize,
    bucket_size: u8,
    words: Vec<AtomicU64>,
    fill: Vec<CachePadded<AtomicU8>>,
    entries: Vec<Entry>,
}

impl PathHash {
    /// Allocate a table for k-mer size `k` with `num_buckets` (rounded up to
    /// a power of two) buckets of `bucket_size` slots each.
    pub fn new(k: usize, num_buckets: usize, bucket_size: u8) -> Self {
        let num_buckets = num_buckets.max(1).next_power_of_two();
        let bucket_size = bucket_size.max(1);
        let w = num_bitfields(k);
        let capacity = num_buckets * bucket_size as usize;
        let words = (0..capacity * w).map(|_| AtomicU64::new(UNSET_BKMER_WORD)).collect();
        let fill = (0..num_buckets).map(|_| CachePadded::new(AtomicU8::new(0))).collect();
        let entries = (0..capacity)
            .map(|_| Entry {
                plen: AtomicU16::new(0),
                seq_byte: AtomicU8::new(0),
                pindex: AtomicU64::new(PATH_HASH_PENDING),
            })
            .collect();
        Self {
            k,
            w,
            num_buckets,
            bucket_size,
            words,
            fill,
            entries,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.num_buckets * self.bucket_size as usize
    }

    fn slot_base(&self, slot: PathHashSlot) -> usize {
        slot as usize * self.w
    }

    fn real_words<'a>(&self, bkey: &'a BinaryKmer) -> &'a [u64] {
        let lo = MAX_BKMER_WORDS - self.w;
        &bkey.words()[lo..]
    }

    fn slot_matches_bkey(&self, slot: PathHashSlot, real: &[u64]) -> bool {
        let base = self.slot_base(slot);
        for (j, expected) in real.iter().enumerate() {
            if self.words[base + j].load(Ordering::Acquire) != *expected {
                return false;
            }
        }
        true
    }

    fn quick_match(&self, slot: PathHashSlot, plen: u16, seq_byte: u8) -> bool {
        let e = &self.entries[slot as usize];
        e.plen.load(Ordering::Acquire) == plen && e.seq_byte.load(Ordering::Acquire) == seq_byte
    }

    /// Full comparison against an already-committed path, spinning briefly
    /// while another inserter commits `pindex`.
    fn full_match(&self, slot: PathHashSlot, packed: &[u8], store: &PathStore) -> bool {
        let entry = &self.entries[slot as usize];
        for _ in 0..64 {
            let pindex = entry.pindex.load(Ordering::Acquire);
            if pindex != PATH_HASH_PENDING {
                return store.seq_at(pindex) == packed;
            }
            std::hint::spin_loop();
        }
        false
    }

    /// Find `(bkey, plen, packed)`, inserting a pending entry if absent. The
    /// caller must append `packed` to `store` and call [`PathHash::set_pindex`]
    /// after an `Inserted` result.
    pub fn find_or_insert(
        &self,
        bkey: &BinaryKmer,
        plen: u16,
        packed: &[u8],
        store: &PathStore,
    ) -> Result<PathInsertResult> {
        let real = self.real_words(bkey).to_vec();
        let seq_byte = packed.first().copied().unwrap_or(0);
        let first = real[0];
        let secondary = real.get(1).copied().unwrap_or(first);
        let mask = self.num_buckets - 1;

        for round in 0..REHASH_LIMIT {
            let hash = seeded_hash(first, secondary, round);
            let bucket = (hash as usize) & mask;
            let bucket_base = bucket * self.bucket_size as usize;
            'slots: for i in 0..self.bucket_size as usize {
                let slot = (bucket_base + i) as PathHashSlot;
                let base = self.slot_base(slot);
                loop {
                    let w0 = self.words[base].load(Ordering::Acquire);
                    if w0 == CLAIMED_BKMER_WORD {
                        std::hint::spin_loop();
                        continue;
                    }
                    if w0 == UNSET_BKMER_WORD {
                        match self.words[base].compare_exchange(
                            UNSET_BKMER_WORD,
                            CLAIMED_BKMER_WORD,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        ) {
                            Ok(_) => {
                                for j in 1..self.w {
                                    self.words[base + j].store(real[j], Ordering::Relaxed);
                                }
                                let entry = &self.entries[slot as usize];
                                entry.plen.store(plen, Ordering::Relaxed);
                                entry.seq_byte.store(seq_byte, Ordering::Relaxed);
                                entry.pindex.store(PATH_HASH_PENDING, Ordering::Relaxed);
                                self.words[base].store(real[0], Ordering::Release);
                                self.fill[bucket].fetch_add(1, Ordering::AcqRel);
                                return Ok(PathInsertResult::Inserted(slot));
                            }
                            Err(_) => continue,
                        }
                    }
                    if w0 == real[0]
                        && self.slot_matches_bkey(slot, &real)
                        && self.quick_match(slot, plen, seq_byte)
                        && (plen <= 4 || self.full_match(slot, packed, store))
                    {
                        return Ok(PathInsertResult::Found(slot));
                    }
                    continue 'slots;
                }
            }
            if (self.fill[bucket].load(Ordering::Acquire) as usize) < self.bucket_size as usize {
                break;
            }
        }
        Err(CortexError::OutOfCapacity {
            requested: 1,
            available: 0,
        })
    }

    /// Commit the arena offset for a slot previously returned as `Inserted`.
    pub fn set_pindex(&self, slot: PathHashSlot, pindex: PathIndex) {
        self.entries[slot as usize].pindex.store(pindex, Ordering::Release);
    }

    /// Current `pindex` for a slot, or [`PATH_HASH_PENDING`] if not yet committed.
    pub fn get_pindex(&self, slot: PathHashSlot) -> PathIndex {
        self.entries[slot as usize].pindex.load(Ordering::Acquire)
    }

    /// K-mer size this table was built for.
    pub fn kmer_size(&self) -> usize {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_commit_then_find_matches() {
        let k = 5;
        let ph = PathHash::new(k, 4, 8);
        let store = PathStore::new(4096, 1, 1);
        let bkey = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        let packed = [0b0001_1011u8];

        let slot = match ph.find_or_insert(&bkey, 4, &packed, &store).unwrap() {
            PathInsertResult::Inserted(s) => s,
            PathInsertResult::Found(_) => panic!("expected fresh insert"),
        };
        let pindex = store.add(crate::constants::PATH_NULL, 4, &packed, &[0b1]).unwrap();
        ph.set_pindex(slot, pindex);

        match ph.find_or_insert(&bkey, 4, &packed, &store).unwrap() {
            PathInsertResult::Found(found_slot) => assert_eq!(found_slot, slot),
            PathInsertResult::Inserted(_) => panic!("expected dedup hit"),
        }
    }

    #[test]
    fn distinct_sequences_get_distinct_slots() {
        let k = 5;
        let ph = PathHash::new(k, 4, 8);
        let store = PathStore::new(4096, 1, 1);
        let bkey = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);

        let a = [0b0001_1011u8];
        let b = [0b0010_1101u8];
        let slot_a = match ph.find_or_insert(&bkey, 4, &a, &store).unwrap() {
            PathInsertResult::Inserted(s) => s,
            PathInsertResult::Found(s) => s,
        };
        let pindex_a = store.add(crate::constants::PATH_NULL, 4, &a, &[0b1]).unwrap();
        ph.set_pindex(slot_a, pindex_a);

        let slot_b = match ph.find_or_insert(&bkey, 4, &b, &store).unwrap() {
            PathInsertResult::Inserted(s) => s,
            PathInsertResult::Found(_) => panic!("different sequence must not dedup"),
        };
        assert_ne!(slot_a, slot_b);
    }
}
