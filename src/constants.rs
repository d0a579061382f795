//! Crate-wide constants shared by the hash table, graph store, and codecs.

/// Largest k-mer size supported by the fixed-width `BinaryKmer` encoding.
pub const KMAX: usize = 255;

/// Maximum number of 64-bit words a `BinaryKmer` can occupy (`ceil(KMAX*2/64)`).
pub const MAX_BKMER_WORDS: usize = (KMAX * 2 + 63) / 64;

/// Sentinel value for the first word of an empty hash table / path hash slot.
/// Real bkeys never produce this pattern because unused high bits are always zero.
pub const UNSET_BKMER_WORD: u64 = u64::MAX;

/// Number of buckets probed (with re-seeded hashes) before giving up on an insert or find.
pub const REHASH_LIMIT: usize = 20;

/// Largest number of slots held in a single hash table bucket.
pub const MAX_BUCKET_SIZE: u8 = 32;

/// Sentinel `PathIndex` meaning "no path" (end of a per-kmer linked list).
pub const PATH_NULL: u64 = 0xFF_FFFF_FFFF;

/// Sentinel `PathIndex` used by `PathHash` entries whose arena offset has not
/// yet been committed by a concurrent inserter.
pub const PATH_HASH_PENDING: u64 = 0xFF_FFFF_FFFF;

/// Bit mask for a 40-bit `PathIndex`.
pub const PATH_INDEX_MASK: u64 = (1u64 << 40) - 1;

/// Graph file magic word, written at both ends of the header.
pub const CTX_MAGIC: &[u8; 6] = b"CORTEX";

/// Graph file format versions this codec understands.
pub const CTX_VERSIONS: [u32; 4] = [4, 5, 6, 7];

/// Version at and above which the header carries per-color names, error
/// rates, and cleaning records.
pub const CTX_VERSION_WITH_METADATA: u32 = 6;

/// Version at and above which the header carries an explicit kmer count and
/// shades field.
pub const CTX_VERSION_WITH_KMER_COUNT: u32 = 7;

/// Path file magic word.
pub const CTP_MAGIC: &[u8; 6] = b"CTXPTH";

/// Path file format version this codec writes and expects to read.
pub const CTP_VERSION: u32 = 1;
