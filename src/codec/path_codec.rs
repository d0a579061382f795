//! `.ctp` path file codec: header read/write, a full arena dump, and merge
//! semantics that rewrite a source file's paths into a destination
//! `PathStore`/`PathHash`, deduplicating and remapping colors as they land.

use std::io::{Read, Write};

use crate::constants::{CTP_MAGIC, CTP_VERSION, MAX_BKMER_WORDS, PATH_INDEX_MASK, PATH_NULL};
use crate::core::error::{CortexError, Result};
use crate::hash_table::{FindResult, HashTable};
use crate::kmer::{num_bitfields, BinaryKmer};
use crate::paths::hash::{PathHash, PathInsertResult};
use crate::paths::store::PathStore;

/// Fill `buf` or fail with [`CortexError::Truncated`] naming how many bytes
/// were actually available, instead of the bare I/O `UnexpectedEof`.
fn read_exact_or_truncated(r: &mut impl Read, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(CortexError::Truncated {
                    expected: buf.len(),
                    got: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn read_u16(r: &mut impl Read) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact_or_truncated(r, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(r: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact_or_truncated(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(r: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact_or_truncated(r, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_magic(r: &mut impl Read) -> Result<()> {
    let mut buf = [0u8; 6];
    read_exact_or_truncated(r, &mut buf)?;
    if &buf != CTP_MAGIC {
        return Err(CortexError::malformed("bad CTXPTH magic word"));
    }
    Ok(())
}

fn read_name(r: &mut impl Read) -> Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    read_exact_or_truncated(r, &mut buf)?;
    String::from_utf8(buf).map_err(|_| CortexError::malformed("sample name is not valid UTF-8"))
}

fn write_name(w: &mut impl Write, name: &str) -> Result<()> {
    w.write_all(&(name.len() as u32).to_le_bytes())?;
    w.write_all(name.as_bytes())?;
    Ok(())
}

/// A `.ctp` file's header.
#[derive(Debug, Clone)]
pub struct PathHeader {
    /// Format version, currently always [`CTP_VERSION`].
    pub version: u32,
    /// K-mer size the paths were built against.
    pub kmer_size: usize,
    /// Byte length of the path arena that follows the header.
    pub arena_bytes: u64,
    /// Number of hash table slots that have at least one path.
    pub num_kmers_with_paths: u64,
    /// Total number of path records in the arena.
    pub num_paths: u64,
    /// Per-color sample names, in the file's own color order.
    pub sample_names: Vec<String>,
}

/// Read and validate a `.ctp` header.
pub fn read_header(r: &mut impl Read) -> Result<PathHeader> {
    read_magic(r)?;
    let version = read_u32(r)?;
    if version != CTP_VERSION {
        return Err(CortexError::incompatible(format!(
            "unsupported path file version {version}"
        )));
    }
    let kmer_size = read_u32(r)? as usize;
    if kmer_size < 3 || kmer_size > crate::constants::KMAX || kmer_size % 2 == 0 {
        return Err(CortexError::malformed(format!(
            "kmer_size {kmer_size} must be odd and in 3..={}",
            crate::constants::KMAX
        )));
    }
    let arena_bytes = read_u64(r)?;
    let num_kmers_with_paths = read_u64(r)?;
    let num_paths = read_u64(r)?;
    let num_cols = read_u32(r)? as usize;
    let mut sample_names = Vec::with_capacity(num_cols);
    for _ in 0..num_cols {
        sample_names.push(read_name(r)?);
    }
    read_magic(r)?;
    Ok(PathHeader {
        version,
        kmer_size,
        arena_bytes,
        num_kmers_with_paths,
        num_paths,
        sample_names,
    })
}

fn write_header(w: &mut impl Write, header: &PathHeader) -> Result<()> {
    w.write_all(CTP_MAGIC)?;
    w.write_all(&header.version.to_le_bytes())?;
    w.write_all(&(header.kmer_size as u32).to_le_bytes())?;
    w.write_all(&header.arena_bytes.to_le_bytes())?;
    w.write_all(&header.num_kmers_with_paths.to_le_bytes())?;
    w.write_all(&header.num_paths.to_le_bytes())?;
    w.write_all(&(header.sample_names.len() as u32).to_le_bytes())?;
    for name in &header.sample_names {
        write_name(w, name)?;
    }
    w.write_all(CTP_MAGIC)?;
    Ok(())
}

/// Verify a source file's `kmer_size` agrees with the destination graph's.
/// Called before any merge byte is written to the destination arena.
pub fn check_compatible(header: &PathHeader, table: &HashTable) -> Result<()> {
    if header.kmer_size != table.kmer_size() {
        return Err(CortexError::incompatible(format!(
            "path file kmer_size {} does not match graph kmer_size {}",
            header.kmer_size,
            table.kmer_size()
        )));
    }
    Ok(())
}

/// Write every slot with at least one path, plus the whole committed arena,
/// to a `.ctp` file.
pub fn write(w: &mut impl Write, kmer_size: usize, sample_names: &[String], table: &HashTable, path_store: &PathStore) -> Result<()> {
    let mut slots_with_paths = Vec::new();
    let mut num_paths = 0u64;
    for slot in 0..table.capacity() as u64 {
        let head = path_store.head(slot as usize);
        if head == PATH_NULL {
            continue;
        }
        slots_with_paths.push(slot);
        let mut cur = head;
        while cur != PATH_NULL {
            num_paths += 1;
            cur = path_store.prev_at(cur);
        }
    }

    let header = PathHeader {
        version: CTP_VERSION,
        kmer_size,
        arena_bytes: path_store.len(),
        num_kmers_with_paths: slots_with_paths.len() as u64,
        num_paths,
        sample_names: sample_names.to_vec(),
    };
    write_header(w, &header)?;
    w.write_all(path_store.raw_bytes())?;

    let lo = MAX_BKMER_WORDS - num_bitfields(kmer_size);
    for slot in slots_with_paths {
        let bkey = table
            .bkey_at(slot)
            .ok_or_else(|| CortexError::corrupted(format!("slot {slot} has a path head but no bkey")))?;
        for word in &bkey.words()[lo..] {
            w.write_all(&word.to_le_bytes())?;
        }
        let head = path_store.head(slot as usize);
        w.write_all(&(head & PATH_INDEX_MASK).to_le_bytes()[..5])?;
    }
    Ok(())
}

fn read_prev_from_slice(arena: &[u8], off: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf[..5].copy_from_slice(&arena[off..off + 5]);
    u64::from_le_bytes(buf) & PATH_INDEX_MASK
}

/// Merge a `.ctp` file's paths into `dest_store`/`dest_hash`, attaching them
/// to slots of `target_table`. `colour_remap[i]` is the destination color for
/// source color `i`; `dest_ncols` is the destination's total color count.
/// Paths whose k-mer is not present in `target_table` are dropped (there is
/// no slot to attach them to).
pub fn load_merge(
    r: &mut impl Read,
    target_table: &HashTable,
    dest_store: &PathStore,
    dest_hash: &PathHash,
    colour_remap: &[usize],
    dest_ncols: usize,
) -> Result<PathHeader> {
    let header = read_header(r)?;
    check_compatible(&header, target_table)?;

    let mut arena = vec![0u8; header.arena_bytes as usize];
    read_exact_or_truncated(r, &mut arena)?;

    let ncols_src = header.sample_names.len();
    let src_colour_bytes = (ncols_src + 7) / 8;
    let dest_colour_bytes = (dest_ncols + 7) / 8;
    let w = num_bitfields(header.kmer_size);
    let lo = MAX_BKMER_WORDS - w;

    for _ in 0..header.num_kmers_with_paths {
        let mut words = [0u64; MAX_BKMER_WORDS];
        for word in words[lo..].iter_mut() {
            *word = read_u64(r)?;
        }
        let bkey = BinaryKmer::from_words(words, header.kmer_size)?;
        let mut head_buf = [0u8; 8];
        read_exact_or_truncated(r, &mut head_buf[..5])?;
        let mut cur = u64::from_le_bytes(head_buf) & PATH_INDEX_MASK;

        let slot = match target_table.find(&bkey) {
            FindResult::Found(s) => s,
            FindResult::NotFound => continue,
        };

        while cur != PATH_NULL {
            let off = cur as usize;
            let plen = read_u16(&mut &arena[off + 5..off + 7])?;
            let seq_len = (plen as usize + 3) / 4;
            let seq = &arena[off + 7..off + 7 + seq_len];
            let src_colours = &arena[off + 7 + seq_len..off + 7 + seq_len + src_colour_bytes];

            let mut dest_colours = vec![0u8; dest_colour_bytes];
            for src_c in 0..ncols_src {
                if src_colours[src_c / 8] & (1 << (src_c % 8)) != 0 {
                    let dc = colour_remap[src_c];
                    dest_colours[dc / 8] |= 1 << (dc % 8);
                }
            }

            match dest_hash.find_or_insert(&bkey, plen, seq, dest_store)? {
                PathInsertResult::Found(hslot) => {
                    let existing = dest_hash.get_pindex(hslot);
                    if existing != crate::constants::PATH_HASH_PENDING {
                        dest_store.or_colours(existing, &dest_colours);
                    }
                }
                PathInsertResult::Inserted(hslot) => {
                    let new_pindex = dest_store.add_and_link(slot as usize, plen, seq, &dest_colours)?;
                    dest_hash.set_pindex(hslot, new_pindex);
                }
            }

            cur = read_prev_from_slice(&arena, off);
        }
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_table::InsertResult;
    use std::io::Cursor;

    #[test]
    fn header_round_trips() {
        let header = PathHeader {
            version: CTP_VERSION,
            kmer_size: 5,
            arena_bytes: 128,
            num_kmers_with_paths: 2,
            num_paths: 3,
            sample_names: vec!["a".into(), "b".into()],
        };
        let mut buf = Vec::new();
        write_header(&mut buf, &header).unwrap();
        let read_back = read_header(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back.kmer_size, 5);
        assert_eq!(read_back.sample_names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn write_then_merge_attaches_path_to_matching_slot() {
        let k = 5;
        let table = HashTable::new(k, 4, 8);
        let bkey = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        match table.find_or_insert(&bkey).unwrap() {
            InsertResult::Inserted(_) => {}
            InsertResult::Found(_) => panic!("expected fresh insert"),
        }
        let store = PathStore::new(4096, table.capacity(), 1);
        let slot = match table.find(&bkey) {
            FindResult::Found(s) => s,
            FindResult::NotFound => panic!("just inserted"),
        };
        store.add_and_link(slot as usize, 4, &[0b0001_1011], &[0b1]).unwrap();

        let mut buf = Vec::new();
        write(&mut buf, k, &["only".to_string()], &table, &store).unwrap();

        let dest_table = HashTable::new(k, 4, 8);
        match dest_table.find_or_insert(&bkey).unwrap() {
            InsertResult::Inserted(_) => {}
            InsertResult::Found(_) => panic!("expected fresh insert"),
        }
        let dest_store = PathStore::new(4096, dest_table.capacity(), 1);
        let dest_hash = PathHash::new(k, 4, 8);

        load_merge(&mut Cursor::new(buf), &dest_table, &dest_store, &dest_hash, &[0], 1).unwrap();

        let dest_slot = match dest_table.find(&bkey) {
            FindResult::Found(s) => s,
            FindResult::NotFound => panic!("kmer must exist in destination"),
        };
        assert_ne!(dest_store.head(dest_slot as usize), PATH_NULL);
    }
}
