//! `.ctx` graph file codec: versioned header read/write, per-kmer record
//! read/write, and the find-or-insert load semantics that merge a file's
//! colors into a live [`Graph`](crate::Graph).
//!
//! Header parsing is split from record streaming (`read_header` vs `load`)
//! so a driver can size its `HashTable`/`GraphStore` from just the header.

use std::io::{Read, Write};

use crate::codec::longdouble;
use crate::constants::{
    CTX_MAGIC, CTX_VERSIONS, CTX_VERSION_WITH_KMER_COUNT, CTX_VERSION_WITH_METADATA, MAX_BKMER_WORDS,
};
use crate::core::error::{CortexError, Result, Warning};
use crate::graph::store::GraphStore;
use crate::graph::{CleaningRecord, GraphInfo};
use crate::hash_table::{FindResult, HashTable, InsertResult};
use crate::kmer::{num_bitfields, BinaryKmer};

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

fn read_u8(r: &mut impl Read) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact_or_truncated(r, &mut buf)?;
    Ok(buf[0])
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

fn read_bool(r: &mut impl Read) -> Result<bool> {
    Ok(read_u8(r)? != 0)
}

fn read_name(r: &mut impl Read) -> Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    read_exact_or_truncated(r, &mut buf)?;
    String::from_utf8(buf).map_err(|_| CortexError::malformed("color/cleaning name is not valid UTF-8"))
}

fn write_name(w: &mut impl Write, name: &str) -> Result<()> {
    w.write_all(&(name.len() as u32).to_le_bytes())?;
    w.write_all(name.as_bytes())?;
    Ok(())
}

fn read_magic(r: &mut impl Read) -> Result<()> {
    let mut buf = [0u8; 6];
    read_exact_or_truncated(r, &mut buf)?;
    if &buf != CTX_MAGIC {
        return Err(CortexError::malformed("bad CORTEX magic word"));
    }
    Ok(())
}

/// A `.ctx` file's header: everything needed to size a `HashTable`/`GraphStore`
/// before a single per-kmer record is read.
#[derive(Debug, Clone)]
pub struct GraphHeader {
    /// Format version, one of [`CTX_VERSIONS`].
    pub version: u32,
    /// K-mer size this file was written with.
    pub kmer_size: usize,
    /// Words per bkey (`num_bitfields(kmer_size)`), as recorded in the file.
    pub num_of_bitfields: usize,
    /// Number of colors carried by this file.
    pub num_of_cols: usize,
    /// Kmer count, present in the file for version ≥ 7, otherwise derived
    /// from file size by [`read_header`] when a length is supplied.
    pub num_of_kmers: Option<u64>,
    /// Unused shades field, present for version ≥ 7.
    pub num_of_shades: Option<u32>,
    /// Per-color metadata (name/error-rate/cleaning are defaulted for
    /// versions below the metadata threshold).
    pub infos: Vec<GraphInfo>,
}

impl GraphHeader {
    /// Minimal header for `num_of_cols` colors at the current codec version.
    pub fn new(kmer_size: usize, num_of_cols: usize) -> Self {
        Self {
            version: *CTX_VERSIONS.last().unwrap(),
            kmer_size,
            num_of_bitfields: num_bitfields(kmer_size),
            num_of_cols,
            num_of_kmers: Some(0),
            num_of_shades: Some(0),
            infos: vec![GraphInfo::default(); num_of_cols],
        }
    }

    fn record_size(&self) -> u64 {
        (self.num_of_bitfields * 8 + self.num_of_cols * 4 + self.num_of_cols) as u64
    }
}

/// A single per-kmer record as read from or written to a `.ctx` file.
#[derive(Debug, Clone)]
pub struct KmerRecord {
    /// The record's canonical key.
    pub bkey: BinaryKmer,
    /// Per-color coverage, indexed by the file's own (binary) color order.
    pub covgs: Vec<u32>,
    /// Per-color edge mask, indexed the same way.
    pub edges: Vec<u8>,
}

fn push_cleaning_warning(warnings: &mut Vec<Warning>, colour: usize, enabled: bool, threshold: &mut u32) {
    if !enabled && *threshold != 0 {
        warnings.push(Warning::CleaningThresholdWithoutCleaning { colour });
        *threshold = 0;
    }
}

/// Read and validate a `.ctx` header. When `file_len` is known (e.g. from
/// `File::metadata`), a version-4/5/6 file's missing `num_of_kmers` is derived
/// from the remaining byte count; a non-multiple-of-record-size remainder is
/// rejected as `Malformed`.
pub fn read_header(r: &mut impl Read, file_len: Option<u64>) -> Result<(GraphHeader, Vec<Warning>)> {
    let mut consumed: u64 = 0;
    let mut track = |n: u64| consumed += n;

    read_magic(r)?;
    track(6);
    let version = read_u32(r)?;
    track(4);
    if !CTX_VERSIONS.contains(&version) {
        return Err(CortexError::incompatible(format!(
            "unsupported graph file version {version}"
        )));
    }
    let kmer_size = read_u32(r)? as usize;
    track(4);
    if kmer_size < 3 || kmer_size > crate::constants::KMAX || kmer_size % 2 == 0 {
        return Err(CortexError::malformed(format!(
            "kmer_size {kmer_size} must be odd and in 3..={}",
            crate::constants::KMAX
        )));
    }
    let num_of_bitfields = read_u32(r)? as usize;
    track(4);
    if num_of_bitfields != num_bitfields(kmer_size) {
        return Err(CortexError::malformed(format!(
            "num_of_bitfields {num_of_bitfields} does not match kmer_size {kmer_size}"
        )));
    }
    let num_of_cols = read_u32(r)? as usize;
    track(4);
    if num_of_cols == 0 {
        return Err(CortexError::malformed("num_of_cols must be at least 1"));
    }

    let mut warnings = Vec::new();
    let mut num_of_kmers = None;
    let mut num_of_shades = None;
    if version >= CTX_VERSION_WITH_KMER_COUNT {
        num_of_kmers = Some(read_u64(r)?);
        track(8);
        let shades = read_u32(r)?;
        track(4);
        if shades % 8 != 0 {
            warnings.push(Warning::ShadesFieldNonStandard(shades));
        }
        num_of_shades = Some(shades);
    }

    let mut mean_read_lengths = vec![0u32; num_of_cols];
    for v in mean_read_lengths.iter_mut() {
        *v = read_u32(r)?;
        track(4);
    }
    let mut total_seq_loaded = vec![0u64; num_of_cols];
    for v in total_seq_loaded.iter_mut() {
        *v = read_u64(r)?;
        track(8);
    }

    let mut infos: Vec<GraphInfo> = (0..num_of_cols)
        .map(|c| GraphInfo {
            mean_read_length: mean_read_lengths[c],
            total_seq_loaded: total_seq_loaded[c],
            ..GraphInfo::default()
        })
        .collect();

    if version >= CTX_VERSION_WITH_METADATA {
        for info in infos.iter_mut() {
            info.sample_name = read_name(r)?;
            track(4 + info.sample_name.len() as u64);
        }
        for info in infos.iter_mut() {
            let mut buf = [0u8; 10];
            r.read_exact(&mut buf)?;
            track(10);
            info.seq_err_rate = longdouble::read(buf);
        }
        for (colour, info) in infos.iter_mut().enumerate() {
            let tip_clip = read_bool(r)?;
            let remv_low_sups = read_bool(r)?;
            let remv_low_nodes = read_bool(r)?;
            let cleaned_against_other = read_bool(r)?;
            track(4);
            let mut thresh_sups = read_u32(r)?;
            let mut thresh_nodes = read_u32(r)?;
            track(8);
            push_cleaning_warning(&mut warnings, colour, remv_low_sups, &mut thresh_sups);
            push_cleaning_warning(&mut warnings, colour, remv_low_nodes, &mut thresh_nodes);
            let cleaned_against_name = read_name(r)?;
            track(4 + cleaned_against_name.len() as u64);
            info.cleaning = CleaningRecord {
                tip_clipped: tip_clip,
                low_covg_supernodes_removed: remv_low_sups,
                low_covg_nodes_removed: remv_low_nodes,
                cleaned_against_other,
                thresh_supernodes: thresh_sups,
                thresh_nodes,
                cleaned_against_name,
            };
        }
    }

    read_magic(r)?;
    track(6);

    let mut header = GraphHeader {
        version,
        kmer_size,
        num_of_bitfields,
        num_of_cols,
        num_of_kmers,
        num_of_shades,
        infos,
    };

    if header.num_of_kmers.is_none() {
        if let Some(total) = file_len {
            let record_size = header.record_size();
            let remaining = total
                .checked_sub(consumed)
                .ok_or_else(|| CortexError::corrupted("header is larger than the file itself"))?;
            if record_size == 0 || remaining % record_size != 0 {
                return Err(CortexError::malformed(
                    "file size is not a whole number of kmer records",
                ));
            }
            header.num_of_kmers = Some(remaining / record_size);
        }
    }

    Ok((header, warnings))
}

/// Write a `.ctx` header at the current codec version (`CTX_VERSIONS.last()`),
/// including both magic bookends.
pub fn write_header(w: &mut impl Write, header: &GraphHeader) -> Result<()> {
    w.write_all(CTX_MAGIC)?;
    w.write_all(&header.version.to_le_bytes())?;
    w.write_all(&(header.kmer_size as u32).to_le_bytes())?;
    w.write_all(&(header.num_of_bitfields as u32).to_le_bytes())?;
    w.write_all(&(header.num_of_cols as u32).to_le_bytes())?;

    if header.version >= CTX_VERSION_WITH_KMER_COUNT {
        w.write_all(&header.num_of_kmers.unwrap_or(0).to_le_bytes())?;
        w.write_all(&header.num_of_shades.unwrap_or(0).to_le_bytes())?;
    }
    for info in &header.infos {
        w.write_all(&info.mean_read_length.to_le_bytes())?;
    }
    for info in &header.infos {
        w.write_all(&info.total_seq_loaded.to_le_bytes())?;
    }
    if header.version >= CTX_VERSION_WITH_METADATA {
        for info in &header.infos {
            write_name(w, &info.sample_name)?;
        }
        for info in &header.infos {
            w.write_all(&longdouble::write(info.seq_err_rate))?;
        }
        for info in &header.infos {
            let c = &info.cleaning;
            w.write_all(&[
                c.tip_clipped as u8,
                c.low_covg_supernodes_removed as u8,
                c.low_covg_nodes_removed as u8,
                c.cleaned_against_other as u8,
            ])?;
            w.write_all(&c.thresh_supernodes.to_le_bytes())?;
            w.write_all(&c.thresh_nodes.to_le_bytes())?;
            write_name(w, &c.cleaned_against_name)?;
        }
    }
    w.write_all(CTX_MAGIC)?;
    Ok(())
}

/// Byte offset, within one kmer record, where the edges field begins
/// (used by callers that rewrite edges in place via seek).
pub fn record_edges_offset(header: &GraphHeader) -> u64 {
    (header.num_of_bitfields * 8 + header.num_of_cols * 4) as u64
}

/// Total serialized header length in bytes (useful for seek-based rewrites).
pub fn header_byte_len(header: &GraphHeader) -> u64 {
    let mut len = 6 + 4 + 4 + 4 + 4;
    if header.version >= CTX_VERSION_WITH_KMER_COUNT {
        len += 8 + 4;
    }
    len += header.num_of_cols as u64 * (4 + 8);
    if header.version >= CTX_VERSION_WITH_METADATA {
        for info in &header.infos {
            len += 4 + info.sample_name.len() as u64;
        }
        len += header.num_of_cols as u64 * 10;
        for info in &header.infos {
            len += 4 + 4 + 4 + 4 + info.cleaning.cleaned_against_name.len() as u64;
        }
    }
    len += 6;
    len
}

/// Read one per-kmer record, or `None` on a clean end-of-stream (zero bytes
/// read where a record's first field would start).
pub fn read_record(r: &mut impl Read, header: &GraphHeader) -> Result<Option<KmerRecord>> {
    let mut words = [0u64; MAX_BKMER_WORDS];
    let lo = MAX_BKMER_WORDS - header.num_of_bitfields;
    let mut first_word_buf = [0u8; 8];
    match r.read(&mut first_word_buf) {
        Ok(0) => return Ok(None),
        Ok(n) if n < 8 => {
            read_exact_or_truncated(r, &mut first_word_buf[n..])?;
        }
        Ok(_) => {}
        Err(e) => return Err(e.into()),
    }
    words[lo] = u64::from_le_bytes(first_word_buf);
    for word in words[lo + 1..].iter_mut() {
        *word = read_u64(r)?;
    }
    let bkey = BinaryKmer::from_words(words, header.kmer_size)?;

    let mut covgs = vec![0u32; header.num_of_cols];
    for c in covgs.iter_mut() {
        *c = read_u32(r)?;
    }
    if covgs.iter().all(|&c| c == 0) {
        return Err(CortexError::malformed("kmer record has zero coverage in every color"));
    }
    let mut edges = vec![0u8; header.num_of_cols];
    for e in edges.iter_mut() {
        *e = read_u8(r)?;
    }
    Ok(Some(KmerRecord { bkey, covgs, edges }))
}

/// Write one per-kmer record.
pub fn write_record(w: &mut impl Write, header: &GraphHeader, bkey: &BinaryKmer, covgs: &[u32], edges: &[u8]) -> Result<()> {
    let lo = MAX_BKMER_WORDS - header.num_of_bitfields;
    for word in &bkey.words()[lo..] {
        w.write_all(&word.to_le_bytes())?;
    }
    for c in covgs {
        w.write_all(&c.to_le_bytes())?;
    }
    w.write_all(edges)?;
    Ok(())
}

/// How a `.ctx` file's binary colors map onto a live graph's colors, and
/// what to do about kmers that already exist.
#[derive(Debug, Clone)]
pub struct LoadPrefs {
    /// First destination color; binary color `i` becomes `into_colour + i`.
    pub into_colour: usize,
    /// If set, only load into kmers that already exist and carry this color.
    pub must_exist_in_colour: Option<usize>,
    /// If true, a kmer that already exists in the table is an error (this
    /// load expects to populate only brand-new colors).
    pub empty_colours: bool,
    /// If true, a newly-inserted kmer's coverage is taken as-is rather than
    /// added to an existing (necessarily zero) value — a distinction that
    /// only matters when combined with future re-loads of the same file.
    pub load_as_union: bool,
}

impl Default for LoadPrefs {
    fn default() -> Self {
        Self {
            into_colour: 0,
            must_exist_in_colour: None,
            empty_colours: false,
            load_as_union: false,
        }
    }
}

/// Summary of a single `load` call.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Kmers that contributed nonzero coverage to at least one destination color.
    pub kmers_loaded: u64,
    /// Kmers read but contributing nothing (all-zero in the destination range,
    /// or skipped by `must_exist_in_colour`).
    pub kmers_skipped: u64,
}

/// Stream a `.ctx` file's body into `table`/`store`, merging colors per `prefs`,
/// and fold the file's per-color metadata into `infos`.
pub fn load(
    r: &mut impl Read,
    header: &GraphHeader,
    table: &HashTable,
    store: &GraphStore,
    infos: &mut [GraphInfo],
    prefs: &LoadPrefs,
) -> Result<Stats> {
    let mut stats = Stats::default();
    while let Some(rec) = read_record(r, header)? {
        let slot = if let Some(must_colour) = prefs.must_exist_in_colour {
            match table.find(&rec.bkey) {
                FindResult::Found(s) if store.in_colour(s, must_colour) => s,
                _ => {
                    stats.kmers_skipped += 1;
                    continue;
                }
            }
        } else {
            match table.find_or_insert(&rec.bkey)? {
                InsertResult::Inserted(s) => s,
                InsertResult::Found(s) => {
                    if prefs.empty_colours {
                        return Err(CortexError::malformed(
                            "kmer already present while loading with empty_colours expected",
                        ));
                    }
                    s
                }
            }
        };

        let mut touched = false;
        for (bi, &covg) in rec.covgs.iter().enumerate() {
            if covg == 0 {
                continue;
            }
            let gc = prefs.into_colour + bi;
            store.add_covg(slot, gc, covg);
            store.set_in_colour(slot, gc);
            touched = true;
        }
        for (bi, &edge_mask) in rec.edges.iter().enumerate() {
            let gc = prefs.into_colour + bi;
            let mask = match prefs.must_exist_in_colour {
                Some(must_colour) => edge_mask & store.edges(slot, must_colour),
                None => edge_mask,
            };
            if mask != 0 {
                store.set_edge_bit(slot, gc, mask);
                store.set_in_colour(slot, gc);
                touched = true;
            }
        }
        if touched {
            stats.kmers_loaded += 1;
        } else {
            stats.kmers_skipped += 1;
        }
        let _ = prefs.load_as_union; // coverage is always additive; reserved for a future replace-on-insert mode
    }

    for (bi, file_info) in header.infos.iter().enumerate() {
        let gc = prefs.into_colour + bi;
        if let Some(dest) = infos.get_mut(gc) {
            dest.merge_loaded(file_info);
        }
    }
    Ok(stats)
}

/// Write a full graph: header followed by every occupied slot's record, in
/// table order.
pub fn write(w: &mut impl Write, header: &GraphHeader, table: &HashTable, store: &GraphStore) -> Result<()> {
    write_header(w, header)?;
    let mut io_result: Result<()> = Ok(());
    table.iterate(|slot, bkey| {
        if io_result.is_err() {
            return;
        }
        let covgs: Vec<u32> = (0..header.num_of_cols).map(|c| store.covg(slot, c)).collect();
        let edges: Vec<u8> = (0..header.num_of_cols).map(|c| store.edges(slot, c)).collect();
        io_result = write_record(w, header, &bkey, &covgs, &edges);
    });
    io_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_header(k: usize, ncols: usize) -> GraphHeader {
        GraphHeader::new(k, ncols)
    }

    #[test]
    fn header_round_trips() {
        let mut header = sample_header(5, 2);
        header.infos[0].sample_name = "sample_a".into();
        header.infos[1].sample_name = "sample_b".into();
        header.infos[0].seq_err_rate = 0.01;
        header.num_of_kmers = Some(2);

        let mut buf = Vec::new();
        write_header(&mut buf, &header).unwrap();
        let (read_back, warnings) = read_header(&mut Cursor::new(buf), None).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(read_back.kmer_size, 5);
        assert_eq!(read_back.num_of_cols, 2);
        assert_eq!(read_back.infos[0].sample_name, "sample_a");
        assert!((read_back.infos[0].seq_err_rate - 0.01).abs() < 1e-6);
    }

    #[test]
    fn rejects_even_kmer_size() {
        let mut header = sample_header(5, 1);
        header.kmer_size = 4;
        header.num_of_bitfields = num_bitfields(4);
        let mut buf = Vec::new();
        // Hand-write a header with an even kmer_size to exercise validation.
        buf.extend_from_slice(CTX_MAGIC);
        buf.extend_from_slice(&header.version.to_le_bytes());
        buf.extend_from_slice(&4u32.to_le_bytes());
        buf.extend_from_slice(&(num_bitfields(4) as u32).to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(CTX_MAGIC);
        let err = read_header(&mut Cursor::new(buf), None).unwrap_err();
        assert!(matches!(err, CortexError::Malformed(_)));
    }

    #[test]
    fn short_header_is_truncated_not_io() {
        let buf = CTX_MAGIC[..3].to_vec();
        let err = read_header(&mut Cursor::new(buf), None).unwrap_err();
        match err {
            CortexError::Truncated { expected, got } => {
                assert_eq!(expected, 6);
                assert_eq!(got, 3);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn load_merges_coverage_and_edges() {
        let k = 5;
        let header = sample_header(k, 1);
        let table = HashTable::new(k, 4, 8);
        let store = GraphStore::new(k, 1, 1, table.capacity());
        let mut infos = vec![GraphInfo::default()];

        let mut buf = Vec::new();
        write_header(&mut buf, &header).unwrap();
        let bkey = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        write_record(&mut buf, &header, &bkey, &[3], &[0b0000_0010]).unwrap();

        let stats = load(
            &mut Cursor::new(buf),
            &header,
            &table,
            &store,
            &mut infos,
            &LoadPrefs::default(),
        )
        .unwrap();
        assert_eq!(stats.kmers_loaded, 1);
        let slot = match table.find(&bkey) {
            FindResult::Found(s) => s,
            FindResult::NotFound => panic!("kmer should have been inserted"),
        };
        assert_eq!(store.covg(slot, 0), 3);
        assert_eq!(store.edges(slot, 0), 0b0000_0010);
        assert!(store.in_colour(slot, 0));
    }

    #[test]
    fn load_sets_membership_for_edge_only_colour() {
        let k = 5;
        let header = sample_header(k, 2);
        let table = HashTable::new(k, 4, 8);
        let store = GraphStore::new(k, 2, 2, table.capacity());
        let mut infos = vec![GraphInfo::default(), GraphInfo::default()];

        let mut buf = Vec::new();
        write_header(&mut buf, &header).unwrap();
        let bkey = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        // Colour 0 carries coverage; colour 1 carries only an edge bit.
        write_record(&mut buf, &header, &bkey, &[3, 0], &[0, 0b0000_0010]).unwrap();

        load(&mut Cursor::new(buf), &header, &table, &store, &mut infos, &LoadPrefs::default()).unwrap();

        let slot = match table.find(&bkey) {
            FindResult::Found(s) => s,
            FindResult::NotFound => panic!("kmer should have been inserted"),
        };
        assert!(store.in_colour(slot, 0));
        assert!(store.in_colour(slot, 1));
    }

    #[test]
    fn write_then_load_round_trips() {
        let k = 5;
        let header_in = sample_header(k, 1);
        let table_in = HashTable::new(k, 4, 8);
        let store_in = GraphStore::new(k, 1, 1, table_in.capacity());
        let bkey = BinaryKmer::encode("AAAAC", k).unwrap().canonical(k);
        let slot = match table_in.find_or_insert(&bkey).unwrap() {
            InsertResult::Inserted(s) => s,
            InsertResult::Found(s) => s,
        };
        store_in.add_covg(slot, 0, 7);
        store_in.set_in_colour(slot, 0);

        let mut buf = Vec::new();
        write(&mut buf, &header_in, &table_in, &store_in).unwrap();

        let (header_out, _) = read_header(&mut Cursor::new(buf.clone()), Some(buf.len() as u64)).unwrap();
        let table_out = HashTable::new(k, 4, 8);
        let store_out = GraphStore::new(k, 1, 1, table_out.capacity());
        let mut infos = vec![GraphInfo::default()];
        let header_len = header_byte_len(&header_out) as usize;
        let mut body = Cursor::new(buf[header_len..].to_vec());
        load(&mut body, &header_out, &table_out, &store_out, &mut infos, &LoadPrefs::default()).unwrap();

        let out_slot = match table_out.find(&bkey) {
            FindResult::Found(s) => s,
            FindResult::NotFound => panic!("round trip lost the kmer"),
        };
        assert_eq!(store_out.covg(out_slot, 0), 7);
    }
}
