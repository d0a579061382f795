//! A colored de Bruijn graph core for genome assembly and population-scale
//! variant analysis: a concurrent k-mer hash table, a coverage/edge/color
//! overlay, an append-only path arena with its own dedup hash, and the
//! `.ctx`/`.ctp` binary codecs that move graphs and paths in and out of it.
//!
//! Command-line parsing, read alignment, variant calling, and assembly
//! heuristics are outside this crate's scope; [`Graph`] is the API a driver
//! built on top of those concerns calls into.

pub mod codec;
pub mod constants;
pub mod core;
pub mod graph;
pub mod hash_table;
pub mod kmer;
pub mod paths;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::codec::graph_codec::{self, GraphHeader, LoadPrefs, Stats};
use crate::codec::path_codec;
use crate::constants::MAX_BUCKET_SIZE;
use crate::core::error::{CortexError, Result};
use crate::core::Context;
use crate::graph::{GraphInfo, HealthReport, InferEdgesPolicy};
use crate::hash_table::HashTable;
use crate::paths::health::PathHealthReport;
use crate::paths::{PathHash, PathStore};

pub use crate::core::{Config, CortexError as Error};
pub use crate::graph::store::GraphStore;

/// One source `.ctp` file for [`Graph::load_ctp_merge`], with the vector
/// translating its own color indices onto this graph's colors.
#[derive(Debug, Clone)]
pub struct CtpMergeSource {
    /// Path to the source file.
    pub path: PathBuf,
    /// `colour_remap[i]` is the destination color for the source's color `i`.
    pub colour_remap: Vec<usize>,
}

/// A colored de Bruijn graph: a fixed-capacity [`HashTable`] of k-mers, a
/// [`GraphStore`] overlay of coverage/edges/membership, and an optional
/// [`PathStore`]/[`PathHash`] pair once paths have been loaded.
pub struct Graph {
    k: usize,
    ncols_covg: usize,
    ncols_edges: usize,
    table: HashTable,
    store: GraphStore,
    path_store: Option<PathStore>,
    path_hash: Option<PathHash>,
    infos: Vec<GraphInfo>,
    context: Context,
}

impl Graph {
    /// Allocate a graph for k-mer size `k` with `ncols_covg` colors of
    /// coverage/membership and `ncols_edges` colors of edge masks (pass `1`
    /// for a single merged edge mask shared by every color), sized to hold
    /// at least `capacity_kmers` k-mers.
    pub fn new(k: usize, ncols_covg: usize, ncols_edges: usize, capacity_kmers: usize) -> Self {
        Self::with_context(k, ncols_covg, ncols_edges, capacity_kmers, Context::default())
    }

    /// As [`Graph::new`], but with an explicit [`Context`] (configuration and
    /// cancellation flag) rather than the default.
    pub fn with_context(
        k: usize,
        ncols_covg: usize,
        ncols_edges: usize,
        capacity_kmers: usize,
        context: Context,
    ) -> Self {
        let bucket_size = MAX_BUCKET_SIZE;
        let num_buckets = (capacity_kmers / bucket_size as usize).max(1);
        let table = HashTable::new(k, num_buckets, bucket_size);
        let store = GraphStore::new(k, ncols_covg, ncols_edges, table.capacity());
        tracing::info!(
            k,
            ncols_covg,
            ncols_edges,
            capacity = table.capacity(),
            "allocated graph"
        );
        Self {
            k,
            ncols_covg,
            ncols_edges,
            table,
            store,
            path_store: None,
            path_hash: None,
            infos: vec![GraphInfo::default(); ncols_covg],
            context,
        }
    }

    /// K-mer size this graph was allocated for.
    pub fn kmer_size(&self) -> usize {
        self.k
    }

    /// The underlying hash table.
    pub fn table(&self) -> &HashTable {
        &self.table
    }

    /// The coverage/edges/membership overlay.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Per-color metadata (sample name, read length, error rate, cleaning).
    pub fn infos(&self) -> &[GraphInfo] {
        &self.infos
    }

    /// The path arena, if [`Graph::load_ctp_merge`] has been called.
    pub fn path_store(&self) -> Option<&PathStore> {
        self.path_store.as_ref()
    }

    fn ensure_paths(&mut self) {
        if self.path_store.is_none() {
            let arena_bytes = self.context.config.paths.default_arena_bytes;
            self.path_store = Some(PathStore::new(arena_bytes, self.table.capacity(), self.ncols_covg));
            self.path_hash = Some(PathHash::new(self.k, self.table.capacity().max(1), MAX_BUCKET_SIZE));
        }
    }

    /// Stream a `.ctx` file's body into this graph, merging colors per
    /// `prefs`. Rejects files whose `kmer_size` does not match this graph's.
    pub fn load_ctx(&mut self, path: impl AsRef<Path>, prefs: &LoadPrefs) -> Result<Stats> {
        let path = path.as_ref();
        let file_len = std::fs::metadata(path)?.len();
        let mut reader = BufReader::new(File::open(path)?);
        let (header, warnings) = graph_codec::read_header(&mut reader, Some(file_len))?;
        if header.kmer_size != self.k {
            return Err(CortexError::incompatible(format!(
                "graph file kmer_size {} does not match this graph's kmer_size {}",
                header.kmer_size, self.k
            )));
        }
        for warning in &warnings {
            tracing::warn!(%warning, path = %path.display(), "loading graph file");
        }
        let stats = graph_codec::load(&mut reader, &header, &self.table, &self.store, &mut self.infos, prefs)?;
        tracing::info!(
            path = %path.display(),
            loaded = stats.kmers_loaded,
            skipped = stats.kmers_skipped,
            "loaded graph file"
        );
        Ok(stats)
    }

    /// Write this graph's current state to a `.ctx` file at the current codec
    /// version, deriving `num_of_kmers` from the table's occupancy.
    pub fn write_ctx(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut header = GraphHeader::new(self.k, self.ncols_covg);
        header.infos = self.infos.clone();
        header.num_of_kmers = Some(self.table.len() as u64);
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        graph_codec::write(&mut writer, &header, &self.table, &self.store)?;
        writer.flush()?;
        Ok(())
    }

    /// Verify every edge bit names a neighbor that exists and carries the
    /// same color.
    pub fn health_check(&self, check_edges: bool) -> HealthReport {
        graph::health::health_check(&self.table, &self.store, check_edges)
    }

    /// Re-derive missing per-color edge bits from neighbor presence. Returns
    /// the number of slots whose edge mask changed; idempotent.
    pub fn infer_edges(&self, policy: InferEdgesPolicy) -> usize {
        graph::infer_edges::infer_edges(&self.table, &self.store, policy)
    }

    /// Merge one or more `.ctp` files' paths into this graph, remapping each
    /// source's colors per `sources[i].colour_remap`. `nthreads` is accepted
    /// for API parity with a future multi-threaded, slot-sharded merger; this
    /// implementation processes sources sequentially (see DESIGN.md).
    pub fn load_ctp_merge(&mut self, sources: &[CtpMergeSource], nthreads: usize) -> Result<()> {
        self.ensure_paths();
        let nthreads = nthreads.max(1);
        tracing::debug!(nthreads, sources = sources.len(), "merging path files");
        let path_store = self.path_store.as_ref().expect("ensure_paths just set this");
        let path_hash = self.path_hash.as_ref().expect("ensure_paths just set this");
        for source in sources {
            let mut reader = BufReader::new(File::open(&source.path)?);
            let header = path_codec::load_merge(
                &mut reader,
                &self.table,
                path_store,
                path_hash,
                &source.colour_remap,
                self.ncols_covg,
            )?;
            tracing::info!(
                path = %source.path.display(),
                num_paths = header.num_paths,
                "merged path file"
            );
        }
        Ok(())
    }

    /// Walk every slot's path chain, verifying it stays within the committed
    /// arena, terminates, and never revisits an offset.
    pub fn check_paths_trace(&self) -> PathHealthReport {
        match &self.path_store {
            Some(store) => paths::health::trace_check(store, self.table.capacity()),
            None => PathHealthReport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::BinaryKmer;

    #[test]
    fn write_then_load_round_trips_through_graph_api() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_path = dir.path().join("test.ctx");

        let mut source = Graph::new(5, 1, 1, 64);
        let bkey = BinaryKmer::encode("AAAAC", 5).unwrap().canonical(5);
        match source.table.find_or_insert(&bkey).unwrap() {
            hash_table::InsertResult::Inserted(slot) => {
                source.store.add_covg(slot, 0, 4);
                source.store.set_in_colour(slot, 0);
            }
            hash_table::InsertResult::Found(_) => panic!("expected fresh insert"),
        }
        source.write_ctx(&ctx_path).unwrap();

        let mut dest = Graph::new(5, 1, 1, 64);
        let stats = dest.load_ctx(&ctx_path, &LoadPrefs::default()).unwrap();
        assert_eq!(stats.kmers_loaded, 1);

        let health = dest.health_check(true);
        assert!(health.is_clean());
    }

    #[test]
    fn load_ctx_rejects_mismatched_kmer_size() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_path = dir.path().join("k5.ctx");
        let source = Graph::new(5, 1, 1, 64);
        source.write_ctx(&ctx_path).unwrap();

        let mut dest = Graph::new(7, 1, 1, 64);
        let err = dest.load_ctx(&ctx_path, &LoadPrefs::default()).unwrap_err();
        assert!(matches!(err, CortexError::Incompatible(_)));
    }

    #[test]
    fn ctp_merge_attaches_path_and_passes_trace_check() {
        let dir = tempfile::tempdir().unwrap();
        let ctp_path = dir.path().join("test.ctp");
        let k = 5;

        let mut source = Graph::new(k, 1, 1, 64);
        let bkey = BinaryKmer::encode("AAAAA", k).unwrap().canonical(k);
        source.table.find_or_insert(&bkey).unwrap();
        source.ensure_paths();
        let slot = match source.table.find(&bkey) {
            hash_table::FindResult::Found(s) => s,
            hash_table::FindResult::NotFound => panic!("just inserted"),
        };
        source
            .path_store
            .as_ref()
            .unwrap()
            .add_and_link(slot as usize, 4, &[0b0001_1011], &[0b1])
            .unwrap();
        path_codec::write(
            &mut BufWriter::new(File::create(&ctp_path).unwrap()),
            k,
            &["only".to_string()],
            &source.table,
            source.path_store.as_ref().unwrap(),
        )
        .unwrap();

        let mut dest = Graph::new(k, 1, 1, 64);
        dest.table.find_or_insert(&bkey).unwrap();
        dest.load_ctp_merge(
            &[CtpMergeSource {
                path: ctp_path,
                colour_remap: vec![0],
            }],
            1,
        )
        .unwrap();

        let report = dest.check_paths_trace();
        assert!(report.is_clean());
        assert_eq!(report.slots_checked, 1);
    }
}
