//! Graph store: coverage, edges, and color membership overlaid on hash table
//! slots, plus the per-color metadata a `.ctx` header carries.

pub mod health;
pub mod infer_edges;
pub mod store;
pub mod supernode;

pub use health::{HealthReport, Violation};
pub use infer_edges::Policy as InferEdgesPolicy;
pub use store::GraphStore;
pub use supernode::{SupernodeWalk, TerminationReason};

/// Per-color metadata carried in a `.ctx` header (format version ≥ 6 for the
/// name/error-rate/cleaning fields; version 4/5 graphs only have
/// `mean_read_length`/`total_seq_loaded`).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphInfo {
    /// Sample name, empty for versions that do not carry one.
    pub sample_name: String,
    /// Mean length of reads contributing to this color.
    pub mean_read_length: u32,
    /// Total bases loaded into this color.
    pub total_seq_loaded: u64,
    /// Estimated per-base sequencing error rate.
    pub seq_err_rate: f64,
    /// Prior cleaning applied to this color, if any.
    pub cleaning: CleaningRecord,
}

impl Default for GraphInfo {
    fn default() -> Self {
        Self {
            sample_name: String::new(),
            mean_read_length: 0,
            total_seq_loaded: 0,
            seq_err_rate: 0.0,
            cleaning: CleaningRecord::default(),
        }
    }
}

impl GraphInfo {
    /// Fold another color's loaded sequence into this one, sequence-weighted
    /// averaging `mean_read_length` and `seq_err_rate`.
    pub fn merge_loaded(&mut self, other: &GraphInfo) {
        let total = self.total_seq_loaded + other.total_seq_loaded;
        if total > 0 {
            self.mean_read_length = ((self.mean_read_length as u64 * self.total_seq_loaded
                + other.mean_read_length as u64 * other.total_seq_loaded)
                / total) as u32;
            self.seq_err_rate = (self.seq_err_rate * self.total_seq_loaded as f64
                + other.seq_err_rate * other.total_seq_loaded as f64)
                / total as f64;
        }
        self.total_seq_loaded = total;
        self.cleaning.merge(&other.cleaning);
    }
}

/// Prior filtering metadata recorded alongside a color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningRecord {
    /// Tips (dead-end branches below a length threshold) were clipped.
    pub tip_clipped: bool,
    /// Low-coverage supernodes were removed.
    pub low_covg_supernodes_removed: bool,
    /// Low-coverage individual nodes were removed.
    pub low_covg_nodes_removed: bool,
    /// This color was cleaned against another graph (rather than itself).
    pub cleaned_against_other: bool,
    /// Supernode coverage threshold used, if `low_covg_supernodes_removed`.
    pub thresh_supernodes: u32,
    /// Node coverage threshold used, if `low_covg_nodes_removed`.
    pub thresh_nodes: u32,
    /// Name of the graph this color was cleaned against.
    pub cleaned_against_name: String,
}

impl CleaningRecord {
    /// Combine two cleaning histories: a boolean is true if either source set
    /// it; thresholds take the stricter (larger) of the two when both apply.
    pub fn merge(&mut self, other: &CleaningRecord) {
        self.tip_clipped |= other.tip_clipped;
        self.low_covg_supernodes_removed |= other.low_covg_supernodes_removed;
        self.low_covg_nodes_removed |= other.low_covg_nodes_removed;
        self.cleaned_against_other |= other.cleaned_against_other;
        self.thresh_supernodes = self.thresh_supernodes.max(other.thresh_supernodes);
        self.thresh_nodes = self.thresh_nodes.max(other.thresh_nodes);
        if self.cleaned_against_name.is_empty() {
            self.cleaned_against_name = other.cleaned_against_name.clone();
        }
    }
}
