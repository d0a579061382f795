//! Binary file codecs: `.ctx` graphs, `.ctp` paths, and the shared 80-bit
//! extended-precision float helper the `.ctx` header needs.

pub mod graph_codec;
pub mod longdouble;
pub mod path_codec;

pub use graph_codec::{GraphHeader, KmerRecord, LoadPrefs, Stats};
pub use path_codec::PathHeader;
