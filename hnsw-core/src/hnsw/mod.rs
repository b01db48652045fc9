mod build;
mod graph;
mod level;
mod neighbor_select;
mod params;
mod search;
mod visited;

pub(crate) use build::{build_graph, ENTRY_POINT};
pub(crate) use graph::{FlatLayer0, Graph};
pub(crate) use params::autotune_hint;
pub(crate) use search::{search_layer, search_layer_flat};

pub use params::HnswParams;
