//! # Thalweg Network
//!
//! Vector stream-network analysis over a DEM.
//!
//! Given polyline stream features, a DEM raster and an optional lake layer,
//! the engine reconstructs the implicit flow graph of the network, detects
//! outlets along the DEM edge, orients every link with a priority flood from
//! the outlets, and computes the standard hydrographic index suite per link:
//! Horton, Strahler, Shreve and Hack stream orders, total upstream channel
//! length, maximum upstream distance, distance to the mouth, tributary id
//! and the mainstem flag.
//!
//! The entry point is [`analyze_network`]; [`StreamNetworkAnalysis`] exposes
//! the same pipeline through the core [`Algorithm`](thalweg_core::Algorithm)
//! trait.

pub mod dem;
pub mod flood;
pub mod graph;
pub mod indices;
pub mod outlets;
pub mod pipeline;
pub mod records;
pub mod spatial;

pub use pipeline::{
    analyze_network, AnalysisParams, NetworkInput, NetworkOutput, StreamNetworkAnalysis,
};
pub use records::{
    FieldKind, FieldSpec, LinkRecord, NodeKind, NodeRecord, LINK_FIELDS, NODE_FIELDS,
};
