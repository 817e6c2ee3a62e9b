//! Output records and the normative attribute-table layout

use crate::graph::{EndpointGraph, LinkId};
use serde::Serialize;
use std::fmt;
use thalweg_core::report::{Phase, Reporter};
use thalweg_core::Result;

/// Classification of an emitted network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// Network terminus where a link crosses off the DEM
    Outlet,
    /// Node where one link has more than one downstream link
    Diffluence,
    /// Node where two catchments touch without an outlet
    JoinedHead,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Outlet => "outlet",
            NodeKind::Diffluence => "diffluence",
            NodeKind::JoinedHead => "joined head",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified network node, emitted during flow orientation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub fid: usize,
    /// Node id; -1 when the endpoint was never grouped
    pub node: i64,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

/// Per-link attribute tuple for the links output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRecord {
    pub fid: usize,
    /// Id of the link this record describes
    pub link: LinkId,
    /// Catchment id; -1 for links no outlet reaches
    pub outlet: i32,
    /// Total upstream channel length
    pub tucl: f64,
    pub max_upstream_dist: f64,
    pub downstream_nodes: i32,
    pub dist_to_mouth: f64,
    pub horton: i32,
    pub strahler: i32,
    /// Fractional at diffluences
    pub shreve: f64,
    pub hack: i32,
    /// 1 when the link's tributary is its outlet link's tributary
    pub mainstem: i32,
    /// Tributary id; -1 for links no outlet reaches
    pub trib_id: i32,
    /// 1 when no outlet reaches the link
    pub discontinuous: i32,
}

/// Data type of an attribute field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Numeric,
    Character,
}

/// DBF-style field layout for attribute-table writers.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub width: u8,
    pub decimals: u8,
}

const fn numeric(name: &'static str, width: u8, decimals: u8) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Numeric,
        width,
        decimals,
    }
}

/// Wire layout of the links output table.
pub const LINK_FIELDS: [FieldSpec; 13] = [
    numeric("FID", 6, 0),
    numeric("OUTLET", 10, 0),
    numeric("TUCL", 10, 3),
    numeric("MAXUPSDIST", 10, 3),
    numeric("DS_NODES", 6, 0),
    numeric("DIST2MOUTH", 10, 3),
    numeric("HORTON", 6, 0),
    numeric("STRAHLER", 6, 0),
    numeric("SHREVE", 10, 3),
    numeric("HACK", 6, 0),
    numeric("MAINSTEM", 1, 0),
    numeric("TRIB_ID", 6, 0),
    numeric("DISCONT", 4, 0),
];

/// Wire layout of the nodes output table.
pub const NODE_FIELDS: [FieldSpec; 2] = [
    numeric("FID", 6, 0),
    FieldSpec {
        name: "TYPE",
        kind: FieldKind::Character,
        width: 14,
        decimals: 0,
    },
];

/// Round to the table precision of 3 decimals.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Emit one record per mapped link, in link-id order.
pub fn link_records(
    graph: &EndpointGraph,
    reporter: &mut dyn Reporter,
) -> Result<Vec<LinkRecord>> {
    let mut records = Vec::new();
    let mut phase = Phase::new("Saving output");

    for (i, link) in graph.links.iter().enumerate() {
        if link.is_feature_mapped {
            records.push(LinkRecord {
                fid: records.len(),
                link: link.id,
                outlet: link.outlet.map_or(-1, |o| o as i32),
                tucl: round3(link.tucl),
                max_upstream_dist: round3(link.max_upstream_dist),
                downstream_nodes: link.downstream_nodes as i32,
                dist_to_mouth: round3(link.dist_to_outlet),
                horton: link.horton_order,
                strahler: link.strahler_order,
                shreve: round3(link.shreve_order),
                hack: link.hack_order,
                mainstem: link.is_mainstem as i32,
                trib_id: link.trib_id.map_or(-1, |t| t as i32),
                discontinuous: link.outlet.is_none() as i32,
            });
        }
        phase.update(reporter, Phase::percent(i + 1, graph.links.len()))?;
    }

    Ok(records)
}
