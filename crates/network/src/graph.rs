//! Endpoint, link and node arenas for the stream network

use crate::dem::DemProbe;
use crate::spatial::SpatialIndex;
use geo::line_measures::LengthMeasurable;
use geo::Euclidean;
use thalweg_core::report::{Phase, Reporter};
use thalweg_core::vector::{polygon_vertices, polyline_parts, Feature};
use thalweg_core::{Error, Result};

pub type EndpointId = usize;
pub type LinkId = usize;
pub type NodeId = usize;

/// First or last vertex of a link.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub id: EndpointId,
    pub link: LinkId,
    pub x: f64,
    pub y: f64,
    /// DEM sample at the endpoint (the nodata sentinel off valid data)
    pub z: f64,
    /// Node this endpoint was grouped into
    pub node: Option<NodeId>,
    /// Water leaves the link at this endpoint
    pub outflowing: bool,
}

/// One part of one polyline feature: a single arc in the network.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    /// The two endpoints of a mapped link; `None` when the part never
    /// touches valid DEM data
    pub endpoints: Option<[EndpointId; 2]>,
    pub length: f64,
    pub is_feature_mapped: bool,
    pub crosses_dem_edge: bool,
    /// Catchment id, assigned during flow orientation
    pub outlet: Option<u32>,
    /// Link at the catchment outlet
    pub outlet_link: Option<LinkId>,
    pub is_outlet_link: bool,
    pub downstream_nodes: u32,
    pub dist_to_outlet: f64,
    /// Total upstream channel length
    pub tucl: f64,
    pub max_upstream_dist: f64,
    pub horton_order: i32,
    pub strahler_order: i32,
    pub shreve_order: f64,
    pub hack_order: i32,
    pub trib_id: Option<u32>,
    pub is_mainstem: bool,
    /// Links immediately downstream of this link
    pub outflowing_links: Vec<LinkId>,
    /// Links immediately upstream of this link
    pub inflowing_links: Vec<LinkId>,
}

impl Link {
    fn new(id: LinkId, length: f64) -> Self {
        Self {
            id,
            endpoints: None,
            length,
            is_feature_mapped: false,
            crosses_dem_edge: false,
            outlet: None,
            outlet_link: None,
            is_outlet_link: false,
            downstream_nodes: 0,
            // a link's own length counts toward its distance to the mouth
            dist_to_outlet: length,
            tucl: 0.0,
            max_upstream_dist: 0.0,
            horton_order: 0,
            strahler_order: 0,
            shreve_order: 0.0,
            hack_order: 0,
            trib_id: None,
            is_mainstem: false,
            outflowing_links: Vec::new(),
            inflowing_links: Vec::new(),
        }
    }

    /// The endpoint at the opposite end of the link
    pub fn other_endpoint(&self, endpoint: EndpointId) -> Option<EndpointId> {
        let [e1, e2] = self.endpoints?;
        Some(if e1 == endpoint { e2 } else { e1 })
    }
}

/// A spatial equivalence class of endpoints within snap distance.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub endpoints: Vec<EndpointId>,
}

/// Lake vertices in a k-d tree, with the node each lake has collapsed into.
pub struct LakeIndex {
    vertices: SpatialIndex,
    node_of_lake: Vec<Option<NodeId>>,
}

impl LakeIndex {
    /// Index every ring vertex of the lake polygons.
    pub fn from_lakes(lakes: &[Feature]) -> Result<Self> {
        let mut vertices = SpatialIndex::new();
        for (lake, feature) in lakes.iter().enumerate() {
            for coord in polygon_vertices(&feature.geometry)? {
                vertices.insert([coord.x, coord.y], lake);
            }
        }
        Ok(Self {
            vertices,
            node_of_lake: vec![None; lakes.len()],
        })
    }

    pub fn num_lakes(&self) -> usize {
        self.node_of_lake.len()
    }

    /// Node owned by the given lake, if any endpoint has touched it yet
    pub fn node_of(&self, lake: usize) -> Option<NodeId> {
        self.node_of_lake[lake]
    }
}

/// Arena of endpoints, links and nodes built from the input polylines.
pub struct EndpointGraph {
    pub endpoints: Vec<Endpoint>,
    pub links: Vec<Link>,
    pub nodes: Vec<Node>,
    index: SpatialIndex,
}

impl EndpointGraph {
    /// Build the arenas from polyline features.
    ///
    /// One link is created per part. Parts with at least one vertex over
    /// valid DEM data are mapped: their first and last vertices become
    /// endpoints, registered in the spatial index with the DEM sample as z.
    /// Lengths are Euclidean, scaled by `dist_mult`.
    pub fn from_streams(
        streams: &[Feature],
        probe: &DemProbe,
        dist_mult: f64,
        reporter: &mut dyn Reporter,
    ) -> Result<Self> {
        let mut num_links = 0;
        for feature in streams {
            num_links += polyline_parts(&feature.geometry)?.len();
        }

        let mut links: Vec<Link> = Vec::new();
        let mut endpoints: Vec<Endpoint> = Vec::new();
        links
            .try_reserve_exact(num_links)
            .map_err(Error::out_of_memory("link arena"))?;
        endpoints
            .try_reserve_exact(num_links * 2)
            .map_err(Error::out_of_memory("endpoint arena"))?;

        let mut index = SpatialIndex::new();
        let mut phase = Phase::new("Reading stream features");

        for (rec_num, feature) in streams.iter().enumerate() {
            for part in polyline_parts(&feature.geometry)? {
                let id = links.len();
                let mut link = Link::new(id, part.length(&Euclidean) * dist_mult);

                let mut crosses_valid = false;
                let mut crosses_nodata = false;
                for coord in &part.0 {
                    let (row, col) = probe.row_col_from_xy(coord.x, coord.y);
                    if probe.is_nodata(probe.value(row, col)) {
                        crosses_nodata = true;
                    } else {
                        crosses_valid = true;
                    }
                    if probe.is_edge_cell(row, col) {
                        crosses_nodata = true;
                    }
                }

                link.is_feature_mapped = crosses_valid;
                link.crosses_dem_edge = crosses_valid && crosses_nodata;

                if link.is_feature_mapped {
                    let first = part.0[0];
                    let last = part.0[part.0.len() - 1];

                    let e1 = endpoints.len();
                    index.insert([first.x, first.y], e1);
                    endpoints.push(Endpoint {
                        id: e1,
                        link: id,
                        x: first.x,
                        y: first.y,
                        z: probe.sample_xy(first.x, first.y),
                        node: None,
                        outflowing: false,
                    });

                    let e2 = endpoints.len();
                    index.insert([last.x, last.y], e2);
                    endpoints.push(Endpoint {
                        id: e2,
                        link: id,
                        x: last.x,
                        y: last.y,
                        z: probe.sample_xy(last.x, last.y),
                        node: None,
                        outflowing: false,
                    });

                    link.endpoints = Some([e1, e2]);
                }

                links.push(link);
            }
            phase.update(reporter, Phase::percent(rec_num + 1, streams.len()))?;
        }

        tracing::debug!(
            links = links.len(),
            endpoints = endpoints.len(),
            "endpoint graph built"
        );

        Ok(Self {
            endpoints,
            links,
            nodes: Vec::new(),
            index,
        })
    }

    /// Group endpoints into nodes by snap proximity.
    ///
    /// Endpoints are walked in id order. A query that returns several
    /// endpoints forms one node from all of them. A lone endpoint consults
    /// the lake index (unless it is already outflowing): within snap range
    /// of a lake vertex it joins that lake's node, creating it on first
    /// touch; otherwise it becomes a singleton node.
    pub fn form_nodes(
        &mut self,
        snap_radius_sq: f64,
        mut lakes: Option<&mut LakeIndex>,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        let num_endpoints = self.endpoints.len();
        let mut visited = vec![false; num_endpoints];
        let mut phase = Phase::new("Grouping endpoints into nodes");

        for i in 0..num_endpoints {
            if !visited[i] {
                let x = self.endpoints[i].x;
                let y = self.endpoints[i].y;
                let outflowing = self.endpoints[i].outflowing;

                let results = self.index.within_radius_sq([x, y], snap_radius_sq);
                if !results.is_empty() {
                    let lone = results.len() == 1;
                    match lakes.as_deref_mut() {
                        Some(lake_index) if lone && !outflowing => {
                            visited[i] = true;
                            match lake_index.vertices.nearest_within([x, y], snap_radius_sq) {
                                Some((lake, _)) => {
                                    if let Some(node) = lake_index.node_of_lake[lake] {
                                        self.nodes[node].endpoints.push(i);
                                        self.endpoints[i].node = Some(node);
                                    } else {
                                        let node = self.push_singleton_node(i);
                                        lake_index.node_of_lake[lake] = Some(node);
                                    }
                                }
                                None => {
                                    self.push_singleton_node(i);
                                }
                            }
                        }
                        _ => {
                            let node_id = self.nodes.len();
                            let mut node = Node::default();
                            for &(endpoint, _) in &results {
                                node.endpoints.push(endpoint);
                                visited[endpoint] = true;
                                self.endpoints[endpoint].node = Some(node_id);
                            }
                            self.nodes.push(node);
                        }
                    }
                }
            }
            phase.update(reporter, Phase::percent(i, num_endpoints))?;
        }

        tracing::debug!(nodes = self.nodes.len(), "endpoint nodes formed");
        Ok(())
    }

    fn push_singleton_node(&mut self, endpoint: EndpointId) -> NodeId {
        let node = self.nodes.len();
        self.nodes.push(Node {
            endpoints: vec![endpoint],
        });
        self.endpoints[endpoint].node = Some(node);
        node
    }

    /// Node membership of an endpoint's current node
    pub fn node_endpoints(&self, endpoint: EndpointId) -> &[EndpointId] {
        match self.endpoints[endpoint].node {
            Some(node) => &self.nodes[node].endpoints,
            None => &[],
        }
    }
}
