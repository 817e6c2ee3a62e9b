//! Outlet-seed selection and the z-ordered flood queue

use crate::dem::DemProbe;
use crate::graph::{EndpointGraph, EndpointId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct QueueEntry {
    z: f64,
    seq: u64,
    endpoint: EndpointId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the max-heap pops the lowest z; equal z falls back to
        // insertion order
        other
            .z
            .total_cmp(&self.z)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue of endpoints keyed by elevation.
///
/// Ties in z pop in insertion order, which keeps the flood deterministic.
#[derive(Debug, Default)]
pub struct StreamQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl StreamQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, endpoint: EndpointId, z: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry { z, seq, endpoint });
    }

    /// The endpoint with the lowest z
    pub fn pop(&mut self) -> Option<EndpointId> {
        self.heap.pop().map(|entry| entry.endpoint)
    }
}

/// Select one outlet seed per boundary-crossing link.
///
/// For each mapped link that touches both valid data and the DEM edge, one
/// endpoint is chosen as the outlet seed, in priority order: the
/// nodata-side endpoint, then the edge-cell endpoint, then the lower valid
/// endpoint. Endpoint 1 is retained when no rule separates the two. The
/// seed is marked outflowing and queued at its elevation.
pub fn detect_outlets(graph: &mut EndpointGraph, probe: &DemProbe) -> StreamQueue {
    let mut queue = StreamQueue::new();

    for id in 0..graph.links.len() {
        let link = &graph.links[id];
        if !link.crosses_dem_edge {
            continue;
        }
        let Some([e1, e2]) = link.endpoints else {
            continue;
        };

        let (z1, edge1) = {
            let e = &graph.endpoints[e1];
            (e.z, probe.is_edge_xy(e.x, e.y))
        };
        let (z2, edge2) = {
            let e = &graph.endpoints[e2];
            (e.z, probe.is_edge_xy(e.x, e.y))
        };
        let nodata1 = probe.is_nodata(z1);
        let nodata2 = probe.is_nodata(z2);

        let seed = if nodata1 && !nodata2 {
            e1
        } else if nodata2 && !nodata1 {
            e2
        } else if edge1 && !edge2 && !nodata2 {
            e1
        } else if edge2 && !edge1 && !nodata1 {
            e2
        } else if z1 < z2 && !nodata2 {
            e1
        } else if z2 < z1 && !nodata1 {
            e2
        } else {
            e1
        };

        let z = graph.endpoints[seed].z;
        graph.endpoints[seed].outflowing = true;
        queue.push(seed, z);
    }

    queue
}
