//! Priority flood from outlet seeds
//!
//! Pops the lowest endpoint off the stream queue and claims every
//! unoriented link joined at the popped link's two nodes, assigning the
//! catchment id, outlet link, downstream-node count and distance to the
//! outlet, and recording the outflow adjacency. Already-oriented neighbors
//! at the upstream node are classified as diffluences or joined heads.

use crate::graph::{EndpointGraph, EndpointId, LinkId};
use crate::outlets::StreamQueue;
use crate::records::{NodeKind, NodeRecord};
use thalweg_core::report::{Phase, Reporter};
use thalweg_core::Result;

/// Orient every link reachable from an outlet seed.
///
/// Returns the node records emitted along the way (outlets, diffluences,
/// joined heads) and the number of outlets assigned.
pub fn orient_network(
    graph: &mut EndpointGraph,
    queue: &mut StreamQueue,
    reporter: &mut dyn Reporter,
) -> Result<(Vec<NodeRecord>, u32)> {
    let mut records: Vec<NodeRecord> = Vec::new();
    let mut next_outlet: u32 = 1;
    let total = graph.endpoints.len();
    let mut popped = 0usize;
    let mut phase = Phase::new("Priority flood");

    while let Some(e) = queue.pop() {
        popped += 1;
        let link_id = graph.endpoints[e].link;

        // captured before any claim below mutates the link
        let downstream_nodes = graph.links[link_id].downstream_nodes;
        let dist_to_outlet = graph.links[link_id].dist_to_outlet;

        if graph.links[link_id].outlet.is_none() {
            graph.links[link_id].outlet = Some(next_outlet);
            next_outlet += 1;
            graph.links[link_id].outlet_link = Some(link_id);
            graph.links[link_id].is_outlet_link = true;
            push_record(&mut records, graph, e, NodeKind::Outlet);
        }
        let outlet = graph.links[link_id].outlet;
        let outlet_link = graph.links[link_id].outlet_link;

        // claim unoriented links joined at the downstream node
        for e2 in graph.node_endpoints(e).to_vec() {
            let l2 = graph.endpoints[e2].link;
            if graph.links[l2].outlet.is_none() {
                claim(
                    graph,
                    queue,
                    e2,
                    link_id,
                    outlet,
                    outlet_link,
                    downstream_nodes,
                    dist_to_outlet,
                );
            }
        }

        // walk to the upstream node and claim or classify its links
        if let Some(upstream) = graph.links[link_id].other_endpoint(e) {
            for e2 in graph.node_endpoints(upstream).to_vec() {
                let l2 = graph.endpoints[e2].link;
                if graph.links[l2].outlet.is_none() {
                    claim(
                        graph,
                        queue,
                        e2,
                        link_id,
                        outlet,
                        outlet_link,
                        downstream_nodes,
                        dist_to_outlet,
                    );
                } else if graph.links[l2].outlet == outlet
                    && l2 != link_id
                    && graph.endpoints[e2].outflowing
                {
                    // the neighbor already drains this catchment: the popped
                    // link is its second downstream path
                    graph.links[l2].outflowing_links.push(link_id);
                    push_record(&mut records, graph, e2, NodeKind::Diffluence);
                } else if graph.links[l2].outlet != outlet && !graph.links[l2].is_outlet_link {
                    push_record(&mut records, graph, e2, NodeKind::JoinedHead);
                }
            }
        }

        phase.update(reporter, Phase::percent(popped, total))?;
    }

    tracing::debug!(
        outlets = next_outlet - 1,
        node_records = records.len(),
        "network oriented"
    );
    Ok((records, next_outlet - 1))
}

#[allow(clippy::too_many_arguments)]
fn claim(
    graph: &mut EndpointGraph,
    queue: &mut StreamQueue,
    endpoint: EndpointId,
    from_link: LinkId,
    outlet: Option<u32>,
    outlet_link: Option<LinkId>,
    downstream_nodes: u32,
    dist_to_outlet: f64,
) {
    let claimed = graph.endpoints[endpoint].link;
    let link = &mut graph.links[claimed];
    link.outlet = outlet;
    link.outlet_link = outlet_link;
    link.downstream_nodes = downstream_nodes + 1;
    link.dist_to_outlet = dist_to_outlet + link.length;
    link.outflowing_links.push(from_link);

    let z = graph.endpoints[endpoint].z;
    queue.push(endpoint, z);
    graph.endpoints[endpoint].outflowing = true;
}

fn push_record(
    records: &mut Vec<NodeRecord>,
    graph: &EndpointGraph,
    endpoint: EndpointId,
    kind: NodeKind,
) {
    let e = &graph.endpoints[endpoint];
    records.push(NodeRecord {
        fid: records.len(),
        node: e.node.map(|n| n as i64).unwrap_or(-1),
        kind,
        x: e.x,
        y: e.y,
    });
}
