//! Hydrographic indices over the oriented network
//!
//! Three traversals of the outflow DAG:
//! 1. headwaters to outlets: TUCL, max upstream distance, fractional Shreve
//!    order, tributary id (furthest-head rule at junctions)
//! 2. headwaters to outlets again: Strahler order and the mainstem flag
//! 3. outlets to headwaters: Horton and Hack orders

use crate::graph::EndpointGraph;
use thalweg_core::report::{Phase, Reporter};
use thalweg_core::Result;

/// Compute every per-link index on an oriented graph.
pub fn compute_indices(graph: &mut EndpointGraph, reporter: &mut dyn Reporter) -> Result<()> {
    Phase::new("Calculating downstream indices").update(reporter, 0)?;
    accumulate_downstream(graph);
    assign_strahler(graph);

    Phase::new("Calculating upstream indices").update(reporter, 0)?;
    assign_horton_hack(graph);

    tracing::debug!("hydrographic indices computed");
    Ok(())
}

/// In-degree of every link under the outflow relation.
fn in_degrees(graph: &EndpointGraph) -> Vec<u32> {
    let mut in_degree = vec![0u32; graph.links.len()];
    for link in &graph.links {
        for &downstream in &link.outflowing_links {
            in_degree[downstream] += 1;
        }
    }
    in_degree
}

/// TUCL, max upstream distance, Shreve order and tributary ids, accumulated
/// from headwaters down to the outlets. Also populates the inflow lists.
fn accumulate_downstream(graph: &mut EndpointGraph) {
    let n = graph.links.len();
    let mut in_degree = vec![0u32; n];

    for i in 0..n {
        for j in 0..graph.links[i].outflowing_links.len() {
            let downstream = graph.links[i].outflowing_links[j];
            in_degree[downstream] += 1;
            graph.links[downstream].inflowing_links.push(i);
        }
    }

    let mut stack: Vec<usize> = Vec::new();
    let mut next_trib: u32 = 1;
    for i in 0..n {
        if in_degree[i] == 0 && graph.links[i].is_feature_mapped && graph.links[i].outlet.is_some()
        {
            stack.push(i);
            graph.links[i].shreve_order = 1.0;
            graph.links[i].trib_id = Some(next_trib);
            next_trib += 1;
        }
    }

    while let Some(current) = stack.pop() {
        graph.links[current].tucl += graph.links[current].length;
        graph.links[current].max_upstream_dist += graph.links[current].length;

        let outflows = graph.links[current].outflowing_links.clone();
        let splits = outflows.len() as f64;
        let tucl = graph.links[current].tucl;
        let shreve = graph.links[current].shreve_order;
        let max_upstream = graph.links[current].max_upstream_dist;
        let trib = graph.links[current].trib_id;

        for &downstream in &outflows {
            {
                let link = &mut graph.links[downstream];
                link.tucl += tucl / splits;
                link.shreve_order += shreve / splits;
                if max_upstream > link.max_upstream_dist {
                    link.max_upstream_dist = max_upstream;
                }
            }

            in_degree[downstream] -= 1;
            if in_degree[downstream] == 0 {
                stack.push(downstream);

                let inflows = graph.links[downstream].inflowing_links.clone();
                if inflows.len() > 1 {
                    // the tributary reaching furthest upstream carries its
                    // id through the junction
                    let mut furthest = 0.0;
                    let mut trib_of_furthest = None;
                    for &upstream in &inflows {
                        if graph.links[upstream].max_upstream_dist > furthest {
                            furthest = graph.links[upstream].max_upstream_dist;
                            trib_of_furthest = graph.links[upstream].trib_id;
                        }
                    }
                    graph.links[downstream].trib_id = trib_of_furthest;
                } else if inflows.len() == 1 {
                    graph.links[downstream].trib_id = trib;
                }
            }
        }
    }
}

/// Strahler order and mainstem flag, headwaters down to the outlets.
fn assign_strahler(graph: &mut EndpointGraph) {
    let n = graph.links.len();
    let mut in_degree = in_degrees(graph);

    let mut stack: Vec<usize> = Vec::new();
    for i in 0..n {
        if in_degree[i] == 0 && graph.links[i].is_feature_mapped {
            stack.push(i);
            graph.links[i].strahler_order = 1;
        }
    }

    while let Some(current) = stack.pop() {
        if graph.links[current].outlet.is_some() {
            if let Some(outlet_link) = graph.links[current].outlet_link {
                if graph.links[outlet_link].trib_id == graph.links[current].trib_id {
                    graph.links[current].is_mainstem = true;
                }
            }
        }

        let outflows = graph.links[current].outflowing_links.clone();
        for &downstream in &outflows {
            in_degree[downstream] -= 1;
            if in_degree[downstream] != 0 {
                continue;
            }
            stack.push(downstream);

            let inflows = graph.links[downstream].inflowing_links.clone();
            if inflows.len() > 1 {
                let mut largest = 0;
                let mut trib_of_largest = None;
                let mut second_largest = 0;
                let mut trib_of_second = None;
                for &upstream in &inflows {
                    if graph.links[upstream].strahler_order >= largest {
                        second_largest = largest;
                        trib_of_second = trib_of_largest;
                        largest = graph.links[upstream].strahler_order;
                        trib_of_largest = graph.links[upstream].trib_id;
                    }
                }
                // the order rises only where two equal-order tributaries meet
                graph.links[downstream].strahler_order =
                    if largest == second_largest && trib_of_largest != trib_of_second {
                        largest + 1
                    } else {
                        largest
                    };
            } else if inflows.len() == 1 {
                graph.links[downstream].strahler_order = graph.links[current].strahler_order;
            }
        }
    }
}

/// Horton and Hack orders, outlets up to the headwaters.
fn assign_horton_hack(graph: &mut EndpointGraph) {
    let n = graph.links.len();
    let mut visited = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();

    for i in 0..n {
        if graph.links[i].is_outlet_link {
            stack.push(i);
            graph.links[i].horton_order = graph.links[i].strahler_order;
            graph.links[i].hack_order = 1;
            visited[i] = true;
        }
    }

    while let Some(current) = stack.pop() {
        let horton = graph.links[current].horton_order;
        let hack = graph.links[current].hack_order;
        let trib = graph.links[current].trib_id;

        let inflows = graph.links[current].inflowing_links.clone();
        for &upstream in &inflows {
            if visited[upstream] {
                continue;
            }
            if graph.links[upstream].trib_id == trib {
                graph.links[upstream].horton_order = horton;
                graph.links[upstream].hack_order = hack;
            } else {
                graph.links[upstream].horton_order = graph.links[upstream].strahler_order;
                graph.links[upstream].hack_order = hack + 1;
            }
            visited[upstream] = true;
            stack.push(upstream);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dem::DemProbe;
    use crate::flood::orient_network;
    use crate::outlets::detect_outlets;
    use geo_types::{line_string, Geometry};
    use thalweg_core::raster::{GeoTransform, Raster};
    use thalweg_core::vector::Feature;
    use thalweg_core::SilentReporter;

    /// 12x12 grid over x, y in [0, 12); z falls toward the south border.
    fn south_sloping_dem() -> Raster<f64> {
        let mut dem = Raster::new(12, 12);
        dem.set_transform(GeoTransform::new(0.0, 12.0, 1.0, -1.0));
        dem.set_nodata(Some(-32768.0));
        for row in 0..12 {
            for col in 0..12 {
                dem.set(row, col, 20.0 + (11 - row) as f64 * 5.0).unwrap();
            }
        }
        dem
    }

    fn analyzed(streams: &[Feature], dem: &Raster<f64>) -> EndpointGraph {
        let probe = DemProbe::new(dem, &mut SilentReporter).unwrap();
        let mut graph =
            EndpointGraph::from_streams(streams, &probe, 1.0, &mut SilentReporter).unwrap();
        let mut queue = detect_outlets(&mut graph, &probe);
        graph.form_nodes(0.01, None, &mut SilentReporter).unwrap();
        orient_network(&mut graph, &mut queue, &mut SilentReporter).unwrap();
        compute_indices(&mut graph, &mut SilentReporter).unwrap();
        graph
    }

    /// Two headwaters joining a trunk that drains the south border. The
    /// western headwater reaches further upstream.
    fn y_junction() -> Vec<Feature> {
        vec![
            // link 0: long western headwater
            Feature::new(Geometry::LineString(
                line_string![(x: 1.5, y: 10.5), (x: 5.5, y: 4.5)],
            )),
            // link 1: short eastern headwater
            Feature::new(Geometry::LineString(
                line_string![(x: 8.5, y: 7.5), (x: 5.5, y: 4.5)],
            )),
            // link 2: trunk to the border
            Feature::new(Geometry::LineString(
                line_string![(x: 5.5, y: 4.5), (x: 5.5, y: 0.5)],
            )),
        ]
    }

    #[test]
    fn y_junction_orders() {
        let graph = analyzed(&y_junction(), &south_sloping_dem());

        let west = &graph.links[0];
        let east = &graph.links[1];
        let trunk = &graph.links[2];

        assert_eq!(west.strahler_order, 1);
        assert_eq!(east.strahler_order, 1);
        assert_eq!(trunk.strahler_order, 2);

        assert_eq!(west.shreve_order, 1.0);
        assert_eq!(east.shreve_order, 1.0);
        assert_eq!(trunk.shreve_order, 2.0);

        // trunk carries the id of the furthest-reaching headwater
        assert_eq!(trunk.trib_id, west.trib_id);
        assert_ne!(west.trib_id, east.trib_id);
    }

    #[test]
    fn y_junction_tucl_and_distances() {
        let graph = analyzed(&y_junction(), &south_sloping_dem());

        let west = &graph.links[0];
        let east = &graph.links[1];
        let trunk = &graph.links[2];

        let expected_tucl = west.length + east.length + trunk.length;
        assert!((trunk.tucl - expected_tucl).abs() < 1e-9);
        assert!((trunk.max_upstream_dist - (west.length + trunk.length)).abs() < 1e-9);
        assert!((west.dist_to_outlet - (west.length + trunk.length)).abs() < 1e-9);
        assert_eq!(trunk.downstream_nodes, 0);
        assert_eq!(west.downstream_nodes, 1);
        assert_eq!(east.downstream_nodes, 1);
    }

    #[test]
    fn y_junction_horton_hack_mainstem() {
        let graph = analyzed(&y_junction(), &south_sloping_dem());

        let west = &graph.links[0];
        let east = &graph.links[1];
        let trunk = &graph.links[2];

        assert!(trunk.is_mainstem);
        assert!(west.is_mainstem);
        assert!(!east.is_mainstem);

        assert_eq!(trunk.hack_order, 1);
        assert_eq!(west.hack_order, 1);
        assert_eq!(east.hack_order, 2);

        assert_eq!(trunk.horton_order, 2);
        assert_eq!(west.horton_order, 2);
        assert_eq!(east.horton_order, 1);
    }

    #[test]
    fn equal_order_same_trib_does_not_raise_strahler() {
        // a single chain of three links: order stays 1 throughout
        let streams = vec![
            Feature::new(Geometry::LineString(
                line_string![(x: 4.5, y: 10.5), (x: 4.5, y: 7.5)],
            )),
            Feature::new(Geometry::LineString(
                line_string![(x: 4.5, y: 7.5), (x: 4.5, y: 4.5)],
            )),
            Feature::new(Geometry::LineString(
                line_string![(x: 4.5, y: 4.5), (x: 4.5, y: 0.5)],
            )),
        ];
        let graph = analyzed(&streams, &south_sloping_dem());

        for link in &graph.links {
            assert_eq!(link.strahler_order, 1);
            assert_eq!(link.hack_order, 1);
            assert!(link.is_mainstem);
        }
        assert_eq!(graph.links[0].trib_id, graph.links[2].trib_id);
    }

    #[test]
    fn disconnected_fragment_keeps_zero_orders() {
        let streams = vec![
            Feature::new(Geometry::LineString(
                line_string![(x: 2.5, y: 4.5), (x: 2.5, y: 0.5)],
            )),
            // interior fragment
            Feature::new(Geometry::LineString(
                line_string![(x: 8.5, y: 8.5), (x: 8.5, y: 6.5)],
            )),
        ];
        let graph = analyzed(&streams, &south_sloping_dem());

        let fragment = &graph.links[1];
        assert_eq!(fragment.outlet, None);
        assert_eq!(fragment.strahler_order, 1);
        assert_eq!(fragment.horton_order, 0);
        assert_eq!(fragment.hack_order, 0);
        assert_eq!(fragment.trib_id, None);
        assert_eq!(fragment.tucl, 0.0);
        assert_eq!(fragment.shreve_order, 0.0);
        assert!(!fragment.is_mainstem);
    }
}
