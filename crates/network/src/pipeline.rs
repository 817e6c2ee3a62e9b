//! End-to-end stream-network analysis

use crate::dem::{metric_distance_multiplier, DemProbe};
use crate::flood::orient_network;
use crate::graph::{EndpointGraph, LakeIndex};
use crate::indices::compute_indices;
use crate::outlets::detect_outlets;
use crate::records::{link_records, LinkRecord, NodeRecord};
use thalweg_core::raster::Raster;
use thalweg_core::vector::Feature;
use thalweg_core::{Algorithm, Error, Reporter, Result, SilentReporter};

/// Parameters for the stream-network analysis.
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    /// Snap distance for endpoint grouping, in the DEM's world units
    pub snap_distance: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            snap_distance: 10.0,
        }
    }
}

/// Owned inputs for the [`Algorithm`] form of the analysis.
#[derive(Debug, Clone)]
pub struct NetworkInput {
    pub streams: Vec<Feature>,
    pub dem: Raster<f64>,
    pub lakes: Option<Vec<Feature>>,
}

/// Emitted link and node records plus the outlet count.
#[derive(Debug, Clone, Default)]
pub struct NetworkOutput {
    pub links: Vec<LinkRecord>,
    pub nodes: Vec<NodeRecord>,
    pub outlet_count: u32,
}

/// Reconstruct the flow graph of a vector stream network and compute its
/// hydrographic indices.
///
/// The pipeline samples the DEM under each polyline part, groups endpoints
/// into nodes within the snap distance (collapsing lake-adjacent endpoints
/// into one node per lake), detects outlets where links cross off valid
/// data, orients every reachable link with a priority flood from the
/// outlets, and computes the per-link index suite over the oriented graph.
///
/// Streams must be polyline features and lakes polygon features; anything
/// else fails with [`Error::BadInputShape`] before any work is done. When no
/// outlet is found the pipeline still completes, with every link flagged
/// discontinuous. Cancellation via the reporter aborts with
/// [`Error::Cancelled`] and no output.
pub fn analyze_network(
    streams: &[Feature],
    dem: &Raster<f64>,
    lakes: Option<&[Feature]>,
    params: &AnalysisParams,
    reporter: &mut dyn Reporter,
) -> Result<NetworkOutput> {
    if !params.snap_distance.is_finite() || params.snap_distance <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "snap_distance",
            value: params.snap_distance.to_string(),
            reason: "must be a positive, finite distance".to_string(),
        });
    }

    // reject wrong geometry base types before any raster work
    for feature in streams {
        thalweg_core::vector::polyline_parts(&feature.geometry)?;
    }
    let mut lake_index = match lakes {
        Some(lakes) => Some(LakeIndex::from_lakes(lakes)?),
        None => None,
    };

    // on geographic DEMs lengths are scaled to meters and the snap distance
    // is brought back into degrees before squaring
    let dist_mult = metric_distance_multiplier(dem);
    let snap = params.snap_distance / dist_mult;
    let snap_radius_sq = snap * snap;

    let probe = DemProbe::new(dem, reporter)?;
    let mut graph = EndpointGraph::from_streams(streams, &probe, dist_mult, reporter)?;

    let mut queue = detect_outlets(&mut graph, &probe);
    tracing::debug!(seeds = queue.len(), "outlet seeds detected");
    if queue.is_empty() {
        reporter.feedback(
            "No outlet candidates were found along the DEM edge; \
             all links will be flagged as discontinuous.",
        );
    }

    graph.form_nodes(snap_radius_sq, lake_index.as_mut(), reporter)?;

    let (nodes, outlet_count) = orient_network(&mut graph, &mut queue, reporter)?;
    compute_indices(&mut graph, reporter)?;
    let links = link_records(&graph, reporter)?;

    tracing::info!(
        links = links.len(),
        nodes = nodes.len(),
        outlets = outlet_count,
        "stream network analysis complete"
    );

    Ok(NetworkOutput {
        links,
        nodes,
        outlet_count,
    })
}

/// [`Algorithm`] wrapper around [`analyze_network`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamNetworkAnalysis;

impl Algorithm for StreamNetworkAnalysis {
    type Input = NetworkInput;
    type Output = NetworkOutput;
    type Params = AnalysisParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Vector Stream Network Analysis"
    }

    fn description(&self) -> &'static str {
        "Calculates stream network geometry from vector streams"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        analyze_network(
            &input.streams,
            &input.dem,
            input.lakes.as_deref(),
            &params,
            &mut SilentReporter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, Geometry, Point};
    use thalweg_core::raster::GeoTransform;
    use thalweg_core::report::Reporter;

    fn small_dem() -> Raster<f64> {
        let mut dem = Raster::filled(6, 6, 30.0);
        dem.set_transform(GeoTransform::new(0.0, 6.0, 1.0, -1.0));
        dem.set_nodata(Some(-32768.0));
        dem
    }

    fn crossing_stream() -> Vec<Feature> {
        vec![Feature::new(Geometry::LineString(
            line_string![(x: 3.5, y: 3.5), (x: 3.5, y: 0.5)],
        ))]
    }

    #[test]
    fn rejects_non_positive_snap_distance() {
        let dem = small_dem();
        let params = AnalysisParams { snap_distance: 0.0 };
        let err = analyze_network(&[], &dem, None, &params, &mut SilentReporter).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name, .. } if name == "snap_distance"));
    }

    #[test]
    fn rejects_point_streams() {
        let dem = small_dem();
        let streams = vec![Feature::new(Geometry::Point(Point::new(1.0, 1.0)))];
        let err = analyze_network(
            &streams,
            &dem,
            None,
            &AnalysisParams::default(),
            &mut SilentReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadInputShape { expected, .. } if expected == "polyline"));
    }

    #[test]
    fn rejects_polyline_lakes() {
        let dem = small_dem();
        let lakes = vec![Feature::new(Geometry::LineString(
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
        ))];
        let err = analyze_network(
            &crossing_stream(),
            &dem,
            Some(&lakes),
            &AnalysisParams::default(),
            &mut SilentReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadInputShape { expected, .. } if expected == "polygon"));
    }

    #[test]
    fn algorithm_wrapper_runs_the_pipeline() {
        let input = NetworkInput {
            streams: crossing_stream(),
            dem: small_dem(),
            lakes: None,
        };
        let output = StreamNetworkAnalysis
            .execute(input, AnalysisParams { snap_distance: 0.1 })
            .unwrap();
        assert_eq!(output.links.len(), 1);
        assert_eq!(output.outlet_count, 1);
    }

    struct CancelImmediately;

    impl Reporter for CancelImmediately {
        fn progress(&mut self, _label: &str, _percent: i32) {}

        fn feedback(&mut self, _message: &str) {}

        fn cancel_requested(&self) -> bool {
            true
        }
    }

    #[test]
    fn cancellation_aborts_without_output() {
        let dem = small_dem();
        let err = analyze_network(
            &crossing_stream(),
            &dem,
            None,
            &AnalysisParams { snap_distance: 0.1 },
            &mut CancelImmediately,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
