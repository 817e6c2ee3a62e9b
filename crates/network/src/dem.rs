//! DEM sampling, edge-cell detection and geographic distance conversion

use ndarray::Array2;
use thalweg_core::raster::{Raster, XyUnits};
use thalweg_core::report::{Phase, Reporter};
use thalweg_core::Result;

/// Moore neighborhood offsets as (row, col)
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
];

/// Read-only sampler over a DEM raster.
///
/// Maps world coordinates to grid cells, yields the nodata sentinel outside
/// the grid, and answers whether a cell sits on the data edge (a valid cell
/// with at least one nodata or off-grid Moore neighbor).
pub struct DemProbe<'a> {
    dem: &'a Raster<f64>,
    edge: Array2<bool>,
}

impl<'a> DemProbe<'a> {
    /// Build the probe, scanning the raster once for edge cells.
    pub fn new(dem: &'a Raster<f64>, reporter: &mut dyn Reporter) -> Result<Self> {
        let (rows, cols) = dem.shape();
        let mut edge = Array2::from_elem((rows, cols), false);

        let mut phase = Phase::new("Finding DEM edge cells");
        for row in 0..rows {
            for col in 0..cols {
                let z = dem.value_at(row as isize, col as isize);
                if dem.is_nodata(z) {
                    continue;
                }
                for &(dr, dc) in &NEIGHBORS {
                    let neighbor = dem.value_at(row as isize + dr, col as isize + dc);
                    if dem.is_nodata(neighbor) {
                        edge[(row, col)] = true;
                        break;
                    }
                }
            }
            phase.update(reporter, Phase::percent(row, rows))?;
        }

        Ok(Self { dem, edge })
    }

    /// The underlying raster
    pub fn dem(&self) -> &Raster<f64> {
        self.dem
    }

    /// The value treated as nodata by [`value`](Self::value)
    pub fn nodata(&self) -> f64 {
        self.dem.nodata_sentinel()
    }

    /// Whether `z` is a nodata sample
    pub fn is_nodata(&self, z: f64) -> bool {
        self.dem.is_nodata(z)
    }

    /// Grid cell containing the world coordinate (x, y)
    pub fn row_col_from_xy(&self, x: f64, y: f64) -> (isize, isize) {
        let (col, row) = self.dem.geo_to_pixel(x, y);
        (row.floor() as isize, col.floor() as isize)
    }

    /// Cell value; the nodata sentinel outside the grid
    pub fn value(&self, row: isize, col: isize) -> f64 {
        self.dem.value_at(row, col)
    }

    /// DEM sample under the world coordinate (x, y)
    pub fn sample_xy(&self, x: f64, y: f64) -> f64 {
        let (row, col) = self.row_col_from_xy(x, y);
        self.value(row, col)
    }

    /// Whether the cell is valid data adjacent to nodata or the grid border
    pub fn is_edge_cell(&self, row: isize, col: isize) -> bool {
        if row < 0
            || col < 0
            || row as usize >= self.edge.nrows()
            || col as usize >= self.edge.ncols()
        {
            return false;
        }
        self.edge[(row as usize, col as usize)]
    }

    /// Edge-cell test at a world coordinate
    pub fn is_edge_xy(&self, x: f64, y: f64) -> bool {
        let (row, col) = self.row_col_from_xy(x, y);
        self.is_edge_cell(row, col)
    }
}

/// Meters per world unit for the DEM's coordinate system.
///
/// Projected rasters use their units directly (factor 1). Geographic rasters
/// get a conversion derived from the WGS-84 ellipsoid at the latitude
/// `(north - south) / 2` of the raster bounds, averaged over the
/// longitudinal and latitudinal degree lengths. Latitudes outside ±90° leave
/// the factor at 1.
pub fn metric_distance_multiplier(dem: &Raster<f64>) -> f64 {
    if dem.units() != XyUnits::Geographic {
        return 1.0;
    }

    let (_, south, _, north) = dem.bounds();
    let mid_lat = (north - south) / 2.0;
    if !(-90.0..=90.0).contains(&mid_lat) {
        return 1.0;
    }

    const A: f64 = 6_378_137.0;
    const B: f64 = 6_356_752.314;

    let phi = mid_lat.to_radians();
    let e2 = (A * A - B * B) / (A * A);
    let long_deg_dist =
        (std::f64::consts::PI * A * phi.cos()) / (180.0 * (1.0 - e2 * phi.sin() * phi.sin()).sqrt());
    let lat_deg_dist = 111_132.954 - 559.822 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos();

    (long_deg_dist + lat_deg_dist) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use thalweg_core::raster::GeoTransform;
    use thalweg_core::SilentReporter;

    fn dem_with_hole() -> Raster<f64> {
        // 5x5, elevation 10 everywhere, nodata at the center
        let mut dem = Raster::filled(5, 5, 10.0);
        dem.set_transform(GeoTransform::new(0.0, 5.0, 1.0, -1.0));
        dem.set_nodata(Some(-32768.0));
        dem.set(2, 2, -32768.0).unwrap();
        dem
    }

    #[test]
    fn border_cells_are_edges() {
        let dem = dem_with_hole();
        let probe = DemProbe::new(&dem, &mut SilentReporter).unwrap();

        assert!(probe.is_edge_cell(0, 0));
        assert!(probe.is_edge_cell(4, 2));
        assert!(probe.is_edge_cell(0, 4));
    }

    #[test]
    fn cells_around_a_nodata_hole_are_edges() {
        let dem = dem_with_hole();
        let probe = DemProbe::new(&dem, &mut SilentReporter).unwrap();

        assert!(probe.is_edge_cell(1, 1));
        assert!(probe.is_edge_cell(2, 3));
        // the hole itself is not an edge cell
        assert!(!probe.is_edge_cell(2, 2));
    }

    #[test]
    fn interior_of_a_large_grid_is_not_edge() {
        let mut dem = Raster::filled(7, 7, 1.0);
        dem.set_nodata(Some(-32768.0));
        let probe = DemProbe::new(&dem, &mut SilentReporter).unwrap();

        assert!(!probe.is_edge_cell(3, 3));
        assert!(!probe.is_edge_cell(2, 4));
    }

    #[test]
    fn off_grid_is_nodata_and_not_edge() {
        let dem = dem_with_hole();
        let probe = DemProbe::new(&dem, &mut SilentReporter).unwrap();

        assert!(probe.is_nodata(probe.value(-1, 0)));
        assert!(probe.is_nodata(probe.value(0, 5)));
        assert!(!probe.is_edge_cell(-1, 0));
    }

    #[test]
    fn world_to_grid_mapping() {
        let dem = dem_with_hole();
        let probe = DemProbe::new(&dem, &mut SilentReporter).unwrap();

        assert_eq!(probe.row_col_from_xy(0.5, 4.5), (0, 0));
        assert_eq!(probe.row_col_from_xy(4.5, 0.5), (4, 4));
        assert_eq!(probe.sample_xy(2.5, 2.5), -32768.0);
        assert_eq!(probe.sample_xy(0.5, 0.5), 10.0);
    }

    #[test]
    fn projected_rasters_have_unit_multiplier() {
        let dem = dem_with_hole();
        assert_eq!(metric_distance_multiplier(&dem), 1.0);
    }

    #[test]
    fn geographic_multiplier_is_about_a_degree_length() {
        // 2° tall raster: conversion latitude is 1°N
        let mut dem: Raster<f64> = Raster::new(2, 2);
        dem.set_transform(GeoTransform::new(-64.0, 46.0, 1.0, -1.0));
        dem.set_units(XyUnits::Geographic);

        let mult = metric_distance_multiplier(&dem);
        assert!(
            (110_000.0..112_000.0).contains(&mult),
            "expected roughly one degree in meters, got {mult}"
        );
    }
}
