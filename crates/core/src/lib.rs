//! # Thalweg Core
//!
//! Core types for the thalweg vector stream-network analysis engine.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type with georeferencing and nodata
//! - `GeoTransform`: Affine transformation between world and grid space
//! - `Feature`: Vector features over `geo-types` geometry
//! - `Reporter`: Progress reporting and cooperative cancellation
//! - The `Algorithm` trait for a consistent execution API

pub mod error;
pub mod raster;
pub mod report;
pub mod vector;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, XyUnits};
pub use report::{Reporter, SilentReporter};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, XyUnits};
    pub use crate::report::{Reporter, SilentReporter};
    pub use crate::vector::{Feature, FeatureCollection};
    pub use crate::Algorithm;
}

/// Core trait for analysis algorithms.
///
/// Algorithms are pure functions that transform input data according to
/// parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
