//! Path matrices for every source/receiver pair.

use ag_core::CMatrix;
use ag_core::timing::Timer;
use ag_setup::Axis;
use nalgebra::{DMatrix, Vector3};
use rayon::prelude::*;
use tracing::debug;

use crate::crossing::{ShearLayer, ShearPath};
use crate::dipole::dipole_transfer;
use crate::error::{ShearError, ShearResult};
use crate::newton::NewtonConfig;

/// Frequency-independent refracted paths, receivers along rows and sources
/// along columns.
#[derive(Debug, Clone)]
pub struct ShearLayerPaths {
    layer: ShearLayer,
    paths: DMatrix<ShearPath>,
}

impl ShearLayerPaths {
    pub fn layer(&self) -> &ShearLayer {
        &self.layer
    }

    pub fn num_receivers(&self) -> usize {
        self.paths.nrows()
    }

    pub fn num_sources(&self) -> usize {
        self.paths.ncols()
    }

    pub fn path(&self, receiver: usize, source: usize) -> &ShearPath {
        &self.paths[(receiver, source)]
    }

    pub fn paths(&self) -> &DMatrix<ShearPath> {
        &self.paths
    }

    pub fn travel_times(&self) -> DMatrix<f64> {
        self.paths.map(|p| p.travel_time)
    }

    pub fn crossing_points(&self) -> DMatrix<Vector3<f64>> {
        self.paths.map(|p| p.crossing)
    }

    /// Dipole transfer matrix at acoustic wavenumber `k0`.
    pub fn dipole_transfer(&self, k0: f64, axis: Axis) -> CMatrix {
        dipole_transfer(self, k0, axis)
    }
}

/// Solves the crossing point for every (receiver, source) pair, in
/// parallel over receivers.
///
/// All sources must lie on one side of the layer and all receivers on the
/// other. When several pairs fail, the error of the lowest receiver index
/// (then source index) is returned.
pub fn propagate(
    sources: &[Vector3<f64>],
    receivers: &[Vector3<f64>],
    layer: &ShearLayer,
    config: &NewtonConfig,
) -> ShearResult<ShearLayerPaths> {
    if sources.is_empty() || receivers.is_empty() {
        return Err(ShearError::Configuration {
            what: format!(
                "need at least one source and one receiver, got {} and {}",
                sources.len(),
                receivers.len()
            ),
        });
    }

    let timer = Timer::start("shear_layer_paths");
    let rows: Vec<ShearResult<Vec<ShearPath>>> = receivers
        .par_iter()
        .enumerate()
        .map(|(m, receiver)| {
            sources
                .iter()
                .enumerate()
                .map(|(n, source)| {
                    layer
                        .path(source, receiver, config)
                        .map_err(|e| e.at_pair(n, m))
                })
                .collect()
        })
        .collect();

    let mut flat = Vec::with_capacity(receivers.len() * sources.len());
    for row in rows {
        flat.extend(row?);
    }
    let paths = DMatrix::from_row_iterator(receivers.len(), sources.len(), flat);

    let max_iterations = paths.iter().map(|p| p.iterations).max().unwrap_or(0);
    debug!(
        receivers = receivers.len(),
        sources = sources.len(),
        max_iterations,
        "shear-layer paths solved"
    );
    timer.stop_and_log();

    Ok(ShearLayerPaths {
        layer: *layer,
        paths,
    })
}
