//! Per-run geometry and the per-frequency synthesis chain.

use ag_amiet::{
    FrequencyVars, KySampling, SpanwiseWavenumbers, TurbulenceModel, WeightedSourceCsm, source_csm,
};
use ag_core::CMatrix;
use ag_core::timing::Timer;
use ag_setup::{KySamplingDef, SimulationSetup, TurbulenceModelDef};
use ag_shear::{NewtonConfig, ShearLayer, ShearLayerPaths, propagate};
use tracing::debug;

use crate::csm::synthesize;
use crate::error::SynthResult;
use crate::steering::steering_filters;

/// Numerical knobs of the synthesis.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisConfig {
    pub turbulence: TurbulenceModel,
    pub ky_sampling: KySampling,
    pub newton: NewtonConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            turbulence: TurbulenceModel::VonKarman,
            ky_sampling: KySampling::default(),
            newton: NewtonConfig::default(),
        }
    }
}

impl SynthesisConfig {
    /// Model choices recorded in a compiled setup.
    pub fn from_setup(setup: &SimulationSetup) -> SynthResult<Self> {
        Ok(Self {
            turbulence: turbulence_model(setup.turbulence),
            ky_sampling: ky_sampling(&setup.ky_sampling)?,
            newton: NewtonConfig::default(),
        })
    }
}

fn turbulence_model(def: TurbulenceModelDef) -> TurbulenceModel {
    match def {
        TurbulenceModelDef::VonKarman => TurbulenceModel::VonKarman,
        TurbulenceModelDef::Liepmann => TurbulenceModel::Liepmann,
    }
}

fn ky_sampling(def: &KySamplingDef) -> SynthResult<KySampling> {
    Ok(KySampling::new(def.max_factor, def.oversample)?)
}

/// Frequency-independent refracted paths: airfoil panels to microphones
/// and scan points to microphones.
#[derive(Debug, Clone)]
pub struct ForwardGeometry {
    pub airfoil_paths: ShearLayerPaths,
    pub grid_paths: ShearLayerPaths,
}

impl ForwardGeometry {
    pub fn build(setup: &SimulationSetup, newton: &NewtonConfig) -> SynthResult<Self> {
        let layer = ShearLayer::from_flow(&setup.flow)?;
        let mics = setup.microphones.positions();
        let airfoil_paths = propagate(setup.airfoil.points(), mics, &layer, newton)?;
        let grid_paths = propagate(setup.grid.points(), mics, &layer, newton)?;
        Ok(Self {
            airfoil_paths,
            grid_paths,
        })
    }
}

/// Everything produced for one analysis frequency.
#[derive(Debug, Clone)]
pub struct FrequencyResult {
    pub frequency: f64,
    /// Microphone CSM (M × M)
    pub csm: CMatrix,
    /// Steering filters (M × N), one column per scan point
    pub steering: CMatrix,
    /// Number of spanwise gusts summed into the source CSM
    pub num_gusts: usize,
}

/// Source side of one frequency.
struct SourceStage {
    fvars: FrequencyVars,
    gusts: SpanwiseWavenumbers,
    weighted: WeightedSourceCsm,
}

/// Immutable synthesis context shared by all frequencies of a run.
#[derive(Debug)]
pub struct Synthesizer<'a> {
    setup: &'a SimulationSetup,
    config: SynthesisConfig,
    geometry: ForwardGeometry,
}

impl<'a> Synthesizer<'a> {
    /// Solves all shear-layer paths once.
    pub fn new(setup: &'a SimulationSetup, config: SynthesisConfig) -> SynthResult<Self> {
        let timer = Timer::start("forward_geometry");
        let geometry = ForwardGeometry::build(setup, &config.newton)?;
        timer.stop_and_log();
        Ok(Self {
            setup,
            config,
            geometry,
        })
    }

    pub fn setup(&self) -> &SimulationSetup {
        self.setup
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn geometry(&self) -> &ForwardGeometry {
        &self.geometry
    }

    /// Microphone CSM and steering filters at `frequency`. Errors carry the
    /// frequency.
    pub fn frequency(&self, frequency: f64) -> SynthResult<FrequencyResult> {
        let timer = Timer::start("frequency");
        let result = self
            .source_stage(frequency)
            .and_then(|stage| self.receiver_stage(stage))
            .map_err(|e| e.at_frequency(frequency))?;
        timer.stop_and_log();
        debug!(
            frequency,
            gusts = result.num_gusts,
            "frequency synthesised"
        );
        Ok(result)
    }

    fn source_stage(&self, frequency: f64) -> SynthResult<SourceStage> {
        let flow = &self.setup.flow;
        let airfoil = &self.setup.airfoil;
        let fvars = FrequencyVars::new(frequency, flow)?;
        let gusts = self.config.ky_sampling.sample(airfoil, &fvars);
        let weighted =
            source_csm(flow, airfoil, &fvars, &gusts, self.config.turbulence)?.area_weighted();
        Ok(SourceStage {
            fvars,
            gusts,
            weighted,
        })
    }

    fn receiver_stage(&self, stage: SourceStage) -> SynthResult<FrequencyResult> {
        let axis = self.setup.flow.dipole_axis();
        let k0 = stage.fvars.k0;

        let forward = self.geometry.airfoil_paths.dipole_transfer(k0, axis);
        let csm = synthesize(&stage.weighted, &forward)?;

        let grid_transfer = self.geometry.grid_paths.dipole_transfer(k0, axis);
        let steering = steering_filters(&grid_transfer)?;

        Ok(FrequencyResult {
            frequency: stage.fvars.frequency,
            csm,
            steering,
            num_gusts: stage.gusts.len(),
        })
    }
}
