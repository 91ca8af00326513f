//! Run execution and caching service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ag_results::{RunConfiguration, RunReader, RunWriter, compute_fingerprint};
use ag_setup::{SimulationDef, compile_simulation};
use ag_synth::{FrequencyResult, SynthResult, SynthesisConfig, Synthesizer};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::progress::{FrequencyProgress, RunProgressEvent, RunStage};

pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
    /// Frequencies synthesised concurrently per batch; `None` or 1 runs
    /// them one at a time. Appends always follow the frequency order.
    pub parallel_batch: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: SOLVER_VERSION.to_string(),
            parallel_batch: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub def: &'a SimulationDef,
    /// Directory relative microphone files resolve against
    pub base_dir: &'a Path,
    pub out_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub geometry_time_s: f64,
    pub synth_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub path: PathBuf,
    pub fingerprint: String,
    pub frequencies: Vec<f64>,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    frequency: Option<FrequencyProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            frequency,
        });
    }
}

/// Execute or reuse a run.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or reuse a run and stream progress events.
///
/// The first failing frequency aborts the run. Records appended before the
/// failure stay in the (unsealed) run file.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::Compiling,
        started,
        Some("Compiling simulation".to_string()),
        None,
    );
    let compile_start = Instant::now();
    let setup = compile_simulation(request.def, request.base_dir)?;
    let config = SynthesisConfig::from_setup(&setup)?;
    let run_config = RunConfiguration::new(
        &setup.flow,
        &setup.airfoil,
        &setup.microphones,
        &setup.grid,
    );
    let fingerprint = compute_fingerprint(
        request.def,
        &run_config,
        &setup.frequencies,
        &request.options.solver_version,
    );
    timing.compile_time_s = compile_start.elapsed().as_secs_f64();

    if request.options.use_cache {
        emit_progress(
            &mut progress_cb,
            RunStage::CheckingCache,
            started,
            Some("Checking run cache".to_string()),
            None,
        );
        if let Some(frequencies) = cached_run(request.out_path, &fingerprint) {
            emit_progress(
                &mut progress_cb,
                RunStage::LoadingCachedResult,
                started,
                Some("Reusing sealed run".to_string()),
                None,
            );
            timing.load_cache_time_s = started.elapsed().as_secs_f64() - timing.compile_time_s;
            timing.total_time_s = started.elapsed().as_secs_f64();
            info!(path = %request.out_path.display(), "reusing cached run");
            return Ok(RunResponse {
                path: request.out_path.to_path_buf(),
                fingerprint,
                frequencies,
                loaded_from_cache: true,
                timing,
            });
        }
    }

    emit_progress(
        &mut progress_cb,
        RunStage::BuildingGeometry,
        started,
        Some("Solving shear-layer paths".to_string()),
        None,
    );
    let geometry_start = Instant::now();
    let synth = Synthesizer::new(&setup, config)?;
    timing.geometry_time_s = geometry_start.elapsed().as_secs_f64();

    info!(
        name = %setup.name,
        mics = setup.microphones.num_mics(),
        scan_points = setup.grid.len(),
        frequencies = setup.frequencies.len(),
        "starting run"
    );

    let mut writer = RunWriter::create(request.out_path)?;
    writer.write_configuration(&run_config)?;
    writer.start_run(&setup.frequencies, &fingerprint)?;

    let count = setup.frequencies.len();
    let batch = request.options.parallel_batch.unwrap_or(1).max(1);
    let mut index = 0;
    for chunk in setup.frequencies.chunks(batch) {
        let synth_start = Instant::now();
        let results: Vec<SynthResult<FrequencyResult>> = if chunk.len() > 1 {
            chunk.par_iter().map(|f| synth.frequency(*f)).collect()
        } else {
            chunk.iter().map(|f| synth.frequency(*f)).collect()
        };
        timing.synth_time_s += synth_start.elapsed().as_secs_f64();

        for result in results {
            let result = result?;
            let progress = FrequencyProgress {
                index,
                count,
                frequency_hz: result.frequency,
            };
            emit_progress(
                &mut progress_cb,
                RunStage::Synthesizing,
                started,
                Some(format!("{} Hz ({}/{})", result.frequency, index + 1, count)),
                Some(progress),
            );

            let save_start = Instant::now();
            writer.append_frequency_record(result.frequency, &result.csm, &result.steering)?;
            timing.save_time_s += save_start.elapsed().as_secs_f64();
            info!(
                frequency = result.frequency,
                index,
                count,
                gusts = result.num_gusts,
                "frequency stored"
            );
            index += 1;
        }
    }

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Sealing run".to_string()),
        None,
    );
    writer.seal()?;

    timing.total_time_s = started.elapsed().as_secs_f64();
    debug!(
        compile_s = timing.compile_time_s,
        geometry_s = timing.geometry_time_s,
        synth_s = timing.synth_time_s,
        save_s = timing.save_time_s,
        total_s = timing.total_time_s,
        "run timing"
    );
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run complete".to_string()),
        None,
    );

    Ok(RunResponse {
        path: request.out_path.to_path_buf(),
        fingerprint,
        frequencies: writer.written_frequencies().to_vec(),
        loaded_from_cache: false,
        timing,
    })
}

/// Frequencies of a sealed run at `path` carrying `fingerprint`.
fn cached_run(path: &Path, fingerprint: &str) -> Option<Vec<f64>> {
    let reader = match RunReader::open(path) {
        Ok(reader) => reader,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no reusable run");
            return None;
        }
    };
    if !reader.is_sealed() {
        debug!(path = %path.display(), "existing run is not sealed");
        return None;
    }
    match reader.run_info() {
        Ok(info) if info.fingerprint == fingerprint => Some(reader.list_frequencies()),
        _ => None,
    }
}

/// Open a stored run for reading.
pub fn load_run(path: &Path) -> AppResult<RunReader> {
    Ok(RunReader::open(path)?)
}
