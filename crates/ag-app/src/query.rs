//! Read-back helpers over stored runs.

use ag_beam::{Beamer, level_grid};
use ag_results::{FrequencyRecord, RunReader};
use nalgebra::DMatrix;

use crate::error::AppResult;

/// Metadata and shape of a stored run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub fingerprint: String,
    pub mic_array: String,
    pub num_mics: usize,
    pub num_scan_points: usize,
    /// Stored frequencies in append order
    pub frequencies: Vec<f64>,
    pub planned_frequencies: Vec<f64>,
}

impl RunSummary {
    /// Every planned frequency was stored and the run was sealed.
    pub fn is_complete(&self) -> bool {
        self.end_time.is_some() && self.frequencies.len() == self.planned_frequencies.len()
    }
}

pub fn get_run_summary(reader: &RunReader) -> AppResult<RunSummary> {
    let info = reader.run_info()?;
    let config = reader.read_configuration()?;
    Ok(RunSummary {
        date: info.date,
        start_time: info.start_time,
        end_time: info.end_time,
        fingerprint: info.fingerprint,
        mic_array: config.mic_array.file_name.clone(),
        num_mics: config.num_mics(),
        num_scan_points: config.grid.to_grid()?.len(),
        frequencies: reader.list_frequencies(),
        planned_frequencies: reader.planned_frequencies().to_vec(),
    })
}

/// Exact-match lookup, or the nearest record within `tolerance` Hz.
pub fn read_record(
    reader: &RunReader,
    frequency: f64,
    tolerance: Option<f64>,
) -> AppResult<FrequencyRecord> {
    let record = match tolerance {
        Some(tol) => reader.read_frequency_record_within(frequency, tol)?,
        None => reader.read_frequency_record(frequency)?,
    };
    Ok(record)
}

/// Delay-and-sum settings for [`beam_map`].
#[derive(Debug, Clone, Copy)]
pub struct BeamOptions {
    /// Band width selector: 0 single line, 1 octave, 3 third-octave
    pub band: u32,
    pub remove_diag: bool,
    /// Calibration offset added to the normalised levels, in dB
    pub modifier: f64,
    pub block_size: usize,
    pub tolerance: Option<f64>,
}

impl Default for BeamOptions {
    fn default() -> Self {
        Self {
            band: 0,
            remove_diag: false,
            modifier: 0.0,
            block_size: Beamer::DEFAULT_BLOCK_SIZE,
            tolerance: None,
        }
    }
}

/// Level map (ny × nx) of a stored frequency on the run's scan grid.
pub fn beam_map(
    reader: &RunReader,
    frequency: f64,
    options: &BeamOptions,
) -> AppResult<DMatrix<f64>> {
    let record = read_record(reader, frequency, options.tolerance)?;
    let grid = reader.read_configuration()?.grid.to_grid()?;
    let stack = record.csm_stack();
    let beamer = Beamer::new(
        record.frequency,
        stack,
        record.steering,
        options.block_size,
        options.remove_diag,
        options.modifier,
    )?;
    let levels = beamer.beamforming(options.band)?;
    Ok(level_grid(&levels, &grid)?)
}
