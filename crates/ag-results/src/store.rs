//! Run writer session.

use ag_core::{CMatrix, ensure_finite, ensure_finite_matrix};
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::array::ComplexArray;
use crate::types::{
    Entry, FrequencyDataGroup, FrequencyRecordGroup, Header, RunConfiguration, RunDataGroup,
    RunEndGroup,
};
use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Created,
    Configured,
    Started,
    Sealed,
}

/// Open write session on one run file.
///
/// Groups must be written in order: configuration, run start, frequency
/// records, seal. Every group is flushed as soon as it is written.
#[derive(Debug)]
pub struct RunWriter {
    path: PathBuf,
    out: BufWriter<File>,
    state: WriterState,
    num_mics: usize,
    num_scan_points: usize,
    written: Vec<f64>,
}

impl RunWriter {
    /// Creates an empty run at `path`, replacing any existing file.
    pub fn create(path: &Path) -> ResultsResult<Self> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        let mut writer = Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            state: WriterState::Created,
            num_mics: 0,
            num_scan_points: 0,
            written: Vec::new(),
        };
        writer.write_entry(&Entry::Header(Header::default()))?;
        debug!(path = %path.display(), "run file created");
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_sealed(&self) -> bool {
        self.state == WriterState::Sealed
    }

    /// Frequencies appended so far, in append order.
    pub fn written_frequencies(&self) -> &[f64] {
        &self.written
    }

    fn write_entry(&mut self, entry: &Entry) -> ResultsResult<()> {
        serde_json::to_writer(&mut self.out, entry)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn expect_state(&self, expected: WriterState, action: &str) -> ResultsResult<()> {
        if self.state == WriterState::Sealed {
            return Err(ResultsError::Sealed {
                path: self.path.clone(),
            });
        }
        if self.state != expected {
            return Err(ResultsError::InvalidState {
                what: format!("cannot {action} in state {:?}", self.state),
            });
        }
        Ok(())
    }

    /// Writes the run-level groups. Allowed once, before the run starts.
    pub fn write_configuration(&mut self, config: &RunConfiguration) -> ResultsResult<()> {
        self.expect_state(WriterState::Created, "write configuration")?;
        let num_scan_points = config.grid.to_grid()?.len();
        self.write_entry(&Entry::TestSetup(config.test_setup.clone()))?;
        self.write_entry(&Entry::AirfoilGeom(config.airfoil.clone()))?;
        self.write_entry(&Entry::GridInfo(config.grid.clone()))?;
        self.write_entry(&Entry::MicrophoneArray(config.mic_array.clone()))?;

        self.num_mics = config.num_mics();
        self.num_scan_points = num_scan_points;
        self.state = WriterState::Configured;
        Ok(())
    }

    /// Writes the run start (date, start time, fingerprint) and the planned
    /// frequency list.
    pub fn start_run(&mut self, frequencies: &[f64], fingerprint: &str) -> ResultsResult<()> {
        self.expect_state(WriterState::Configured, "start run")?;
        for &f in frequencies {
            ensure_finite(f, "planned frequency")
                .map_err(|source| ResultsError::NonFinite { frequency: f, source })?;
        }
        let now = Local::now();
        self.write_entry(&Entry::RunData(RunDataGroup {
            date: now.format("%d/%m/%Y").to_string(),
            start_time: now.format("%H:%M:%S").to_string(),
            fingerprint: fingerprint.to_string(),
        }))?;
        self.write_entry(&Entry::FrequencyData(FrequencyDataGroup {
            frequencies: frequencies.to_vec(),
        }))?;
        self.state = WriterState::Started;
        Ok(())
    }

    /// Appends one frequency record. A frequency already present in the
    /// run, or any non-finite value, is rejected before anything is written.
    pub fn append_frequency_record(
        &mut self,
        frequency: f64,
        csm: &CMatrix,
        steering: &CMatrix,
    ) -> ResultsResult<()> {
        self.expect_state(WriterState::Started, "append frequency record")?;
        ensure_finite(frequency, "frequency")
            .and_then(|_| ensure_finite_matrix(csm, "CSM"))
            .and_then(|_| ensure_finite_matrix(steering, "steering vector"))
            .map_err(|source| ResultsError::NonFinite { frequency, source })?;
        if self.written.contains(&frequency) {
            return Err(ResultsError::DuplicateFrequency { frequency });
        }
        let m = self.num_mics;
        if csm.shape() != (m, m) {
            return Err(ResultsError::Shape {
                what: "CSM",
                expected: vec![m, m],
                got: vec![csm.nrows(), csm.ncols()],
            });
        }
        if steering.shape() != (m, self.num_scan_points) {
            return Err(ResultsError::Shape {
                what: "steering vector",
                expected: vec![m, self.num_scan_points],
                got: vec![steering.nrows(), steering.ncols()],
            });
        }

        let index = self.written.len();
        self.write_entry(&Entry::FrequencyRecord(FrequencyRecordGroup {
            index,
            frequency,
            steering_vector: ComplexArray::from_matrix(steering),
            csm: ComplexArray::csm_stack(csm),
        }))?;
        self.written.push(frequency);
        debug!(index, frequency, "frequency record appended");
        Ok(())
    }

    /// Writes the end time. No further writes are accepted.
    pub fn seal(&mut self) -> ResultsResult<()> {
        self.expect_state(WriterState::Started, "seal run")?;
        let end_time = Local::now().format("%H:%M:%S").to_string();
        self.write_entry(&Entry::RunEnd(RunEndGroup { end_time }))?;
        self.state = WriterState::Sealed;
        debug!(path = %self.path.display(), records = self.written.len(), "run sealed");
        Ok(())
    }
}
