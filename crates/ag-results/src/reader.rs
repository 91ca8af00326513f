//! Read access to a run file.

use ag_core::CMatrix;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::types::{
    AirfoilGroup, Entry, FORMAT_NAME, FORMAT_VERSION, GridInfoGroup, MicArrayGroup,
    RunConfiguration, RunDataGroup, TestSetupGroup,
};
use crate::{ResultsError, ResultsResult};

const RECORD_GROUP: &str = "Frequency data/freq";

/// Results for one stored frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRecord {
    pub index: usize,
    pub frequency: f64,
    /// Microphone CSM (M × M)
    pub csm: CMatrix,
    /// Steering filters (M × N)
    pub steering: CMatrix,
}

impl FrequencyRecord {
    /// Two-bin CSM stack as stored: an all-zero bin followed by the CSM.
    pub fn csm_stack(&self) -> [CMatrix; 2] {
        let m = self.csm.nrows();
        [CMatrix::zeros(m, m), self.csm.clone()]
    }
}

/// Run timestamps and cache fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub date: String,
    pub start_time: String,
    /// `None` until the run is sealed
    pub end_time: Option<String>,
    pub fingerprint: String,
}

#[derive(Deserialize)]
struct EntryTag {
    group: String,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    frequency: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct RecordLocation {
    line: usize,
    frequency: f64,
    offset: u64,
    len: usize,
}

/// Indexed view of a run file. Frequency records are loaded on demand.
#[derive(Debug)]
pub struct RunReader {
    path: PathBuf,
    test_setup: Option<TestSetupGroup>,
    airfoil: Option<AirfoilGroup>,
    grid: Option<GridInfoGroup>,
    mic_array: Option<MicArrayGroup>,
    run_data: Option<RunDataGroup>,
    planned: Vec<f64>,
    records: Vec<RecordLocation>,
    end_time: Option<String>,
}

impl RunReader {
    pub fn open(path: &Path) -> ResultsResult<Self> {
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                path: path.to_path_buf(),
            });
        }
        let mut reader = BufReader::new(File::open(path)?);
        let mut run = Self {
            path: path.to_path_buf(),
            test_setup: None,
            airfoil: None,
            grid: None,
            mic_array: None,
            run_data: None,
            planned: Vec::new(),
            records: Vec::new(),
            end_time: None,
        };

        let mut line = String::new();
        let mut offset: u64 = 0;
        let mut line_no = 0;
        loop {
            line.clear();
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            line_no += 1;
            let start = offset;
            offset += n as u64;
            let terminated = line.ends_with('\n');
            let text = line.trim_end();
            if text.is_empty() {
                continue;
            }

            match run.index_line(text, line_no, start) {
                Ok(()) => {}
                Err(err) if !terminated => {
                    // interrupted append
                    warn!(path = %path.display(), line = line_no, "ignoring incomplete last line: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        if line_no == 0 {
            return Err(ResultsError::Corrupt {
                line: 1,
                reason: "empty run file".to_string(),
            });
        }
        Ok(run)
    }

    fn index_line(&mut self, text: &str, line_no: usize, offset: u64) -> ResultsResult<()> {
        let corrupt = |reason: String| ResultsError::Corrupt {
            line: line_no,
            reason,
        };
        let tag: EntryTag = serde_json::from_str(text).map_err(|e| corrupt(e.to_string()))?;

        if line_no == 1 && tag.group != "Header" {
            return Err(corrupt("missing header".to_string()));
        }

        if tag.group == RECORD_GROUP {
            let (Some(_), Some(frequency)) = (tag.index, tag.frequency) else {
                return Err(corrupt("frequency record without index or frequency".to_string()));
            };
            self.records.push(RecordLocation {
                line: line_no,
                frequency,
                offset,
                len: text.len(),
            });
            return Ok(());
        }

        let entry: Entry = serde_json::from_str(text).map_err(|e| corrupt(e.to_string()))?;
        match entry {
            Entry::Header(h) => {
                if h.format != FORMAT_NAME || h.version > FORMAT_VERSION {
                    return Err(corrupt(format!(
                        "unsupported format {} v{}",
                        h.format, h.version
                    )));
                }
            }
            Entry::TestSetup(g) => self.test_setup = Some(g),
            Entry::AirfoilGeom(g) => self.airfoil = Some(g),
            Entry::GridInfo(g) => self.grid = Some(g),
            Entry::MicrophoneArray(g) => self.mic_array = Some(g),
            Entry::RunData(g) => self.run_data = Some(g),
            Entry::FrequencyData(g) => self.planned = g.frequencies,
            Entry::RunEnd(g) => self.end_time = Some(g.end_time),
            Entry::FrequencyRecord(_) => {}
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_sealed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Frequencies of the stored records, in append order.
    pub fn list_frequencies(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.frequency).collect()
    }

    /// Frequencies the run was started with.
    pub fn planned_frequencies(&self) -> &[f64] {
        &self.planned
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn read_configuration(&self) -> ResultsResult<RunConfiguration> {
        Ok(RunConfiguration {
            test_setup: self
                .test_setup
                .clone()
                .ok_or(ResultsError::MissingGroup { group: "TestSetup" })?,
            airfoil: self
                .airfoil
                .clone()
                .ok_or(ResultsError::MissingGroup {
                    group: "AirfoilGeom",
                })?,
            grid: self
                .grid
                .clone()
                .ok_or(ResultsError::MissingGroup { group: "Grid info" })?,
            mic_array: self.mic_array.clone().ok_or(ResultsError::MissingGroup {
                group: "Microphone array",
            })?,
        })
    }

    pub fn run_info(&self) -> ResultsResult<RunInfo> {
        let data = self
            .run_data
            .as_ref()
            .ok_or(ResultsError::MissingGroup { group: "Run data" })?;
        Ok(RunInfo {
            date: data.date.clone(),
            start_time: data.start_time.clone(),
            end_time: self.end_time.clone(),
            fingerprint: data.fingerprint.clone(),
        })
    }

    /// Record whose stored frequency equals `frequency` exactly.
    pub fn read_frequency_record(&self, frequency: f64) -> ResultsResult<FrequencyRecord> {
        let loc = self
            .records
            .iter()
            .find(|r| r.frequency == frequency)
            .ok_or(ResultsError::FrequencyNotFound { frequency })?;
        self.load(loc)
    }

    /// Record closest to `frequency`, provided it lies within `tolerance` Hz.
    pub fn read_frequency_record_within(
        &self,
        frequency: f64,
        tolerance: f64,
    ) -> ResultsResult<FrequencyRecord> {
        let loc = self
            .records
            .iter()
            .filter(|r| (r.frequency - frequency).abs() <= tolerance)
            .min_by(|a, b| {
                (a.frequency - frequency)
                    .abs()
                    .total_cmp(&(b.frequency - frequency).abs())
            })
            .ok_or(ResultsError::FrequencyNotFound { frequency })?;
        self.load(loc)
    }

    /// Record in append position `index`.
    pub fn read_frequency_record_by_index(&self, index: usize) -> ResultsResult<FrequencyRecord> {
        let loc = self
            .records
            .get(index)
            .ok_or(ResultsError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })?;
        self.load(loc)
    }

    fn load(&self, loc: &RecordLocation) -> ResultsResult<FrequencyRecord> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(loc.offset))?;
        let mut buf = vec![0u8; loc.len];
        file.read_exact(&mut buf)?;

        let Entry::FrequencyRecord(group) = serde_json::from_slice::<Entry>(&buf)? else {
            return Err(ResultsError::Corrupt {
                line: loc.line,
                reason: "indexed line is not a frequency record".to_string(),
            });
        };
        let csm = group.csm.csm_from_stack()?;
        let steering = group.steering_vector.to_matrix("steering vector")?;
        if steering.nrows() != csm.nrows() {
            return Err(ResultsError::Shape {
                what: "steering vector",
                expected: vec![csm.nrows(), steering.ncols()],
                got: vec![steering.nrows(), steering.ncols()],
            });
        }
        Ok(FrequencyRecord {
            index: group.index,
            frequency: group.frequency,
            csm,
            steering,
        })
    }
}
