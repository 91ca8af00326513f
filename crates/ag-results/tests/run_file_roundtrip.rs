use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ag_core::{CMatrix, c64, m};
use ag_results::{ResultsError, RunConfiguration, RunReader, RunWriter};
use ag_setup::{AirfoilGeometry, FlowConfiguration, FlowInputs, MicrophoneArray, ScanGrid};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn configuration() -> RunConfiguration {
    let flow = FlowConfiguration::new(FlowInputs::default()).unwrap();
    let airfoil = AirfoilGeometry::new(m(0.075), m(0.225), 5, 5).unwrap();
    let mics = MicrophoneArray::from_rows(
        "square",
        &[
            vec![-0.5, 0.5, 0.5, -0.5],
            vec![-0.5, -0.5, 0.5, 0.5],
            vec![-1.0, -1.0, -1.0, -1.0],
        ],
    )
    .unwrap();
    let grid = ScanGrid::new([m(0.1), m(0.1)], [m(0.05), m(0.05)], m(0.0)).unwrap();
    RunConfiguration::new(&flow, &airfoil, &mics, &grid)
}

fn csm(seed: f64) -> CMatrix {
    CMatrix::from_fn(4, 4, |i, j| {
        if i == j {
            c64(seed + i as f64, 0.0)
        } else {
            c64(0.1 * seed / (1 + i + j) as f64, 0.01 * (i as f64 - j as f64))
        }
    })
}

fn steering(seed: f64) -> CMatrix {
    CMatrix::from_fn(4, 9, |i, j| c64(seed * (i + 1) as f64 / 3.0, -(j as f64) / 7.0))
}

fn write_run(path: &std::path::Path, frequencies: &[f64]) -> RunWriter {
    let mut writer = RunWriter::create(path).expect("failed to create run");
    writer
        .write_configuration(&configuration())
        .expect("failed to write configuration");
    writer
        .start_run(frequencies, "abc123")
        .expect("failed to start run");
    for (i, f) in frequencies.iter().enumerate() {
        writer
            .append_frequency_record(*f, &csm(i as f64 + 1.0), &steering(*f / 1000.0))
            .expect("failed to append record");
    }
    writer
}

#[test]
fn two_frequency_roundtrip() {
    let dir = unique_temp_dir("ag_results_roundtrip");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[1000.0, 2000.0]);
    writer.seal().expect("failed to seal");

    let reader = RunReader::open(&path).expect("failed to open run");
    assert!(reader.is_sealed());
    assert_eq!(reader.list_frequencies(), vec![1000.0, 2000.0]);
    assert_eq!(reader.planned_frequencies(), &[1000.0, 2000.0]);

    for (i, f) in reader.list_frequencies().into_iter().enumerate() {
        let record = reader.read_frequency_record(f).expect("record missing");
        assert_eq!(record.index, i);
        assert_eq!(record.frequency, f);
        assert_eq!(record.csm, csm(i as f64 + 1.0));
        assert_eq!(record.steering, steering(f / 1000.0));
        let [zeros, actual] = record.csm_stack();
        assert!(zeros.iter().all(|z| z.norm() == 0.0));
        assert_eq!(actual, record.csm);
    }

    let config = reader.read_configuration().expect("configuration missing");
    assert_eq!(config, configuration());
    let info = reader.run_info().expect("run data missing");
    assert_eq!(info.fingerprint, "abc123");
    assert!(info.end_time.is_some());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn exact_lookup_misses_nearby_frequency() {
    let dir = unique_temp_dir("ag_results_exact");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[1000.0]);
    writer.seal().expect("failed to seal");

    let reader = RunReader::open(&path).expect("failed to open run");
    let err = reader.read_frequency_record(1000.0001).unwrap_err();
    assert!(matches!(err, ResultsError::FrequencyNotFound { .. }));
    assert!(err.is_not_found());

    let near = reader
        .read_frequency_record_within(1000.0001, 0.01)
        .expect("tolerant lookup failed");
    assert_eq!(near.frequency, 1000.0);
    assert!(reader.read_frequency_record_within(1001.0, 0.5).is_err());

    assert_eq!(
        reader.read_frequency_record_by_index(0).unwrap().frequency,
        1000.0
    );
    assert!(matches!(
        reader.read_frequency_record_by_index(1),
        Err(ResultsError::IndexOutOfRange { index: 1, len: 1 })
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn duplicate_frequency_rejected() {
    let dir = unique_temp_dir("ag_results_duplicate");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[1000.0]);
    let err = writer
        .append_frequency_record(1000.0, &csm(9.0), &steering(1.0))
        .unwrap_err();
    assert!(matches!(err, ResultsError::DuplicateFrequency { .. }));
    assert_eq!(writer.written_frequencies(), &[1000.0]);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn non_finite_record_rejected_and_run_stays_readable() {
    let dir = unique_temp_dir("ag_results_non_finite");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[1000.0]);

    let mut bad_csm = csm(2.0);
    bad_csm[(1, 2)] = c64(f64::NAN, 0.0);
    let err = writer
        .append_frequency_record(2000.0, &bad_csm, &steering(2.0))
        .unwrap_err();
    assert!(matches!(err, ResultsError::NonFinite { frequency, .. } if frequency == 2000.0));

    let mut bad_steering = steering(3.0);
    bad_steering[(0, 4)] = c64(0.0, f64::NEG_INFINITY);
    assert!(matches!(
        writer.append_frequency_record(3000.0, &csm(3.0), &bad_steering),
        Err(ResultsError::NonFinite { .. })
    ));
    assert!(matches!(
        writer.append_frequency_record(f64::INFINITY, &csm(4.0), &steering(4.0)),
        Err(ResultsError::NonFinite { .. })
    ));
    assert!(!err.is_not_found());
    assert_eq!(writer.written_frequencies(), &[1000.0]);

    let reader = RunReader::open(&path).expect("partial run should open");
    assert_eq!(reader.list_frequencies(), vec![1000.0]);
    let record = reader.read_frequency_record(1000.0).expect("record missing");
    assert_eq!(record.csm, csm(1.0));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn non_finite_planned_frequency_rejected() {
    let dir = unique_temp_dir("ag_results_planned_nan");
    let path = dir.join("run.jsonl");
    let mut writer = RunWriter::create(&path).expect("failed to create run");
    writer
        .write_configuration(&configuration())
        .expect("failed to write configuration");
    assert!(matches!(
        writer.start_run(&[1000.0, f64::NAN], "abc123"),
        Err(ResultsError::NonFinite { .. })
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn sealed_run_rejects_writes() {
    let dir = unique_temp_dir("ag_results_sealed");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[500.0]);
    writer.seal().expect("failed to seal");
    assert!(writer.is_sealed());

    let err = writer
        .append_frequency_record(600.0, &csm(1.0), &steering(1.0))
        .unwrap_err();
    assert!(matches!(err, ResultsError::Sealed { .. }));
    assert!(matches!(writer.seal(), Err(ResultsError::Sealed { .. })));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn write_order_enforced() {
    let dir = unique_temp_dir("ag_results_order");
    let path = dir.join("run.jsonl");
    let mut writer = RunWriter::create(&path).expect("failed to create run");
    assert!(matches!(
        writer.start_run(&[1.0], ""),
        Err(ResultsError::InvalidState { .. })
    ));
    writer.write_configuration(&configuration()).unwrap();
    assert!(matches!(
        writer.write_configuration(&configuration()),
        Err(ResultsError::InvalidState { .. })
    ));
    assert!(matches!(
        writer.append_frequency_record(1.0, &csm(1.0), &steering(1.0)),
        Err(ResultsError::InvalidState { .. })
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn shapes_checked_on_append() {
    let dir = unique_temp_dir("ag_results_shapes");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[]);
    let bad_csm = CMatrix::zeros(3, 3);
    assert!(matches!(
        writer.append_frequency_record(1.0, &bad_csm, &steering(1.0)),
        Err(ResultsError::Shape { .. })
    ));
    let bad_steering = CMatrix::zeros(4, 8);
    assert!(matches!(
        writer.append_frequency_record(1.0, &csm(1.0), &bad_steering),
        Err(ResultsError::Shape { .. })
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn create_truncates_existing_file() {
    let dir = unique_temp_dir("ag_results_truncate");
    let path = dir.join("run.jsonl");
    let mut writer = write_run(&path, &[1000.0, 2000.0]);
    writer.seal().unwrap();
    drop(writer);

    let writer = write_run(&path, &[3000.0]);
    drop(writer);
    let reader = RunReader::open(&path).expect("failed to open run");
    assert_eq!(reader.list_frequencies(), vec![3000.0]);
    assert!(!reader.is_sealed());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn partial_run_readable_after_interrupted_append() {
    let dir = unique_temp_dir("ag_results_partial");
    let path = dir.join("run.jsonl");
    let writer = write_run(&path, &[1000.0, 2000.0]);
    drop(writer);

    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"group":"Frequency data/freq","index":2,"freq"#)
        .unwrap();
    drop(file);

    let reader = RunReader::open(&path).expect("partial run should open");
    assert!(!reader.is_sealed());
    assert_eq!(reader.list_frequencies(), vec![1000.0, 2000.0]);
    assert!(reader.run_info().unwrap().end_time.is_none());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_run_is_not_found() {
    let path = unique_temp_dir("ag_results_missing").join("nothing.jsonl");
    let err = RunReader::open(&path).unwrap_err();
    assert!(matches!(err, ResultsError::RunNotFound { .. }));
}
