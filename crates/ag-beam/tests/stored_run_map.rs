use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ag_beam::{Beamer, level_grid};
use ag_core::{C64, CMatrix, c64, m};
use ag_results::{RunConfiguration, RunReader, RunWriter};
use ag_setup::{AirfoilGeometry, FlowConfiguration, FlowInputs, MicrophoneArray, ScanGrid};
use nalgebra::Vector3;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn array() -> MicrophoneArray {
    let positions = (0..16)
        .map(|i| {
            let r = 0.1 + 0.04 * i as f64;
            let phi = 2.399_963 * i as f64;
            Vector3::new(r * phi.cos(), r * phi.sin(), -1.0)
        })
        .collect();
    MicrophoneArray::new("spiral", positions).unwrap()
}

/// Unit-norm phase vectors for every scan point.
fn phase_steering(grid: &ScanGrid, mics: &MicrophoneArray, k0: f64) -> CMatrix {
    let scale = 1.0 / (mics.num_mics() as f64).sqrt();
    CMatrix::from_fn(mics.num_mics(), grid.len(), |i, n| {
        let r = (mics.positions()[i] - grid.points()[n]).norm();
        C64::from_polar(scale, -k0 * r)
    })
}

#[test]
fn stored_point_source_is_located() {
    let flow = FlowConfiguration::new(FlowInputs::default()).unwrap();
    let airfoil = AirfoilGeometry::new(m(0.075), m(0.225), 4, 4).unwrap();
    let mics = array();
    let grid = ScanGrid::new([m(0.2), m(0.2)], [m(0.05), m(0.05)], m(0.0)).unwrap();
    let frequency = 4000.0;
    let k0 = 2.0 * std::f64::consts::PI * frequency / flow.c0();

    let w = phase_steering(&grid, &mics, k0);
    let source = grid.index(3, 1);
    let g = w.column(source).into_owned();
    let csm = (&g * g.adjoint()).map(|z| z * 2.0);

    let dir = unique_temp_dir("ag_beam_stored");
    let path = dir.join("run.jsonl");
    let mut writer = RunWriter::create(&path).unwrap();
    writer
        .write_configuration(&RunConfiguration::new(&flow, &airfoil, &mics, &grid))
        .unwrap();
    writer.start_run(&[frequency], "map").unwrap();
    writer.append_frequency_record(frequency, &csm, &w).unwrap();
    writer.seal().unwrap();

    let reader = RunReader::open(&path).unwrap();
    let record = reader.read_frequency_record(frequency).unwrap();
    let beamer = Beamer::new(
        frequency,
        record.csm_stack(),
        record.steering.clone(),
        Beamer::DEFAULT_BLOCK_SIZE,
        false,
        0.0,
    )
    .unwrap();

    let pressure = beamer.pressure(0).unwrap();
    assert!((pressure[source] - 2.0).abs() < 1e-9);
    let peak = (0..pressure.len())
        .max_by(|&a, &b| pressure[a].total_cmp(&pressure[b]))
        .unwrap();
    assert_eq!(peak, source);

    let levels = beamer.beamforming(3).unwrap();
    let stored_grid = reader.read_configuration().unwrap().grid.to_grid().unwrap();
    let map = level_grid(&levels, &stored_grid).unwrap();
    assert_eq!(map.shape(), (stored_grid.ny(), stored_grid.nx()));
    assert!((map[(1, 3)] - 93.979_400_086_720_38).abs() < 1e-9);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn diagonal_removal_on_incoherent_noise_is_zero() {
    let grid = ScanGrid::new([m(0.1), m(0.1)], [m(0.05), m(0.05)], m(0.0)).unwrap();
    let mics = array();
    let w = phase_steering(&grid, &mics, 50.0);
    let noise = CMatrix::from_diagonal_element(16, 16, c64(3.0, 0.0));
    let beamer = Beamer::new(
        2000.0,
        [CMatrix::zeros(16, 16), noise],
        w,
        Beamer::DEFAULT_BLOCK_SIZE,
        true,
        0.0,
    )
    .unwrap();
    let pressure = beamer.pressure(0).unwrap();
    assert!(pressure.iter().all(|p| p.abs() < 1e-12));
    assert!(beamer.beamforming(0).is_err());
}

#[test]
fn steering_rows_must_match_channels() {
    let result = Beamer::new(
        1000.0,
        [CMatrix::zeros(4, 4), CMatrix::identity(4, 4)],
        CMatrix::zeros(5, 9),
        128,
        false,
        0.0,
    );
    assert!(result.is_err());
}
