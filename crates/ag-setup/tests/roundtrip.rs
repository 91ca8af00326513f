use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ag_setup::mic_xml::save_mic_xml;
use ag_setup::{
    GridDef, MicrophoneArray, MicrophonesDef, SetupError, SimulationDef, compile_simulation,
    load_json, load_yaml, save_json, save_yaml,
};
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

#[test]
fn roundtrip_yaml_example() {
    let dir = unique_temp_dir("ag_setup_yaml");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sim.yaml");

    let def = SimulationDef::example();
    save_yaml(&path, &def).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(def, loaded);
}

#[test]
fn roundtrip_json_example() {
    let dir = unique_temp_dir("ag_setup_json");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sim.json");

    let def = SimulationDef::example();
    save_json(&path, &def).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(def, loaded);
}

#[test]
fn unsupported_grid_fails_at_load_time() {
    let dir = unique_temp_dir("ag_setup_grid");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sim.yaml");

    let mut yaml = serde_yaml::to_string(&SimulationDef::example()).unwrap();
    yaml = yaml.replace("type: rect", "type: hexagonal");
    fs::write(&path, yaml).unwrap();

    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(err, SetupError::Validation(_)), "{err}");
}

#[test]
fn xml_microphones_resolve_relative_to_base_dir() {
    let dir = unique_temp_dir("ag_setup_xml");
    fs::create_dir_all(&dir).unwrap();

    let array = MicrophoneArray::new(
        "ring",
        vec![
            Vector3::new(0.3, 0.0, -0.8),
            Vector3::new(0.0, 0.3, -0.8),
            Vector3::new(-0.3, 0.0, -0.8),
        ],
    )
    .unwrap();
    save_mic_xml(&dir.join("ring.xml"), &array).unwrap();

    let mut def = SimulationDef::example();
    def.microphones = MicrophonesDef::XmlFile {
        path: PathBuf::from("ring.xml"),
        standoff_m: Some(-0.49),
    };
    let setup = compile_simulation(&def, &dir).unwrap();

    assert_eq!(setup.microphones.name(), "ring");
    assert_eq!(setup.microphones.num_mics(), 3);
    assert!(setup.microphones.positions().iter().all(|p| p.z == -0.49));
    assert_eq!(setup.microphones.positions()[0].x, 0.3);
}

#[test]
fn missing_xml_file_is_an_io_error() {
    let mut def = SimulationDef::example();
    def.microphones = MicrophonesDef::XmlFile {
        path: PathBuf::from("does_not_exist.xml"),
        standoff_m: None,
    };
    def.grid = GridDef::Rect {
        scan_length_m: [0.1, 0.1],
        scan_spacing_m: [0.1, 0.1],
        z_m: 0.0,
    };
    let err = compile_simulation(&def, &unique_temp_dir("ag_setup_missing")).unwrap_err();
    assert!(matches!(err, SetupError::Io(_)));
}
