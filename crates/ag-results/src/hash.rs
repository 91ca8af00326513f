//! Content-based fingerprints for run caching.

use ag_setup::SimulationDef;
use sha2::{Digest, Sha256};

use crate::types::RunConfiguration;

/// SHA-256 over the simulation definition, the compiled run configuration,
/// the resolved frequency list and the solver version.
///
/// The compiled configuration carries the microphone positions read from
/// external files, so editing such a file changes the fingerprint even when
/// the definition text does not. Two runs with equal fingerprints produce
/// the same data, so a sealed run with a matching fingerprint can be reused.
pub fn compute_fingerprint(
    def: &SimulationDef,
    config: &RunConfiguration,
    frequencies: &[f64],
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let def_json = serde_json::to_string(def).unwrap_or_default();
    hasher.update(def_json.as_bytes());

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    for f in frequencies {
        hasher.update(f.to_le_bytes());
    }

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_setup::{FrequenciesDef, MicrophoneArray, compile_simulation};
    use std::path::Path;

    fn fingerprint(def: &SimulationDef, version: &str) -> String {
        let setup = compile_simulation(def, Path::new(".")).expect("example should compile");
        let config = RunConfiguration::new(
            &setup.flow,
            &setup.airfoil,
            &setup.microphones,
            &setup.grid,
        );
        compute_fingerprint(def, &config, &setup.frequencies, version)
    }

    #[test]
    fn fingerprint_stability() {
        let def = SimulationDef::example();
        let a = fingerprint(&def, "v1");
        let b = fingerprint(&def, "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_differs_for_different_inputs() {
        let def1 = SimulationDef::example();
        let mut def2 = SimulationDef::example();
        def2.frequencies = FrequenciesDef::Hz {
            values: vec![1000.0, 2000.0],
        };

        assert_ne!(fingerprint(&def1, "v1"), fingerprint(&def2, "v1"));
        assert_ne!(fingerprint(&def1, "v1"), fingerprint(&def1, "v2"));
    }

    #[test]
    fn fingerprint_follows_resolved_microphones() {
        let def = SimulationDef::example();
        let setup = compile_simulation(&def, Path::new(".")).unwrap();
        let config = RunConfiguration::new(
            &setup.flow,
            &setup.airfoil,
            &setup.microphones,
            &setup.grid,
        );

        let mut rows = setup.microphones.to_rows();
        rows[2][0] -= 0.1;
        let moved = MicrophoneArray::from_rows(setup.microphones.name().to_string(), &rows)
            .unwrap();
        let moved_config =
            RunConfiguration::new(&setup.flow, &setup.airfoil, &moved, &setup.grid);

        assert_ne!(
            compute_fingerprint(&def, &config, &setup.frequencies, "v1"),
            compute_fingerprint(&def, &moved_config, &setup.frequencies, "v1")
        );
    }
}
