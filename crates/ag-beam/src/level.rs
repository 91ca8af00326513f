//! Sound pressure level maps.

use ag_core::units::constants::P_REF_SQUARED_PA2;
use ag_setup::ScanGrid;
use nalgebra::DMatrix;

use crate::error::{BeamError, BeamResult};

/// Level floor for non-positive squared pressures.
pub const LEVEL_FLOOR_DB: f64 = -350.0;

/// `10 log10(x / (20 µPa)²)`; non-positive `x` maps to the floor.
pub fn l_p(x: f64) -> f64 {
    if x > 0.0 {
        10.0 * (x / P_REF_SQUARED_PA2).log10()
    } else {
        LEVEL_FLOOR_DB
    }
}

/// `L_p(p / max p) + modifier` for every scan point.
pub fn normalized_levels(pressure: &[f64], modifier: f64) -> BeamResult<Vec<f64>> {
    let max = pressure.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return Err(BeamError::NoPositivePower);
    }
    Ok(pressure.iter().map(|p| l_p(p / max) + modifier).collect())
}

/// Level vector laid out on the scan grid: rows along y, columns along x.
pub fn level_grid(levels: &[f64], grid: &ScanGrid) -> BeamResult<DMatrix<f64>> {
    if levels.len() != grid.len() {
        return Err(BeamError::Shape {
            what: "level map",
            expected: (grid.len(), 1),
            got: (levels.len(), 1),
        });
    }
    Ok(DMatrix::from_row_slice(grid.ny(), grid.nx(), levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::m;

    #[test]
    fn l_p_reference_points() {
        assert!((l_p(4e-10)).abs() < 1e-12);
        assert!((l_p(1.0) - 93.979_400_086_720_38).abs() < 1e-9);
        assert_eq!(l_p(0.0), LEVEL_FLOOR_DB);
        assert_eq!(l_p(-1.0), LEVEL_FLOOR_DB);
    }

    #[test]
    fn maximum_maps_to_reference_plus_modifier() {
        let levels = normalized_levels(&[1e-3, 4e-3, 2e-3, 0.0], -93.979_400_086_720_38).unwrap();
        assert!(levels[1].abs() < 1e-9);
        assert!((levels[0] - 10.0 * 0.25f64.log10()).abs() < 1e-9);
        assert!(levels[3] < -400.0);
    }

    #[test]
    fn all_zero_map_rejected() {
        assert!(matches!(
            normalized_levels(&[0.0, -1.0], 0.0),
            Err(BeamError::NoPositivePower)
        ));
    }

    #[test]
    fn grid_layout_is_row_major() {
        let grid = ScanGrid::new([m(0.2), m(0.1)], [m(0.1), m(0.1)], m(0.0)).unwrap();
        let levels: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let map = level_grid(&levels, &grid).unwrap();
        assert_eq!(map.shape(), (2, 3));
        assert_eq!(map[(1, 0)], levels[grid.index(0, 1)]);
        assert!(level_grid(&levels[..5], &grid).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn peak_is_modifier_above_reference(
            p in prop::collection::vec(0.0f64..1e6, 1..40),
            modifier in -50.0f64..50.0,
        ) {
            prop_assume!(p.iter().any(|x| *x > 0.0));
            let levels = normalized_levels(&p, modifier).unwrap();
            let peak = l_p(1.0) + modifier;
            let max = levels.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!((max - peak).abs() < 1e-9);
            prop_assert!(levels.iter().all(|l| *l <= peak + 1e-9));
        }
    }
}
