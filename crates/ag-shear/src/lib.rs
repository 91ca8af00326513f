//! Sound propagation from the airfoil through a planar shear layer.
//!
//! The jet core (source side) convects with the mean flow; the far side of
//! the shear layer is at rest. For every source/receiver pair the crossing
//! point on the layer is found by minimising the travel time, and the
//! resulting paths give the dipole transfer matrix used both for the
//! airfoil-to-microphone and the scan-grid-to-microphone geometry.

pub mod crossing;
pub mod dipole;
pub mod error;
pub mod newton;
pub mod paths;

pub use crossing::{ShearLayer, ShearPath};
pub use dipole::dipole_transfer;
pub use error::{ShearError, ShearResult};
pub use newton::{NewtonConfig, NewtonResult};
pub use paths::{ShearLayerPaths, propagate};
