//! Crossing point of a single source/receiver ray on the shear layer.

use ag_setup::FlowConfiguration;
use nalgebra::{Matrix2, Vector2, Vector3};

use crate::error::{ShearError, ShearResult};
use crate::newton::{NewtonConfig, newton_minimize};

/// Planar shear layer at `z = z_sl`. The side containing the sources moves
/// with Mach number `mach` along +x; the receiver side is at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearLayer {
    z_sl: f64,
    c0: f64,
    mach: f64,
    beta: f64,
}

/// Refracted path between one source and one receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearPath {
    /// Point where the ray crosses the layer
    pub crossing: Vector3<f64>,
    /// Minimised source-to-receiver travel time (s)
    pub travel_time: f64,
    /// Convected distance from the source to the crossing point
    pub sigma: f64,
    /// Distance from the crossing point to the receiver
    pub r_out: f64,
    /// Receiver minus source position
    pub offset: Vector3<f64>,
    pub iterations: usize,
}

impl ShearLayer {
    pub fn new(z_sl: f64, ux: f64, c0: f64) -> ShearResult<Self> {
        if !z_sl.is_finite() {
            return Err(ShearError::Configuration {
                what: format!("shear layer height must be finite, got {z_sl}"),
            });
        }
        if !(c0.is_finite() && c0 > 0.0) {
            return Err(ShearError::Configuration {
                what: format!("speed of sound must be positive, got {c0}"),
            });
        }
        let mach = ux / c0;
        if !(mach.is_finite() && (0.0..1.0).contains(&mach)) {
            return Err(ShearError::Configuration {
                what: format!("Mach number must be in [0, 1), got {mach}"),
            });
        }
        Ok(Self {
            z_sl,
            c0,
            mach,
            beta: (1.0 - mach * mach).sqrt(),
        })
    }

    pub fn from_flow(flow: &FlowConfiguration) -> ShearResult<Self> {
        Self::new(flow.z_sl(), flow.ux(), flow.c0())
    }

    pub fn z_sl(&self) -> f64 {
        self.z_sl
    }

    pub fn c0(&self) -> f64 {
        self.c0
    }

    pub fn mach(&self) -> f64 {
        self.mach
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Signed side of the layer: `-1` below, `+1` above, `0` on it.
    pub fn side(&self, point: &Vector3<f64>) -> i8 {
        let h = point.z - self.z_sl;
        if h > 0.0 {
            1
        } else if h < 0.0 {
            -1
        } else {
            0
        }
    }

    fn check_pair(&self, source: &Vector3<f64>, receiver: &Vector3<f64>) -> ShearResult<()> {
        if !(source.iter().all(|v| v.is_finite()) && receiver.iter().all(|v| v.is_finite())) {
            return Err(ShearError::Configuration {
                what: "source and receiver coordinates must be finite".to_string(),
            });
        }
        let (s, r) = (self.side(source), self.side(receiver));
        if s == 0 || r == 0 || s == r {
            return Err(ShearError::Configuration {
                what: format!(
                    "shear layer z = {} must lie strictly between source z = {} and receiver z = {}",
                    self.z_sl, source.z, receiver.z
                ),
            });
        }
        Ok(())
    }

    /// Travel time `c0 * T` through the crossing point `c` (in the layer
    /// plane).
    fn scaled_time(&self, source: &Vector3<f64>, receiver: &Vector3<f64>, c: &Vector2<f64>) -> f64 {
        let (q, _, _, _) = self.convected_leg(source, c);
        let (rho, _, _, _) = self.still_leg(receiver, c);
        (q - self.mach * (c.x - source.x)) / (self.beta * self.beta) + rho
    }

    /// Gradient and Hessian of [`Self::scaled_time`] with respect to `c`.
    fn scaled_time_derivs(
        &self,
        source: &Vector3<f64>,
        receiver: &Vector3<f64>,
        c: &Vector2<f64>,
    ) -> (Vector2<f64>, Matrix2<f64>) {
        let b2 = self.beta * self.beta;
        let (q, dx, dy, h1) = self.convected_leg(source, c);
        let (rho, ex, ey, h2) = self.still_leg(receiver, c);

        let q3 = q * q * q;
        let rho3 = rho * rho * rho;
        let grad = Vector2::new((dx / q - self.mach) / b2 - ex / rho, dy / q - ey / rho);
        let hess = Matrix2::new(
            (dy * dy + h1 * h1) / q3 + (ey * ey + h2 * h2) / rho3,
            -dx * dy / q3 - ex * ey / rho3,
            -dx * dy / q3 - ex * ey / rho3,
            (dx * dx + b2 * h1 * h1) / q3 + (ex * ex + h2 * h2) / rho3,
        );
        (grad, hess)
    }

    fn convected_leg(&self, source: &Vector3<f64>, c: &Vector2<f64>) -> (f64, f64, f64, f64) {
        let dx = c.x - source.x;
        let dy = c.y - source.y;
        let h = self.z_sl - source.z;
        let q = (dx * dx + self.beta * self.beta * (dy * dy + h * h)).sqrt();
        (q, dx, dy, h)
    }

    fn still_leg(&self, receiver: &Vector3<f64>, c: &Vector2<f64>) -> (f64, f64, f64, f64) {
        let ex = receiver.x - c.x;
        let ey = receiver.y - c.y;
        let h = receiver.z - self.z_sl;
        ((ex * ex + ey * ey + h * h).sqrt(), ex, ey, h)
    }

    /// Fermat path from `source` to `receiver`.
    ///
    /// Starts from the straight-line intersection with the layer. A
    /// [`ShearError::Divergence`] returned here carries pair indices 0; see
    /// [`ShearError::at_pair`].
    pub fn path(
        &self,
        source: &Vector3<f64>,
        receiver: &Vector3<f64>,
        config: &NewtonConfig,
    ) -> ShearResult<ShearPath> {
        self.check_pair(source, receiver)?;

        let offset = receiver - source;
        let t = (self.z_sl - source.z) / offset.z;
        let x0 = Vector2::new(source.x + t * offset.x, source.y + t * offset.y);

        let result = newton_minimize(
            x0,
            |c| self.scaled_time(source, receiver, c),
            |c| self.scaled_time_derivs(source, receiver, c),
            offset.norm(),
            config,
        );
        if !result.converged {
            return Err(ShearError::Divergence {
                source_index: 0,
                receiver_index: 0,
                iterations: result.iterations,
                last_step: result.last_step,
            });
        }

        let c = result.x;
        let (sigma, _, _, _) = self.convected_leg(source, &c);
        let (r_out, _, _, _) = self.still_leg(receiver, &c);
        Ok(ShearPath {
            crossing: Vector3::new(c.x, c.y, self.z_sl),
            travel_time: result.value / self.c0,
            sigma,
            r_out,
            offset,
            iterations: result.iterations,
        })
    }
}

impl ShearError {
    /// Attach source/receiver indices to a divergence error.
    pub fn at_pair(self, source: usize, receiver: usize) -> Self {
        match self {
            ShearError::Divergence {
                iterations,
                last_step,
                ..
            } => ShearError::Divergence {
                source_index: source,
                receiver_index: receiver,
                iterations,
                last_step,
            },
            other => other,
        }
    }
}
