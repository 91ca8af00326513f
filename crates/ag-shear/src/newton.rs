//! Damped Newton minimiser for smooth convex functions of two variables.

use nalgebra::{Matrix2, Vector2};

/// Newton minimiser configuration.
#[derive(Debug, Clone, Copy)]
pub struct NewtonConfig {
    /// Maximum Newton iterations
    pub max_iterations: usize,
    /// Converged once the Newton step is below `step_tol * scale`
    pub step_tol: f64,
    /// Armijo sufficient-decrease constant
    pub armijo: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            step_tol: 1e-12,
            armijo: 1e-4,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone, Copy)]
pub struct NewtonResult {
    /// Minimiser
    pub x: Vector2<f64>,
    /// Objective at `x`
    pub value: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Norm of the last accepted step
    pub last_step: f64,
    /// Converged flag
    pub converged: bool,
}

/// Minimise `f` from `x0` using its analytic gradient and Hessian.
///
/// `derivs` returns `(gradient, hessian)`. Each step is the Newton
/// direction, shortened by Armijo backtracking until `f` decreases; `scale`
/// is the problem's length scale used by the step tolerance.
pub fn newton_minimize<F, D>(
    x0: Vector2<f64>,
    f: F,
    derivs: D,
    scale: f64,
    config: &NewtonConfig,
) -> NewtonResult
where
    F: Fn(&Vector2<f64>) -> f64,
    D: Fn(&Vector2<f64>) -> (Vector2<f64>, Matrix2<f64>),
{
    let tol = config.step_tol * scale.max(1.0);
    let mut x = x0;
    let mut fx = f(&x);
    let mut last_step = f64::INFINITY;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        iterations = iter + 1;
        let (grad, hess) = derivs(&x);

        let Some(step) = hess.lu().solve(&(-grad)) else {
            break;
        };
        // Hessian not positive definite along the step: fall back to steepest descent
        let step = if grad.dot(&step) < 0.0 { step } else { -grad };

        let step_norm = step.norm();
        if !step_norm.is_finite() {
            break;
        }
        if step_norm <= tol {
            let x_new = x + step;
            return NewtonResult {
                x: x_new,
                value: f(&x_new),
                iterations,
                last_step: step_norm,
                converged: true,
            };
        }

        let slope = grad.dot(&step);
        // allow for rounding in f near the minimum
        let slack = 4.0 * f64::EPSILON * fx.abs();
        let mut alpha = 1.0;
        let mut x_new = x + step;
        let mut f_new = f(&x_new);
        let mut accepted = false;
        for _ in 0..config.max_line_search_iters {
            if f_new.is_finite() && f_new <= fx + config.armijo * alpha * slope + slack {
                accepted = true;
                break;
            }
            alpha *= config.line_search_beta;
            x_new = x + alpha * step;
            f_new = f(&x_new);
        }
        if !accepted {
            break;
        }

        x = x_new;
        fx = f_new;
        last_step = alpha * step_norm;
    }

    NewtonResult {
        x,
        value: fx,
        iterations,
        last_step,
        converged: false,
    }
}
