//! Compass search (pattern search) optimization: a gradient-free minimizer
//! that probes each cardinal direction of the parameter space.
//!
//! Follows the algorithm on page 402 of [Optimization by Direct Search: New
//! Perspectives on Some Classical and Modern
//! Methods](https://doi.org/10.1137/S003614450242889) (Kolda et al. 2003),
//! with optional axis-aligned box constraints.

use log::debug;

/// A scalar loss over a flat parameter vector. `update` refreshes any
/// internal caches before a round of evaluations; the default does nothing.
pub trait LossFunction {
    fn update(&mut self) {}

    /// Evaluates the loss at the given parameter point. A false mask skips
    /// the computation and returns zero.
    fn eval(&mut self, params: &[f64], mask: bool) -> f64;
}

/// Adapts a plain `FnMut(&[f64]) -> f64` closure into a [`LossFunction`].
pub struct ClosureLoss<F>(pub F);

impl<F: FnMut(&[f64]) -> f64> LossFunction for ClosureLoss<F> {
    fn eval(&mut self, params: &[f64], mask: bool) -> f64 {
        if mask {
            (self.0)(params)
        } else {
            0.0
        }
    }
}

/// Configuration of a [`CompassSearch`] run.
#[derive(Debug, Clone)]
pub struct CompassOptions {
    /// component-wise lower bound of the box constraint
    pub lower: Option<Vec<f64>>,
    /// component-wise upper bound of the box constraint
    pub upper: Option<Vec<f64>>,
    /// threshold on the step size that determines convergence
    pub tolerance: f64,
    /// initial step size
    pub step_size: f64,
    /// step reduction factor when no cardinal direction improves the loss
    pub contraction: f64,
    /// step growth factor when an improving direction was found
    pub expansion: f64,
    /// a false mask permanently excludes the search from running
    pub mask: bool,
}

impl Default for CompassOptions {
    fn default() -> Self {
        Self {
            lower: None,
            upper: None,
            tolerance: f64::EPSILON,
            step_size: 1.0,
            contraction: 0.5,
            expansion: 1.0,
            mask: true,
        }
    }
}

/// Compass search over a borrowed parameter vector.
///
/// The optimizer owns neither the loss nor the parameters; it mutates the
/// caller's parameter storage in place. Convergence is purely step-size
/// based: callers impose their own iteration cap and check
/// [`CompassSearch::is_converged`].
///
/// The stored loss never increases across [`CompassSearch::step`] calls, and
/// the step size shrinks by `contraction` on every sweep that finds no
/// improvement, so the search converges in finitely many steps for any
/// positive tolerance.
pub struct CompassSearch<'a, L: LossFunction> {
    loss: &'a mut L,
    params: &'a mut [f64],
    options: CompassOptions,

    // signed 1-based cardinal probe directions; 0 would be a no-op
    directions: Vec<i32>,
    step: f64,
    loss_value: f64,
}

impl<'a, L: LossFunction> CompassSearch<'a, L> {
    /// Starts a search with default options.
    pub fn new(loss: &'a mut L, params: &'a mut [f64]) -> Self {
        Self::with_options(loss, params, CompassOptions::default())
    }

    /// Starts a search with the given options and evaluates the initial
    /// loss.
    pub fn with_options(loss: &'a mut L, params: &'a mut [f64], options: CompassOptions) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let directions = (1..=params.len() as i32)
            .flat_map(|i| [i, -i])
            .collect();
        let mut search = Self {
            loss,
            params,
            options,
            directions,
            step: 0.0,
            loss_value: 0.0,
        };
        search.reset();
        search
    }

    /// Resets the step size to its initial value and re-evaluates the
    /// current loss.
    pub fn reset(&mut self) {
        self.step = self.options.step_size;
        self.loss.update();
        self.loss_value = self.loss.eval(self.params, self.options.mask);
    }

    /// Probes every cardinal direction and moves the parameters to the best
    /// strictly-improving probe, if any. Returns the loss at the current
    /// parameter point after the step.
    pub fn step(&mut self) -> f64 {
        if !self.options.mask || self.is_converged() {
            return self.loss_value;
        }

        self.loss.update();

        let mut best_direction = 0;
        let mut best_loss = self.loss_value;

        for &direction in &self.directions {
            let index = direction.unsigned_abs() as usize - 1;
            let saved = self.params[index];
            self.params[index] = if direction < 0 {
                saved - self.step
            } else {
                saved + self.step
            };

            // probes that leave the box constraint are invalid
            if in_box(
                self.params,
                self.options.lower.as_deref(),
                self.options.upper.as_deref(),
            ) {
                let err = self.loss.eval(self.params, self.options.mask);
                if err < best_loss {
                    best_direction = direction;
                    best_loss = err;
                }
            }

            // restore the exact original value before the next probe
            self.params[index] = saved;
        }

        // a strict improvement becomes permanent, anything else contracts
        // the step size
        if best_loss < self.loss_value && best_direction != 0 {
            let index = best_direction.unsigned_abs() as usize - 1;
            if best_direction < 0 {
                self.params[index] -= self.step;
            } else {
                self.params[index] += self.step;
            }
            self.step *= self.options.expansion;
            self.loss_value = best_loss;
            debug!(
                "compass: direction {best_direction} improved loss to {best_loss:e}, step {:e}",
                self.step
            );
        } else {
            self.step *= self.options.contraction;
            debug!("compass: no improvement, contracted step to {:e}", self.step);
        }

        self.loss_value
    }

    /// True once the step size has fallen to the tolerance, or when the
    /// search was masked off at construction.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.step <= self.options.tolerance || !self.options.mask
    }

    /// The loss at the current parameter point.
    #[must_use]
    pub fn loss(&self) -> f64 {
        self.loss_value
    }

    /// The current step size.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step
    }
}

fn in_box(params: &[f64], lower: Option<&[f64]>, upper: Option<&[f64]>) -> bool {
    let above = lower.map_or(true, |lo| params.iter().zip(lo).all(|(p, l)| p >= l));
    let below = upper.map_or(true, |up| params.iter().zip(up).all(|(p, u)| p <= u));
    above && below
}
