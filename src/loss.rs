//! Sampled loss functions for fitting one reflectance model against
//! another (a reference model, or measured data wrapped as a model).

use std::f64::consts;

use log::trace;

use crate::optimizer::LossFunction;
use crate::utils::{sin_theta, VecExt};
use crate::{ComponentFlag, ParameterSet, RgbD, TransportMode, Vec3d, BSDF};

/// A cosine weighted L2 loss between a mutable candidate model and a fixed
/// reference, accumulated over a regular hemispherical grid of direction
/// pairs. Each sample is weighted by `sin(theta_i) sin(theta_o)` to account
/// for the solid angle of its grid cell.
///
/// The candidate's parameters are applied through [`ParameterSet`] on every
/// evaluation, which makes the loss directly usable with
/// [`crate::optimizer::CompassSearch`].
pub struct CosineWeightedL2<M, R> {
    model: M,
    reference: R,
    pairs: Vec<(Vec3d, Vec3d)>,
    cached: Vec<RgbD>,
    component: ComponentFlag,
    mode: TransportMode,
}

/// midpoint directions of a theta x phi grid over the upper hemisphere
fn hemisphere_grid(theta_count: usize, phi_count: usize) -> Vec<Vec3d> {
    let mut directions = Vec::with_capacity(theta_count * phi_count);
    #[allow(clippy::cast_precision_loss)]
    for ti in 0..theta_count {
        let theta = (ti as f64 + 0.5) / theta_count as f64 * consts::FRAC_PI_2;
        for pi in 0..phi_count {
            let phi = (pi as f64 + 0.5) / phi_count as f64 * 2.0 * consts::PI;
            let (sin_t, cos_t) = theta.sin_cos();
            let (sin_p, cos_p) = phi.sin_cos();
            directions.push(Vec3d::new(sin_t * cos_p, sin_t * sin_p, cos_t));
        }
    }
    directions
}

impl<M, R> CosineWeightedL2<M, R>
where
    M: BSDF + ParameterSet,
    R: BSDF,
{
    /// Builds the loss over a `(theta, phi)` direction grid; `samples_in`
    /// and `samples_out` give the grid resolution for the incident and
    /// exitant hemisphere.
    #[must_use]
    pub fn new(
        model: M,
        reference: R,
        samples_in: (usize, usize),
        samples_out: (usize, usize),
    ) -> Self {
        let incident = hemisphere_grid(samples_in.0, samples_in.1);
        let exitant = hemisphere_grid(samples_out.0, samples_out.1);

        let mut pairs = Vec::with_capacity(incident.len() * exitant.len());
        for &omega_o in &exitant {
            for &omega_i in &incident {
                pairs.push((omega_i, omega_o));
            }
        }

        let mut loss = Self {
            model,
            reference,
            pairs,
            cached: Vec::new(),
            component: ComponentFlag::ALL,
            mode: TransportMode::Radiance,
        };
        loss.update();
        loss
    }

    /// The candidate's current parameter vector, the natural starting point
    /// for an optimizer run.
    #[must_use]
    pub fn initial_params(&self) -> Vec<f64> {
        self.model.parameter_values()
    }

    /// Box bounds of the candidate's parameters.
    #[must_use]
    pub fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        (
            self.model.parameter_lower_bounds(),
            self.model.parameter_upper_bounds(),
        )
    }

    /// The candidate model with whatever parameters were applied last.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consumes the loss and returns the fitted candidate.
    #[must_use]
    pub fn into_model(self) -> M {
        self.model
    }
}

impl<M, R> LossFunction for CosineWeightedL2<M, R>
where
    M: BSDF + ParameterSet,
    R: BSDF,
{
    /// Refreshes the cached reference evaluations.
    fn update(&mut self) {
        self.cached = self
            .pairs
            .iter()
            .map(|&(omega_i, omega_o)| {
                self.reference
                    .eval(omega_i, omega_o, self.component, self.mode, true)
            })
            .collect();
    }

    fn eval(&mut self, params: &[f64], mask: bool) -> f64 {
        if !mask {
            return 0.0;
        }

        self.model.set_parameter_values(params);

        let mut sum = 0.0;
        for (&(omega_i, omega_o), &reference) in self.pairs.iter().zip(&self.cached) {
            let value = self
                .model
                .eval(omega_i, omega_o, self.component, self.mode, true);
            let difference = (value - reference) * omega_i.z.max(0.0);
            sum += difference.sq().hsum() * sin_theta(omega_i) * sin_theta(omega_o);
        }
        trace!("cosine weighted l2 at {params:?}: {sum:e}");
        sum
    }
}
