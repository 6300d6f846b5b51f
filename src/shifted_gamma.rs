//! The Shifted Gamma microfacet normal distribution from [Accurate fitting
//! of measured reflectances using a Shifted Gamma micro-facet
//! distribution](https://doi.org/10.1111/j.1467-8659.2012.03147.x).
//!
//! No analytic importance sampling routine exists for this density; samples
//! and their densities are produced through a GGX proxy with the same
//! roughness, which is a valid proposal distribution because the density
//! query and the sampling routine stay paired.

use std::f64::consts;

use crate::ggx::Ggx;
use crate::ndf::Ndf;
use crate::utils::{tan_theta2, FloatExt};
use crate::{ParameterSet, Vec2d, Vec3d};

/// The Shifted Gamma distribution (scalar instantiation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftedGamma {
    /// roughness-like scale of the slope distribution
    pub alpha: f64,
    /// shape (power) parameter of the gamma falloff
    pub p: f64,
}

impl ShiftedGamma {
    #[must_use]
    pub const fn new(alpha: f64, p: f64) -> Self {
        Self { alpha, p }
    }

    const fn proxy(&self) -> Ggx {
        Ggx::isotropic(self.alpha)
    }
}

impl Ndf for ShiftedGamma {
    fn eval(&self, halfway: Vec3d, mask: bool) -> f64 {
        let mask = mask && halfway.z > 0.0;
        if !mask {
            return 0.0;
        }
        let temp = self.alpha + tan_theta2(halfway) / self.alpha;
        let denom = temp.powf(self.p);
        let p22 = if denom > f64::EPSILON {
            (-temp).exp() / denom
        } else {
            0.0
        };
        p22 / (consts::PI * halfway.z.sq().sq())
    }

    fn sample(&self, view: Vec3d, xi: Vec2d, mask: bool) -> Vec3d {
        self.proxy().sample(view, xi, mask)
    }

    fn pdf(&self, view: Vec3d, m: Vec3d, mask: bool) -> f64 {
        self.proxy().pdf(view, m, mask)
    }

    /// The original publication fits shadowing into the model constants; the
    /// monodirectional term is 1 inside the valid hemisphere.
    fn g1(&self, v: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && v.z > 0.0 && v.dot(m) > 0.0;
        if mask {
            1.0
        } else {
            0.0
        }
    }
}

impl ParameterSet for ShiftedGamma {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.alpha, self.p]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.alpha = values[0];
        self.p = values[1];
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![1e-3, 1e-2]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![2.0, 5.0]
    }
}

#[cfg(test)]
mod tests {
    use super::ShiftedGamma;
    use crate::ndf::Ndf;
    use crate::test_utils::{self, SamplerExt};

    #[test]
    fn g1_contract() {
        test_utils::test_g1_contract(&ShiftedGamma::new(0.3, 0.64));
    }

    #[test]
    fn pdf_integral() {
        test_utils::test_ndf_pdf_integral(&ShiftedGamma::new(0.25, 0.64));
    }

    #[test]
    fn sample_and_pdf_stay_paired() {
        let ndf = ShiftedGamma::new(0.25, 0.64);
        let mut rd = fastrand::Rng::new();
        for _ in 0..10_000 {
            let view = test_utils::hemispherical_sample(&mut rd);
            let m = ndf.sample(view, rd.vec2d(), true);
            assert!(m.z > 0.0);
            assert!(ndf.pdf(view, m, true) > 0.0);
        }
    }
}
