//! The Student's t-distribution of slopes (STD) microfacet normal
//! distribution from [STD: Student's t-Distribution of Slopes for Microfacet
//! Based BSDFs](https://doi.org/10.1111/cgf.13137).
//!
//! The shape parameter `gamma` interpolates between GGX-like heavy tails
//! (small gamma) and Beckmann-like falloff (large gamma).

use std::f64::consts;

use crate::ndf::Ndf;
use crate::utils::{cossin, ln_gamma, xi_valid, FloatExt};
use crate::{ParameterSet, Vec2d, Vec3d};

/// The STD microfacet distribution, sampling `D(m) cos theta` the classic
/// way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentT {
    /// roughness along the x tangent axis
    pub alpha_x: f64,
    /// roughness along the y tangent axis
    pub alpha_y: f64,
    /// tail shape, in `(1.5, 40]`
    pub gamma: f64,
}

impl StudentT {
    #[must_use]
    pub const fn isotropic(alpha: f64, gamma: f64) -> Self {
        Self {
            alpha_x: alpha,
            alpha_y: alpha,
            gamma,
        }
    }

    #[must_use]
    pub const fn anisotropic(alpha_x: f64, alpha_y: f64, gamma: f64) -> Self {
        Self {
            alpha_x,
            alpha_y,
            gamma,
        }
    }

    // rational fits from Eqs. 22 & 23
    fn f21(z: f64) -> f64 {
        let z2 = z * z;
        let z3 = z2 * z;
        #[allow(clippy::suboptimal_flops)]
        {
            (1.066 * z + 2.655 * z2 + 4.892 * z3) / (1.038 + 2.969 * z + 4.305 * z2 + 4.418 * z3)
        }
    }

    fn f22(gamma: f64) -> f64 {
        let g2 = gamma * gamma;
        let g3 = g2 * gamma;
        #[allow(clippy::suboptimal_flops)]
        {
            (14.402 - 27.145 * gamma + 20.574 * g2 - 2.745 * g3)
                / (-30.612 + 86.567 * gamma - 84.341 * g2 + 29.938 * g3)
        }
    }

    fn f23(gamma: f64) -> f64 {
        let g2 = gamma * gamma;
        let g3 = g2 * gamma;
        #[allow(clippy::suboptimal_flops)]
        {
            (-129.404 + 324.987 * gamma - 299.305 * g2 + 93.268 * g3)
                / (-92.609 + 256.006 * gamma - 245.663 * g2 + 86.064 * g3)
        }
    }

    fn f24(z: f64) -> f64 {
        let z2 = z * z;
        let z3 = z2 * z;
        #[allow(clippy::suboptimal_flops)]
        {
            (6.537 + 6.074 * z - 0.623 * z2 + 5.223 * z3)
                / (6.538 + 6.103 * z - 3.218 * z2 + 6.347 * z3)
        }
    }
}

impl Ndf for StudentT {
    fn eval(&self, halfway: Vec3d, mask: bool) -> f64 {
        let mask = mask && halfway.z > 0.0;
        if !mask {
            return 0.0;
        }
        let slope2 = (halfway.x / self.alpha_x).sq() + (halfway.y / self.alpha_y).sq();
        let normalization =
            consts::PI * self.alpha_x * self.alpha_y * halfway.z.sq().sq();
        let tail = (1.0 + slope2 / ((self.gamma - 1.0) * halfway.z.sq())).powf(self.gamma);
        1.0 / (normalization * tail)
    }

    fn sample(&self, _view: Vec3d, xi: Vec2d, mask: bool) -> Vec3d {
        let mask = mask && xi_valid(xi);
        if !mask {
            return Vec3d::ZERO;
        }

        let csp = cossin(2.0 * consts::PI * xi.x);
        let normalization = 1.0 / ((csp.x / self.alpha_x).sq() + (csp.y / self.alpha_y).sq());
        let csp = Vec2d::new(csp.x * self.alpha_x, csp.y * self.alpha_y).normalize();

        let tan_theta2 =
            (xi.y.powf(1.0 / (1.0 - self.gamma)) - 1.0) * (self.gamma - 1.0) * normalization;
        let cos_theta = 1.0 / (1.0 + tan_theta2).sqrt();
        let sin_theta = (1.0 - cos_theta.sq()).safe_sqrt();

        Vec3d::new(csp.x * sin_theta, csp.y * sin_theta, cos_theta)
    }

    fn pdf(&self, _view: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && m.z > 0.0;
        if !mask {
            return 0.0;
        }
        let pdf = self.eval(m, mask) * m.z;
        if pdf > 0.0 {
            pdf
        } else {
            0.0
        }
    }

    /// Published rational fits of the masking integral (Eqs. 13-23).
    fn g1(&self, v: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && v.z > 0.0 && v.dot(m) > 0.0;
        if !mask {
            return 0.0;
        }

        // at normal incidence the slope ratio diverges and G1 is exactly 1
        if v.z >= 1.0 - f64::EPSILON {
            return 1.0;
        }

        let gamma = self.gamma;

        // z = mu / sigma (unnumbered equation between Eqs. 18 and 19)
        let z = v.z / ((v.x * self.alpha_x).sq() + (v.y * self.alpha_y).sq()).sqrt();

        // S1 (Eq. 14)
        let s1 = ((gamma - 1.0) + z * z).powf(1.5 - gamma) / z;

        // S2 (Eqs. 22 & 23, approximating Eq. 15)
        let s2 = Self::f21(z) * (Self::f22(gamma) + Self::f23(gamma) * Self::f24(z));

        // Lambda (Eq. 13)
        let s1_scale = (gamma - 1.0).powf(gamma) / (2.0 * gamma - 3.0);
        let gamma_ratio = (ln_gamma(gamma - 0.5) - ln_gamma(gamma)).exp();
        let inv_sqrt_pi = consts::FRAC_2_SQRT_PI / 2.0;
        #[allow(clippy::suboptimal_flops)]
        let lambda =
            gamma_ratio * inv_sqrt_pi * (s1_scale * s1 + (gamma - 1.0).sqrt() * s2) - 0.5;

        // G1 (Eq. 7)
        1.0 / (1.0 + lambda)
    }
}

impl ParameterSet for StudentT {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.alpha_x, self.alpha_y, self.gamma]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.alpha_x = values[0];
        self.alpha_y = values[1];
        self.gamma = values[2];
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![1e-3, 1e-3, 1.5 + 1e-4]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![2.0, 2.0, 40.0]
    }
}
