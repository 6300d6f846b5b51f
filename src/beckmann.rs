//! The Beckmann microfacet normal distribution
//!
//! Density and sampling follow [Microfacet Models for Refraction through
//! Rough Surfaces](http://dx.doi.org/10.2312/EGWR/EGSR07/195-206), with the
//! anisotropic extension.

use std::f64::consts;

use crate::ndf::{rational_g1, Ndf};
use crate::utils::{cossin, xi_valid, FloatExt};
use crate::{ParameterSet, Vec2d, Vec3d};

/// The Beckmann microfacet distribution, sampling `D(m) cos theta` the
/// classic way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beckmann {
    /// roughness along the x tangent axis
    pub alpha_x: f64,
    /// roughness along the y tangent axis
    pub alpha_y: f64,
}

impl Beckmann {
    #[must_use]
    pub const fn isotropic(alpha: f64) -> Self {
        Self {
            alpha_x: alpha,
            alpha_y: alpha,
        }
    }

    #[must_use]
    pub const fn anisotropic(alpha_x: f64, alpha_y: f64) -> Self {
        Self { alpha_x, alpha_y }
    }
}

impl Ndf for Beckmann {
    fn eval(&self, halfway: Vec3d, mask: bool) -> f64 {
        let mask = mask && halfway.z > 0.0;
        if !mask {
            return 0.0;
        }
        let cos2 = halfway.z.sq();
        let slope2 = (halfway.x / self.alpha_x).sq() + (halfway.y / self.alpha_y).sq();
        (-slope2 / cos2).exp() / (consts::PI * self.alpha_x * self.alpha_y * cos2 * cos2)
    }

    fn sample(&self, _view: Vec3d, xi: Vec2d, mask: bool) -> Vec3d {
        let mask = mask && xi_valid(xi);
        if !mask {
            return Vec3d::ZERO;
        }

        // azimuth, stretched by the roughness for the anisotropic case
        let mut csp = cossin(2.0 * consts::PI * xi.x);
        csp = Vec2d::new(csp.x * self.alpha_x, csp.y * self.alpha_y);
        let normalization = csp.length_squared();
        csp /= normalization.sqrt();

        // polar angle: tan^2 = -alpha^2 ln(xi), expressed through cos
        let cos_theta = 1.0 / (1.0 - normalization * xi.y.ln()).sqrt();
        let sin_theta = (1.0 - cos_theta.sq()).safe_sqrt();

        Vec3d::new(csp.x * sin_theta, csp.y * sin_theta, cos_theta)
    }

    fn pdf(&self, _view: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && m.z > 0.0;
        if !mask {
            return 0.0;
        }
        // density of the classic sampling: D(m) cos theta
        let pdf = self.eval(m, mask) * m.z;

        // ignore negative values (round off errors)
        if pdf > 0.0 {
            pdf
        } else {
            0.0
        }
    }

    fn g1(&self, v: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && v.z > 0.0 && v.dot(m) > 0.0;
        if !mask {
            return 0.0;
        }
        let a = v.z / ((v.x * self.alpha_x).sq() + (v.y * self.alpha_y).sq()).sqrt();
        rational_g1(a)
    }
}

impl ParameterSet for Beckmann {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.alpha_x, self.alpha_y]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.alpha_x = values[0];
        self.alpha_y = values[1];
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![1e-3; 2]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![2.0; 2]
    }
}
