//! The Phong microfacet normal distribution, in the parameterization of
//! [Microfacet Models for Refraction through Rough Surfaces](http://dx.doi.org/10.2312/EGWR/EGSR07/195-206).

use std::f64::consts;

use crate::ndf::{rational_g1, Ndf};
use crate::utils::{cossin, tan_theta, xi_valid, FloatExt};
use crate::{ParameterSet, Vec2d, Vec3d};

/// The Phong microfacet distribution `(n+2)/(2 pi) cos^n theta`, sampling
/// `D(m) cos theta` the classic way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phong {
    /// specular sharpness exponent
    pub sharpness: f64,
}

impl Phong {
    #[must_use]
    pub const fn new(sharpness: f64) -> Self {
        Self { sharpness }
    }
}

impl Ndf for Phong {
    fn eval(&self, halfway: Vec3d, mask: bool) -> f64 {
        let mask = mask && halfway.z > 0.0;
        if !mask {
            return 0.0;
        }
        let normalization = (self.sharpness + 2.0) / (2.0 * consts::PI);
        halfway.z.powf(self.sharpness) * normalization
    }

    fn sample(&self, _view: Vec3d, xi: Vec2d, mask: bool) -> Vec3d {
        let mask = mask && xi_valid(xi);
        if !mask {
            return Vec3d::ZERO;
        }
        let cos_theta = xi.x.powf(1.0 / (self.sharpness + 2.0));
        let sin_theta = (1.0 - cos_theta.sq()).safe_sqrt();
        let csp = cossin(2.0 * consts::PI * xi.y);
        Vec3d::new(csp.x * sin_theta, csp.y * sin_theta, cos_theta)
    }

    fn pdf(&self, _view: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && m.z > 0.0;
        if !mask {
            return 0.0;
        }
        // density of the classic sampling: D(m) |cos theta|
        let pdf = self.eval(m, mask) * m.z.abs();
        if pdf > 0.0 {
            pdf
        } else {
            0.0
        }
    }

    /// No closed form exists; uses the same rational approximation as
    /// Beckmann with `a = sqrt(0.5 n + 1) / tan theta`.
    fn g1(&self, v: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && v.z > 0.0 && v.dot(m) > 0.0;
        if !mask {
            return 0.0;
        }
        #[allow(clippy::suboptimal_flops)]
        let a = (0.5 * self.sharpness + 1.0).sqrt() / tan_theta(v);
        rational_g1(a)
    }
}

impl ParameterSet for Phong {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.sharpness]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.sharpness = values[0];
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![0.0]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![10_000.0]
    }
}

#[cfg(test)]
mod tests {
    use super::Phong;
    use crate::ndf::Ndf;
    use crate::test_utils::{self, SamplerExt};
    use crate::Vec3d;

    #[test]
    fn g1_contract() {
        test_utils::test_g1_contract(&Phong::new(30.0));
    }

    #[test]
    fn density_peaks_at_the_normal() {
        let ndf = Phong::new(50.0);
        let up = ndf.eval(Vec3d::Z, true);
        let tilted = ndf.eval(Vec3d::new(0.0, 0.5, 0.866_025).normalize(), true);
        assert!(up > tilted);
    }

    #[test]
    fn pdf_integral() {
        test_utils::test_ndf_pdf_integral(&Phong::new(20.0));
    }

    #[test]
    fn sampled_normals_match_density() {
        let ndf = Phong::new(20.0);
        let mut rd = fastrand::Rng::new();
        for _ in 0..10_000 {
            let view = test_utils::hemispherical_sample(&mut rd);
            let m = ndf.sample(view, rd.vec2d(), true);
            assert!(m.z > 0.0);
            assert!(ndf.pdf(view, m, true) > 0.0);
        }
    }
}
