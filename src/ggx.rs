//! The GGX (Trowbridge-Reitz) microfacet normal distribution
//!
//! # Mathematical background
//! * [Microfacet Models for Refraction through Rough Surfaces](http://dx.doi.org/10.2312/EGWR/EGSR07/195-206)
//! * [Understanding the Masking-Shadowing Function in Microfacet-Based BRDFs](https://jcgt.org/published/0003/02/03/)
//! * [Sampling the GGX Distribution of Visible Normals](https://jcgt.org/published/0007/04/01/)

use std::f64::consts;

use crate::ndf::Ndf;
use crate::utils::{xi_valid, FloatExt};
use crate::{ParameterSet, Vec2d, Vec3d};

/// The GGX microfacet distribution with visible-normal sampling.
///
/// The roughness values are not perceived linearly; `alpha =
/// perceived_roughness^2` is a good approximation for choosing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ggx {
    /// roughness along the x tangent axis
    pub alpha_x: f64,
    /// roughness along the y tangent axis
    pub alpha_y: f64,
}

impl Ggx {
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

impl Ndf for Ggx {
    fn eval(&self, halfway: Vec3d, mask: bool) -> f64 {
        let mask = mask && halfway.z > 0.0;
        if !mask {
            return 0.0;
        }
        let denom = consts::PI
            * self.alpha_x
            * self.alpha_y
            * ((halfway.x / self.alpha_x).sq() + (halfway.y / self.alpha_y).sq() + halfway.z.sq())
                .sq();
        1.0 / denom
    }

    /// Samples the distribution of visible normals, following
    /// [Heitz 2018](https://jcgt.org/published/0007/04/01/).
    fn sample(&self, view: Vec3d, xi: Vec2d, mask: bool) -> Vec3d {
        let mask = mask && xi_valid(xi);
        if !mask {
            return Vec3d::ZERO;
        }

        // 1) stretch the view direction into the hemisphere configuration
        let v_h = Vec3d::new(
            view.x * self.alpha_x,
            view.y * self.alpha_y,
            view.z,
        )
        .normalize();

        // 2) orthonormal basis around the stretched view
        #[allow(clippy::suboptimal_flops)]
        let lensq = v_h.x * v_h.x + v_h.y * v_h.y;
        let t1 = if lensq > 1e-10 {
            Vec3d::new(-v_h.y, v_h.x, 0.0) / lensq.sqrt()
        } else {
            Vec3d::new(1.0, 0.0, 0.0)
        };
        let t2 = Vec3d::cross(v_h, t1);

        // 3) sample a point on the projected disk
        let r = xi.x.sqrt();
        let phi = 2.0 * consts::PI * xi.y;
        let p1 = r * phi.cos();
        let p2 = r * phi.sin();
        let s = 0.5 * (1.0 + v_h.z);
        #[allow(clippy::suboptimal_flops)]
        let p2 = (1.0 - s) * (1.0 - p1 * p1).safe_sqrt() + s * p2;

        // 4) reproject onto the hemisphere
        #[allow(clippy::suboptimal_flops)]
        let m_h = t1 * p1 + t2 * p2 + v_h * (1.0 - p1 * p1 - p2 * p2).safe_sqrt();

        // 5) unstretch
        Vec3d::new(
            self.alpha_x * m_h.x,
            self.alpha_y * m_h.y,
            m_h.z.max(0.0),
        )
        .normalize()
    }

    fn pdf(&self, view: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && m.z > 0.0;
        if !mask {
            return 0.0;
        }
        // density of the visible normals: D(m) G1(view) |view.m| / cos(view)
        let pdf = self.eval(m, mask) * self.g1(view, m, mask) * view.dot(m).abs() / view.z;

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
        2.0 / (1.0
            + (1.0 + ((self.alpha_x * v.x).sq() + (self.alpha_y * v.y).sq()) / v.z.sq()).sqrt())
    }
}

impl ParameterSet for Ggx {
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

#[cfg(test)]
mod tests {
    use super::Ggx;
    use crate::ndf::Ndf;
    use crate::test_utils::{self, SamplerExt};
    use crate::Vec3d;

    #[test]
    fn g1_contract() {
        test_utils::test_g1_contract(&Ggx::anisotropic(0.09, 0.16));
    }

    #[test]
    fn eval_below_horizon_is_zero() {
        let ndf = Ggx::isotropic(0.25);
        assert_eq!(ndf.eval(Vec3d::new(0.0, 0.6, -0.8), true), 0.0);
        assert_eq!(ndf.eval(Vec3d::Z, false), 0.0);
    }

    #[test]
    fn pdf_integral() {
        test_utils::test_ndf_pdf_integral(&Ggx::anisotropic(0.2, 0.35));
    }

    #[test]
    fn sampled_normals_are_visible() {
        let ndf = Ggx::anisotropic(0.2, 0.35);
        let mut rd = fastrand::Rng::new();
        for _ in 0..10_000 {
            let view = test_utils::hemispherical_sample(&mut rd);
            let m = ndf.sample(view, rd.vec2d(), true);
            assert!(m.z > 0.0, "sampled normal below horizon: {m:?}");
            assert!(
                ndf.pdf(view, m, true) > 0.0,
                "sampled normal has zero density: view {view:?}, m {m:?}"
            );
        }
    }
}
