//! The classic diffuse Lambertian reflectance model
use std::f64::consts;
use std::fmt;
use std::str::FromStr;

use crate::text::{self, ParseError};
use crate::utils::{cossin, xi_valid, FloatExt};
use crate::{
    BsdfSample, ComponentFlag, ParameterSet, RgbD, TransportMode, Vec2d, Vec3d, BSDF,
};

/// The classic diffuse Lambertian model: a constant reflectance above the
/// horizon, importance sampled proportional to the cosine weighted solid
/// angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    /// The diffuse albedo. Every channel should be in \[0,1\] to preserve
    /// physical validity.
    pub albedo: RgbD,
}

impl Lambertian {
    #[must_use]
    pub const fn new(albedo: RgbD) -> Self {
        Self { albedo }
    }
}

impl BSDF for Lambertian {
    fn eval(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        _mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        let mask = mask
            && component.contains(ComponentFlag::DIFFUSE)
            && omega_i.z >= 0.0
            && omega_o.z >= 0.0;
        if !mask {
            return RgbD::ZERO;
        }
        self.albedo / consts::PI
    }

    fn sample(
        &self,
        omega_o: Vec3d,
        xi: Vec2d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> BsdfSample {
        let mask = mask && component.contains(ComponentFlag::DIFFUSE) && xi_valid(xi);
        if !mask {
            return BsdfSample::default();
        }

        // sample proportional to the cosine weighted solid angle
        let csp = cossin(xi.x * 2.0 * consts::PI);
        let sin_theta = (1.0 - xi.y).safe_sqrt();
        let direction = Vec3d::new(
            csp.x * sin_theta,
            csp.y * sin_theta,
            xi.y.safe_sqrt(),
        );

        BsdfSample {
            direction,
            pdf: self.pdf(direction, omega_o, component, mode, mask),
            flag: ComponentFlag::DIFFUSE,
        }
    }

    fn pdf(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        _mode: TransportMode,
        mask: bool,
    ) -> f64 {
        let mask = mask
            && component.contains(ComponentFlag::DIFFUSE)
            && omega_i.z >= 0.0
            && omega_o.z >= 0.0;
        if !mask {
            return 0.0;
        }
        omega_i.z / consts::PI
    }

    fn reflectance(
        &self,
        _omega_o: Vec3d,
        component: ComponentFlag,
        _mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        if mask && component.contains(ComponentFlag::DIFFUSE) {
            self.albedo
        } else {
            RgbD::ZERO
        }
    }
}

impl ParameterSet for Lambertian {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.albedo.x, self.albedo.y, self.albedo.z]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.albedo = RgbD::new(values[0], values[1], values[2]);
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![0.0; 3]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![1.0; 3]
    }
}

impl fmt::Display for Lambertian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lambertian([{}, {}, {}])",
            self.albedo.x, self.albedo.y, self.albedo.z
        )
    }
}

impl FromStr for Lambertian {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "Lambertian")?;
        let tokens = text::split_args(args);
        if tokens.len() != 1 {
            return Err(ParseError::argument_count("Lambertian", 1, tokens.len(), s));
        }
        Ok(Self::new(text::parse_rgb(tokens[0], s)?))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts;

    use super::Lambertian;
    use crate::test_utils::{self, assert_eq_approx_abs};
    use crate::{ComponentFlag, RgbD, TransportMode, Vec2d, Vec3d, BSDF};

    #[test]
    fn sample_pdf_consistency() {
        let mat = Lambertian::new(RgbD::ONE);
        test_utils::test_sample_pdf_consistency(&mat);
    }

    #[test]
    fn reciprocity() {
        let mat = Lambertian::new(RgbD::ONE);
        test_utils::test_reciprocity(&mat);
    }

    #[test]
    fn pdf_integral() {
        let mat = Lambertian::new(RgbD::ONE);
        test_utils::test_pdf_integral(&mat);
    }

    // normal incidence values of the half albedo model
    #[test]
    fn normal_incidence_values() {
        let mat = Lambertian::new(RgbD::splat(0.5));
        let up = Vec3d::Z;
        let all = ComponentFlag::ALL;
        let mode = TransportMode::Radiance;

        let value = mat.eval(up, up, all, mode, true);
        assert_eq_approx_abs!(value.x, 0.5 / consts::PI, 1e-12);
        assert_eq_approx_abs!(value.y, 0.5 / consts::PI, 1e-12);
        assert_eq_approx_abs!(value.z, 0.5 / consts::PI, 1e-12);

        assert_eq_approx_abs!(mat.pdf(up, up, all, mode, true), 1.0 / consts::PI, 1e-12);
        assert_eq!(mat.reflectance(up, all, mode, true), RgbD::splat(0.5));
    }

    #[test]
    fn component_and_mask_gating() {
        let mat = Lambertian::new(RgbD::splat(0.5));
        let up = Vec3d::Z;
        let mode = TransportMode::Radiance;
        assert_eq!(
            mat.eval(up, up, ComponentFlag::SPECULAR, mode, true),
            RgbD::ZERO
        );
        assert_eq!(mat.eval(up, up, ComponentFlag::ALL, mode, false), RgbD::ZERO);
        let s = mat.sample(up, Vec2d::new(0.3, -0.1), ComponentFlag::ALL, mode, true);
        assert_eq!(s.pdf, 0.0);
        assert!(s.flag.is_empty());
    }
}
