//! Interchangeable Fresnel reflectance strategies for microfacet models.
//!
//! Each strategy is a plain value type holding its own material parameter
//! (a normal-incidence reflectance, a real index of refraction, or a complex
//! index of refraction) and evaluates to a spectral reflectance for a given
//! cosine between the view direction and the microfacet normal.

use crate::utils::{pow5, FloatExt, VecExt};
use crate::{ParameterSet, RgbD};

/// Fresnel reflectance as a function of the cosine between the view
/// direction and the (microfacet) normal. Masked-off calls return zero.
pub trait Fresnel {
    fn eval(&self, cos_theta: f64, mask: bool) -> RgbD;
}

/// Normal-incidence reflectance of a dielectric with relative index of
/// refraction `ior`: `((n-1)/(n+1))^2`
#[must_use]
pub fn ior_to_f0(ior: f64) -> f64 {
    ((ior - 1.0) / (ior + 1.0)).sq()
}

/// Inverse of [`ior_to_f0`]. The reflectance is clamped just below 1 to keep
/// the conversion finite.
#[must_use]
pub fn f0_to_ior(f0: f64) -> f64 {
    let r = f0.safe_sqrt().min(1.0 - 1e-6);
    (1.0 + r) / (1.0 - r)
}

/// Schlick's approximation of the Fresnel reflectance
/// \[Comp. Graph. Forum '94\], parameterized by the reflectance at normal
/// incidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schlick {
    /// reflectance at normal incidence, per channel, in \[0,1\]
    pub f0: RgbD,
}

impl Schlick {
    #[must_use]
    pub const fn new(f0: RgbD) -> Self {
        Self { f0 }
    }

    /// Construct from a real index of refraction via the f0 conversion.
    #[must_use]
    pub fn from_ior(ior: f64) -> Self {
        Self {
            f0: RgbD::splat(ior_to_f0(ior)),
        }
    }
}

impl Fresnel for Schlick {
    fn eval(&self, cos_theta: f64, mask: bool) -> RgbD {
        if !mask {
            return RgbD::ZERO;
        }
        self.f0 + (RgbD::ONE - self.f0) * pow5(1.0 - cos_theta)
    }
}

impl ParameterSet for Schlick {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.f0.x, self.f0.y, self.f0.z]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.f0 = RgbD::new(values[0], values[1], values[2]);
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![0.0; 3]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![1.0; 3]
    }
}

/// Exact unpolarized dielectric Fresnel reflectance in the form proposed by
/// Cook and Torrance \[SIGGRAPH '82\], parameterized by a real index of
/// refraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cook {
    /// relative index of refraction
    pub ior: f64,
}

impl Cook {
    #[must_use]
    pub const fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Construct from a normal-incidence reflectance via the ior conversion.
    #[must_use]
    pub fn from_f0(f0: f64) -> Self {
        Self { ior: f0_to_ior(f0) }
    }
}

impl Fresnel for Cook {
    fn eval(&self, cos_theta: f64, mask: bool) -> RgbD {
        if !mask {
            return RgbD::ZERO;
        }
        // safe_sqrt turns total internal reflection (g^2 < 0) into g = 0,
        // for which the expression below evaluates to exactly 1.
        let g = (self.ior.sq() + cos_theta.sq() - 1.0).safe_sqrt();
        let a = (g - cos_theta) / (g + cos_theta);
        #[allow(clippy::suboptimal_flops)]
        let b = (cos_theta * (g + cos_theta) - 1.0) / (cos_theta * (g - cos_theta) + 1.0);
        RgbD::splat((0.5 * a.sq() * (1.0 + b.sq())).max(0.0))
    }
}

impl ParameterSet for Cook {
    fn parameter_values(&self) -> Vec<f64> {
        vec![self.ior]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.ior = values[0];
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![1.0]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![3.0]
    }
}

/// Exact Fresnel reflectance of a dielectric-conductor interface with a
/// complex index of refraction `eta + i k`, evaluated per spectral channel.
/// Follows Shirley \[1985\], Eqs. 2.4-2.7, assuming the dielectric side is
/// air.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    /// real part of the index of refraction, per channel
    pub eta: RgbD,
    /// imaginary part (absorption), per channel
    pub k: RgbD,
}

impl Complex {
    #[must_use]
    pub const fn new(eta: RgbD, k: RgbD) -> Self {
        Self { eta, k }
    }
}

impl Fresnel for Complex {
    fn eval(&self, cos_theta: f64, mask: bool) -> RgbD {
        if !mask {
            return RgbD::ZERO;
        }
        let cos2 = cos_theta.sq();
        let sin2 = 1.0 - cos2;

        let n2 = self.eta * self.eta;
        let k2 = self.k * self.k;

        // a and a^2 + b^2 (Eqs. 2.6 & 2.7)
        let temp = n2 - k2 - RgbD::splat(sin2);
        let a2b2 = (temp * temp + 4.0 * n2 * k2).safe_sqrt();
        let a = ((a2b2 + temp) * 0.5).safe_sqrt();

        // Rs (Eq. 2.4)
        let a2c = 2.0 * a * cos_theta;
        let rs = (a2b2 - a2c + RgbD::splat(cos2)) / (a2b2 + a2c + RgbD::splat(cos2));

        // Rp (Eq. 2.5, with tanTheta replaced by sinTheta/cosTheta)
        let rp = rs * (a2b2 * cos2 - (a2c - RgbD::splat(sin2)) * sin2)
            / (a2b2 * cos2 + (a2c + RgbD::splat(sin2)) * sin2);

        0.5 * (rs + rp)
    }
}

impl ParameterSet for Complex {
    fn parameter_values(&self) -> Vec<f64> {
        vec![
            self.eta.x, self.eta.y, self.eta.z, self.k.x, self.k.y, self.k.z,
        ]
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        self.eta = RgbD::new(values[0], values[1], values[2]);
        self.k = RgbD::new(values[3], values[4], values[5]);
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        vec![1e-2; 6]
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        vec![10.0; 6]
    }
}

#[cfg(test)]
mod tests {
    use super::{f0_to_ior, ior_to_f0, Complex, Cook, Fresnel, Schlick};
    use crate::test_utils::assert_eq_approx_abs;
    use crate::utils::FloatExt;
    use crate::RgbD;

    #[test]
    fn ior_reflectance_conversion_roundtrip() {
        for ior in [1.2, 1.5, 1.7, 2.4] {
            assert_eq_approx_abs!(f0_to_ior(ior_to_f0(ior)), ior, 1e-9);
        }
    }

    #[test]
    fn schlick_endpoints() {
        let f = Schlick::new(RgbD::splat(0.04));
        let normal = f.eval(1.0, true);
        assert_eq_approx_abs!(normal.x, 0.04, 1e-12);
        // grazing incidence approaches 1
        let grazing = f.eval(0.0, true);
        assert_eq_approx_abs!(grazing.x, 1.0, 1e-12);
        assert_eq!(f.eval(1.0, false), RgbD::ZERO);
    }

    #[test]
    fn schlick_matches_exact_at_normal_incidence() {
        let ior = 1.5;
        let schlick = Schlick::from_ior(ior);
        let cook = Cook::new(ior);
        let s = schlick.eval(1.0, true);
        let c = cook.eval(1.0, true);
        assert_eq_approx_abs!(s.x, c.x, 1e-9);
    }

    #[test]
    fn cook_normal_incidence() {
        let ior = 1.5;
        let f = Cook::new(ior).eval(1.0, true);
        assert_eq_approx_abs!(f.x, ior_to_f0(ior), 1e-9);
    }

    #[test]
    fn cook_total_internal_reflection() {
        // ior < 1 and grazing angles push g^2 negative
        let f = Cook::new(0.5).eval(0.4, true);
        assert_eq_approx_abs!(f.x, 1.0, 1e-12);
    }

    #[test]
    fn complex_normal_incidence() {
        // ((n-1)^2 + k^2) / ((n+1)^2 + k^2) per channel
        let eta = RgbD::new(0.2, 1.0, 1.5);
        let k = RgbD::new(3.0, 2.5, 2.0);
        let f = Complex::new(eta, k).eval(1.0, true);
        for i in 0..3 {
            let expected = ((eta[i] - 1.0).sq() + k[i].sq()) / ((eta[i] + 1.0).sq() + k[i].sq());
            assert_eq_approx_abs!(f[i], expected, 1e-9);
        }
    }

    #[test]
    fn reflectance_stays_in_unit_range() {
        let strategies: [&dyn Fresnel; 3] = [
            &Schlick::new(RgbD::splat(0.2)),
            &Cook::new(1.5),
            &Complex::new(RgbD::splat(1.1), RgbD::splat(2.2)),
        ];
        for f in strategies {
            let mut cos_theta = 0.0;
            while cos_theta <= 1.0 {
                let r = f.eval(cos_theta, true);
                for i in 0..3 {
                    assert!(r[i] >= 0.0 && r[i] <= 1.0 + 1e-9, "r = {r:?}");
                }
                cos_theta += 0.01;
            }
        }
    }
}
