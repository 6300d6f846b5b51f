//! The general microfacet BSDF model following [Microfacet Models for
//! Refraction through Rough Surfaces](http://dx.doi.org/10.2312/EGWR/EGSR07/195-206),
//! composed from three interchangeable strategies: a normal distribution
//! ([`Ndf`]), a joint masking-shadowing term ([`MaskingShadowing`]) and a
//! [`Fresnel`] reflectance.
//!
//! Historic microfacet publications differ in a constant normalization
//! factor (1, 4 or pi); the factor is selected at compile time through the
//! [`norm`] marker types.

use std::fmt;
use std::marker::PhantomData;
#[cfg(any(
    feature = "beckmann",
    feature = "ggx",
    feature = "phong",
    feature = "student-t",
    feature = "shifted-gamma"
))]
use std::str::FromStr;

use crate::fresnel::Fresnel;
use crate::masking::MaskingShadowing;
use crate::ndf::Ndf;
#[cfg(any(
    feature = "beckmann",
    feature = "ggx",
    feature = "phong",
    feature = "student-t",
    feature = "shifted-gamma"
))]
use crate::text::{self, ParseError};
use crate::utils::{halfway, reflect, xi_valid};
use crate::{
    BsdfSample, ComponentFlag, ParameterSet, RgbD, TransportMode, Vec2d, Vec3d, BSDF,
};

#[cfg(feature = "beckmann")]
use crate::beckmann::Beckmann;
#[cfg(feature = "ggx")]
use crate::ggx::Ggx;
#[cfg(feature = "phong")]
use crate::phong::Phong;
#[cfg(feature = "shifted-gamma")]
use crate::shifted_gamma::ShiftedGamma;
#[cfg(feature = "student-t")]
use crate::student_t::StudentT;

use crate::fresnel;
#[cfg(any(feature = "ggx", feature = "phong", feature = "shifted-gamma"))]
use crate::masking::Uncorrelated;
#[cfg(feature = "beckmann")]
use crate::masking::VGroove;
#[cfg(feature = "student-t")]
use crate::masking::HeightCorrelated;

/// Compile-time normalization constants of the microfacet formula.
pub mod norm {
    use std::f64::consts;

    /// A constant divisor distinguishing the historic microfacet
    /// normalization conventions.
    pub trait Normalization {
        const FACTOR: f64;
    }

    /// no normalization constant
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Unnormalized;

    impl Normalization for Unnormalized {
        const FACTOR: f64 = 1.0;
    }

    /// 1/4, as in Walter et al. 2007
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Walter;

    impl Normalization for Walter {
        const FACTOR: f64 = 4.0;
    }

    /// 1/pi, as in Cook and Torrance 1982
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Cook;

    impl Normalization for Cook {
        const FACTOR: f64 = consts::PI;
    }
}

use norm::Normalization;

/// The general microfacet BRDF
///
/// `f(i, o) = D(h) G(i, o, h) F(h) / N / (cos theta_i cos theta_o)`
///
/// with `h` the halfway vector and `N` the normalization constant.
///
/// Custom compositions implement [`BSDF`] as soon as they provide a
/// `Display` rendering of their serialized form; the predefined
/// compositions ([`CookTorrance`], [`Walter`], ...) come with one.
#[derive(Debug, Clone, Copy)]
pub struct Microfacet<D, G, F, N = norm::Walter> {
    /// microfacet normal distribution
    pub ndf: D,
    /// fresnel reflectance at the microfacet interface
    pub fresnel: F,
    strategies: PhantomData<(G, N)>,
}

impl<D, G, F, N> Microfacet<D, G, F, N> {
    #[must_use]
    pub const fn new(ndf: D, fresnel: F) -> Self {
        Self {
            ndf,
            fresnel,
            strategies: PhantomData,
        }
    }
}

impl<D, G, F, N> BSDF for Microfacet<D, G, F, N>
where
    D: Ndf,
    G: MaskingShadowing,
    F: Fresnel + ParameterSet,
    N: Normalization,
    Self: fmt::Display,
{
    fn eval(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        _mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        let mask = mask
            && component.contains(ComponentFlag::SPECULAR)
            && omega_i.z > 0.0
            && omega_o.z > 0.0;
        if !mask {
            return RgbD::ZERO;
        }

        let Some(h) = halfway(omega_i, omega_o) else {
            return RgbD::ZERO;
        };
        let ih = omega_i.dot(h);
        let oh = omega_o.dot(h);

        let d = self.ndf.eval(h, mask);
        let g = G::eval(&self.ndf, omega_i, omega_o, h, mask);

        // the two dot products are mathematically equal; averaging them keeps
        // f(i,o) and f(o,i) bit-identical under round off
        let f = self.fresnel.eval(0.5 * (ih + oh), mask);

        d * g * f / N::FACTOR / (omega_i.z * omega_o.z)
    }

    fn sample(
        &self,
        omega_o: Vec3d,
        xi: Vec2d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> BsdfSample {
        let mask = mask
            && component.contains(ComponentFlag::SPECULAR)
            && xi_valid(xi)
            && omega_o.z > 0.0;
        if !mask {
            return BsdfSample::default();
        }

        // reflect the exitant direction about a sampled microfacet normal
        let m = self.ndf.sample(omega_o, xi, mask);
        let direction = reflect(m, omega_o);

        BsdfSample {
            direction,
            pdf: self.pdf(direction, omega_o, component, mode, mask),
            flag: ComponentFlag::SPECULAR,
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
            && component.contains(ComponentFlag::SPECULAR)
            && omega_i.z > 0.0
            && omega_o.z > 0.0;
        if !mask {
            return 0.0;
        }

        let Some(h) = halfway(omega_i, omega_o) else {
            return 0.0;
        };
        // rounding can push the halfway vector just below the horizon
        let h = if h.z < 0.0 { -h } else { h };

        // half-vector to incident-direction jacobian: 1 / (4 |o.h|)
        self.ndf.pdf(omega_o, h, mask) / (4.0 * omega_o.dot(h).abs())
    }

    fn reflectance(
        &self,
        omega_o: Vec3d,
        component: ComponentFlag,
        _mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        let mask = mask && component.contains(ComponentFlag::SPECULAR) && omega_o.z > 0.0;
        if !mask {
            return RgbD::ZERO;
        }

        // approximate as a perfect mirror
        self.fresnel.eval(omega_o.z, mask) / N::FACTOR * 4.0
    }
}

impl<D, G, F, N> ParameterSet for Microfacet<D, G, F, N>
where
    D: Ndf,
    F: ParameterSet,
{
    fn parameter_values(&self) -> Vec<f64> {
        let mut values = self.ndf.parameter_values();
        values.extend(self.fresnel.parameter_values());
        values
    }

    fn set_parameter_values(&mut self, values: &[f64]) {
        let split = self.ndf.parameter_values().len();
        self.ndf.set_parameter_values(&values[..split]);
        self.fresnel.set_parameter_values(&values[split..]);
    }

    fn parameter_lower_bounds(&self) -> Vec<f64> {
        let mut bounds = self.ndf.parameter_lower_bounds();
        bounds.extend(self.fresnel.parameter_lower_bounds());
        bounds
    }

    fn parameter_upper_bounds(&self) -> Vec<f64> {
        let mut bounds = self.ndf.parameter_upper_bounds();
        bounds.extend(self.fresnel.parameter_upper_bounds());
        bounds
    }
}

/// The classic Cook-Torrance model: Beckmann facets, v-groove shadowing,
/// exact dielectric Fresnel, 1/pi normalization.
#[cfg(feature = "beckmann")]
pub type CookTorrance = Microfacet<Beckmann, VGroove, fresnel::Cook, norm::Cook>;

#[cfg(feature = "beckmann")]
impl fmt::Display for CookTorrance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CookTorrance({}, {}, {})",
            self.ndf.alpha_x, self.ndf.alpha_y, self.fresnel.ior
        )
    }
}

#[cfg(feature = "beckmann")]
impl FromStr for CookTorrance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "CookTorrance")?;
        let v = text::parse_scalars(args, s, 3)?;
        Ok(Self::new(
            Beckmann::anisotropic(v[0], v[1]),
            fresnel::Cook::new(v[2]),
        ))
    }
}

/// The Walter 2007 rough-surface model: GGX facets with visible-normal
/// sampling, uncorrelated Smith shadowing, exact dielectric Fresnel, 1/4
/// normalization.
#[cfg(feature = "ggx")]
pub type Walter = Microfacet<Ggx, Uncorrelated, fresnel::Cook, norm::Walter>;

#[cfg(feature = "ggx")]
impl fmt::Display for Walter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Walter({}, {}, {})",
            self.ndf.alpha_x, self.ndf.alpha_y, self.fresnel.ior
        )
    }
}

#[cfg(feature = "ggx")]
impl FromStr for Walter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "Walter")?;
        let v = text::parse_scalars(args, s, 3)?;
        Ok(Self::new(
            Ggx::anisotropic(v[0], v[1]),
            fresnel::Cook::new(v[2]),
        ))
    }
}

/// Phong facets in the Walter parameterization with uncorrelated Smith
/// shadowing.
#[cfg(feature = "phong")]
pub type PhongWalter = Microfacet<Phong, Uncorrelated, fresnel::Cook, norm::Walter>;

#[cfg(feature = "phong")]
impl fmt::Display for PhongWalter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PhongWalter({}, {})",
            self.ndf.sharpness, self.fresnel.ior
        )
    }
}

#[cfg(feature = "phong")]
impl FromStr for PhongWalter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "PhongWalter")?;
        let v = text::parse_scalars(args, s, 2)?;
        Ok(Self::new(Phong::new(v[0]), fresnel::Cook::new(v[1])))
    }
}

/// The Student's t-distribution model of Ribardiere et al. 2017 with
/// height-correlated Smith shadowing.
#[cfg(feature = "student-t")]
pub type Ribardiere = Microfacet<StudentT, HeightCorrelated, fresnel::Cook, norm::Walter>;

#[cfg(feature = "student-t")]
impl fmt::Display for Ribardiere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ribardiere({}, {}, {}, {})",
            self.ndf.alpha_x, self.ndf.alpha_y, self.ndf.gamma, self.fresnel.ior
        )
    }
}

#[cfg(feature = "student-t")]
impl FromStr for Ribardiere {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "Ribardiere")?;
        let v = text::parse_scalars(args, s, 4)?;
        Ok(Self::new(
            StudentT::anisotropic(v[0], v[1], v[2]),
            fresnel::Cook::new(v[3]),
        ))
    }
}

/// The Shifted Gamma model of Bagher et al. 2012 with a Schlick Fresnel
/// term.
#[cfg(feature = "shifted-gamma")]
pub type Bagher = Microfacet<ShiftedGamma, Uncorrelated, fresnel::Schlick, norm::Walter>;

#[cfg(feature = "shifted-gamma")]
impl fmt::Display for Bagher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bagher({}, {}, [{}, {}, {}])",
            self.ndf.alpha, self.ndf.p, self.fresnel.f0.x, self.fresnel.f0.y, self.fresnel.f0.z
        )
    }
}

#[cfg(feature = "shifted-gamma")]
impl FromStr for Bagher {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "Bagher")?;
        let tokens = text::split_args(args);
        if tokens.len() != 3 {
            return Err(ParseError::argument_count("Bagher", 3, tokens.len(), s));
        }
        let alpha = text::parse_scalar(tokens[0], s)?;
        let p = text::parse_scalar(tokens[1], s)?;
        let f0 = text::parse_rgb(tokens[2], s)?;
        Ok(Self::new(
            ShiftedGamma::new(alpha, p),
            fresnel::Schlick::new(f0),
        ))
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;
    #[allow(unused_imports)]
    use crate::test_utils;

    #[cfg(feature = "ggx")]
    mod walter {
        use super::*;

        const ROUGH: Walter = Walter::new(Ggx::anisotropic(0.09, 0.16), fresnel::Cook::new(1.5));

        #[test]
        fn sample_pdf_consistency() {
            test_utils::test_sample_pdf_consistency(&ROUGH);
        }

        #[test]
        fn reciprocity() {
            test_utils::test_reciprocity(&ROUGH);
        }

        #[test]
        fn pdf_integral() {
            test_utils::test_pdf_integral(&ROUGH);
        }

        #[test]
        fn masked_and_offhorizon_calls_are_zero() {
            use crate::{ComponentFlag, RgbD, TransportMode, Vec2d, Vec3d, BSDF};
            let up = Vec3d::Z;
            let down = -Vec3d::Z;
            let all = ComponentFlag::ALL;
            let mode = TransportMode::Radiance;
            assert_eq!(ROUGH.eval(up, up, all, mode, false), RgbD::ZERO);
            assert_eq!(ROUGH.eval(down, up, all, mode, true), RgbD::ZERO);
            assert_eq!(ROUGH.pdf(up, down, all, mode, true), 0.0);
            // only the specular component exists
            assert_eq!(
                ROUGH.eval(up, up, ComponentFlag::DIFFUSE, mode, true),
                RgbD::ZERO
            );
            // out-of-range random numbers yield the invalid sample
            let s = ROUGH.sample(up, Vec2d::new(1.5, 0.5), all, mode, true);
            assert_eq!(s.pdf, 0.0);
            assert!(s.flag.is_empty());
        }

        #[test]
        fn reflectance_is_scaled_normal_incidence_fresnel() {
            use crate::fresnel::Fresnel;
            use crate::{ComponentFlag, TransportMode, Vec3d, BSDF};
            let omega_o = Vec3d::new(0.0, 0.6, 0.8);
            let r = ROUGH.reflectance(
                omega_o,
                ComponentFlag::ALL,
                TransportMode::Radiance,
                true,
            );
            let f = fresnel::Cook::new(1.5).eval(omega_o.z, true);
            // walter normalization: 4 / 4 = 1
            assert_eq!(r, f);
        }
    }

    #[cfg(feature = "beckmann")]
    mod cook_torrance {
        use super::*;

        const ROUGH: CookTorrance =
            CookTorrance::new(Beckmann::anisotropic(0.2, 0.3), fresnel::Cook::new(1.45));

        #[test]
        fn sample_pdf_consistency() {
            test_utils::test_sample_pdf_consistency(&ROUGH);
        }

        #[test]
        fn reciprocity() {
            test_utils::test_reciprocity(&ROUGH);
        }

        #[test]
        fn pdf_integral() {
            test_utils::test_pdf_integral(&ROUGH);
        }
    }

    #[cfg(feature = "phong")]
    mod phong_walter {
        use super::*;

        const ROUGH: PhongWalter = PhongWalter::new(Phong::new(30.0), fresnel::Cook::new(1.5));

        #[test]
        fn sample_pdf_consistency() {
            test_utils::test_sample_pdf_consistency(&ROUGH);
        }

        #[test]
        fn pdf_integral() {
            test_utils::test_pdf_integral(&ROUGH);
        }
    }

    #[cfg(feature = "student-t")]
    mod ribardiere {
        use super::*;

        const ROUGH: Ribardiere =
            Ribardiere::new(StudentT::isotropic(0.2, 3.0), fresnel::Cook::new(1.5));

        #[test]
        fn sample_pdf_consistency() {
            test_utils::test_sample_pdf_consistency(&ROUGH);
        }

        #[test]
        fn pdf_integral() {
            test_utils::test_pdf_integral(&ROUGH);
        }
    }

    #[cfg(feature = "shifted-gamma")]
    mod bagher {
        use super::*;
        use crate::RgbD;

        #[test]
        fn sample_pdf_consistency() {
            let rough = Bagher::new(
                ShiftedGamma::new(0.3, 0.64),
                fresnel::Schlick::new(RgbD::splat(0.9)),
            );
            test_utils::test_sample_pdf_consistency(&rough);
        }

        #[test]
        fn pdf_integral() {
            let smooth = Bagher::new(
                ShiftedGamma::new(0.15, 0.64),
                fresnel::Schlick::new(RgbD::splat(0.9)),
            );
            test_utils::test_pdf_integral(&smooth);
        }
    }
}
