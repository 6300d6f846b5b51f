pub trait ApproxEqual: Copy {
    fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool;
    fn equals_approx_abs(self, other: Self, eps: Self) -> bool;
}

macro_rules! assert_eq_approx {
    ($lhs:expr, $rhs:expr, $eps_abs:expr, $eps_rel:expr) => {
        assert!(
            $crate::test_utils::ApproxEqual::equals_approx($lhs, $rhs, $eps_abs, $eps_rel),
            r#"assert_eq_approx failed:
    {}: {:?}
    {}: {:?}
    {} (maximum absolute error): {:?}
    {} (maximum relative error): {:?}"#,
            stringify!($lhs),
            $lhs,
            stringify!($rhs),
            $rhs,
            stringify!($eps_abs),
            $eps_abs,
            stringify!($eps_rel),
            $eps_rel,
        );
    };

    ($lhs:expr, $rhs:expr, $eps_abs: expr, $eps_rel:expr, $($arg:tt)+) => {
        assert!($crate::test_utils::ApproxEqual::equals_approx($lhs, $rhs, $eps_abs, $eps_rel), $($arg)*);
    }
}

macro_rules! assert_eq_approx_abs {
    ($lhs:expr, $rhs:expr, $eps_abs:expr) => {
        assert!(
            $crate::test_utils::ApproxEqual::equals_approx_abs($lhs, $rhs, $eps_abs),
            r#"assert_eq_approx_abs failed:
    {}: {:?}
    {}: {:?}
    {} (maximum absolute error): {:?}"#,
            stringify!($lhs),
            $lhs,
            stringify!($rhs),
            $rhs,
            stringify!($eps_abs),
            $eps_abs,
        )
    };

    ($lhs:expr, $rhs:expr, $eps_abs:expr, $($arg:tt)+) => {
        assert!($crate::test_utils::ApproxEqual::equals_approx_abs($lhs, $rhs, $eps_abs),
        $($arg)*);
    };
}

macro_rules! assert_in_range {
    ($value:expr, $lower:expr, $upper:expr) => {
        assert!(
            $lower <= $value && $value <= $upper,
            r#"assert_in_range failed:
    {} (value): {:?}
    {} (lower bound): {:?}
    {} (upper bound): {:?}"#,
            stringify!($value),
            $value,
            stringify!($lower),
            $lower,
            stringify!($upper),
            $upper
        )
    };
}

impl ApproxEqual for f64 {
    fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool {
        #[allow(clippy::float_cmp)]
        if self == other || (self - other).abs() <= eps {
            true
        } else {
            let diff = (self - other).abs();
            let max = self.abs().max(other.abs());
            diff <= max * eps_rel
        }
    }

    fn equals_approx_abs(self, other: Self, eps: Self) -> bool {
        #[allow(clippy::float_cmp)]
        if self == other {
            true
        } else {
            (self - other).abs() <= eps
        }
    }
}

impl ApproxEqual for Vec3d {
    fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool {
        self.x.equals_approx(other.x, eps.x, eps_rel.x)
            && self.y.equals_approx(other.y, eps.y, eps_rel.y)
            && self.z.equals_approx(other.z, eps.z, eps_rel.z)
    }

    fn equals_approx_abs(self, other: Self, eps: Self) -> bool {
        self.x.equals_approx_abs(other.x, eps.x)
            && self.y.equals_approx_abs(other.y, eps.y)
            && self.z.equals_approx_abs(other.z, eps.z)
    }
}

use std::f64::consts;

pub(crate) use assert_eq_approx;
pub(crate) use assert_eq_approx_abs;
pub(crate) use assert_in_range;

use crate::ndf::Ndf;
use crate::utils::FloatExt;
use crate::{ComponentFlag, TransportMode, Vec2d, Vec3d, BSDF};

pub trait SamplerExt {
    fn vec2d(&mut self) -> Vec2d;
}

impl SamplerExt for fastrand::Rng {
    fn vec2d(&mut self) -> Vec2d {
        Vec2d::new(self.f64(), self.f64())
    }
}

/** sample a direction with density 1 / 4pi */
pub fn spherical_sample(rd: &mut fastrand::Rng) -> Vec3d {
    #[allow(clippy::suboptimal_flops)]
    let cos_theta = 2.0 * rd.f64() - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).safe_sqrt();
    let phi = rd.f64() * 2.0 * consts::PI;
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3d::new(sin_theta * sin_phi, sin_theta * cos_phi, cos_theta)
}

/** sample a direction above the horizon with density 1 / 2pi */
pub fn hemispherical_sample(rd: &mut fastrand::Rng) -> Vec3d {
    let v = spherical_sample(rd);
    Vec3d::new(v.x, v.y, v.z.abs())
}

/// The monodirectional masking contract: exactly zero for backfacing
/// configurations or below the horizon, inside [0, 1] everywhere else.
pub fn test_g1_contract<N: Ndf>(ndf: &N) {
    let mut rd = fastrand::Rng::new();
    for _ in 0..10_000 {
        let v = spherical_sample(&mut rd);
        let m = spherical_sample(&mut rd);
        let g = ndf.g1(v, m, true);
        if v.dot(m) <= 0.0 || v.z <= 0.0 {
            assert_eq!(g, 0.0, "g1 must be exactly 0 for v {v:?}, m {m:?}");
        } else {
            assert_in_range!(g, 0.0, 1.0 + 1e-9);
        }
        assert_eq!(ndf.g1(v, m, false), 0.0, "masked g1 must be 0");
    }
}

/// The density of a normal distribution's sampling routine integrates to 1
/// over the upper hemisphere.
pub fn test_ndf_pdf_integral<N: Ndf>(ndf: &N) {
    let mut rd = fastrand::Rng::new();
    let num_samples = 400_000;
    for view_z in [0.999, 0.95, 0.8] {
        let view = Vec3d::new((1.0 - view_z * view_z).safe_sqrt(), 0.0, view_z);
        let mut sum = 0.0;
        let mut sum2 = 0.0;
        for _ in 0..num_samples {
            let m = hemispherical_sample(&mut rd);
            let value = ndf.pdf(view, m, true) * 2.0 * consts::PI;
            sum += value;
            sum2 += value.sq();
        }
        #[allow(clippy::cast_lossless)]
        let n = num_samples as f64;
        let mean = sum / n;
        let variance = (sum2 / n - mean.sq()).max(0.0) * n / (n - 1.0);
        let std_error = (variance / n).sqrt();
        let confidence = (4.0 * std_error).max(0.01);
        assert_eq_approx_abs!(
            mean,
            1.0,
            confidence,
            r#"
    ndf pdf does not integrate to 1: {mean} after {num_samples} samples,
    standard error {std_error}, view {view:?}"#
        );
    }
}

/// Samples and density queries must agree: the pdf reported by `sample`
/// matches a subsequent `pdf` call, and both evaluation and density are
/// non-negative.
pub fn test_sample_pdf_consistency<T: BSDF>(material: &T) {
    let mut rd = fastrand::Rng::new();
    let all = ComponentFlag::ALL;
    let mode = TransportMode::Radiance;
    let runs = 10_000;
    for _ in 0..runs {
        let omega_o = hemispherical_sample(&mut rd);
        let sample = material.sample(omega_o, rd.vec2d(), all, mode, true);

        assert!(sample.pdf >= 0.0, "negative pdf: {}", sample.pdf);
        let value = material.eval(sample.direction, omega_o, all, mode, true);
        assert!(
            value.x >= 0.0 && value.y >= 0.0 && value.z >= 0.0,
            "negative eval: {value:?}"
        );

        if sample.pdf > 0.0 {
            let queried = material.pdf(sample.direction, omega_o, all, mode, true);
            assert_eq_approx!(
                sample.pdf,
                queried,
                1e-12,
                1e-9,
                r#"
    PDFs must agree between sample and pdf,
    sampled: {},
    queried: {queried},
    omega_o: {omega_o:?},
    direction: {:?}"#,
                sample.pdf,
                sample.direction
            );
        }
    }
}

/// Evaluation must not depend on the order of the direction pair.
pub fn test_reciprocity<T: BSDF>(material: &T) {
    let mut rd = fastrand::Rng::new();
    let all = ComponentFlag::ALL;
    let mode = TransportMode::Radiance;
    let runs = 10_000;
    for _ in 0..runs {
        let omega_o = spherical_sample(&mut rd);
        let omega_i = spherical_sample(&mut rd);
        let forward = material.eval(omega_i, omega_o, all, mode, true);
        let backward = material.eval(omega_o, omega_i, all, mode, true);
        assert_eq_approx!(
            forward,
            backward,
            Vec3d::splat(1e-9),
            Vec3d::splat(1e-9),
            "reciprocity violated: {forward:?} vs {backward:?} for {omega_i:?}, {omega_o:?}"
        );
    }
}

/// White-furnace style energy sanity: the density of `sample` integrates to
/// 1 over the sphere (up to the small probability mass of samples reflected
/// below the horizon, which the pdf reports as zero).
pub fn test_pdf_integral<T: BSDF>(material: &T) {
    let mut rd = fastrand::Rng::new();
    let all = ComponentFlag::ALL;
    let mode = TransportMode::Radiance;
    let num_samples = 400_000;
    for omega_o_z in [0.999, 0.98, 0.95] {
        let omega_o = Vec3d::new((1.0 - omega_o_z * omega_o_z).safe_sqrt(), 0.0, omega_o_z);
        let mut sum = 0.0;
        let mut sum2 = 0.0;
        for _ in 0..num_samples {
            let omega_i = spherical_sample(&mut rd);
            let value = material.pdf(omega_i, omega_o, all, mode, true) * 4.0 * consts::PI;
            sum += value;
            sum2 += value.sq();
        }
        #[allow(clippy::cast_lossless)]
        let n = num_samples as f64;
        let mean = sum / n;
        let variance = (sum2 / n - mean.sq()).max(0.0) * n / (n - 1.0);
        let std_error = (variance / n).sqrt();
        let confidence = (4.0 * std_error).max(0.03);
        assert_eq_approx_abs!(
            mean,
            1.0,
            confidence,
            r#"
    expected the monte carlo pdf integral to approach 1,
    but it approached {mean} after {num_samples} samples
    with a standard error of {std_error}.
    omega_o: {omega_o:?}"#
        );
    }
}
