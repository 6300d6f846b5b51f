use std::f64::consts;

use crate::{Vec2d, Vec3d};

pub trait FloatExt {
    fn sq(self) -> Self;
    fn safe_sqrt(self) -> Self;
}

impl FloatExt for f64 {
    fn sq(self) -> Self {
        self * self
    }

    /// square root that clamps slightly negative inputs to zero instead of
    /// producing NaN
    fn safe_sqrt(self) -> Self {
        self.max(0.0).sqrt()
    }
}

pub trait VecExt {
    type Scalar;
    #[must_use]
    fn hsum(self) -> Self::Scalar;
    #[must_use]
    fn sq(self) -> Self;
    #[must_use]
    fn sqrt(self) -> Self;
    #[must_use]
    fn safe_sqrt(self) -> Self;
}

impl VecExt for Vec3d {
    type Scalar = f64;

    /// sum over the components / spectral channels
    fn hsum(self) -> Self::Scalar {
        self.x + self.y + self.z
    }

    fn sq(self) -> Self {
        self * self
    }

    fn sqrt(self) -> Self {
        Self {
            x: self.x.sqrt(),
            y: self.y.sqrt(),
            z: self.z.sqrt(),
        }
    }

    fn safe_sqrt(self) -> Self {
        self.max(Self::ZERO).sqrt()
    }
}

/// mirror `vec` around the normal `n`
pub fn reflect(n: Vec3d, vec: Vec3d) -> Vec3d {
    n * (n.dot(vec) * 2.0) - vec
}

/// normalized halfway vector between two directions, `None` if they cancel
pub fn halfway(a: Vec3d, b: Vec3d) -> Option<Vec3d> {
    (a + b).try_normalize()
}

/// squared tangent of the polar angle in the local frame
pub fn tan_theta2(v: Vec3d) -> f64 {
    (v.x.sq() + v.y.sq()) / v.z.sq()
}

/// tangent of the polar angle in the local frame
pub fn tan_theta(v: Vec3d) -> f64 {
    (v.x.sq() + v.y.sq()).sqrt() / v.z
}

/// sine of the polar angle of a unit direction
pub fn sin_theta(v: Vec3d) -> f64 {
    (1.0 - v.z.sq()).safe_sqrt()
}

/// cosine and sine of an azimuthal angle, packed as (cos, sin)
pub fn cossin(phi: f64) -> Vec2d {
    let (sin, cos) = phi.sin_cos();
    Vec2d::new(cos, sin)
}

/// true when both random numbers lie in [0, 1]
pub fn xi_valid(xi: Vec2d) -> bool {
    xi.x >= 0.0 && xi.y >= 0.0 && xi.x <= 1.0 && xi.y <= 1.0
}

pub fn pow5(v: f64) -> f64 {
    let v2 = v * v;
    v2 * v2 * v
}

// Lanczos coefficients, g = 7, n = 9
const LANCZOS: [f64; 8] = [
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// natural logarithm of the gamma function, valid for positive arguments
pub fn ln_gamma(x: f64) -> f64 {
    let x = x - 1.0;
    let mut acc = 0.999_999_999_999_809_9;
    for (i, c) in LANCZOS.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        {
            acc += c / (x + (i + 1) as f64);
        }
    }
    let t = x + 7.5;
    #[allow(clippy::suboptimal_flops)]
    {
        0.5 * (2.0 * consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
    }
}
