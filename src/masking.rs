//! Joint masking-shadowing strategies, combining two monodirectional
//! [`Ndf::g1`] terms into the `G` factor of a microfacet model.

use crate::ndf::Ndf;
use crate::Vec3d;

/// Combines two monodirectional masking terms of an [`Ndf`] into a joint
/// shadowing-masking attenuation. Every strategy returns zero when
/// `dot(omega_i, m) <= 0` or `dot(omega_o, m) <= 0`.
pub trait MaskingShadowing {
    fn eval<N: Ndf>(ndf: &N, omega_i: Vec3d, omega_o: Vec3d, m: Vec3d, mask: bool) -> f64;
}

/// Uncorrelated joint masking and shadowing, `G1(i) G1(o)`. Follows Eq. 98
/// from [Heitz 2014](https://jcgt.org/published/0003/02/03/).
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncorrelated;

impl MaskingShadowing for Uncorrelated {
    fn eval<N: Ndf>(ndf: &N, omega_i: Vec3d, omega_o: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && omega_i.dot(m) > 0.0 && omega_o.dot(m) > 0.0;
        if !mask {
            return 0.0;
        }
        ndf.g1(omega_i, m, mask) * ndf.g1(omega_o, m, mask)
    }
}

/// Height correlated joint masking and shadowing. Follows Eq. 99 from
/// [Heitz 2014](https://jcgt.org/published/0003/02/03/):
///
/// `1 / (1 + delta_i + delta_o) = g_i g_o / (g_i + g_o - g_i g_o)`
/// with `delta = 1/g - 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightCorrelated;

impl MaskingShadowing for HeightCorrelated {
    fn eval<N: Ndf>(ndf: &N, omega_i: Vec3d, omega_o: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && omega_i.dot(m) > 0.0 && omega_o.dot(m) > 0.0;
        if !mask {
            return 0.0;
        }
        let gi = ndf.g1(omega_i, m, mask);
        let go = ndf.g1(omega_o, m, mask);
        let gio = gi * go;
        let denom = gi + go - gio;
        if denom > f64::EPSILON {
            gio / denom
        } else {
            0.0
        }
    }
}

/// V-groove shadowing and masking, based on Torrance and Sparrow, "Theory
/// for off-specular reflection from roughened surfaces".
#[derive(Debug, Clone, Copy, Default)]
pub struct VGroove;

impl MaskingShadowing for VGroove {
    fn eval<N: Ndf>(_ndf: &N, omega_i: Vec3d, omega_o: Vec3d, m: Vec3d, mask: bool) -> f64 {
        let mask = mask && omega_i.dot(m) > 0.0 && omega_o.dot(m) > 0.0;
        if !mask {
            return 0.0;
        }
        (2.0 * m.z * omega_i.z / omega_i.dot(m))
            .min(2.0 * m.z * omega_o.z / omega_o.dot(m))
            .min(1.0)
    }
}
