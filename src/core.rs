use std::fmt;

use bitflags::bitflags;

/// used for colors
pub type RgbD = glam::f64::DVec3;

/// used for direction vectors
pub type Vec3d = glam::f64::DVec3;
/// used for direction vectors
pub type Vec2d = glam::f64::DVec2;

bitflags! {
    /// Selects which physical component of a [`BSDF`] takes part in an
    /// evaluation or sampling call. Useful for models that are a sum of a
    /// diffuse and a specular term. Flags combine with bitwise or; the empty
    /// set selects nothing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentFlag: u8 {
        /// Diffuse reflectance component
        const DIFFUSE = 1 << 0;
        /// Specular reflectance component
        const SPECULAR = 1 << 1;
        /// All components
        const ALL = Self::DIFFUSE.bits() | Self::SPECULAR.bits();
    }
}

impl Default for ComponentFlag {
    fn default() -> Self {
        Self::empty()
    }
}

/// Whether an evaluation follows the physical (light transport) or the
/// adjoint (importance transport) convention. The incident and exitant
/// directions swap physical meaning between the two; the analytic models in
/// this crate are reciprocal and ignore the distinction, but the contract
/// carries it so that non-reciprocal models can honor it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Physical light transport
    #[default]
    Radiance,
    /// Adjoint importance transport
    Importance,
}

/// Contains the data that is returned by [`BSDF::sample`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsdfSample {
    /// The sampled incident direction. The zero vector when the sample is
    /// invalid (masked off, degenerate weights, random numbers outside
    /// `[0,1]`).
    pub direction: Vec3d,

    /// The probability density of choosing `direction` given the exitant
    /// direction. Equals what a subsequent [`BSDF::pdf`] call with the same
    /// direction pair returns, up to floating point rounding.
    pub pdf: f64,

    /// Which reflectance component produced the sample
    pub flag: ComponentFlag,
}

impl Default for BsdfSample {
    fn default() -> Self {
        Self {
            direction: Vec3d::ZERO,
            pdf: 0.0,
            flag: ComponentFlag::empty(),
        }
    }
}

/// Bidirectional Scattering Distribution Functions. A trait that describes
/// the reflectance properties of a surface.
///
/// All directions live in a local shading frame with the geometric normal
/// along +z; directions with a non-negative z component are above the
/// surface. Callers are responsible for passing unit vectors.
///
/// Every operation threads a boolean `mask` parameter. A false mask yields
/// the zero/neutral result; implementations must not divide, `sqrt` or `log`
/// unguarded values on masked-off calls. Numeric degeneracy (zero weights,
/// zero denominators, out-of-range random numbers) is never an error: the
/// affected call returns a zero result instead.
///
/// The `Display` supertrait renders the serialized text form of a model,
/// `TypeName(arg1, arg2, ...)`; see the [`crate::text`] module.
pub trait BSDF: fmt::Display {
    /// Returns the value of the BSDF for the given direction pair. The
    /// foreshortening term `|cos theta_i|` is not included.
    ///
    /// # Arguments
    /// * `omega_i` - Incident light direction
    /// * `omega_o` - Exitant light direction
    /// * `component` - Which reflectance component to evaluate
    /// * `mode` - Radiance or importance transport
    /// * `mask` - enable/disable the evaluation
    fn eval(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> RgbD;

    /// Given a direction where light is scattered to, samples an incident
    /// direction from which the light may come.
    ///
    /// The returned pdf is computed through [`BSDF::pdf`] so that sampling
    /// and density queries cannot drift apart.
    ///
    /// # Arguments
    /// * `omega_o` - Exitant light direction
    /// * `xi` - Two uniform random numbers in `[0,1]`
    /// * `component` - Which reflectance component to sample
    /// * `mode` - Radiance or importance transport
    /// * `mask` - enable/disable the sample
    fn sample(
        &self,
        omega_o: Vec3d,
        xi: Vec2d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> BsdfSample;

    /// Returns the probability density of sampling `omega_i` given `omega_o`
    /// with [`BSDF::sample`].
    fn pdf(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> f64;

    /// Returns the approximate hemispherical reflectance for a given exitant
    /// direction. This is a cheap importance-sampling weight, not ground
    /// truth.
    fn reflectance(
        &self,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> RgbD;
}

/// Exposes the free parameters of a model as a flat vector, together with
/// axis-aligned box bounds. Values and bounds share one ordering, so a
/// parameter vector produced by [`ParameterSet::parameter_values`] can be
/// mutated by an optimizer and written back with
/// [`ParameterSet::set_parameter_values`].
pub trait ParameterSet {
    /// The current parameter values.
    fn parameter_values(&self) -> Vec<f64>;

    /// Overwrites the parameters from a flat vector. `values` must have the
    /// same length as [`ParameterSet::parameter_values`] returns.
    fn set_parameter_values(&mut self, values: &[f64]);

    /// Component-wise lower bound of the valid parameter region.
    fn parameter_lower_bounds(&self) -> Vec<f64>;

    /// Component-wise upper bound of the valid parameter region.
    fn parameter_upper_bounds(&self) -> Vec<f64>;
}

#[cfg(test)]
mod tests {
    use super::{BsdfSample, ComponentFlag};

    #[test]
    fn component_flags() {
        assert_eq!(
            ComponentFlag::DIFFUSE | ComponentFlag::SPECULAR,
            ComponentFlag::ALL
        );
        assert!(ComponentFlag::ALL.contains(ComponentFlag::DIFFUSE));
        assert!(!ComponentFlag::DIFFUSE.contains(ComponentFlag::SPECULAR));
        assert_eq!(ComponentFlag::default(), ComponentFlag::empty());
    }

    #[test]
    fn default_sample_is_invalid() {
        let sample = BsdfSample::default();
        assert_eq!(sample.pdf, 0.0);
        assert_eq!(sample.direction.length(), 0.0);
        assert!(sample.flag.is_empty());
    }
}
