//! Aggregation of independently-defined BSDFs into one mixture model.
//!
//! Two faces share a single mixture algorithm: [`AggregateModel`] composes a
//! tuple of statically-known models, [`AggregateBsdf`] holds a runtime list
//! of shared handles (for compositions only known at load time, e.g. parsed
//! from a string). Both produce identical results for identical children.
//!
//! Evaluation is the plain sum of the children. Sampling selects one child
//! with probability proportional to its approximate hemispherical
//! reflectance and reports the density of the full mixture, which keeps the
//! sample usable for unbiased Monte Carlo estimation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::text::{self, ParseError};
use crate::utils::VecExt;
use crate::{
    BsdfSample, ComponentFlag, RgbD, TransportMode, Vec2d, Vec3d, BSDF,
};

fn mixture_weights(
    children: &[&dyn BSDF],
    omega_o: Vec3d,
    component: ComponentFlag,
    mode: TransportMode,
    mask: bool,
) -> (Vec<f64>, f64) {
    let weights: Vec<f64> = children
        .iter()
        .map(|child| child.reflectance(omega_o, component, mode, mask).hsum())
        .collect();
    let sum = weights.iter().sum();
    (weights, sum)
}

fn mixture_eval(
    children: &[&dyn BSDF],
    omega_i: Vec3d,
    omega_o: Vec3d,
    component: ComponentFlag,
    mode: TransportMode,
    mask: bool,
) -> RgbD {
    children.iter().fold(RgbD::ZERO, |sum, child| {
        sum + child.eval(omega_i, omega_o, component, mode, mask)
    })
}

fn mixture_sample(
    children: &[&dyn BSDF],
    omega_o: Vec3d,
    xi: Vec2d,
    component: ComponentFlag,
    mode: TransportMode,
    mask: bool,
) -> BsdfSample {
    let mut result = BsdfSample::default();

    let (weights, sum) = mixture_weights(children, omega_o, component, mode, mask);

    // all children degenerate at this direction: report an invalid sample
    let mask = mask && sum > f64::EPSILON;
    if !mask {
        return result;
    }

    // Select a child proportional to its weight by walking the list in
    // stored order. There are few children, so a binary search over the
    // cumulative weights would be overkill.
    let mut residual = xi.x * sum;
    let mut resolved = false;
    for (child, &weight) in children.iter().zip(&weights) {
        if !resolved && residual >= 0.0 && residual <= weight {
            // re-normalize the first random number so the child sees [0,1]
            let xi0 = if weight > f64::EPSILON {
                residual / weight
            } else {
                0.0
            };
            result = child.sample(omega_o, Vec2d::new(xi0, xi.y), component, mode, mask);
            resolved = true;
        }
        residual -= weight;
    }

    // The density of the mixture at the sampled direction is the weighted
    // mean over all children, not the density of the selected child alone.
    result.pdf = 0.0;
    for (child, &weight) in children.iter().zip(&weights) {
        result.pdf += weight * child.pdf(result.direction, omega_o, component, mode, mask) / sum;
    }

    result
}

fn mixture_pdf(
    children: &[&dyn BSDF],
    omega_i: Vec3d,
    omega_o: Vec3d,
    component: ComponentFlag,
    mode: TransportMode,
    mask: bool,
) -> f64 {
    let (weights, sum) = mixture_weights(children, omega_o, component, mode, mask);

    let mask = mask && sum > f64::EPSILON;
    if !mask {
        return 0.0;
    }

    children
        .iter()
        .zip(&weights)
        .map(|(child, &weight)| {
            weight * child.pdf(omega_i, omega_o, component, mode, mask) / sum
        })
        .sum()
}

fn mixture_reflectance(
    children: &[&dyn BSDF],
    omega_o: Vec3d,
    component: ComponentFlag,
    mode: TransportMode,
    mask: bool,
) -> RgbD {
    children.iter().fold(RgbD::ZERO, |sum, child| {
        sum + child.reflectance(omega_o, component, mode, mask)
    })
}

fn fmt_children(children: &[&dyn BSDF], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Aggregate([")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, "])")
}

/// A tuple of statically-known BSDF models, viewed as an ordered child list.
pub trait BsdfTuple {
    fn children(&self) -> Vec<&dyn BSDF>;
}

macro_rules! impl_bsdf_tuple {
    ($($model:ident : $idx:tt),+) => {
        impl<$($model: BSDF),+> BsdfTuple for ($($model,)+) {
            fn children(&self) -> Vec<&dyn BSDF> {
                vec![$(&self.$idx as &dyn BSDF),+]
            }
        }
    };
}

impl_bsdf_tuple!(A: 0, B: 1);
impl_bsdf_tuple!(A: 0, B: 1, C: 2);
impl_bsdf_tuple!(A: 0, B: 1, C: 2, D: 3);

/// Compile-time aggregation of a fixed set of models. The composition owns
/// its children by value; the child order is the tuple order and determines
/// which child a given random number selects.
#[derive(Debug, Clone, Copy)]
pub struct AggregateModel<T>(pub T);

impl<T: BsdfTuple> BSDF for AggregateModel<T> {
    fn eval(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        mixture_eval(&self.0.children(), omega_i, omega_o, component, mode, mask)
    }

    fn sample(
        &self,
        omega_o: Vec3d,
        xi: Vec2d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> BsdfSample {
        mixture_sample(&self.0.children(), omega_o, xi, component, mode, mask)
    }

    fn pdf(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> f64 {
        mixture_pdf(&self.0.children(), omega_i, omega_o, component, mode, mask)
    }

    fn reflectance(
        &self,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        mixture_reflectance(&self.0.children(), omega_o, component, mode, mask)
    }
}

impl<T: BsdfTuple> fmt::Display for AggregateModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_children(&self.0.children(), f)
    }
}

/// Runtime aggregation over shared handles. The aggregate does not own the
/// model definitions; cloning is shallow and shares the children. The list
/// is fixed at construction and its order is significant.
#[derive(Clone)]
pub struct AggregateBsdf {
    children: Vec<Arc<dyn BSDF>>,
}

impl AggregateBsdf {
    #[must_use]
    pub fn new(children: Vec<Arc<dyn BSDF>>) -> Self {
        Self { children }
    }

    #[must_use]
    pub fn children(&self) -> &[Arc<dyn BSDF>] {
        &self.children
    }

    fn as_dyn(&self) -> Vec<&dyn BSDF> {
        self.children.iter().map(AsRef::as_ref).collect()
    }
}

impl FromIterator<Arc<dyn BSDF>> for AggregateBsdf {
    fn from_iter<I: IntoIterator<Item = Arc<dyn BSDF>>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl BSDF for AggregateBsdf {
    fn eval(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        mixture_eval(&self.as_dyn(), omega_i, omega_o, component, mode, mask)
    }

    fn sample(
        &self,
        omega_o: Vec3d,
        xi: Vec2d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> BsdfSample {
        mixture_sample(&self.as_dyn(), omega_o, xi, component, mode, mask)
    }

    fn pdf(
        &self,
        omega_i: Vec3d,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> f64 {
        mixture_pdf(&self.as_dyn(), omega_i, omega_o, component, mode, mask)
    }

    fn reflectance(
        &self,
        omega_o: Vec3d,
        component: ComponentFlag,
        mode: TransportMode,
        mask: bool,
    ) -> RgbD {
        mixture_reflectance(&self.as_dyn(), omega_o, component, mode, mask)
    }
}

impl fmt::Display for AggregateBsdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_children(&self.as_dyn(), f)
    }
}

impl fmt::Debug for AggregateBsdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AggregateBsdf({self})")
    }
}

impl FromStr for AggregateBsdf {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = text::expect_call(s, "Aggregate")?;
        let tokens = text::split_args(args);
        if tokens.len() != 1 {
            return Err(ParseError::argument_count("Aggregate", 1, tokens.len(), s));
        }
        let list = text::expect_list(tokens[0], s)?;
        text::split_args(list)
            .into_iter()
            .map(text::from_str_dyn)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}
