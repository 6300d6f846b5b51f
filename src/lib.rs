#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::nursery)]
#![warn(clippy::suboptimal_flops)]
#![deny(clippy::return_self_not_must_use)]
#![allow(clippy::similar_names)]
#![deny(clippy::semicolon_if_nothing_returned)]
#![deny(clippy::must_use_candidate)]
#![deny(clippy::double_must_use)]
#![deny(clippy::use_self)]
#![deny(clippy::unreadable_literal)]
#![deny(clippy::explicit_iter_loop)]
// these are lints to enable later
#![allow(clippy::cast_lossless)]

//! A catalogue of physically-based BSDF models for rendering research:
//! evaluating, importance sampling and fitting reflectance models, and
//! exposing them to host renderers.
//!
//! # Design Decisions
//!
//! The heart of the crate is the [`BSDF`] trait with four operations:
//! `eval`, `sample`, `pdf` and `reflectance`. Microfacet models are
//! composed from three interchangeable strategies (a normal distribution,
//! a masking-shadowing term and a Fresnel term) in [`microfacet`];
//! heterogeneous models combine into reflectance-weighted mixtures in
//! [`aggregate`]; and [`optimizer`] provides a gradient-free compass
//! search for fitting model parameters against a reference through
//! [`loss`].
//!
//! All light transport math is done in [f64]. BSDFs are computed in a
//! local space: the surface is the xy-plane and the z-vector is the
//! normal, so incident and exitant vectors must be rotated before or
//! after evaluation. The `|omega_i.dot(n)|` foreshortening term is not
//! part of the BSDF; pdfs, on the other hand, take it into account when
//! generating samples for importance sampling.
//!
//! `sample` functions are deterministic: you pass the uniform random
//! numbers in `[0,1]` yourself, which lets you control the random
//! generator or low discrepancy sequence in use.
//!
//! Every operation threads a boolean `mask`; masked-off calls return the
//! zero/neutral value instead of raising, and degenerate numerics (zero
//! mixture weights, out-of-range random numbers) degrade to zero-valued
//! results the same way. Parsing of the textual model representation
//! ([`text`]) is the only fallible surface and reports typed errors.
//!
//! This crate is built on [glam] for a simple but fast vector math
//! library at the core.
//!
//! # References
//! A lot of rendering literature went into this. The most influential
//! sources:
//! * Bruce Walter, Stephen R. Marschner, Hongsong Li, and Kenneth E.
//!     Torrance. Microfacet models for refraction through rough surfaces.
//!     In *Proceedings of the Eurographics Symposium on Rendering,* 2007.
//! * Eric Heitz. Understanding the masking-shadowing function in
//!     microfacet-based brdfs. *Journal of Computer Graphics Techniques,
//!     3(2):32-91,* 2014.
//! * Eric Heitz. Sampling the GGX Distribution of Visible Normals.
//!     *Journal of Computer Graphics Techniques (JCGT)*, vol. 7, no. 4,
//!     1-13, 2018 <http://jcgt.org/published/0007/04/01/>
//! * Robert L. Cook and Kenneth E. Torrance. A reflectance model for
//!     computer graphics. *ACM SIGGRAPH Computer Graphics*, 1982.
//! * Mickael Ribardiere, Benjamin Bringier, Daniel Meneveaux, Lionel
//!     Simonot. STD: Student's t-Distribution of Slopes for Microfacet
//!     Based BSDFs. *Computer Graphics Forum*, 2017.
//! * Mahdi M. Bagher, Cyril Soler, and Nicolas Holzschuch. Accurate
//!     fitting of measured reflectances using a Shifted Gamma micro-facet
//!     distribution. *Computer Graphics Forum*, 2012.
//! * Tamara G. Kolda, Robert M. Lewis, and Virginia Torczon. Optimization
//!     by Direct Search: New Perspectives on Some Classical and Modern
//!     Methods. *SIAM Review*, 2003.

mod core;

pub use core::{
    BsdfSample, ComponentFlag, ParameterSet, RgbD, TransportMode, Vec2d, Vec3d, BSDF,
};

#[cfg(test)]
pub(crate) mod test_utils;
pub(crate) mod utils;

pub mod fresnel;
pub mod masking;
pub mod microfacet;
pub mod ndf;
pub mod text;

#[cfg(feature = "aggregate")]
pub mod aggregate;
#[cfg(feature = "beckmann")]
pub mod beckmann;
#[cfg(feature = "ggx")]
pub mod ggx;
#[cfg(feature = "lambert")]
pub mod lambert;
#[cfg(feature = "fit")]
pub mod loss;
#[cfg(feature = "fit")]
pub mod optimizer;
#[cfg(feature = "phong")]
pub mod phong;
#[cfg(feature = "shifted-gamma")]
pub mod shifted_gamma;
#[cfg(feature = "student-t")]
pub mod student_t;
