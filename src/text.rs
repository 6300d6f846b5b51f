//! Text representation of reflectance models.
//!
//! The format is `TypeName(arg1, arg2, ...)` with case-sensitive type
//! names, positional arguments, the same syntax recursively for nested
//! models and a bracketed list syntax `[a, b, c]` for vector-valued
//! parameters. Every concrete model implements `Display` (producing this
//! form) and `FromStr` (consuming it); [`from_str_dyn`] parses a string
//! whose concrete type is only known at run time.
//!
//! Numbers print through Rust's shortest round-trip formatting, so a
//! parse of a rendered model reconstructs bit-identical parameters.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{RgbD, BSDF};

/// Failure to parse the text form of a model. Malformed input is never
/// silently defaulted; every variant names the offending substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// the type name is not registered
    UnknownModel {
        /// the unrecognized type name
        name: String,
        /// the full offending substring
        input: String,
    },
    /// the type name does not match the expected model
    NameMismatch {
        expected: &'static str,
        found: String,
        input: String,
    },
    /// structurally malformed input
    Malformed {
        expected: &'static str,
        input: String,
    },
    /// a numeric argument failed to parse
    InvalidNumber { token: String, input: String },
    /// wrong number of arguments for the named model
    ArgumentCount {
        name: &'static str,
        expected: usize,
        found: usize,
        input: String,
    },
}

impl ParseError {
    pub(crate) fn argument_count(
        name: &'static str,
        expected: usize,
        found: usize,
        input: &str,
    ) -> Self {
        Self::ArgumentCount {
            name,
            expected,
            found,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModel { name, input } => {
                write!(f, "unknown model type `{name}` in `{input}`")
            }
            Self::NameMismatch {
                expected,
                found,
                input,
            } => write!(
                f,
                "mismatched model name `{found}`, expected `{expected}` in `{input}`"
            ),
            Self::Malformed { expected, input } => {
                write!(f, "malformed input, expected {expected} in `{input}`")
            }
            Self::InvalidNumber { token, input } => {
                write!(f, "invalid number `{token}` in `{input}`")
            }
            Self::ArgumentCount {
                name,
                expected,
                found,
                input,
            } => write!(
                f,
                "`{name}` takes {expected} argument(s), found {found} in `{input}`"
            ),
        }
    }
}

impl Error for ParseError {}

/// Splits `Name(args)` into the name and the raw argument substring. The
/// closing parenthesis must be the last non-whitespace character.
pub(crate) fn parse_call(input: &str) -> Result<(&str, &str), ParseError> {
    let malformed = || ParseError::Malformed {
        expected: "`TypeName(...)`",
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let open = trimmed.find('(').ok_or_else(malformed)?;
    let name = trimmed[..open].trim();
    if name.is_empty() || !trimmed.ends_with(')') {
        return Err(malformed());
    }
    let args = &trimmed[open + 1..trimmed.len() - 1];
    Ok((name, args))
}

/// Like [`parse_call`], but additionally checks the type name.
pub(crate) fn expect_call<'a>(
    input: &'a str,
    expected: &'static str,
) -> Result<&'a str, ParseError> {
    let (name, args) = parse_call(input)?;
    if name == expected {
        Ok(args)
    } else {
        Err(ParseError::NameMismatch {
            expected,
            found: name.to_string(),
            input: input.to_string(),
        })
    }
}

/// Splits an argument substring at the commas of the outermost nesting
/// level. Whitespace-only input produces no arguments.
pub(crate) fn split_args(args: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() || !tokens.is_empty() {
        tokens.push(last);
    }
    tokens
}

pub(crate) fn parse_scalar(token: &str, input: &str) -> Result<f64, ParseError> {
    token.trim().parse().map_err(|_| ParseError::InvalidNumber {
        token: token.trim().to_string(),
        input: input.to_string(),
    })
}

/// Parses a fixed count of comma separated scalars.
pub(crate) fn parse_scalars(
    args: &str,
    input: &str,
    expected: usize,
) -> Result<Vec<f64>, ParseError> {
    let tokens = split_args(args);
    if tokens.len() != expected {
        let (name, _) = parse_call(input)?;
        return Err(ParseError::ArgumentCount {
            // the registered names are static; fall back for foreign input
            name: registry_name(name).unwrap_or("model"),
            expected,
            found: tokens.len(),
            input: input.to_string(),
        });
    }
    tokens
        .into_iter()
        .map(|token| parse_scalar(token, input))
        .collect()
}

/// Strips the brackets of a `[a, b, c]` list token.
pub(crate) fn expect_list<'a>(token: &'a str, input: &str) -> Result<&'a str, ParseError> {
    let trimmed = token.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        Ok(&trimmed[1..trimmed.len() - 1])
    } else {
        Err(ParseError::Malformed {
            expected: "a bracketed list `[...]`",
            input: input.to_string(),
        })
    }
}

/// Parses a three channel `[r, g, b]` color.
pub(crate) fn parse_rgb(token: &str, input: &str) -> Result<RgbD, ParseError> {
    let list = expect_list(token, input)?;
    let tokens = split_args(list);
    if tokens.len() != 3 {
        return Err(ParseError::Malformed {
            expected: "a three channel list `[r, g, b]`",
            input: input.to_string(),
        });
    }
    Ok(RgbD::new(
        parse_scalar(tokens[0], input)?,
        parse_scalar(tokens[1], input)?,
        parse_scalar(tokens[2], input)?,
    ))
}

type DynParser = fn(&str) -> Result<Arc<dyn BSDF>, ParseError>;

fn parse_as<M>(input: &str) -> Result<Arc<dyn BSDF>, ParseError>
where
    M: BSDF + FromStr<Err = ParseError> + 'static,
{
    Ok(Arc::new(M::from_str(input)?))
}

// sorted by name; from_str_dyn dispatches with a binary search
static REGISTRY: &[(&str, DynParser)] = &[
    #[cfg(feature = "aggregate")]
    ("Aggregate", parse_as::<crate::aggregate::AggregateBsdf>),
    #[cfg(feature = "shifted-gamma")]
    ("Bagher", parse_as::<crate::microfacet::Bagher>),
    #[cfg(feature = "beckmann")]
    ("CookTorrance", parse_as::<crate::microfacet::CookTorrance>),
    #[cfg(feature = "lambert")]
    ("Lambertian", parse_as::<crate::lambert::Lambertian>),
    #[cfg(feature = "phong")]
    ("PhongWalter", parse_as::<crate::microfacet::PhongWalter>),
    #[cfg(feature = "student-t")]
    ("Ribardiere", parse_as::<crate::microfacet::Ribardiere>),
    #[cfg(feature = "ggx")]
    ("Walter", parse_as::<crate::microfacet::Walter>),
];

fn registry_name(name: &str) -> Option<&'static str> {
    REGISTRY
        .binary_search_by(|(registered, _)| registered.cmp(&name))
        .ok()
        .map(|i| REGISTRY[i].0)
}

/// Parses any registered model into a shared handle, dispatching on the
/// type name. Unrecognized names are an error carrying the name and the
/// offending substring.
pub fn from_str_dyn(input: &str) -> Result<Arc<dyn BSDF>, ParseError> {
    let (name, _) = parse_call(input)?;
    match REGISTRY.binary_search_by(|(registered, _)| registered.cmp(&name)) {
        Ok(i) => (REGISTRY[i].1)(input),
        Err(_) => Err(ParseError::UnknownModel {
            name: name.to_string(),
            input: input.to_string(),
        }),
    }
}
