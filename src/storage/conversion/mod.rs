//! Representation conversion and content negotiation
//!
//! Converters are capability-dispatch handlers that transform a
//! representation from one content type to another. Each declares fixed
//! input and output types; eligibility is decided on metadata and client
//! preferences only, never on payload content. A chain of converters is a
//! [`CompositeHandler`] over [`ConverterArgs`].

mod turtle;

pub use turtle::{QuadToTurtleConverter, TurtleToQuadConverter};

use crate::error::{HandlerError, HandlerResult};
use crate::handler::{AsyncHandler, CompositeHandler};
use crate::ldp::representation::{
    Preference, Representation, RepresentationPreferences, ResourceIdentifier,
};
use mime::Mime;

/// Content type of the internal structured form
pub const INTERNAL_QUADS: &str = "internal/quads";

/// Turtle serialization
pub const TEXT_TURTLE: &str = "text/turtle";

/// Opaque binary data
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Input for a representation converter
pub struct ConverterArgs {
    /// Resource the representation belongs to
    pub identifier: ResourceIdentifier,
    /// Representation to convert
    pub representation: Representation,
    /// Client preferences steering the output type
    pub preferences: RepresentationPreferences,
}

/// A converter chain: an ordered composite of representation converters
pub type ConverterChain = CompositeHandler<ConverterArgs, Representation>;

/// Boxed converter, ready to be chained
pub type BoxedConverter = Box<dyn AsyncHandler<Input = ConverterArgs, Output = Representation>>;

/// Whether a concrete content type falls in a (possibly wildcard) media range
pub fn matches_range(content_type: &str, range: &str) -> bool {
    let (Ok(value), Ok(range)) = (content_type.parse::<Mime>(), range.parse::<Mime>()) else {
        return content_type == range;
    };
    let type_matches = range.type_() == mime::STAR || range.type_() == value.type_();
    let subtype_matches = range.subtype() == mime::STAR || range.subtype() == value.subtype();
    type_matches && subtype_matches
}

/// Weight of a content type against a preference list
///
/// An empty list means no preference, which matches everything at weight 1.
/// Otherwise the highest weight among matching entries wins, and 0 means
/// incompatible.
pub fn type_weight(content_type: &str, preferences: &[Preference]) -> f64 {
    if preferences.is_empty() {
        return 1.0;
    }
    preferences
        .iter()
        .filter(|preference| matches_range(content_type, &preference.value))
        .map(|preference| preference.weight)
        .fold(0.0, f64::max)
}

/// Output type a converter should target for the given preferences
///
/// Picks the declared output with the highest preference weight; ties keep
/// the earliest declaration. `None` when no output is compatible.
pub fn best_output<'a>(
    outputs: &[&'a str],
    preferences: &RepresentationPreferences,
) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for output in outputs {
        let weight = type_weight(output, &preferences.content_type);
        if weight > 0.0 && best.map_or(true, |(_, w)| weight > w) {
            best = Some((output, weight));
        }
    }
    best.map(|(output, _)| output)
}

/// Validate a conversion request against a converter's declared types
///
/// Rejects when the representation's content type is not a supported input,
/// or when none of the supported outputs is compatible with the preferences.
pub fn check_request(
    args: &ConverterArgs,
    in_types: &[&str],
    out_types: &[&str],
) -> HandlerResult<()> {
    let content_type = args
        .representation
        .metadata
        .content_type()
        .ok_or_else(|| HandlerError::unsupported("Input has no content type."))?;
    if !in_types.contains(&content_type) {
        return Err(HandlerError::unsupported(format!(
            "Can only convert from {}.",
            in_types.join(", ")
        )));
    }
    if best_output(out_types, &args.preferences).is_none() {
        return Err(HandlerError::unsupported(format!(
            "Can only convert to {}.",
            out_types.join(", ")
        )));
    }
    Ok(())
}
