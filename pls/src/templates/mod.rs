//! Pull request title and body rendering using Handlebars.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, BodyContext, TemplateRenderer};

/// Body template used when `pr-body-template` is not configured.
///
/// The template only renders a new pull request. Later runs replace the
/// options, changelog and debug blocks in place and leave the rest of the
/// body alone, so version details belong inside those blocks.
pub const DEFAULT_BODY_TEMPLATE: &str = "\
Merging this pull request publishes the release below. Pick a different version to steer it.

{{options}}

{{changelog}}
";
