//! Handlebars-backed renderer for release pull requests.

use super::TemplateError;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Serialize;
use serde_json::json;

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Usage: `{{#if (eq bump_type "transition")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let lhs = h.param(0).and_then(|v| v.value().as_str());
    let rhs = h.param(1).and_then(|v| v.value().as_str());

    let equal = matches!((lhs, rhs), (Some(a), Some(b)) if a == b);
    out.write(if equal { "true" } else { "" })?;
    Ok(())
}

/// Values exposed to the pull request body template.
#[derive(Debug, Clone, Serialize)]
pub struct BodyContext<'a> {
    /// Effective release version.
    pub version: &'a str,

    /// Version the release starts from.
    pub from: &'a str,

    /// Wire name of the bump type.
    pub bump_type: &'a str,

    /// Rendered options block.
    pub options: &'a str,

    /// Rendered changelog section.
    pub changelog: &'a str,
}

/// Renders release pull request titles and bodies.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the pull request title.
    ///
    /// # Arguments
    ///
    /// * `format` - Handlebars title format, e.g. `chore: release v{{version}}`
    /// * `version` - The effective release version
    ///
    /// # Errors
    ///
    /// Returns an error if the format references unknown variables.
    pub fn render_title(&self, format: &str, version: &str) -> Result<String, TemplateError> {
        Ok(self
            .handlebars
            .render_template(format, &json!({ "version": version }))?)
    }

    /// Renders the pull request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the template references unknown variables.
    pub fn render_body(&self, template: &str, context: &BodyContext<'_>) -> Result<String, TemplateError> {
        Ok(self.handlebars.render_template(template, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BodyContext<'static> {
        BodyContext {
            version: "1.1.0",
            from: "1.0.0",
            bump_type: "minor",
            options: "<!-- pls:options -->\n<!-- pls:options:end -->",
            changelog: "## 1.1.0",
        }
    }

    #[test]
    fn renders_title() {
        let renderer = TemplateRenderer::new();

        assert_eq!(
            renderer
                .render_title("chore: release v{{version}}", "1.3.0-alpha.0")
                .unwrap(),
            "chore: release v1.3.0-alpha.0"
        );
    }

    #[test]
    fn renders_body_without_escaping() {
        let renderer = TemplateRenderer::new();
        let body = renderer
            .render_body("{{options}}\n\n{{changelog}}", &context())
            .unwrap();

        assert_eq!(body, "<!-- pls:options -->\n<!-- pls:options:end -->\n\n## 1.1.0");
    }

    #[test]
    fn eq_helper_compares_strings() {
        let renderer = TemplateRenderer::new();
        let body = renderer
            .render_body(
                r#"{{#if (eq bump_type "minor")}}feature release{{else}}other{{/if}}"#,
                &context(),
            )
            .unwrap();

        assert_eq!(body, "feature release");
    }

    #[test]
    fn strict_mode_rejects_unknown_variables() {
        let renderer = TemplateRenderer::new();

        assert!(renderer.render_title("v{{release}}", "1.0.0").is_err());
    }
}
