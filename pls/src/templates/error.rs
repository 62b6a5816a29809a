//! Template rendering error types.

/// Errors raised while rendering pull request titles and bodies.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Handlebars rendering error, including unknown variables in strict mode.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}
