use thiserror::Error;

/// Errors surfaced by the component model itself.
///
/// Component *construction* is infallible; these arise only on the
/// orchestrator side, when placeholders are resolved against a runtime
/// context.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to render placeholder template")]
    Render(#[from] handlebars::RenderError),

    #[error("no output named `{0}` in runtime context")]
    UnknownOutput(String),
}
