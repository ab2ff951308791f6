//! The template seam between the stage and its host.
//!
//! The host pipeline owns the real substitution engine; the stage only needs
//! `render(template, context) -> String`. [`FieldRenderer`] is the minimal
//! built-in so the crate works standalone.

use crate::message::PipelineMessage;

/// Per-message rendering context handed to the [`Renderer`].
pub struct RenderContext<'a> {
    /// The message being handled
    pub message: &'a dyn PipelineMessage,

    /// Name of the stage instance doing the rendering
    pub stage: &'a str,
}

/// Expands the configured `from` template against a single message.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, ctx: &RenderContext<'_>) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&str, &RenderContext<'_>) -> String + Send + Sync,
{
    fn render(&self, template: &str, ctx: &RenderContext<'_>) -> String {
        self(template, ctx)
    }
}

/// Built-in renderer substituting `{value}` with the message text and
/// `{stage}` with the stage name. Hosts with a template engine supply their
/// own [`Renderer`] instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldRenderer;

impl Renderer for FieldRenderer {
    fn render(&self, template: &str, ctx: &RenderContext<'_>) -> String {
        template
            .replace("{value}", ctx.message.text().unwrap_or(""))
            .replace("{stage}", ctx.stage)
    }
}
