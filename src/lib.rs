pub mod error;
pub mod model;
pub mod render;

pub use error::ReportError;
pub use model::{BenchData, RenderOptions};
pub use render::report::RstRenderer;

/// Render a complete bench report from pre-aggregated statistics.
///
/// Convenience wrapper around [`RstRenderer`].
pub fn render_report(data: BenchData, options: RenderOptions) -> String {
    RstRenderer::new(data, options).render()
}
