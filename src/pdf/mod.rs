pub mod document;
pub mod render;
#[cfg(test)]
pub mod testing;

pub use document::DocumentSession;
pub use render::{default_renderer, PageRenderer, RenderOptions};
