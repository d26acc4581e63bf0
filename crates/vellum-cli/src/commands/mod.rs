//! Command implementations.

mod render;
mod writers;

pub use render::RenderCommand;
pub use writers::WritersCommand;
