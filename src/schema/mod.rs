//! GraphQL schema introspection and SDL rendering.

pub mod introspection;
pub mod render;

pub use introspection::{SchemaClient, SchemaModel};
pub use render::render_sdl;
