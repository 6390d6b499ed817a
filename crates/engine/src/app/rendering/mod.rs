mod font;
mod renderer;
mod transform;

pub use font::text_size;
pub use renderer::{compose_frame, RenderError, Renderer};
pub use transform::{present_scale, window_to_logical, Viewport};
