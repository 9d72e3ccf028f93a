//! Rendering module
//!
//! A minimal `Canvas` surface with two implementations: an on-screen window
//! and a headless software frame buffer.

pub mod canvas;
pub mod draw;
pub mod framebuffer;
pub mod window;

pub use canvas::{Canvas, CanvasEvent, RenderError, Rgb, colors};
pub use draw::{draw_entity, draw_population};
pub use framebuffer::FrameBuffer;
pub use window::WindowCanvas;
