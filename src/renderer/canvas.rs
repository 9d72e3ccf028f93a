//! Display surface abstraction
//!
//! The simulation only needs to clear, draw filled circles, present and
//! learn about close requests. Anything that can do that can host the loop.

use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use glam::IVec2;
use thiserror::Error;

/// 8-bit RGB color
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Colors for scene elements
pub mod colors {
    use super::Rgb;

    pub const BACKGROUND: Rgb = Rgb::new(0, 0, 0);
}

/// Window/input events the loop cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    /// The user or the host asked to close
    CloseRequested,
    /// The surface changed size; drawing continues in arena coordinates
    Resized { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot open window: {0}")]
    Window(String),
    #[error("surface lost: {0}")]
    SurfaceLost(String),
    #[error("failed to write snapshot '{path}': {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A drawing surface
pub trait Canvas {
    /// Current size in pixels
    fn size(&self) -> (u32, u32);

    /// Fill the back buffer with `color`
    fn clear(&mut self, color: Rgb);

    /// Draw a filled circle, clipped to the surface
    fn fill_circle(&mut self, center: IVec2, radius: i32, color: Rgb);

    /// Show the back buffer
    fn present(&mut self) -> Result<(), RenderError>;

    /// Drain pending events
    fn poll_events(&mut self) -> Vec<CanvasEvent>;
}
