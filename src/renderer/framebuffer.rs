//! Software frame buffer
//!
//! Double-buffered RGB pixels in memory. Used for headless runs and tests,
//! and can export the last presented frame as a PNG.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::IVec2;

use super::canvas::{Canvas, CanvasEvent, RenderError, Rgb};

pub struct FrameBuffer {
    width: u32,
    height: u32,
    back: Vec<Rgb>,
    front: Vec<Rgb>,
    frames_presented: u64,
    /// Request close once this many frames have been presented
    frame_limit: Option<u64>,
    close_flag: Arc<AtomicBool>,
    close_sent: bool,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            back: vec![Rgb::default(); len],
            front: vec![Rgb::default(); len],
            frames_presented: 0,
            frame_limit: None,
            close_flag: Arc::new(AtomicBool::new(false)),
            close_sent: false,
        }
    }

    /// Ask to close after `frames` presented frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Flag that other threads can set to request a close
    pub fn close_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.close_flag)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Color of a pixel in the back buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.back.get(self.index(x, y)).copied()
    }

    /// Last presented frame, row-major
    pub fn presented(&self) -> &[Rgb] {
        &self.front
    }

    /// Write the last presented frame as a PNG
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let bytes: &[u8] = bytemuck::cast_slice(self.front.as_slice());
        let image = image::RgbImage::from_raw(self.width, self.height, bytes.to_vec())
            .ok_or_else(|| RenderError::SurfaceLost("frame buffer size mismatch".into()))?;
        image.save(path).map_err(|source| RenderError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved snapshot to {}", path.display());
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }
}

impl Canvas for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.back.fill(color);
    }

    fn fill_circle(&mut self, center: IVec2, radius: i32, color: Rgb) {
        if radius <= 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;

        for dy in -radius..=radius {
            let y = center.y + dy;
            if y < 0 || y > max_y {
                continue;
            }
            let half = ((radius * radius - dy * dy) as f32).sqrt() as i32;
            let x0 = (center.x - half).max(0);
            let x1 = (center.x + half).min(max_x);
            if x0 > x1 {
                continue;
            }
            let row = self.index(0, y as u32);
            self.back[row + x0 as usize..=row + x1 as usize].fill(color);
        }
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.front.copy_from_slice(&self.back);
        self.frames_presented += 1;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<CanvasEvent> {
        let limit_reached = self
            .frame_limit
            .is_some_and(|limit| self.frames_presented >= limit);
        if !self.close_sent && (limit_reached || self.close_flag.load(Ordering::Relaxed)) {
            self.close_sent = true;
            return vec![CanvasEvent::CloseRequested];
        }
        Vec::new()
    }
}
