//! Native window backend
//!
//! A resizable winit window whose event loop is pumped once per frame, so the
//! simulation loop keeps control of pacing. Frames are rasterized into a
//! `FrameBuffer` at arena size and copied to a softbuffer surface. A window
//! larger than the arena shows background around the frame; a smaller one
//! crops it.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use glam::IVec2;
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use super::canvas::{Canvas, CanvasEvent, RenderError, Rgb, colors};
use super::framebuffer::FrameBuffer;

/// Pump rounds to wait for the window to appear
const OPEN_ATTEMPTS: u32 = 100;
const OPEN_POLL: Duration = Duration::from_millis(10);

type WindowSurface = Surface<Arc<Window>, Arc<Window>>;

/// winit callbacks; collects events until the canvas drains them
struct WindowHandler {
    title: String,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    surface: Option<WindowSurface>,
    /// `None` while the window has a zero-sized client area
    surface_size: Option<(NonZeroU32, NonZeroU32)>,
    events: Vec<CanvasEvent>,
    error: Option<RenderError>,
}

impl WindowHandler {
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RenderError> {
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size)
            .with_resizable(true);
        let window = Arc::new(event_loop.create_window(attributes).map_err(window_error)?);

        let context = Context::new(Arc::clone(&window)).map_err(window_error)?;
        let surface = Surface::new(&context, Arc::clone(&window)).map_err(window_error)?;
        let size = window.inner_size();

        self.window = Some(window);
        self.surface = Some(surface);
        self.resize_surface(size)
    }

    fn resize_surface(&mut self, size: PhysicalSize<u32>) -> Result<(), RenderError> {
        self.surface_size = NonZeroU32::new(size.width).zip(NonZeroU32::new(size.height));
        if let (Some(surface), Some((width, height))) = (self.surface.as_mut(), self.surface_size) {
            surface.resize(width, height).map_err(surface_lost)?;
        }
        Ok(())
    }
}

impl ApplicationHandler for WindowHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                self.events.push(CanvasEvent::CloseRequested);
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = self.resize_surface(size) {
                    self.error = Some(e);
                }
                self.events.push(CanvasEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            _ => {}
        }
    }
}

/// On-screen canvas
pub struct WindowCanvas {
    event_loop: EventLoop<()>,
    handler: WindowHandler,
    /// Arena-sized raster; also owns the close flag
    frame: FrameBuffer,
}

impl WindowCanvas {
    /// Open a resizable window showing a `width`x`height` arena.
    ///
    /// Must be called on the main thread.
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self, RenderError> {
        let event_loop = EventLoop::new().map_err(window_error)?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut canvas = Self {
            event_loop,
            handler: WindowHandler {
                title: title.to_string(),
                initial_size: PhysicalSize::new(width, height),
                window: None,
                surface: None,
                surface_size: None,
                events: Vec::new(),
                error: None,
            },
            frame: FrameBuffer::new(width, height),
        };

        for _ in 0..OPEN_ATTEMPTS {
            canvas.pump(Some(OPEN_POLL));
            if let Some(e) = canvas.handler.error.take() {
                return Err(e);
            }
            if canvas.handler.window.is_some() {
                log::info!("Opened {width}x{height} window");
                return Ok(canvas);
            }
        }
        Err(RenderError::Window("window was never created".into()))
    }

    /// Flag that other threads can set to request a close
    pub fn close_handle(&self) -> Arc<AtomicBool> {
        self.frame.close_handle()
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.handler)
        {
            log::debug!("Event loop exited with code {code}");
            self.handler.events.push(CanvasEvent::CloseRequested);
        }
    }
}

impl Canvas for WindowCanvas {
    fn size(&self) -> (u32, u32) {
        self.frame.size()
    }

    fn clear(&mut self, color: Rgb) {
        self.frame.clear(color);
    }

    fn fill_circle(&mut self, center: IVec2, radius: i32, color: Rgb) {
        self.frame.fill_circle(center, radius, color);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.frame.present()?;
        if let Some(e) = self.handler.error.take() {
            return Err(e);
        }
        let (Some(surface), Some((width, height))) =
            (self.handler.surface.as_mut(), self.handler.surface_size)
        else {
            return Ok(());
        };

        let mut buffer = surface.buffer_mut().map_err(surface_lost)?;
        let (src_width, src_height) = self.frame.size();
        blit(
            self.frame.presented(),
            (src_width, src_height),
            &mut buffer,
            (width.get(), height.get()),
        );
        buffer.present().map_err(surface_lost)
    }

    fn poll_events(&mut self) -> Vec<CanvasEvent> {
        self.pump(Some(Duration::ZERO));
        let mut events = std::mem::take(&mut self.handler.events);
        events.extend(self.frame.poll_events());
        events
    }
}

/// Copy an RGB frame into a `0RGB` surface, cropping or padding with background
fn blit(
    src: &[Rgb],
    (src_width, src_height): (u32, u32),
    dst: &mut [u32],
    (dst_width, dst_height): (u32, u32),
) {
    if dst_width == 0 {
        return;
    }
    let background = pack(colors::BACKGROUND);
    let src_width = src_width as usize;
    let copy_width = src_width.min(dst_width as usize);

    for (y, row) in dst
        .chunks_exact_mut(dst_width as usize)
        .take(dst_height as usize)
        .enumerate()
    {
        if y < src_height as usize {
            let src_row = &src[y * src_width..y * src_width + copy_width];
            for (out, color) in row.iter_mut().zip(src_row) {
                *out = pack(*color);
            }
            row[copy_width..].fill(background);
        } else {
            row.fill(background);
        }
    }
}

#[inline]
fn pack(color: Rgb) -> u32 {
    (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b)
}

fn window_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Window(e.to_string())
}

fn surface_lost(e: impl std::fmt::Display) -> RenderError {
    RenderError::SurfaceLost(e.to_string())
}
