#![allow(clippy::too_many_arguments)]

use anyhow::{Context, Result};
use log::*;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

pub mod vulkan;
pub mod window;

use vulkan::{ContextOptions, GraphicsContext, WindowGraphics};
pub use window::{WindowRegistry, WindowSettings};

/// Owns the event loop, the graphics context and the window registry, and
/// drives resize/close notifications back into the presentation layer.
#[derive(Debug)]
pub struct Engine {
    event_loop: EventLoop<()>,
    graphics: GraphicsContext,
    registry: WindowRegistry,
}

impl Engine {
    /// Creates one window per settings entry and binds each to a freshly
    /// bootstrapped graphics context.
    pub fn new(settings: Vec<WindowSettings>) -> Result<Engine> {
        let event_loop = EventLoop::new()?;

        let mut settings = settings.into_iter();
        let first_settings = settings
            .next()
            .context("at least one window is required")?;
        let first_window = build_window(&event_loop, &first_settings)?;

        // The bootstrap needs a surface to resolve the presentation queue,
        // so the first window's surface comes back out of it.
        let (graphics, first_surface) =
            unsafe { GraphicsContext::new(&first_window, &ContextOptions::default())? };

        let mut registry = WindowRegistry::new();
        let first_graphics =
            unsafe { WindowGraphics::from_surface(&graphics, &first_window, first_surface)? };
        registry.insert(first_window, first_graphics);

        for entry in settings {
            let window = build_window(&event_loop, &entry)?;
            let window_graphics = unsafe { WindowGraphics::bind(&graphics, &window)? };
            registry.insert(window, window_graphics);
        }

        Ok(Engine {
            event_loop,
            graphics,
            registry,
        })
    }

    pub fn window_count(&self) -> usize {
        self.registry.len()
    }

    /// Runs the event loop until the last window closes, then tears the
    /// graphics context down.
    pub fn run(self) -> Result<()> {
        let Engine {
            event_loop,
            mut graphics,
            mut registry,
        } = self;

        event_loop.run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } => match event {
                WindowEvent::Resized(size) => {
                    // Zero-sized means minimized; the swapchain keeps its
                    // last extent until the window comes back.
                    if size.width == 0 || size.height == 0 {
                        return;
                    }
                    if let Some(bound) = registry.get_mut(window_id) {
                        if let Some(window_graphics) = bound.graphics.as_mut() {
                            if let Err(err) =
                                unsafe { window_graphics.recreate(&graphics, &bound.window) }
                            {
                                error!("Presentation lost for {:?}: {}", window_id, err);
                                if let Some(mut lost) = bound.graphics.take() {
                                    unsafe { lost.destroy(&graphics) };
                                }
                            }
                        }
                    }
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    info!(
                        "key: {:?}, state: {:?}, repeat: {}",
                        key_event.physical_key, key_event.state, key_event.repeat
                    );
                }
                WindowEvent::Moved(position) => {
                    trace!("window {:?} moved to {:?}", window_id, position);
                }
                WindowEvent::CloseRequested => {
                    if let Some(mut bound) = registry.remove(window_id) {
                        if let Some(mut window_graphics) = bound.graphics.take() {
                            unsafe { window_graphics.destroy(&graphics) };
                        }
                    }
                    if registry.is_empty() {
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::LoopExiting => {
                for mut bound in registry.drain() {
                    if let Some(mut window_graphics) = bound.graphics.take() {
                        unsafe { window_graphics.destroy(&graphics) };
                    }
                }
                unsafe { graphics.destroy() };
            }
            _ => {}
        })?;

        Ok(())
    }
}

fn build_window(event_loop: &EventLoop<()>, settings: &WindowSettings) -> Result<Window> {
    let window = WindowBuilder::new()
        .with_title(&settings.title)
        .with_inner_size(LogicalSize::new(settings.width, settings.height))
        .build(event_loop)?;
    Ok(window)
}
