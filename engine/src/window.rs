use std::collections::HashMap;

use winit::window::{Window, WindowId};

use crate::vulkan::WindowGraphics;

/// Initial parameters for one window.
#[derive(Clone, Debug)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Humble".into(),
            width: 600,
            height: 500,
        }
    }
}

/// A live window together with its presentation state. `graphics` is `None`
/// once the window's presentation path has failed; the window itself stays
/// open.
#[derive(Debug)]
pub struct BoundWindow {
    pub window: Window,
    pub graphics: Option<WindowGraphics>,
}

impl BoundWindow {
    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Maps native window ids to their bound state so event-loop callbacks can
/// be dispatched. Lookup only: entries are inserted on creation and removed
/// on close, and the registry never decides a window's lifetime.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, BoundWindow>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, window: Window, graphics: WindowGraphics) {
        self.windows.insert(
            window.id(),
            BoundWindow {
                window,
                graphics: Some(graphics),
            },
        );
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut BoundWindow> {
        self.windows.get_mut(&id)
    }

    pub fn remove(&mut self, id: WindowId) -> Option<BoundWindow> {
        self.windows.remove(&id)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = BoundWindow> + '_ {
        self.windows.drain().map(|(_, bound)| bound)
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }
}
