//! An in-memory window manager.
//!
//! Windows here behave like real ones in the one way that matters to the
//! tiler: a window never shrinks below its minimum size, and reports a refusal
//! when asked to.

use serde::Serialize;
use tracing::trace;

use crate::common::collections::HashMap;
use crate::layout_engine::Gaps;
use crate::sys::geometry::Rectangle;
use crate::sys::window::{WindowId, WindowManager};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MinimumSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeadlessWindow {
    pub frame: Option<Rectangle>,
    pub min_size: MinimumSize,
    pub workspace: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlacementRequest {
    pub window: WindowId,
    pub area: Rectangle,
    pub workspace: u32,
    pub accepted: bool,
}

#[derive(Debug, Default)]
pub struct HeadlessWindowManager {
    gaps: Gaps,
    windows: HashMap<WindowId, HeadlessWindow>,
    requests: Vec<PlacementRequest>,
}

impl HeadlessWindowManager {
    pub fn new(gaps: Gaps) -> Self {
        Self {
            gaps,
            ..Default::default()
        }
    }

    pub fn add_window(&mut self, window: WindowId) -> &mut HeadlessWindow {
        self.windows.entry(window).or_default()
    }

    pub fn set_min_size(&mut self, window: WindowId, width: i32, height: i32) {
        self.add_window(window).min_size = MinimumSize { width, height };
    }

    pub fn window(&self, window: WindowId) -> Option<&HeadlessWindow> { self.windows.get(&window) }

    pub fn frame(&self, window: WindowId) -> Option<Rectangle> {
        self.windows.get(&window).and_then(|w| w.frame)
    }

    /// The last area the tiler asked `window` to take, accepted or not.
    pub fn last_request(&self, window: WindowId) -> Option<&PlacementRequest> {
        self.requests.iter().rev().find(|r| r.window == window)
    }

    pub fn requests(&self) -> &[PlacementRequest] { &self.requests }

    pub fn take_requests(&mut self) -> Vec<PlacementRequest> { std::mem::take(&mut self.requests) }
}

impl WindowManager for HeadlessWindowManager {
    fn gaps(&self) -> Gaps { self.gaps }

    fn place_window(&mut self, window: WindowId, area: &Rectangle, workspace: u32) -> bool {
        let state = self.windows.entry(window).or_default();
        let min = state.min_size;
        let accepted = area.width >= min.width && area.height >= min.height;

        // Like a real client, the window keeps its minimum size when the
        // requested area is too small.
        state.frame = Some(Rectangle {
            width: area.width.max(min.width),
            height: area.height.max(min.height),
            ..*area
        });
        state.workspace = workspace;

        trace!(%window, %area, accepted, "placing window");
        self.requests.push(PlacementRequest {
            window,
            area: *area,
            workspace,
            accepted,
        });
        accepted
    }
}
