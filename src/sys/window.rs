use serde::{Deserialize, Serialize};

use crate::layout_engine::Gaps;
use crate::sys::geometry::Rectangle;

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// An identifier representing a window.
///
/// Handles are allocated by the host and only compared for equality here; the
/// layout engine never owns the window they point at.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct WindowId {
    pub pid: pid_t,
    pub idx: u32,
}

impl WindowId {
    pub const fn new(pid: pid_t, idx: u32) -> WindowId { WindowId { pid, idx } }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.pid, self.idx)
    }
}

/// The host side of tiling: applies geometry to real windows.
pub trait WindowManager {
    /// Gap sizes already scaled to screen pixels.
    fn gaps(&self) -> Gaps;

    /// Moves and resizes `window` to `area` on `workspace`.
    ///
    /// Returns `false` when the window refuses the geometry, typically because
    /// `area` is below the window's minimum size.
    fn place_window(&mut self, window: WindowId, area: &Rectangle, workspace: u32) -> bool;
}
