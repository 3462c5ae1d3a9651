use tracing::{debug, warn};

use crate::layout_engine::{AutoTiler, ForkId, Gaps, Node, Orientation, ToplevelRegistry};
use crate::sys::geometry::Rectangle;
use crate::sys::window::{WindowId, WindowManager};

/// Smallest length either side of a split may be given by a ratio change.
pub const MINIMUM_LENGTH: i32 = 256;

/// A tiling fork contains two child nodes. These nodes may either be windows,
/// or sub-forks.
#[derive(Clone, Debug, PartialEq)]
pub struct Fork {
    pub left: Node,
    /// A fork without a right child has not been split yet and hands its whole
    /// area to `left`.
    pub right: Option<Node>,
    /// Last area this subtree was tiled into. Toplevel forks keep their own,
    /// already inset by the outer gap.
    pub area: Rectangle,
    pub orientation: Orientation,
    /// Offset of the split along the split axis. Zero until the first tile.
    pub left_length: i32,
    /// `left_length` from before the last ratio change; the rollback target.
    pub prev_left: i32,
    pub parent: Option<ForkId>,
    pub workspace: u32,
    pub is_toplevel: bool,
}

impl Fork {
    pub fn new(left: Node, right: Option<Node>, area: Rectangle, workspace: u32) -> Self {
        Self {
            left,
            right,
            area,
            orientation: Orientation::Horizontal,
            left_length: 0,
            prev_left: 0,
            parent: None,
            workspace,
            is_toplevel: false,
        }
    }

    pub fn is_horizontal(&self) -> bool { self.orientation == Orientation::Horizontal }

    fn split_length(&self) -> i32 { self.area[self.orientation.axes().0] }

    /// Area of a window held directly by this fork. Windows inside sub-forks
    /// are not searched.
    pub fn area_of(&self, gaps: &Gaps, window: WindowId) -> Option<Rectangle> {
        if self.left.is_window(window) {
            Some(self.area_of_left())
        } else if self.right.is_some_and(|right| right.is_window(window)) {
            self.area_of_right(gaps)
        } else {
            None
        }
    }

    pub fn area_of_left(&self) -> Rectangle {
        let (length, _) = self.orientation.axes();
        let mut area = self.area;
        area[length] = self.left_length;
        area
    }

    pub fn area_of_right(&self, gaps: &Gaps) -> Option<Rectangle> {
        self.right?;
        let (length, position) = self.orientation.axes();
        let offset = self.left_length + gaps.inner;
        let mut area = self.area;
        area[position] += offset;
        area[length] -= offset;
        Some(area)
    }

    pub fn ratio(&self) -> f64 {
        match self.split_length() {
            0 => 0.0,
            total => self.left_length as f64 / total as f64,
        }
    }

    /// Replaces the area, keeping the split at the same proportion.
    pub fn set_area(&mut self, area: Rectangle) -> Rectangle {
        let prev = self.left_length;
        let ratio = self.ratio();
        self.area = area;
        self.left_length = (self.split_length() as f64 * ratio).round() as i32;
        debug!(prev, new = self.left_length, "recomputed left length");
        self.area
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> &mut Self {
        self.orientation = orientation;
        self
    }

    pub fn set_parent(&mut self, parent: ForkId) -> &mut Self {
        self.parent = Some(parent);
        self
    }

    /// Moves the split to `left_length`, keeping both sides at least
    /// `MINIMUM_LENGTH` long. The previous split is kept for rollback.
    ///
    /// On an axis shorter than `2 * MINIMUM_LENGTH` the right side wins and
    /// the split lands at `total - MINIMUM_LENGTH`.
    pub fn set_ratio(&mut self, left_length: i32) -> &mut Self {
        self.prev_left = self.left_length;
        let total = self.split_length();
        self.left_length = left_length.max(MINIMUM_LENGTH).min(total - MINIMUM_LENGTH);
        self
    }

    /// Marks this fork as the root of a tree and registers it under `key`.
    ///
    /// The outer gap is removed from `area` on the first promotion only.
    pub fn set_toplevel(
        &mut self,
        gaps: &Gaps,
        registry: &mut ToplevelRegistry,
        entity: ForkId,
        key: impl Into<String>,
        id: (u32, u32),
    ) -> &mut Self {
        registry.insert(key.into(), (entity, id));
        if !self.is_toplevel {
            self.is_toplevel = true;
            self.area.inset(gaps.outer);
        }
        self
    }

    /// Replaces the association of a window in a fork with another.
    ///
    /// When `left` does not hold `old`, a window on the right is overwritten
    /// whether or not it held `old`. A right sub-fork is never overwritten.
    pub fn replace_window(&mut self, old: WindowId, new: WindowId) -> bool {
        if self.left.is_window(old) {
            self.left = Node::Window(new);
            return true;
        }
        match &mut self.right {
            Some(right @ Node::Window(_)) => {
                if !right.is_window(old) {
                    warn!(%old, %new, "replacing right window that did not match");
                }
                *right = Node::Window(new);
                true
            }
            Some(Node::Fork(_)) | None => false,
        }
    }

    /// Flips the orientation and carries `left_length` across to the other
    /// axis, scaled by the ratio between the two axis lengths.
    pub fn toggle_orientation(&mut self) {
        let old_length = self.split_length();
        self.orientation = self.orientation.toggle();
        let new_length = self.split_length();

        self.left_length = match old_length {
            0 => 0,
            old => (self.left_length as f64 / old as f64 * new_length as f64).round() as i32,
        };
    }

    /// Tiles all windows within the fork `entity` into the given area.
    ///
    /// With `failure_allowed` unset, a child refusing its region restores the
    /// split from `prev_left`, re-tiles the children that were already moved,
    /// and returns `false`.
    pub fn tile(
        tiler: &mut AutoTiler,
        wm: &mut impl WindowManager,
        entity: ForkId,
        area: Rectangle,
        workspace: u32,
        failure_allowed: bool,
    ) -> bool {
        let gaps = wm.gaps();
        let Some(fork) = tiler.fork_mut(entity) else {
            warn!(?entity, "tried to tile a fork that no longer exists");
            return false;
        };

        if !fork.is_toplevel {
            fork.set_area(area);
        }

        if fork.left_length == 0 {
            fork.left_length = fork.split_length() / 2;
            fork.prev_left = fork.left_length;
        }

        fork.workspace = workspace;

        let (left, right, area, left_length) = (fork.left, fork.right, fork.area, fork.left_length);
        let (length, position) = fork.orientation.axes();

        let Some(right) = right else {
            return left.tile(tiler, wm, area, workspace) || failure_allowed;
        };

        let mut region = area;
        region[length] = left_length - gaps.inner_half;

        if !left.tile(tiler, wm, region, workspace) && !failure_allowed {
            debug!(?entity, "failed to move left node");
            if let Some((left_area, _)) = Self::restore_split(tiler, entity, &gaps) {
                left.tile(tiler, wm, left_area, workspace);
            }
            return false;
        }

        region[position] += left_length + gaps.inner;
        region[length] = area[length] - left_length - gaps.inner;

        if right.tile(tiler, wm, region, workspace) || failure_allowed {
            return true;
        }

        debug!(?entity, "failed to move right node");
        if let Some((left_area, right_area)) = Self::restore_split(tiler, entity, &gaps) {
            left.tile(tiler, wm, left_area, workspace);
            if let Some(right_area) = right_area {
                right.tile(tiler, wm, right_area, workspace);
            }
        }
        false
    }

    /// Puts the split back where it was before the last ratio change and
    /// returns the child areas it implies.
    fn restore_split(
        tiler: &mut AutoTiler,
        entity: ForkId,
        gaps: &Gaps,
    ) -> Option<(Rectangle, Option<Rectangle>)> {
        let fork = tiler.fork_mut(entity)?;
        debug!(from = fork.left_length, to = fork.prev_left, "rolling back split");
        fork.left_length = fork.prev_left;
        Some((fork.area_of_left(), fork.area_of_right(gaps)))
    }
}
