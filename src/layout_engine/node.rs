use crate::layout_engine::{AutoTiler, Fork, ForkId};
use crate::sys::geometry::Rectangle;
use crate::sys::window::{WindowId, WindowManager};

/// A child slot of a fork: either a window leaf or another fork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    Window(WindowId),
    Fork(ForkId),
}

impl Node {
    pub fn is_window(&self, window: WindowId) -> bool {
        matches!(self, Node::Window(w) if *w == window)
    }

    /// Places this node into `area`.
    ///
    /// A sub-fork is always tiled with failure disallowed, so a refusal anywhere
    /// below rolls that fork back before it is reported here.
    pub fn tile(
        self,
        tiler: &mut AutoTiler,
        wm: &mut impl WindowManager,
        area: Rectangle,
        workspace: u32,
    ) -> bool {
        match self {
            Node::Window(window) => wm.place_window(window, &area, workspace),
            Node::Fork(fork) => Fork::tile(tiler, wm, fork, area, workspace, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_window_only_matches_the_same_leaf() {
        let mut tiler = AutoTiler::new();
        let a = WindowId::new(1, 1);
        let fork = tiler.create_fork(Node::Window(a), None, Rectangle::default(), 0);

        assert!(Node::Window(a).is_window(a));
        assert!(!Node::Window(a).is_window(WindowId::new(1, 2)));
        assert!(!Node::Fork(fork).is_window(a));
    }
}
