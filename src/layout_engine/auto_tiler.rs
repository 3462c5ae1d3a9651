use ascii_tree::Tree;
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::common::collections::HashMap;
use crate::layout_engine::{Fork, Gaps, Node, Orientation, TilerError};
use crate::sys::geometry::Rectangle;
use crate::sys::window::{WindowId, WindowManager};

slotmap::new_key_type! { pub struct ForkId; }

/// Toplevel forks by key (typically monitor and workspace), along with the
/// `(monitor, workspace)` pair they were registered with.
pub type ToplevelRegistry = HashMap<String, (ForkId, (u32, u32))>;

/// Owns every fork of every tree. Forks refer to each other by `ForkId`, so a
/// removed fork simply stops resolving.
#[derive(Default, Debug)]
pub struct AutoTiler {
    pub forks: SlotMap<ForkId, Fork>,
    pub toplevel: ToplevelRegistry,
}

impl AutoTiler {
    pub fn new() -> Self { Self::default() }

    pub fn fork(&self, fork: ForkId) -> Option<&Fork> { self.forks.get(fork) }

    pub fn fork_mut(&mut self, fork: ForkId) -> Option<&mut Fork> { self.forks.get_mut(fork) }

    pub fn create_fork(
        &mut self,
        left: Node,
        right: Option<Node>,
        area: Rectangle,
        workspace: u32,
    ) -> ForkId {
        let entity = self.forks.insert(Fork::new(left, right, area, workspace));
        for child in std::iter::once(left).chain(right) {
            if let Node::Fork(child) = child
                && let Some(child) = self.forks.get_mut(child)
            {
                child.set_parent(entity);
            }
        }
        entity
    }

    /// Frees a single fork. Its children are left as they are.
    pub fn remove_fork(&mut self, fork: ForkId) -> Option<Fork> {
        self.toplevel.retain(|_, (entity, _)| *entity != fork);
        self.forks.remove(fork)
    }

    pub fn parent_of(&self, fork: ForkId) -> Option<ForkId> {
        self.forks.get(fork)?.parent.filter(|parent| self.forks.contains_key(*parent))
    }

    pub fn root_of(&self, mut fork: ForkId) -> ForkId {
        while let Some(parent) = self.parent_of(fork) {
            fork = parent;
        }
        fork
    }

    pub fn toplevel(&self, key: &str) -> Option<(ForkId, (u32, u32))> {
        self.toplevel.get(key).copied()
    }

    pub fn set_toplevel(
        &mut self,
        gaps: &Gaps,
        fork: ForkId,
        key: impl Into<String>,
        id: (u32, u32),
    ) -> Result<(), TilerError> {
        let Self { forks, toplevel } = self;
        let entity = forks.get_mut(fork).ok_or(TilerError::ForkNotFound(fork))?;
        entity.set_toplevel(gaps, toplevel, fork, key, id);
        Ok(())
    }

    /// Starts a new tree holding a single window.
    pub fn create_toplevel(
        &mut self,
        gaps: &Gaps,
        window: WindowId,
        area: Rectangle,
        key: impl Into<String>,
        id: (u32, u32),
    ) -> Result<ForkId, TilerError> {
        if self.find_window(window).is_some() {
            return Err(TilerError::WindowAlreadyTiled(window));
        }
        let fork = self.create_fork(Node::Window(window), None, area, id.1);
        if let Some(entity) = self.forks.get_mut(fork) {
            entity.set_orientation(Orientation::for_area(&area));
        }
        self.set_toplevel(gaps, fork, key, id)?;
        Ok(fork)
    }

    /// The fork holding `window` as a direct child.
    pub fn find_window(&self, window: WindowId) -> Option<ForkId> {
        self.forks
            .iter()
            .find(|(_, fork)| {
                fork.left.is_window(window) || fork.right.is_some_and(|r| r.is_window(window))
            })
            .map(|(id, _)| id)
    }

    pub fn windows_under(&self, fork: ForkId) -> Vec<WindowId> {
        let mut out = Vec::new();
        self.collect_windows_under(Node::Fork(fork), &mut out);
        out
    }

    fn collect_windows_under(&self, node: Node, out: &mut Vec<WindowId>) {
        match node {
            Node::Window(window) => out.push(window),
            Node::Fork(fork) => {
                if let Some(fork) = self.forks.get(fork) {
                    self.collect_windows_under(fork.left, out);
                    if let Some(right) = fork.right {
                        self.collect_windows_under(right, out);
                    }
                }
            }
        }
    }

    /// Tiles `new` next to `onto`.
    ///
    /// If the fork holding `onto` has a free right slot, `new` takes it.
    /// Otherwise `onto` is split into a new fork that covers its current area.
    pub fn attach_window(
        &mut self,
        gaps: &Gaps,
        onto: WindowId,
        new: WindowId,
    ) -> Result<ForkId, TilerError> {
        if self.find_window(new).is_some() {
            return Err(TilerError::WindowAlreadyTiled(new));
        }
        let parent = self.find_window(onto).ok_or(TilerError::WindowNotTiled(onto))?;
        let fork = self.forks.get_mut(parent).ok_or(TilerError::ForkNotFound(parent))?;

        if fork.right.is_none() {
            fork.right = Some(Node::Window(new));
            debug!(%onto, %new, "attached window to free slot");
            return Ok(parent);
        }

        let area = fork.area_of(gaps, onto).ok_or(TilerError::WindowNotTiled(onto))?;
        let workspace = fork.workspace;
        let child = self.create_fork(Node::Window(onto), Some(Node::Window(new)), area, workspace);
        if let Some(entity) = self.forks.get_mut(child) {
            entity.set_orientation(Orientation::for_area(&area)).set_parent(parent);
        }
        self.replace_child(parent, Node::Window(onto), Node::Fork(child));
        debug!(%onto, %new, ?child, "split window into new fork");
        Ok(child)
    }

    /// Removes `window` from its tree.
    ///
    /// Returns the root of the tree that still holds windows, or `None` if the
    /// window was the last one.
    pub fn detach_window(&mut self, window: WindowId) -> Result<Option<ForkId>, TilerError> {
        let fork = self.find_window(window).ok_or(TilerError::WindowNotTiled(window))?;
        Ok(self.remove_child(fork, Node::Window(window)))
    }

    fn remove_child(&mut self, fork_id: ForkId, node: Node) -> Option<ForkId> {
        let parent = self.parent_of(fork_id);
        let fork = self.forks.get_mut(fork_id)?;

        if fork.left == node {
            match fork.right.take() {
                Some(right) => fork.left = right,
                None => {
                    debug!(?fork_id, "removing empty fork");
                    self.remove_fork(fork_id);
                    return parent.and_then(|parent| self.remove_child(parent, Node::Fork(fork_id)));
                }
            }
        } else if fork.right == Some(node) {
            fork.right = None;
        }

        // A non-toplevel fork with one child is redundant: hand the child to
        // the parent.
        if let Some(parent) = parent
            && let Some(fork) = self.forks.get(fork_id)
            && fork.right.is_none()
            && !fork.is_toplevel
        {
            let survivor = fork.left;
            self.replace_child(parent, Node::Fork(fork_id), survivor);
            self.remove_fork(fork_id);
            debug!(?fork_id, ?parent, "collapsed fork into parent");
            return Some(self.root_of(parent));
        }

        Some(self.root_of(fork_id))
    }

    fn replace_child(&mut self, fork_id: ForkId, old: Node, new: Node) {
        if let Node::Fork(child) = new
            && let Some(child) = self.forks.get_mut(child)
        {
            child.set_parent(fork_id);
        }
        if let Some(fork) = self.forks.get_mut(fork_id) {
            if fork.left == old {
                fork.left = new;
            } else if fork.right == Some(old) {
                fork.right = Some(new);
            }
        }
    }

    pub fn replace_window(&mut self, old: WindowId, new: WindowId) -> Result<ForkId, TilerError> {
        if self.find_window(new).is_some() {
            return Err(TilerError::WindowAlreadyTiled(new));
        }
        let fork = self.find_window(old).ok_or(TilerError::WindowNotTiled(old))?;
        if let Some(entity) = self.forks.get_mut(fork) {
            entity.replace_window(old, new);
        }
        Ok(fork)
    }

    /// Tiles the toplevel registered under `key` into its own area. Windows
    /// refusing their area do not stop the rest of the tree from moving.
    pub fn arrange(&mut self, wm: &mut impl WindowManager, key: &str) -> Result<bool, TilerError> {
        let (fork, (_, workspace)) =
            self.toplevel(key).ok_or_else(|| TilerError::ToplevelNotFound(key.to_string()))?;
        let area = self.forks.get(fork).ok_or(TilerError::ForkNotFound(fork))?.area;
        Ok(Fork::tile(self, wm, fork, area, workspace, true))
    }

    /// Moves the split of `fork` to `left_length` and re-tiles it. If any
    /// window refuses its new area the previous split is restored and `false`
    /// is returned.
    pub fn resize_fork(
        &mut self,
        wm: &mut impl WindowManager,
        fork: ForkId,
        left_length: i32,
    ) -> Result<bool, TilerError> {
        let entity = self.forks.get_mut(fork).ok_or(TilerError::ForkNotFound(fork))?;
        entity.set_ratio(left_length);
        info!(
            ?fork,
            requested = left_length,
            left_length = entity.left_length,
            "changing split ratio"
        );
        let (area, workspace) = (entity.area, entity.workspace);
        Ok(Fork::tile(self, wm, fork, area, workspace, false))
    }

    /// Toggles the orientation of the fork directly holding `window`.
    pub fn toggle_orientation(
        &mut self,
        wm: &mut impl WindowManager,
        window: WindowId,
    ) -> Result<bool, TilerError> {
        let fork = self.find_window(window).ok_or(TilerError::WindowNotTiled(window))?;
        let entity = self.forks.get_mut(fork).ok_or(TilerError::ForkNotFound(fork))?;
        entity.toggle_orientation();
        let (area, workspace) = (entity.area, entity.workspace);
        Ok(Fork::tile(self, wm, fork, area, workspace, true))
    }

    pub fn draw_tree(&self, fork: ForkId) -> String {
        let mut out = String::new();
        if ascii_tree::write_tree(&mut out, &self.tree_of(Node::Fork(fork))).is_err() {
            return "<unprintable tree>".to_string();
        }
        out
    }

    fn tree_of(&self, node: Node) -> Tree {
        match node {
            Node::Window(window) => Tree::Leaf(vec![format!("window {window}")]),
            Node::Fork(entity) => match self.forks.get(entity) {
                Some(fork) => {
                    let mut children = vec![self.tree_of(fork.left)];
                    children.extend(fork.right.map(|right| self.tree_of(right)));
                    let label = format!(
                        "fork {} left_length={} area={} workspace={}{}",
                        fork.orientation,
                        fork.left_length,
                        fork.area,
                        fork.workspace,
                        if fork.is_toplevel { " (toplevel)" } else { "" },
                    );
                    Tree::Node(label, children)
                }
                None => Tree::Leaf(vec![format!("missing fork {entity:?}")]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::sys::headless::HeadlessWindowManager;

    fn w(idx: u32) -> WindowId { WindowId::new(1, idx) }

    const SCREEN: Rectangle = Rectangle::new(0, 0, 1000, 800);
    const KEY: &str = "0:0";

    fn setup() -> (AutoTiler, HeadlessWindowManager, ForkId) {
        let mut tiler = AutoTiler::new();
        let wm = HeadlessWindowManager::new(Gaps::new(10, 10));
        let root = tiler.create_toplevel(&wm.gaps(), w(1), SCREEN, KEY, (0, 0)).unwrap();
        (tiler, wm, root)
    }

    fn requested(wm: &HeadlessWindowManager, window: WindowId) -> Option<Rectangle> {
        wm.last_request(window).map(|r| r.area)
    }

    #[test]
    fn toplevel_is_registered_and_inset() {
        let (tiler, _, root) = setup();
        let fork = tiler.fork(root).unwrap();
        assert!(fork.is_toplevel);
        assert!(fork.is_horizontal());
        assert_eq!(fork.area, Rectangle::new(10, 10, 980, 780));
        assert_eq!(tiler.toplevel(KEY), Some((root, (0, 0))));
    }

    #[test]
    fn attaching_fills_the_free_slot_then_splits() {
        let (mut tiler, mut wm, root) = setup();
        let gaps = wm.gaps();

        assert_eq!(tiler.attach_window(&gaps, w(1), w(2)), Ok(root));
        assert!(tiler.arrange(&mut wm, KEY).unwrap());
        assert_eq!(tiler.windows_under(root), vec![w(1), w(2)]);

        let child = tiler.attach_window(&gaps, w(2), w(3)).unwrap();
        assert_ne!(child, root);
        assert_eq!(tiler.parent_of(child), Some(root));
        assert_eq!(tiler.fork(root).unwrap().right, Some(Node::Fork(child)));
        assert_eq!(tiler.fork(child).unwrap().orientation, Orientation::Vertical);

        assert!(tiler.arrange(&mut wm, KEY).unwrap());
        assert_eq!(tiler.windows_under(root), vec![w(1), w(2), w(3)]);
        assert_eq!(requested(&wm, w(1)), Some(Rectangle::new(10, 10, 485, 780)));
        assert_eq!(requested(&wm, w(2)), Some(Rectangle::new(510, 10, 480, 385)));
        assert_eq!(requested(&wm, w(3)), Some(Rectangle::new(510, 410, 480, 380)));
        assert_eq!(tiler.find_window(w(3)), Some(child));
    }

    #[test]
    fn detaching_collapses_redundant_forks() {
        let (mut tiler, mut wm, root) = setup();
        let gaps = wm.gaps();
        tiler.attach_window(&gaps, w(1), w(2)).unwrap();
        let child = tiler.attach_window(&gaps, w(2), w(3)).unwrap();
        tiler.arrange(&mut wm, KEY).unwrap();

        assert_eq!(tiler.detach_window(w(2)), Ok(Some(root)));
        assert!(tiler.fork(child).is_none());
        assert_eq!(tiler.fork(root).unwrap().right, Some(Node::Window(w(3))));
        assert_eq!(tiler.windows_under(root), vec![w(1), w(3)]);

        assert_eq!(tiler.detach_window(w(1)), Ok(Some(root)));
        assert_eq!(tiler.fork(root).unwrap().left, Node::Window(w(3)));
        assert_eq!(tiler.fork(root).unwrap().right, None);

        assert!(tiler.arrange(&mut wm, KEY).unwrap());
        assert_eq!(requested(&wm, w(3)), Some(Rectangle::new(10, 10, 980, 780)));

        assert_eq!(tiler.detach_window(w(3)), Ok(None));
        assert!(tiler.forks.is_empty());
        assert_eq!(tiler.toplevel(KEY), None);
        assert_eq!(tiler.detach_window(w(3)), Err(TilerError::WindowNotTiled(w(3))));
    }

    #[test]
    fn detaching_from_a_nested_fork_keeps_the_grandchild() {
        let (mut tiler, wm, root) = setup();
        let gaps = wm.gaps();
        tiler.attach_window(&gaps, w(1), w(2)).unwrap();
        let child = tiler.attach_window(&gaps, w(2), w(3)).unwrap();
        let grandchild = tiler.attach_window(&gaps, w(3), w(4)).unwrap();

        tiler.detach_window(w(2)).unwrap();
        assert!(tiler.fork(child).is_none());
        assert_eq!(tiler.fork(root).unwrap().right, Some(Node::Fork(grandchild)));
        assert_eq!(tiler.parent_of(grandchild), Some(root));
        assert_eq!(tiler.windows_under(root), vec![w(1), w(3), w(4)]);
    }

    #[test]
    fn structural_errors() {
        let (mut tiler, mut wm, _) = setup();
        let gaps = wm.gaps();

        assert_eq!(tiler.attach_window(&gaps, w(9), w(2)), Err(TilerError::WindowNotTiled(w(9))));
        assert_eq!(
            tiler.attach_window(&gaps, w(1), w(1)),
            Err(TilerError::WindowAlreadyTiled(w(1)))
        );
        assert_eq!(
            tiler.create_toplevel(&gaps, w(1), SCREEN, "1:0", (1, 0)),
            Err(TilerError::WindowAlreadyTiled(w(1)))
        );
        assert_eq!(
            tiler.arrange(&mut wm, "nope"),
            Err(TilerError::ToplevelNotFound("nope".to_string()))
        );
    }

    #[test]
    fn resize_is_rolled_back_when_a_window_refuses() {
        let (mut tiler, mut wm, root) = setup();
        tiler.attach_window(&wm.gaps(), w(1), w(2)).unwrap();
        tiler.arrange(&mut wm, KEY).unwrap();
        wm.set_min_size(w(2), 400, 0);

        assert_eq!(tiler.resize_fork(&mut wm, root, 700), Ok(false));
        assert_eq!(tiler.fork(root).unwrap().left_length, 490);
        assert_eq!(requested(&wm, w(2)), Some(Rectangle::new(510, 10, 480, 780)));

        assert_eq!(tiler.resize_fork(&mut wm, root, 300), Ok(true));
        assert_eq!(tiler.fork(root).unwrap().left_length, 300);
        assert_eq!(requested(&wm, w(2)), Some(Rectangle::new(320, 10, 670, 780)));
    }

    #[test]
    fn toggle_orientation_retiles_the_fork() {
        let (mut tiler, mut wm, root) = setup();
        tiler.attach_window(&wm.gaps(), w(1), w(2)).unwrap();
        tiler.arrange(&mut wm, KEY).unwrap();

        assert_eq!(tiler.toggle_orientation(&mut wm, w(2)), Ok(true));
        let fork = tiler.fork(root).unwrap();
        assert_eq!(fork.orientation, Orientation::Vertical);
        assert_eq!(fork.left_length, 390);
        assert_eq!(requested(&wm, w(1)), Some(Rectangle::new(10, 10, 980, 385)));
        assert_eq!(requested(&wm, w(2)), Some(Rectangle::new(10, 410, 980, 380)));
    }

    #[test]
    fn replace_window_keeps_the_slot() {
        let (mut tiler, _, root) = setup();
        tiler.attach_window(&Gaps::default(), w(1), w(2)).unwrap();

        assert_eq!(tiler.replace_window(w(2), w(5)), Ok(root));
        assert_eq!(tiler.windows_under(root), vec![w(1), w(5)]);
        assert_eq!(tiler.replace_window(w(2), w(6)), Err(TilerError::WindowNotTiled(w(2))));
        assert_eq!(tiler.replace_window(w(1), w(5)), Err(TilerError::WindowAlreadyTiled(w(5))));
    }

    #[test]
    fn parent_lookup_fails_gracefully_once_removed() {
        let mut tiler = AutoTiler::new();
        let child = tiler.create_fork(Node::Window(w(1)), None, SCREEN, 0);
        let root = tiler.create_fork(Node::Fork(child), None, SCREEN, 0);

        assert_eq!(tiler.parent_of(child), Some(root));
        assert_eq!(tiler.root_of(child), root);

        tiler.remove_fork(root);
        assert_eq!(tiler.fork(child).unwrap().parent, Some(root));
        assert_eq!(tiler.parent_of(child), None);
        assert_eq!(tiler.root_of(child), child);
    }

    #[test]
    fn draw_tree_lists_forks_and_windows() {
        let (mut tiler, mut wm, root) = setup();
        let gaps = wm.gaps();
        tiler.attach_window(&gaps, w(1), w(2)).unwrap();
        tiler.arrange(&mut wm, KEY).unwrap();
        tiler.attach_window(&gaps, w(2), w(3)).unwrap();

        let drawn = tiler.draw_tree(root);
        assert!(drawn.contains("fork horizontal"), "{drawn}");
        assert!(drawn.contains("(toplevel)"), "{drawn}");
        assert!(drawn.contains("fork vertical"), "{drawn}");
        for idx in 1..=3 {
            assert!(drawn.contains(&format!("window 1:{idx}")), "{drawn}");
        }
    }
}
