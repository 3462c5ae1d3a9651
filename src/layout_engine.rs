pub mod auto_tiler;
mod error;
pub mod fork;
pub(crate) mod graph;
pub mod node;

pub use auto_tiler::{AutoTiler, ForkId, ToplevelRegistry};
pub use error::TilerError;
pub use fork::{Fork, MINIMUM_LENGTH};
pub use graph::Orientation;
pub use node::Node;

/// Gap sizes in screen pixels, as handed to the tiler by the window manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gaps {
    /// Full gap between two siblings.
    pub inner: i32,
    /// Half of `inner`, trimmed from the left child of a split.
    pub inner_half: i32,
    /// Margin removed once from a toplevel's area.
    pub outer: i32,
}

impl Gaps {
    pub fn new(inner: i32, outer: i32) -> Self {
        Self {
            inner,
            inner_half: inner / 2,
            outer,
        }
    }
}
