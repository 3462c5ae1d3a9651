use crate::sys::geometry::{HEIGHT, Rectangle, WIDTH, XPOS, YPOS};

/// Split orientation of a fork.
///
/// `Horizontal` lays children side by side (splitting the width), `Vertical`
/// stacks them (splitting the height).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn toggle(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// The orientation that splits the longer side of `area`.
    pub fn for_area(area: &Rectangle) -> Self {
        if area.width > area.height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Rectangle slots of the split axis as `(length, position)`.
    pub fn axes(self) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (WIDTH, XPOS),
            Orientation::Vertical => (HEIGHT, YPOS),
        }
    }
}
