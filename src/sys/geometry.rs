use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub const XPOS: usize = 0;
pub const YPOS: usize = 1;
pub const WIDTH: usize = 2;
pub const HEIGHT: usize = 3;

/// An axis-aligned rectangle in screen pixels.
///
/// The four fields can also be addressed by index (`XPOS`, `YPOS`, `WIDTH`,
/// `HEIGHT`) so that orientation-generic code can talk about "the split axis"
/// without matching on the orientation at every step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn array(&self) -> [i32; 4] { [self.x, self.y, self.width, self.height] }

    pub fn right(&self) -> i32 { self.x + self.width }

    pub fn bottom(&self) -> i32 { self.y + self.height }

    /// Shrinks the rectangle by `amount` on every side. Saturates instead of
    /// wrapping on oversized amounts.
    pub fn inset(&mut self, amount: i32) -> &mut Self {
        let twice = amount.saturating_mul(2);
        self.x = self.x.saturating_add(amount);
        self.y = self.y.saturating_add(amount);
        self.width = self.width.saturating_sub(twice);
        self.height = self.height.saturating_sub(twice);
        self
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

impl Index<usize> for Rectangle {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        match index {
            XPOS => &self.x,
            YPOS => &self.y,
            WIDTH => &self.width,
            HEIGHT => &self.height,
            _ => panic!("rectangle index out of range: {index}"),
        }
    }
}

impl IndexMut<usize> for Rectangle {
    fn index_mut(&mut self, index: usize) -> &mut i32 {
        match index {
            XPOS => &mut self.x,
            YPOS => &mut self.y,
            WIDTH => &mut self.width,
            HEIGHT => &mut self.height,
            _ => panic!("rectangle index out of range: {index}"),
        }
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}
