use thiserror::Error;

use crate::layout_engine::ForkId;
use crate::sys::window::WindowId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TilerError {
    #[error("Fork {0:?} no longer exists")]
    ForkNotFound(ForkId),
    #[error("Window {0} is not tiled")]
    WindowNotTiled(WindowId),
    #[error("Window {0} is already tiled")]
    WindowAlreadyTiled(WindowId),
    #[error("No toplevel registered under {0:?}")]
    ToplevelNotFound(String),
}
