//! Grid layout: slot arithmetic and output PDF composition.

pub mod compositor;
pub mod grid;

pub use compositor::{compose_handout, ComposeError, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
pub use grid::{GridError, GridShape, SlotRect};
